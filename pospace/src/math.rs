//! Integer helpers and the arbitrary-precision float behind the quality
//! function.
//!
//! The quality score needs `D^(1/N)` where `D` is a 256-bit digest integer
//! and `N` the graph size. [`BigFloat`] is a minimal normalized binary
//! float (BigUint mantissa, power-of-two exponent, 256-bit precision) with
//! just the operations the Newton iteration requires.

use std::cmp::Ordering;

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};

/// True if `i` is a positive power of two.
pub fn is_pow2(i: i64) -> bool {
    i != 0 && i & (i - 1) == 0
}

/// `2^i` for small non-negative `i`.
pub fn pow2(i: i64) -> i64 {
    1 << i
}

/// Log base 2 of `i`, rounded up for non-powers of two.
pub fn log2(i: i64) -> i64 {
    let mut j = i;
    let mut l = 0;
    loop {
        j >>= 1;
        if j == 0 {
            break;
        }
        l += 1;
    }
    if is_pow2(i) {
        l
    } else {
        l + 1
    }
}

/// The smallest power of two that is `>= i`.
pub fn next_pow2(i: i64) -> i64 {
    if is_pow2(i) {
        i
    } else {
        pow2(log2(i))
    }
}

/// Mantissa precision in bits.
const PRECISION: u64 = 256;

/// Newton iteration cap; convergence is quadratic from the seeded estimate
/// so this is never reached on well-formed inputs.
const MAX_NEWTON_ITERS: usize = 1000;

/// A non-negative arbitrary-precision binary float: `mant * 2^exp`, with
/// the mantissa normalized to exactly [`PRECISION`] bits (or zero).
#[derive(Clone, Debug)]
pub struct BigFloat {
    mant: BigUint,
    exp: i64,
}

impl BigFloat {
    pub fn zero() -> Self {
        Self {
            mant: BigUint::zero(),
            exp: 0,
        }
    }

    pub fn one() -> Self {
        Self::from_u64(1)
    }

    pub fn is_zero(&self) -> bool {
        self.mant.is_zero()
    }

    pub fn from_u64(v: u64) -> Self {
        Self::from_biguint(BigUint::from(v))
    }

    pub fn from_biguint(n: BigUint) -> Self {
        Self::normalized(n, 0)
    }

    /// Lossless conversion from a positive finite double. Zero, negative
    /// and non-finite inputs map to zero.
    pub fn from_f64(x: f64) -> Self {
        if !(x.is_finite() && x > 0.0) {
            return Self::zero();
        }
        let bits = x.to_bits();
        let biased = (bits >> 52) & 0x7ff;
        let frac = bits & 0xf_ffff_ffff_ffff;
        let (mant, exp) = if biased == 0 {
            (BigUint::from(frac), -1074i64)
        } else {
            (BigUint::from(frac | 1 << 52), biased as i64 - 1075)
        };
        Self::normalized(mant, exp)
    }

    fn normalized(mut mant: BigUint, mut exp: i64) -> Self {
        if mant.is_zero() {
            return Self::zero();
        }
        let bits = mant.bits();
        if bits > PRECISION {
            let shift = bits - PRECISION;
            mant >>= shift;
            exp += shift as i64;
        } else if bits < PRECISION {
            let shift = PRECISION - bits;
            mant <<= shift;
            exp -= shift as i64;
        }
        Self { mant, exp }
    }

    pub fn mul(&self, other: &Self) -> Self {
        if self.is_zero() || other.is_zero() {
            return Self::zero();
        }
        Self::normalized(&self.mant * &other.mant, self.exp + other.exp)
    }

    /// `self / other`; `other` must be non-zero.
    pub fn div(&self, other: &Self) -> Self {
        debug_assert!(!other.is_zero(), "division by zero");
        if self.is_zero() {
            return Self::zero();
        }
        let num = &self.mant << PRECISION;
        Self::normalized(num / &other.mant, self.exp - other.exp - PRECISION as i64)
    }

    pub fn add(&self, other: &Self) -> Self {
        if self.is_zero() {
            return other.clone();
        }
        if other.is_zero() {
            return self.clone();
        }
        let (hi, lo) = if self.exp >= other.exp {
            (self, other)
        } else {
            (other, self)
        };
        let diff = (hi.exp - lo.exp) as u64;
        if diff > PRECISION + 1 {
            return hi.clone();
        }
        Self::normalized((&hi.mant << diff) + &lo.mant, lo.exp)
    }

    /// `|self - other|`.
    pub fn abs_diff(&self, other: &Self) -> Self {
        let (hi, lo) = match self.cmp(other) {
            Ordering::Less => (other, self),
            Ordering::Equal => return Self::zero(),
            Ordering::Greater => (self, other),
        };
        if lo.is_zero() {
            return hi.clone();
        }
        let diff = (hi.exp - lo.exp) as u64;
        if diff > PRECISION + 1 {
            return hi.clone();
        }
        Self::normalized((&hi.mant << diff) - &lo.mant, lo.exp)
    }

    pub fn cmp(&self, other: &Self) -> Ordering {
        match (self.is_zero(), other.is_zero()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => {}
        }
        // both mantissas are normalized to the same width, so the exponent
        // orders magnitudes
        self.exp.cmp(&other.exp).then(self.mant.cmp(&other.mant))
    }

    /// Approximate base-2 logarithm; `self` must be non-zero.
    fn log2_approx(&self) -> f64 {
        debug_assert!(!self.is_zero());
        let top = (&self.mant >> (PRECISION - 53)).to_u64().unwrap_or(1);
        (self.exp + PRECISION as i64 - 1) as f64 + (top as f64 / (1u64 << 52) as f64).log2()
    }

    /// Nearest double, saturating to infinity when out of range.
    pub fn to_f64(&self) -> f64 {
        if self.is_zero() {
            return 0.0;
        }
        let top = (&self.mant >> (PRECISION - 53)).to_u64().unwrap_or(0);
        top as f64 * ((self.exp + PRECISION as i64 - 53) as f64).exp2()
    }
}

/// `a^n` by repeated squaring; negative `n` yields the reciprocal power.
pub fn big_pow(a: &BigFloat, n: i64) -> BigFloat {
    let mut exp = a.clone();
    let mut n = n;
    if n < 0 {
        exp = BigFloat::one().div(&exp);
        n = -n;
    } else if n == 0 {
        return BigFloat::one();
    }
    let mut x = BigFloat::one();
    let mut i = n;
    while i > 1 {
        if i & 1 == 1 {
            x = exp.mul(&x);
        }
        exp = exp.mul(&exp);
        i >>= 1;
    }
    exp.mul(&x)
}

/// `a^(1/n)` by Newton's iteration, converging to an absolute error below
/// `1e-8`. The estimate is seeded from the logarithm so the iteration only
/// polishes.
pub fn nth_root(a: &BigFloat, n: i64) -> BigFloat {
    debug_assert!(n >= 1);
    if a.is_zero() {
        return BigFloat::zero();
    }
    if n == 1 {
        return a.clone();
    }
    let eps = BigFloat::from_f64(1e-8);
    let nf = BigFloat::from_u64(n as u64);

    // x0 = 2^(log2(a)/n), split into integral and fractional exponent parts
    // so huge inputs cannot overflow the double path
    let e = a.log2_approx() / n as f64;
    let ei = e.floor();
    let mut x = BigFloat::from_f64((e - ei).exp2());
    x.exp += ei as i64;
    if x.is_zero() {
        x = BigFloat::one();
    }

    for _ in 0..MAX_NEWTON_ITERS {
        let q = a.div(&big_pow(&x, n - 1));
        let d = q.abs_diff(&x).div(&nf);
        let converged = d.cmp(&eps) == Ordering::Less;
        if q.cmp(&x) != Ordering::Less {
            x = x.add(&d);
        } else {
            x = x.abs_diff(&d);
        }
        if converged {
            break;
        }
    }
    x
}
