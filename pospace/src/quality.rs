//! The quality function: maps a proof to a mining score in `(0, 1]`.
//!
//! The opened leaf values are hashed into a digest `D`, read as a
//! non-negative arbitrary-precision integer; the quality is
//! `D^(1/N) / 2^(256/N)` for graph size `N`, so a uniformly random digest
//! gives a uniformly comparable score and a larger digest always scores
//! higher. An invalid proof scores 0.

use num_bigint::BigUint;
use num_traits::Zero;

use crate::hash::label_digest;
use crate::math::{nth_root, BigFloat};
use crate::prover::{CommitProof, SpaceProof};
use crate::verifier::Verifier;

/// Score a sequence of opened leaf values against a graph size.
pub fn proof_quality<'a, I>(values: I, graph_size: i64) -> f64
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let mut preimage = Vec::new();
    for value in values {
        preimage.extend_from_slice(value);
    }
    let digest = BigUint::from_bytes_be(&label_digest(&preimage));
    if digest.is_zero() {
        return 0.0;
    }
    let root = nth_root(&BigFloat::from_biguint(digest), graph_size);
    root.to_f64() / (256.0 / graph_size as f64).exp2()
}

/// Verify a commit proof and score it; an invalid proof scores 0.
pub fn commit_quality(verifier: &Verifier, proof: &CommitProof) -> f64 {
    match verifier.verify_commit(proof) {
        Ok(()) => proof_quality(
            proof.proofs.iter().map(|p| p.value.as_slice()),
            verifier.graph_size(),
        ),
        Err(_) => 0.0,
    }
}

/// Verify a space proof and score it; an invalid proof scores 0.
pub fn space_quality(verifier: &Verifier, proof: &SpaceProof) -> f64 {
    match verifier.verify_space(proof) {
        Ok(()) => proof_quality(
            proof.proofs.iter().map(|p| p.value.as_slice()),
            verifier.graph_size(),
        ),
        Err(_) => 0.0,
    }
}
