//! SHA3 hashing primitives for labels, Merkle nodes and challenge streams.

use sha3::digest::{ExtendableOutput, Update, XofReader};
use sha3::{Digest, Sha3_256, Sha3_512, Shake256};

/// Output size in bytes of the label hash (32 selects SHA3-256, 64 SHA3-512).
pub const HASH_SIZE: usize = 32;

/// Hash `data` with the configured label hash.
pub fn label_digest(data: &[u8]) -> Vec<u8> {
    match HASH_SIZE {
        32 => sum256(data).to_vec(),
        64 => sum512(data).to_vec(),
        _ => unreachable!("HASH_SIZE must be 32 or 64"),
    }
}

/// SHA3-256 digest.
pub fn sum256(data: &[u8]) -> [u8; 32] {
    Sha3_256::digest(data).into()
}

/// SHA3-512 digest.
pub fn sum512(data: &[u8]) -> [u8; 64] {
    Sha3_512::digest(data).into()
}

/// Fill `out` with the SHAKE-256 expansion of `data`.
pub fn shake256(out: &mut [u8], data: &[u8]) {
    let mut hasher = Shake256::default();
    hasher.update(data);
    hasher.finalize_xof().read(out);
}
