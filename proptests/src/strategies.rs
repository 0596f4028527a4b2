//! Shared proptest strategies.

use proptest::prelude::*;

/// An arbitrary challenge seed of the required length.
pub fn seed_bytes() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(any::<u8>(), pospace::SEED_SIZE)
}
