//! Property-based tests for challenge sampling.
//!
//! Tests the following invariants:
//! - CHAL-1: sampling is a pure function of (seed, count, graph_size)
//! - CHAL-2: every challenge lies in [0, graph_size)
//! - CHAL-3: exactly `count` challenges come back
//! - CHAL-4: distinct seeds induce distinct challenge sets

#![allow(unused_imports)]
use crate::strategies::*;
use pospace::{Verifier, GRAPH_SIZE};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// CHAL-1: sampling is deterministic across verifier instances.
    #[test]
    fn prop_sampling_is_pure(seed in seed_bytes()) {
        let a = Verifier::new().sample_challenges(&seed, 16).unwrap();
        let b = Verifier::new().sample_challenges(&seed, 16).unwrap();
        prop_assert_eq!(a, b, "challenge sampling must be pure");
    }

    /// CHAL-2 and CHAL-3: count and range hold for every seed.
    #[test]
    fn prop_challenges_in_range(seed in seed_bytes(), count in 1usize..64) {
        let challenges = Verifier::new().sample_challenges(&seed, count).unwrap();
        prop_assert_eq!(challenges.len(), count);
        for c in challenges {
            prop_assert!((0..GRAPH_SIZE).contains(&c), "challenge {} out of range", c);
        }
    }

    /// CHAL-2 for non-standard graph sizes.
    #[test]
    fn prop_challenges_respect_graph_size(
        seed in seed_bytes(),
        graph_size in 2i64..10_000,
    ) {
        let challenges = Verifier::with_graph_size(graph_size)
            .sample_challenges(&seed, 16)
            .unwrap();
        for c in challenges {
            prop_assert!((0..graph_size).contains(&c));
        }
    }

    /// CHAL-4: distinct seeds induce distinct challenge sets.
    #[test]
    fn prop_distinct_seeds_distinct_challenges(
        seed1 in seed_bytes(),
        seed2 in seed_bytes(),
    ) {
        prop_assume!(seed1 != seed2);
        let a = Verifier::new().sample_challenges(&seed1, 16).unwrap();
        let b = Verifier::new().sample_challenges(&seed2, 16).unwrap();
        prop_assert_ne!(a, b, "distinct seeds must give distinct challenges");
    }

    /// Seeds of any other length are rejected.
    #[test]
    fn prop_wrong_seed_length_rejected(len in 0usize..256) {
        prop_assume!(len != pospace::SEED_SIZE);
        let seed = vec![0u8; len];
        prop_assert!(Verifier::new().sample_challenges(&seed, 16).is_err());
    }
}
