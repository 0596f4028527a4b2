//! Proof-of-Space prover/verifier engine.
//!
//! A prover dedicates disk space by materialising a hard-to-pebble DAG of
//! hash labels, commits to the labelling with a Merkle tree, and answers
//! random challenges with short Merkle openings. Block-production weight in
//! the surrounding chain is proportional to the committed storage.
//!
//! # Architecture
//!
//! ```text
//! COMMIT PHASE:
//!   Construct DAG (butterfly / super-concentrator / stacked expanders)
//!     → Label nodes: H(pk ‖ index ‖ sorted parent labels)
//!     → Feed labels into disk Merkle tree → publish root as commit
//!
//! CHALLENGE PHASE:
//!   Seed → SHAKE-256 → challenge indices
//!     → CommitProof (leaf + parent openings) / SpaceProof (leaf openings)
//!     → Verify Merkle paths + label recomputation → quality score
//! ```
//!
//! # Example
//!
//! ```ignore
//! use pospace::{GraphFamily, Prover, Verifier};
//!
//! let mut prover = Prover::open(signing_key, "data/prover")?;
//! prover.merkle_tree(0)?;
//! prover.graph(0, GraphFamily::stacked_expanders())?;
//! prover.make_commit()?;
//!
//! let mut verifier = Verifier::new();
//! verifier.verify_commitment(&prover.make_commitment()?)?;
//! let challenges = verifier.space_challenges(&seed)?;
//! let proof = prover.prove_space(&seed, &challenges)?;
//! verifier.verify_space(&proof)?;
//! ```

pub mod encoding;
pub mod error;
pub mod graph;
pub mod hash;
pub mod math;
pub mod merkle;
pub mod prover;
pub mod quality;
pub mod store;
pub mod varint;
pub mod verifier;

pub use error::{PosError, Result, VerifyFailure};
pub use graph::{Graph, GraphFamily};
pub use hash::HASH_SIZE;
pub use merkle::{verify_proof, Proof, Tree};
pub use prover::{CommitProof, Commitment, Prover, SpaceProof};
pub use quality::{commit_quality, proof_quality, space_quality};
pub use store::{KvStore, BATCH_SIZE};
pub use verifier::{Verifier, ALPHA_MULT, BETA_MULT, GRAPH_SIZE, SEED_SIZE};
