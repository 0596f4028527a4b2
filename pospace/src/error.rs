//! Error types for the proof-of-space engine.

use thiserror::Error;

/// Result type alias using PosError
pub type Result<T> = std::result::Result<T, PosError>;

/// Errors that can occur while building graphs, trees and proofs.
#[derive(Error, Debug)]
pub enum PosError {
    /// Invalid family parameters or an exhausted permutation slot
    #[error("graph construction failed: {0}")]
    Construction(String),

    /// A parent label was missing during labelling (internal bug)
    #[error("cannot label node {idx}: parent {parent} has no label")]
    Labeling { idx: i64, parent: i64 },

    /// Merkle tree misuse (too many leaves, out-of-range proof index)
    #[error("merkle tree error: {0}")]
    Merkle(String),

    /// A proof was rejected; the concrete reason is carried verbatim
    #[error("proof rejected: {0}")]
    Verification(#[from] VerifyFailure),

    /// Corrupt on-disk record
    #[error("corrupt record: {0}")]
    Decode(String),

    /// An operation was called out of order (e.g. proving before commit)
    #[error("invalid prover state: {0}")]
    InvalidState(&'static str),

    /// Key-value store failure
    #[error("store error: {0}")]
    Io(#[from] sled::Error),

    /// Malformed JSON input for proofs or blocks
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Concrete reasons a verifier rejects a proof.
///
/// These are rejections, not failures: the verifier's state is unchanged
/// and the caller may retry with a corrected proof.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifyFailure {
    #[error("expected {expected} proofs, got {got}")]
    ProofCount { expected: usize, got: usize },

    #[error("expected {expected} parent proof sets, got {got}")]
    ParentProofCount { expected: usize, got: usize },

    #[error("proof opens index {got}, challenge is {expected}")]
    WrongIndex { expected: i64, got: i64 },

    #[error("merkle path mismatch for index {idx}")]
    PathMismatch { idx: i64 },

    #[error("parent proof index {parent} not below challenge {challenge}")]
    ParentIndex { parent: i64, challenge: i64 },

    #[error("recomputed label does not match leaf value at index {idx}")]
    LabelMismatch { idx: i64 },

    #[error("expected commit of {expected} bytes, got {got}")]
    CommitLength { expected: usize, got: usize },

    #[error("expected seed of {expected} bytes, got {got}")]
    SeedLength { expected: usize, got: usize },

    #[error("commitment signature invalid")]
    Signature,

    #[error("no commitment received")]
    NoCommitment,

    #[error("no challenges sampled")]
    NoChallenges,
}
