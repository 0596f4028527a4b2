//! Block records and storage for the proof-of-space chain.
//!
//! A block is three sub-records, each signed into the chain's history:
//! the hash sub-record carries the round's commit and space proofs and a
//! signature over the previous hash sub-record; the signature sub-record
//! signs the previous signature sub-record and the current transaction
//! sub-record; the transaction sub-record lists the block's transactions.
//! Blocks are appended to a single JSON block file.

mod block;
mod file;

pub use block::{Block, In, Out, SubHash, SubSignature, SubTx, Tx};
pub use file::BlockFile;

use thiserror::Error;

/// Result type alias using ChainError
pub type Result<T> = std::result::Result<T, ChainError>;

/// Errors from block assembly and the block file.
#[derive(Error, Debug)]
pub enum ChainError {
    #[error("block {0} is out of range")]
    OutOfRange(usize),

    #[error("block file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("block serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
