//! Mining-round control logic for the proof-of-space chain.

pub mod config;
pub mod round;

pub use config::{load_config, MinerConfig};
pub use round::Miner;
