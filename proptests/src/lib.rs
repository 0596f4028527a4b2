//! Property-based invariant suites for the proof-of-space engine.
//!
//! Covered invariants:
//! - CHAL-1..4: challenge sampling is pure, exact in count, and in range
//!   for every 64-byte seed
//! - GRAPH-1..3: every family keeps parents unique and strictly below
//!   their node across its parameter space

pub mod challenges;
pub mod graph;
pub mod strategies;
