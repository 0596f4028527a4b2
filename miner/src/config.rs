//! Miner configuration.
//!
//! Loads settings from `miner.toml` with environment variable overrides.
//!
//! # Example
//!
//! ```toml
//! [storage]
//! data_dir = "data/miner"
//!
//! [graph]
//! id = 0
//! family = "stacked_expanders"
//! n = 2048
//! k = 31
//! d = 5
//! localize = false
//!
//! [round]
//! delta = 50
//! timeout_secs = 10
//! ```

use anyhow::{Context, Result};
use pospace::GraphFamily;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// Read an env var, parse it, and apply it to `target`. Logs a warning on
/// parse failure.
fn env_parse<T: std::str::FromStr>(var: &str, target: &mut T) {
    if let Ok(val) = std::env::var(var) {
        match val.parse() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env = var,
                value = %val,
                expected_type = std::any::type_name::<T>(),
                "Invalid env var value, using default"
            ),
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct MinerConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub round: RoundConfig,
}

/// Storage locations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Directory holding the prover's graph and tree stores
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Path of the append-only block file
    #[serde(default = "default_chain_path")]
    pub chain_path: String,
}

fn default_data_dir() -> String {
    "data/miner/db".to_string()
}

fn default_chain_path() -> String {
    "data/miner/blocks".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            chain_path: default_chain_path(),
        }
    }
}

/// Graph selection
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GraphConfig {
    /// Graph id; equal ids reproduce identical graphs
    #[serde(default)]
    pub id: u64,
    /// DAG family and its parameters
    #[serde(flatten)]
    pub family: GraphFamily,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            id: 0,
            family: GraphFamily::stacked_expanders(),
        }
    }
}

/// Round timing
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RoundConfig {
    /// Seed lookback in blocks
    #[serde(default = "default_delta")]
    pub delta: usize,
    /// How long to wait for a competing block before publishing
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_delta() -> usize {
    50
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            delta: default_delta(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Load the configuration: TOML file (when present), then env overrides.
pub fn load_config(path: Option<&str>) -> Result<MinerConfig> {
    let path = path.unwrap_or("miner.toml");
    let mut config = if Path::new(path).exists() {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {path}"))?;
        toml::from_str(&raw).with_context(|| format!("parsing config file {path}"))?
    } else {
        MinerConfig::default()
    };

    env_parse("MINER_DATA_DIR", &mut config.storage.data_dir);
    env_parse("MINER_CHAIN_PATH", &mut config.storage.chain_path);
    env_parse("MINER_GRAPH_ID", &mut config.graph.id);
    env_parse("MINER_DELTA", &mut config.round.delta);
    env_parse("MINER_ROUND_TIMEOUT_SECS", &mut config.round.timeout_secs);

    Ok(config)
}
