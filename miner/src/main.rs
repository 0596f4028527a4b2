//! Miner - proof-of-space mining client.

use anyhow::{Context, Result};
use clap::Parser;
use ed25519_dalek::SigningKey;
use rand::RngCore;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use miner::{load_config, Miner};

#[derive(Parser, Debug)]
#[command(author, version, about = "Proof-of-space mining client")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Number of rounds to mine (runs forever when omitted)
    #[arg(short, long)]
    rounds: Option<u64>,

    /// Hex-encoded 32-byte signing key (generated fresh when omitted)
    #[arg(short, long)]
    key: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    let signing_key = match cli.key.as_deref() {
        Some(raw) => {
            let bytes: [u8; 32] = hex::decode(raw)
                .context("signing key must be hex")?
                .try_into()
                .map_err(|_| anyhow::anyhow!("signing key must be 32 bytes"))?;
            SigningKey::from_bytes(&bytes)
        }
        None => {
            let mut bytes = [0u8; 32];
            rand::rng().fill_bytes(&mut bytes);
            SigningKey::from_bytes(&bytes)
        }
    };

    std::fs::create_dir_all(&config.storage.data_dir)
        .with_context(|| format!("creating data dir {}", config.storage.data_dir))?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        data_dir = %config.storage.data_dir,
        family = config.graph.family.name(),
        delta = config.round.delta,
        timeout_secs = config.round.timeout_secs,
        "Miner starting"
    );

    let mut miner = Miner::open(signing_key, &config)?;
    info!(public_key = hex::encode(miner.public_key().as_bytes()), "identity loaded");

    // without a peer reactor the inbound channel stays open and empty, so
    // every round runs out its deadline and publishes
    let (_blocks_tx, mut blocks_rx) = mpsc::channel(64);

    let mut round = 0u64;
    loop {
        if let Some(limit) = cli.rounds {
            if round == limit {
                break;
            }
        }
        round += 1;
        match miner.round(&mut blocks_rx).await? {
            Some(block) => info!(round, block_id = block.block_id(), "round won"),
            None => info!(round, "round yielded"),
        }
    }
    Ok(())
}
