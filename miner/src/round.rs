//! The mining round.
//!
//! Per round the miner derives a seed from the block `delta` deep in its
//! chain, mines a space proof and scores it, then listens for competing
//! blocks under a deadline. A strictly better arrival wins the round;
//! otherwise the miner mines its commit proof, assembles the next block
//! and appends it to the block file.

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info};

use chain::{Block, BlockFile, Tx};
use pospace::hash::sum512;
use pospace::{
    proof_quality, space_quality, CommitProof, GraphFamily, Prover, SpaceProof, Verifier,
};

use crate::config::MinerConfig;

/// A mining client: one prover, its verifier, and the local chain.
pub struct Miner {
    chain: BlockFile,
    delta: usize,
    prover: Prover,
    timeout: std::time::Duration,
    txs: Vec<Tx>,
    verifier: Verifier,
}

impl Miner {
    /// Open the miner's stores per `config` and commit its space.
    pub fn open(signing_key: ed25519_dalek::SigningKey, config: &MinerConfig) -> Result<Self> {
        if let Some(parent) = std::path::Path::new(&config.storage.chain_path).parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let chain = BlockFile::create(&config.storage.chain_path)
            .with_context(|| format!("creating block file {}", config.storage.chain_path))?;
        let prover = Prover::open(signing_key, &config.storage.data_dir)?;
        let graph_size = config.graph.family.size()?;
        let mut miner = Self {
            chain,
            delta: config.round.delta,
            prover,
            timeout: std::time::Duration::from_secs(config.round.timeout_secs),
            txs: Vec::new(),
            verifier: Verifier::with_graph_size(graph_size),
        };
        miner.init(config.graph.id, config.graph.family)?;
        Ok(miner)
    }

    /// Build the graph and tree, publish the commitment, and queue the
    /// commitment transaction for the next block.
    fn init(&mut self, id: u64, family: GraphFamily) -> Result<()> {
        self.prover.merkle_tree(id)?;
        self.prover.graph(id, family)?;
        info!(family = family.name(), size = self.prover.graph_size(), "graph constructed");
        self.prover.make_commit()?;
        let commitment = self.prover.make_commitment()?;
        self.verifier.verify_commitment(&commitment)?;
        info!(commit = hex::encode(self.prover.commit()), "space committed");
        self.txs.push(Tx::Commitment {
            public_key: commitment.public_key,
            commitment,
            tx_id: 0,
        });
        Ok(())
    }

    pub fn public_key(&self) -> ed25519_dalek::VerifyingKey {
        self.prover.public_key()
    }

    pub fn chain(&mut self) -> &mut BlockFile {
        &mut self.chain
    }

    /// The round seed: the hash of the block `delta` back from the tip
    /// (the tip itself while the chain is shallow, the empty hash on a
    /// fresh chain).
    pub fn seed(&mut self) -> Result<Vec<u8>> {
        let data = match self.chain.last() {
            None => Vec::new(),
            Some(last) => {
                let id = if last >= self.delta { last - self.delta } else { last };
                self.chain.read(id)?.serialize()?
            }
        };
        Ok(sum512(&data).to_vec())
    }

    /// Mine the space proof a seed induces.
    pub fn mine_space(&mut self, seed: &[u8]) -> Result<SpaceProof> {
        let challenges = self.verifier.space_challenges(seed)?;
        debug!(?challenges, "space challenges");
        Ok(self.prover.prove_space(seed, &challenges)?)
    }

    /// Mine the commit proof a seed induces.
    pub fn mine_commit(&mut self, seed: &[u8]) -> Result<CommitProof> {
        let challenges = self.verifier.commit_challenges(seed)?;
        Ok(self.prover.prove_commit(seed, &challenges)?)
    }

    /// The quality of this miner's own space proof for the current seed.
    pub fn space_proof_quality(&mut self) -> Result<f64> {
        let seed = self.seed()?;
        let proof = self.mine_space(&seed)?;
        Ok(space_quality(&self.verifier, &proof))
    }

    /// Run one round. Returns the published block, or `None` when a
    /// competing block of strictly higher quality arrived in time.
    ///
    /// Incoming blocks are assumed structurally validated by the gossip
    /// layer; only their quality is compared here. Ties go to the local
    /// proof, so the first arrival wins among equals.
    pub async fn round(&mut self, blocks: &mut mpsc::Receiver<Block>) -> Result<Option<Block>> {
        let seed = self.seed()?;
        let space_proof = self.mine_space(&seed)?;
        let quality = space_quality(&self.verifier, &space_proof);
        debug!(quality, "space proof mined");

        let deadline = Instant::now() + self.timeout;
        loop {
            tokio::select! {
                incoming = blocks.recv() => match incoming {
                    Some(block) => {
                        let rival = proof_quality(
                            block.hash_sub.space_proof.proofs.iter().map(|p| p.value.as_slice()),
                            self.verifier.graph_size(),
                        );
                        if rival > quality {
                            info!(
                                block_id = block.block_id(),
                                rival,
                                quality,
                                "yielding to higher-quality block"
                            );
                            return Ok(None);
                        }
                        debug!(block_id = block.block_id(), rival, "ignoring weaker block");
                    }
                    // channel closed: nobody left to compete
                    None => break,
                },
                _ = tokio::time::sleep_until(deadline) => break,
            }
        }

        let commit_proof = self.mine_commit(&seed)?;
        let signing_key = self.prover.signing_key().clone();
        let block = match self.chain.last() {
            Some(last) => {
                let prev = self.chain.read(last)?;
                Block::new(
                    last as i64 + 1,
                    &prev,
                    &signing_key,
                    commit_proof,
                    space_proof,
                    std::mem::take(&mut self.txs),
                )?
            }
            None => Block::genesis(
                &signing_key,
                commit_proof,
                space_proof,
                std::mem::take(&mut self.txs),
            )?,
        };
        self.chain.append(&block)?;
        info!(block_id = block.block_id(), quality, "block published");
        Ok(Some(block))
    }
}
