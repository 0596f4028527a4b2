//! The prover: owns a graph store and a Merkle tree store, publishes a
//! signed commitment, and answers challenge sets with Merkle openings.

use std::path::Path;

use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use serde::{Deserialize, Serialize};

use crate::encoding;
use crate::error::{PosError, Result};
use crate::graph::{Graph, GraphFamily};
use crate::merkle::{Proof, Tree};
use crate::store::KvStore;

/// The published commitment: the Merkle root over all node labels, signed
/// by the prover's long-term key.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Commitment {
    #[serde(with = "encoding::base64_bytes")]
    pub commit: Vec<u8>,
    #[serde(with = "encoding::base64_pubkey")]
    pub public_key: VerifyingKey,
    #[serde(with = "encoding::base64_signature")]
    pub signature: Signature,
}

/// A commit proof: one opening per challenge plus openings for every parent
/// of each challenged node, in sorted-ascending parent order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CommitProof {
    pub parent_proofs: Vec<Vec<Proof>>,
    pub proofs: Vec<Proof>,
    #[serde(with = "encoding::base64_pubkey")]
    pub public_key: VerifyingKey,
    #[serde(with = "encoding::base64_bytes")]
    pub seed: Vec<u8>,
    pub size: i64,
}

/// A space proof: one leaf opening per challenge.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpaceProof {
    pub proofs: Vec<Proof>,
    #[serde(with = "encoding::base64_pubkey")]
    pub public_key: VerifyingKey,
    #[serde(with = "encoding::base64_bytes")]
    pub seed: Vec<u8>,
    pub size: i64,
}

/// A prover instance. The graph and tree stores are named trees inside one
/// sled database owned exclusively by this prover.
pub struct Prover {
    commit: Vec<u8>,
    db: sled::Db,
    graph: Option<Graph>,
    signing_key: SigningKey,
    tree: Option<Tree>,
}

impl Prover {
    /// Open (or create) the prover's database at `path`.
    pub fn open(signing_key: SigningKey, path: impl AsRef<Path>) -> Result<Self> {
        let db = sled::open(path)?;
        Ok(Self {
            commit: Vec::new(),
            db,
            graph: None,
            signing_key,
            tree: None,
        })
    }

    pub fn public_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    pub fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    /// The Merkle root, empty until [`Prover::make_commit`] has run.
    pub fn commit(&self) -> &[u8] {
        &self.commit
    }

    pub fn graph_size(&self) -> Option<i64> {
        self.graph.as_ref().map(|g| g.size())
    }

    /// Attach the Merkle tree store with the given id.
    pub fn merkle_tree(&mut self, id: u64) -> Result<()> {
        let tree = self.db.open_tree(format!("tree-{id}"))?;
        self.tree = Some(Tree::new(KvStore::new(tree)));
        Ok(())
    }

    /// Construct the graph with the given id and family.
    pub fn graph(&mut self, id: u64, family: GraphFamily) -> Result<()> {
        let tree = self.db.open_tree(format!("graph-{}-{id}", family.name()))?;
        self.graph = Some(family.construct(KvStore::new(tree), id)?);
        Ok(())
    }

    /// The one-shot commit pipeline: label the graph, feed every label into
    /// the tree in index order, hash the levels, and adopt the root.
    pub fn make_commit(&mut self) -> Result<()> {
        let public_key = self.signing_key.verifying_key();
        let graph = self
            .graph
            .as_mut()
            .ok_or(PosError::InvalidState("graph is not set"))?;
        let tree = self
            .tree
            .as_mut()
            .ok_or(PosError::InvalidState("merkle tree is not set"))?;
        graph.set_labels(public_key.as_bytes())?;
        let num_leaves = graph.size();
        tree.init(num_leaves);
        for idx in 0..num_leaves {
            let label = graph.label(idx)?;
            tree.add_leaf(&label)?;
        }
        tree.hash_levels()?;
        self.commit = tree.root()?;
        Ok(())
    }

    /// Sign the commit with the long-term key.
    pub fn make_commitment(&self) -> Result<Commitment> {
        if self.commit.is_empty() {
            return Err(PosError::InvalidState("commit is not set"));
        }
        Ok(Commitment {
            commit: self.commit.clone(),
            public_key: self.public_key(),
            signature: self.signing_key.sign(&self.commit),
        })
    }

    /// Open every challenged leaf and, in sorted order, every parent of
    /// each challenged node.
    pub fn prove_commit(&self, seed: &[u8], challenges: &[i64]) -> Result<CommitProof> {
        let (graph, tree) = self.engine()?;
        let mut proofs = Vec::with_capacity(challenges.len());
        let mut parent_proofs = Vec::with_capacity(challenges.len());
        for &c in challenges {
            proofs.push(open_leaf(graph, tree, c)?);
            let parents = graph.parents(c)?;
            let mut opened = Vec::with_capacity(parents.len());
            for parent in parents {
                opened.push(open_leaf(graph, tree, parent)?);
            }
            parent_proofs.push(opened);
        }
        Ok(CommitProof {
            parent_proofs,
            proofs,
            public_key: self.public_key(),
            seed: seed.to_vec(),
            size: graph.size(),
        })
    }

    /// Open every challenged leaf.
    pub fn prove_space(&self, seed: &[u8], challenges: &[i64]) -> Result<SpaceProof> {
        let (graph, tree) = self.engine()?;
        let mut proofs = Vec::with_capacity(challenges.len());
        for &c in challenges {
            proofs.push(open_leaf(graph, tree, c)?);
        }
        Ok(SpaceProof {
            proofs,
            public_key: self.public_key(),
            seed: seed.to_vec(),
            size: graph.size(),
        })
    }

    fn engine(&self) -> Result<(&Graph, &Tree)> {
        let graph = self
            .graph
            .as_ref()
            .ok_or(PosError::InvalidState("graph is not set"))?;
        let tree = self
            .tree
            .as_ref()
            .ok_or(PosError::InvalidState("merkle tree is not set"))?;
        Ok((graph, tree))
    }
}

/// A leaf opening seeded with the graph-side sibling label.
fn open_leaf(graph: &Graph, tree: &Tree, idx: i64) -> Result<Proof> {
    let sibling = graph.label(idx ^ 1)?;
    let value = graph.label(idx)?;
    tree.compute_proof(idx, &sibling, &value)
}
