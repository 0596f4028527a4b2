//! Disk-backed Merkle tree over graph labels.
//!
//! Nodes live in a key-value store keyed by their 1-based heap position
//! (root at 1, children of `k` at `2k` and `2k+1`). Leaves are consumed in
//! graph-index order and pair-hashed straight into the level above them, so
//! the store never holds raw leaves; a proof's first branch element is the
//! graph-side sibling label supplied by the caller.

use serde::{Deserialize, Serialize};

use crate::encoding;
use crate::error::{PosError, Result};
use crate::hash::label_digest;
use crate::math::next_pow2;
use crate::store::KvStore;
use crate::varint::encode_i64;

/// A Merkle opening for one leaf.
///
/// `pos` is the leaf's heap position (`idx + num_nodes + 1`); `branch`
/// holds the sibling labels from leaf to root, starting with the graph
/// sibling.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    #[serde(with = "encoding::base64_list")]
    pub branch: Vec<Vec<u8>>,
    pub idx: i64,
    pub pos: i64,
    #[serde(with = "encoding::base64_bytes")]
    pub value: Vec<u8>,
}

/// The on-disk Merkle tree builder and opener.
pub struct Tree {
    store: KvStore,
    leaf_count: i64,
    node_count: i64,
    num_leaves: i64,
    num_nodes: i64,
    value: Option<Vec<u8>>,
}

impl Tree {
    pub fn new(store: KvStore) -> Self {
        Self {
            store,
            leaf_count: 0,
            node_count: 0,
            num_leaves: 0,
            num_nodes: 0,
            value: None,
        }
    }

    /// Prepare for `num_leaves` leaves; the write cursor starts at the
    /// first position of the level above the leaves.
    pub fn init(&mut self, num_leaves: i64) {
        self.num_leaves = num_leaves;
        self.num_nodes = next_pow2(num_leaves) - 1;
        self.node_count = (self.num_nodes >> 1) + 1;
        self.leaf_count = 0;
        self.value = None;
    }

    /// The root label at position 1.
    pub fn root(&self) -> Result<Vec<u8>> {
        self.get_node(1)
    }

    /// Consume the next leaf in graph-index order. Even-indexed leaves are
    /// buffered; odd-indexed ones complete a pair, whose hash lands at the
    /// cursor position.
    pub fn add_leaf(&mut self, value: &[u8]) -> Result<()> {
        if self.leaf_count == self.num_leaves {
            return Err(PosError::Merkle(
                "cannot add leaf; maximum capacity reached".into(),
            ));
        }
        if self.leaf_count & 1 == 0 {
            self.value = Some(value.to_vec());
        } else {
            let mut pair = self.value.take().unwrap_or_default();
            pair.extend_from_slice(value);
            self.store.put(
                &encode_i64(self.node_count),
                &label_digest(&pair),
            )?;
            self.node_count += 1;
        }
        self.leaf_count += 1;
        Ok(())
    }

    /// Complete the tree: finish the top-of-leaves level (a lone buffered
    /// child hashes alone, vacant positions store the empty marker), then
    /// fold pairs of children downward until the root at position 1 is
    /// written.
    pub fn hash_levels(&mut self) -> Result<()> {
        while self.node_count > 0 {
            if self.node_count > self.num_nodes {
                self.node_count = self.num_nodes >> 1;
                continue;
            }
            if self.node_count > self.num_nodes >> 1 {
                let value = match self.value.take() {
                    Some(child) => label_digest(&child),
                    None => Vec::new(),
                };
                self.store.put(&encode_i64(self.node_count), &value)?;
                self.node_count += 1;
            } else {
                let left_pos = self.node_count << 1;
                let mut pair = self.get_node(left_pos)?;
                pair.extend_from_slice(&self.get_node(left_pos + 1)?);
                self.store
                    .put(&encode_i64(self.node_count), &label_digest(&pair))?;
                self.node_count -= 1;
            }
        }
        self.store.flush()
    }

    /// Build the opening for leaf `idx`. The caller supplies the leaf's own
    /// graph label and the graph sibling label (`graph_label(idx ^ 1)`),
    /// which seeds the branch; the remaining siblings are read from the
    /// store at `pos ^ 1` while `pos` halves toward the root.
    pub fn compute_proof(&self, idx: i64, sibling: &[u8], value: &[u8]) -> Result<Proof> {
        if idx < 0 {
            return Err(PosError::Merkle("idx cannot be less than 0".into()));
        }
        if idx >= self.num_leaves {
            return Err(PosError::Merkle(format!(
                "expected idx < {}; got idx={idx}",
                self.num_leaves
            )));
        }
        let mut proof = Proof {
            branch: vec![sibling.to_vec()],
            idx,
            pos: idx + self.num_nodes + 1,
            value: value.to_vec(),
        };
        let mut pos = proof.pos;
        loop {
            pos >>= 1;
            if pos == 1 {
                return Ok(proof);
            }
            proof.branch.push(self.get_node(pos ^ 1)?);
        }
    }

    fn get_node(&self, pos: i64) -> Result<Vec<u8>> {
        self.store
            .get(&encode_i64(pos))?
            .ok_or_else(|| PosError::Merkle(format!("missing tree node at position {pos}")))
    }
}

/// Recompute the root from an opening; the low bit of the running position
/// dictates each concatenation order.
pub fn verify_proof(proof: &Proof, root: &[u8]) -> bool {
    let mut pos = proof.pos;
    let mut value = proof.value.clone();
    for other in &proof.branch {
        let mut pair = Vec::with_capacity(value.len() + other.len());
        if pos & 1 == 0 {
            pair.extend_from_slice(&value);
            pair.extend_from_slice(other);
        } else {
            pair.extend_from_slice(other);
            pair.extend_from_slice(&value);
        }
        value = label_digest(&pair);
        pos >>= 1;
    }
    value == root
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_tree() -> (tempfile::TempDir, Tree) {
        let dir = tempfile::tempdir().unwrap();
        let db = sled::open(dir.path()).unwrap();
        let tree = Tree::new(KvStore::new(db.open_tree("tree").unwrap()));
        (dir, tree)
    }

    fn leaf(n: u8) -> Vec<u8> {
        vec![n; 32]
    }

    /// Build a tree over `count` distinct leaves and return it.
    fn build(count: i64) -> (tempfile::TempDir, Tree) {
        let (dir, mut tree) = open_tree();
        tree.init(count);
        for i in 0..count {
            tree.add_leaf(&leaf(i as u8)).unwrap();
        }
        tree.hash_levels().unwrap();
        (dir, tree)
    }

    #[test]
    fn test_root_of_two_leaves() {
        let (_dir, tree) = build(2);
        let mut pair = leaf(0);
        pair.extend_from_slice(&leaf(1));
        assert_eq!(tree.root().unwrap(), label_digest(&pair));
    }

    #[test]
    fn test_proofs_verify_for_every_leaf() {
        for count in [2i64, 4, 6, 8, 16] {
            let (_dir, tree) = build(count);
            let root = tree.root().unwrap();
            for idx in 0..count {
                let sibling = leaf((idx ^ 1) as u8);
                let proof = tree.compute_proof(idx, &sibling, &leaf(idx as u8)).unwrap();
                assert!(verify_proof(&proof, &root), "leaf {idx} of {count}");
            }
        }
    }

    #[test]
    fn test_non_power_of_two_leaf_count() {
        // 6 leaves pad the heap to 8; vacant top-level positions hold the
        // empty marker and still commit to the leaf count
        let (_dir, tree) = build(6);
        let root6 = tree.root().unwrap();
        let (_dir2, tree8) = build(8);
        assert_ne!(root6, tree8.root().unwrap());
    }

    #[test]
    fn test_tampered_branch_rejected() {
        let (_dir, tree) = build(8);
        let root = tree.root().unwrap();
        let mut proof = tree.compute_proof(3, &leaf(2), &leaf(3)).unwrap();
        assert!(verify_proof(&proof, &root));
        for level in 0..proof.branch.len() {
            let mut tampered = proof.clone();
            tampered.branch[level][0] ^= 1;
            assert!(!verify_proof(&tampered, &root), "flip at level {level}");
        }
        proof.value[0] ^= 1;
        assert!(!verify_proof(&proof, &root));
    }

    #[test]
    fn test_too_many_leaves_rejected() {
        let (_dir, mut tree) = open_tree();
        tree.init(2);
        tree.add_leaf(&leaf(0)).unwrap();
        tree.add_leaf(&leaf(1)).unwrap();
        assert!(matches!(
            tree.add_leaf(&leaf(2)),
            Err(PosError::Merkle(_))
        ));
    }

    #[test]
    fn test_proof_index_out_of_range() {
        let (_dir, tree) = build(4);
        assert!(tree.compute_proof(-1, &leaf(0), &leaf(0)).is_err());
        assert!(tree.compute_proof(4, &leaf(0), &leaf(0)).is_err());
    }

    #[test]
    fn test_proof_serialization_roundtrip() {
        let (_dir, tree) = build(4);
        let proof = tree.compute_proof(2, &leaf(3), &leaf(2)).unwrap();
        let json = serde_json::to_string(&proof).unwrap();
        let recovered: Proof = serde_json::from_str(&json).unwrap();
        assert_eq!(recovered, proof);
        assert!(verify_proof(&recovered, &tree.root().unwrap()));
    }

    #[test]
    fn test_proof_json_field_names() {
        let (_dir, tree) = build(4);
        let proof = tree.compute_proof(0, &leaf(1), &leaf(0)).unwrap();
        let json: serde_json::Value = serde_json::to_value(&proof).unwrap();
        for field in ["branch", "idx", "pos", "value"] {
            assert!(json.get(field).is_some(), "missing field {field}");
        }
    }

    #[test]
    fn test_deterministic_root() {
        let (_d1, a) = build(16);
        let (_d2, b) = build(16);
        assert_eq!(a.root().unwrap(), b.root().unwrap());
    }
}
