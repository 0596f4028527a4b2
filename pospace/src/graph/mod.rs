//! The DAG engine: node storage, the three graph families, and labelling.
//!
//! A graph lives in a key-value store keyed by node index. Construction
//! writes empty node records, a family-specific pass adds edges (every
//! parent strictly below its child), and a final labelling pass assigns
//! `H(pk ‖ le64(i) ‖ sorted parent labels)` to each node in index order.

mod double_butterfly;
mod linear_super_concentrator;
mod node;
mod stacked_expanders;

pub use node::Node;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::{PosError, Result};
use crate::hash::{label_digest, sum256};
use crate::math::{is_pow2, log2, pow2};
use crate::store::KvStore;
use crate::varint::encode_i64;

/// The supported DAG families; each variant carries only its parameters and
/// constructs into the common [`Graph`] container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum GraphFamily {
    DoubleButterfly {
        g: i64,
        l: i64,
    },
    LinearSuperConcentrator {
        n: i64,
        k: i64,
        d: i64,
        localize: bool,
    },
    StackedExpanders {
        n: i64,
        k: i64,
        d: i64,
        localize: bool,
    },
}

impl GraphFamily {
    /// Default double butterfly (g=3, l=4).
    pub fn double_butterfly() -> Self {
        Self::DoubleButterfly { g: 3, l: 4 }
    }

    /// Default linear super-concentrator (n=256, k=3, d=4, localized).
    pub fn linear_super_concentrator() -> Self {
        Self::LinearSuperConcentrator {
            n: 256,
            k: 3,
            d: 4,
            localize: true,
        }
    }

    /// Default stacked expanders (n=2048, k=31, d=5, Chung layers),
    /// which commit to 65,536 nodes.
    pub fn stacked_expanders() -> Self {
        Self::StackedExpanders {
            n: 2048,
            k: 31,
            d: 5,
            localize: false,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::DoubleButterfly { .. } => "double_butterfly",
            Self::LinearSuperConcentrator { .. } => "linear_super_concentrator",
            Self::StackedExpanders { .. } => "stacked_expanders",
        }
    }

    /// Validate the parameters and compute the vertex count.
    pub fn size(&self) -> Result<i64> {
        match *self {
            Self::DoubleButterfly { g, l } => {
                if g < 1 {
                    return Err(PosError::Construction("g cannot be less than 1".into()));
                }
                if l < 1 {
                    return Err(PosError::Construction("l cannot be less than 1".into()));
                }
                let verts_per_row = pow2(g);
                let rows_per_section = 2 * g;
                Ok(verts_per_row * (l * (rows_per_section - 1) + 1))
            }
            Self::LinearSuperConcentrator { n, k, d, .. } => {
                if !is_pow2(n) || n < 16 {
                    return Err(PosError::Construction(
                        "n must be a power of two >= 16".into(),
                    ));
                }
                if k < 1 || log2(n) / 2 < k {
                    return Err(PosError::Construction(
                        "n must be a higher power of two for this many stages".into(),
                    ));
                }
                if d < 1 || d > linear_super_concentrator::smallest_stage(n, k) {
                    return Err(PosError::Construction(
                        "d must lie between 1 and the smallest stage size".into(),
                    ));
                }
                Ok(linear_super_concentrator::total_size(n, k))
            }
            Self::StackedExpanders { n, k, d, .. } => {
                if n < 2 {
                    return Err(PosError::Construction("n cannot be less than 2".into()));
                }
                if k < 1 {
                    return Err(PosError::Construction("k cannot be less than 1".into()));
                }
                if d < 1 || d > n {
                    return Err(PosError::Construction(
                        "d must lie between 1 and the layer size".into(),
                    ));
                }
                Ok(n * (k + 1))
            }
        }
    }

    /// Build the graph into `store`. Construction randomness is seeded from
    /// the family and `id`, so equal configurations reproduce bit-identical
    /// graphs.
    pub fn construct(&self, store: KvStore, id: u64) -> Result<Graph> {
        let size = self.size()?;
        let mut graph = Graph::create(store, size, self.name())?;
        let mut rng = construction_rng(self.name(), id);
        match *self {
            Self::DoubleButterfly { g, l } => double_butterfly::construct(&mut graph, g, l)?,
            Self::LinearSuperConcentrator { n, k, d, localize } => {
                linear_super_concentrator::construct(&mut graph, &mut rng, n, k, d, localize)?
            }
            Self::StackedExpanders { n, k, d, localize } => {
                stacked_expanders::construct(&mut graph, &mut rng, n, k, d, localize)?
            }
        }
        Ok(graph)
    }
}

fn construction_rng(family: &str, id: u64) -> StdRng {
    let mut preimage = Vec::with_capacity(family.len() + 16);
    preimage.extend_from_slice(b"pospace/graph/");
    preimage.extend_from_slice(family.as_bytes());
    preimage.extend_from_slice(&encode_i64(id as i64));
    StdRng::from_seed(sum256(&preimage))
}

/// A constructed DAG backed by a key-value store.
pub struct Graph {
    store: KvStore,
    size: i64,
    family: &'static str,
}

impl Graph {
    /// Allocate empty node records for every index.
    fn create(store: KvStore, size: i64, family: &'static str) -> Result<Self> {
        let mut graph = Self {
            store,
            size,
            family,
        };
        for idx in 0..size {
            graph.put(&Node::new(idx))?;
        }
        graph.store.flush()?;
        Ok(graph)
    }

    pub fn size(&self) -> i64 {
        self.size
    }

    pub fn family(&self) -> &'static str {
        self.family
    }

    pub fn get(&self, idx: i64) -> Result<Node> {
        if idx < 0 {
            return Err(PosError::Decode("idx cannot be less than 0".into()));
        }
        if idx >= self.size {
            return Err(PosError::Decode(format!(
                "expected idx < {}; got idx={idx}",
                self.size
            )));
        }
        let data = self
            .store
            .get(&encode_i64(idx))?
            .ok_or_else(|| PosError::Decode(format!("missing node record {idx}")))?;
        let nd = Node::from_bytes(&data)?;
        if nd.idx != idx {
            return Err(PosError::Decode(format!(
                "node record {idx} carries idx {}",
                nd.idx
            )));
        }
        Ok(nd)
    }

    pub(crate) fn put(&mut self, nd: &Node) -> Result<()> {
        self.store.put(&encode_i64(nd.idx), &nd.to_bytes())
    }

    pub(crate) fn flush(&mut self) -> Result<()> {
        self.store.flush()
    }

    /// Parent indices of `idx`, in stored order (sorted after labelling).
    pub fn parents(&self, idx: i64) -> Result<Vec<i64>> {
        Ok(self.get(idx)?.parents)
    }

    /// The label of `idx`; empty until [`Graph::set_labels`] has run.
    pub fn label(&self, idx: i64) -> Result<Vec<u8>> {
        Ok(self.get(idx)?.label)
    }

    /// Assign every node its label `H(pk ‖ le64(i) ‖ sorted parent labels)`,
    /// walking indices in order so parent labels always exist.
    pub fn set_labels(&mut self, public_key: &[u8]) -> Result<()> {
        for idx in 0..self.size {
            let mut nd = self.get(idx)?;
            let mut preimage = Vec::with_capacity(public_key.len() + 8 + nd.parents.len() * 32);
            preimage.extend_from_slice(public_key);
            preimage.extend_from_slice(&encode_i64(idx));
            if nd.has_parents() {
                nd.parents.sort_unstable();
                for &parent in &nd.parents {
                    let label = self.label(parent)?;
                    if label.is_empty() {
                        return Err(PosError::Labeling { idx, parent });
                    }
                    preimage.extend_from_slice(&label);
                }
            }
            nd.label = label_digest(&preimage);
            self.put(&nd)?;
        }
        self.store.flush()
    }
}
