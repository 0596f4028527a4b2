//! Graph node records.

use crate::error::{PosError, Result};
use crate::varint::{decode_i64, encode_i64, WINDOW};

/// A single DAG vertex: its index, the indices of its parents, and the hash
/// label assigned during the labelling pass (empty until then).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub idx: i64,
    pub parents: Vec<i64>,
    pub label: Vec<u8>,
}

impl Node {
    pub fn new(idx: i64) -> Self {
        Self {
            idx,
            parents: Vec::new(),
            label: Vec::new(),
        }
    }

    /// Add `parent` to the parent list. Returns false if the edge already
    /// exists. A node is never its own parent.
    pub fn add_parent(&mut self, parent: i64) -> bool {
        assert_ne!(self.idx, parent, "node cannot be its own parent");
        if self.parents.contains(&parent) {
            return false;
        }
        self.parents.push(parent);
        true
    }

    pub fn has_parents(&self) -> bool {
        !self.parents.is_empty()
    }

    /// Record layout: `le64(idx) ‖ le64(#parents) ‖ le64(parent)… ‖
    /// le64(|label|) ‖ label`, each integer in its own 8-byte window.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(WINDOW * (self.parents.len() + 3) + self.label.len());
        data.extend_from_slice(&encode_i64(self.idx));
        data.extend_from_slice(&encode_i64(self.parents.len() as i64));
        for &parent in &self.parents {
            data.extend_from_slice(&encode_i64(parent));
        }
        data.extend_from_slice(&encode_i64(self.label.len() as i64));
        data.extend_from_slice(&self.label);
        data
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut cursor = Cursor { data, offset: 0 };
        let idx = cursor.read_i64()?;
        let num_parents = cursor.read_i64()?;
        if num_parents < 0 {
            return Err(PosError::Decode("negative parent count".into()));
        }
        let mut parents = Vec::with_capacity(num_parents as usize);
        for _ in 0..num_parents {
            parents.push(cursor.read_i64()?);
        }
        let label_len = cursor.read_i64()?;
        if label_len < 0 {
            return Err(PosError::Decode("negative label length".into()));
        }
        let label = cursor.read_bytes(label_len as usize)?.to_vec();
        if cursor.offset != data.len() {
            return Err(PosError::Decode("bytes left over".into()));
        }
        Ok(Self {
            idx,
            parents,
            label,
        })
    }
}

struct Cursor<'a> {
    data: &'a [u8],
    offset: usize,
}

impl Cursor<'_> {
    fn read_i64(&mut self) -> Result<i64> {
        let window = self.read_bytes(WINDOW)?;
        Ok(decode_i64(window))
    }

    fn read_bytes(&mut self, len: usize) -> Result<&[u8]> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| PosError::Decode("record truncated".into()))?;
        let bytes = &self.data[self.offset..end];
        self.offset = end;
        Ok(bytes)
    }
}
