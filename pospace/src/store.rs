//! Batched key-value store over a sled tree.
//!
//! Graph construction and labelling touch hundreds of thousands of records;
//! writes therefore accumulate in an in-process window and land in the tree
//! as one `sled::Batch` every [`BATCH_SIZE`] puts and on [`KvStore::flush`].
//! Reads consult the window first, so a record is visible to its writer the
//! moment it is put. No durability guarantees are made beyond sled's own.

use std::collections::BTreeMap;

use crate::error::Result;

/// Number of buffered writes that triggers a batch flush.
pub const BATCH_SIZE: usize = 100;

/// An ordered byte-key store with write batching.
pub struct KvStore {
    tree: sled::Tree,
    window: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl KvStore {
    pub fn new(tree: sled::Tree) -> Self {
        Self {
            tree,
            window: BTreeMap::new(),
        }
    }

    /// Read a value, preferring an unflushed write.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        if let Some(value) = self.window.get(key) {
            return Ok(Some(value.clone()));
        }
        Ok(self.tree.get(key)?.map(|ivec| ivec.to_vec()))
    }

    /// Buffer a write; flushes automatically once the window fills.
    pub fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.window.insert(key.to_vec(), value.to_vec());
        if self.window.len() >= BATCH_SIZE {
            self.flush()?;
        }
        Ok(())
    }

    /// Apply the buffered window as a single batch.
    pub fn flush(&mut self) -> Result<()> {
        if self.window.is_empty() {
            return Ok(());
        }
        let mut batch = sled::Batch::default();
        for (key, value) in std::mem::take(&mut self.window) {
            batch.insert(key, value);
        }
        self.tree.apply_batch(batch)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_store() -> (tempfile::TempDir, KvStore) {
        let dir = tempfile::tempdir().unwrap();
        let db = sled::open(dir.path()).unwrap();
        let store = KvStore::new(db.open_tree("test").unwrap());
        (dir, store)
    }

    #[test]
    fn test_put_get_before_flush() {
        let (_dir, mut store) = open_store();
        store.put(b"a", b"1").unwrap();
        assert_eq!(store.get(b"a").unwrap(), Some(b"1".to_vec()));
    }

    #[test]
    fn test_flush_persists_window() {
        let (_dir, mut store) = open_store();
        store.put(b"a", b"1").unwrap();
        store.flush().unwrap();
        assert_eq!(store.get(b"a").unwrap(), Some(b"1".to_vec()));
        assert_eq!(store.get(b"b").unwrap(), None);
    }

    #[test]
    fn test_auto_flush_at_batch_size() {
        let (_dir, mut store) = open_store();
        for i in 0..BATCH_SIZE {
            store.put(&[i as u8, (i >> 8) as u8], b"v").unwrap();
        }
        assert!(store.window.is_empty());
        assert_eq!(store.get(&[0, 0]).unwrap(), Some(b"v".to_vec()));
    }

    #[test]
    fn test_overwrite_in_window() {
        let (_dir, mut store) = open_store();
        store.put(b"k", b"old").unwrap();
        store.put(b"k", b"new").unwrap();
        assert_eq!(store.get(b"k").unwrap(), Some(b"new".to_vec()));
        store.flush().unwrap();
        assert_eq!(store.get(b"k").unwrap(), Some(b"new".to_vec()));
    }
}
