//! The append-only block file.
//!
//! Blocks are JSON-serialized back to back; an in-memory offset table maps
//! block ids to byte ranges for random reads.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::{Block, ChainError, Result};

pub struct BlockFile {
    ends: Vec<u64>,
    file: File,
}

impl BlockFile {
    /// Create a fresh block file at `path`, truncating any previous one.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        Ok(Self {
            ends: Vec::new(),
            file,
        })
    }

    /// Append a block and record its end offset.
    pub fn append(&mut self, block: &Block) -> Result<()> {
        let data = block.serialize()?;
        self.file.seek(SeekFrom::End(0))?;
        self.file.write_all(&data)?;
        let mut end = data.len() as u64;
        if let Some(last) = self.ends.last() {
            end += last;
        }
        self.ends.push(end);
        Ok(())
    }

    /// Read block `i` back from its byte range.
    pub fn read(&mut self, i: usize) -> Result<Block> {
        if i >= self.ends.len() {
            return Err(ChainError::OutOfRange(i));
        }
        let begin = if i > 0 { self.ends[i - 1] } else { 0 };
        let end = self.ends[i];
        let mut data = vec![0u8; (end - begin) as usize];
        self.file.seek(SeekFrom::Start(begin))?;
        self.file.read_exact(&mut data)?;
        Ok(serde_json::from_slice(&data)?)
    }

    /// The id of the newest block, if any.
    pub fn last(&self) -> Option<usize> {
        self.ends.len().checked_sub(1)
    }

    pub fn len(&self) -> usize {
        self.ends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ends.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::tests::stub_block;

    #[test]
    fn test_append_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let mut chain = BlockFile::create(dir.path().join("blocks")).unwrap();
        assert!(chain.is_empty());
        assert_eq!(chain.last(), None);

        let genesis = stub_block(1, 0, None);
        chain.append(&genesis).unwrap();
        let block = stub_block(1, 1, Some(&genesis));
        chain.append(&block).unwrap();

        assert_eq!(chain.len(), 2);
        assert_eq!(chain.last(), Some(1));
        assert_eq!(chain.read(0).unwrap().block_id(), 0);
        assert_eq!(chain.read(1).unwrap().block_id(), 1);
    }

    #[test]
    fn test_read_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        let mut chain = BlockFile::create(dir.path().join("blocks")).unwrap();
        assert!(matches!(chain.read(0), Err(ChainError::OutOfRange(0))));
    }

    #[test]
    fn test_reread_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let mut chain = BlockFile::create(dir.path().join("blocks")).unwrap();
        let genesis = stub_block(3, 0, None);
        chain.append(&genesis).unwrap();
        let a = chain.read(0).unwrap().serialize().unwrap();
        let b = chain.read(0).unwrap().serialize().unwrap();
        assert_eq!(a, b);
    }
}
