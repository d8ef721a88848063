//! One file per chunk, named by the chunk's CID string.

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use zdag_core::ContentAddress;
use zdag_graph::{Chunk, ChunkLoader, LoadError};

pub struct DirChunkStore {
    root: PathBuf,
}

impl DirChunkStore {
    /// Open `root`, creating it if needed.
    pub async fn open(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(DirChunkStore { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, address: &ContentAddress) -> PathBuf {
        self.root.join(address.to_string())
    }

    /// Write a chunk unless a file for its address exists already.
    pub async fn put(&self, chunk: &Chunk) -> io::Result<bool> {
        let path = self.path(&chunk.address);
        if tokio::fs::try_exists(&path).await? {
            return Ok(false);
        }
        tokio::fs::write(&path, &chunk.bytes).await?;
        Ok(true)
    }

    /// Write every chunk, returning how many were new.
    pub async fn put_all(&self, chunks: &[Chunk]) -> io::Result<usize> {
        let mut written = 0;
        for chunk in chunks {
            if self.put(chunk).await? {
                written += 1;
            }
        }
        Ok(written)
    }
}

#[async_trait]
impl ChunkLoader for DirChunkStore {
    async fn load(&self, address: &ContentAddress) -> Result<Vec<u8>, LoadError> {
        match tokio::fs::read(self.path(address)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(LoadError::NotFound),
            Err(e) => Err(LoadError::Io(e)),
        }
    }
}
