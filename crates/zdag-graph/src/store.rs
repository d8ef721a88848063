//! Chunk loading.
//!
//! Reassembly reads chunks through the [`ChunkLoader`] trait and nothing else.
//! [`MemoryChunkStore`] is the in-process implementation; it counts loads per
//! address so callers can observe how many reads a descent made.

use crate::encoder::Chunk;
use crate::error::LoadError;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use zdag_core::ContentAddress;

/// Source of chunk bytes by address.
///
/// Implementations may do I/O. Retries, if any, belong here: reassembly
/// treats every error as final.
#[async_trait]
pub trait ChunkLoader: Send + Sync {
    async fn load(&self, address: &ContentAddress) -> Result<Vec<u8>, LoadError>;
}

#[async_trait]
impl<T: ChunkLoader + ?Sized> ChunkLoader for Arc<T> {
    async fn load(&self, address: &ContentAddress) -> Result<Vec<u8>, LoadError> {
        (**self).load(address).await
    }
}

/// In-memory chunk store.
#[derive(Debug, Default)]
pub struct MemoryChunkStore {
    chunks: RwLock<HashMap<ContentAddress, Vec<u8>>>,
    loads: RwLock<HashMap<ContentAddress, usize>>,
}

impl MemoryChunkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a chunk. Returns `false` if the address was already present.
    pub fn put(&self, address: ContentAddress, bytes: Vec<u8>) -> bool {
        let mut chunks = self.chunks.write();
        if chunks.contains_key(&address) {
            return false;
        }
        chunks.insert(address, bytes);
        true
    }

    /// Store every chunk, returning how many were new.
    pub fn put_all<'a>(&self, chunks: impl IntoIterator<Item = &'a Chunk>) -> usize {
        chunks
            .into_iter()
            .filter(|chunk| self.put(chunk.address, chunk.bytes.clone()))
            .count()
    }

    /// Overwrite a chunk regardless of what it held.
    pub fn replace(&self, address: ContentAddress, bytes: Vec<u8>) {
        self.chunks.write().insert(address, bytes);
    }

    pub fn remove(&self, address: &ContentAddress) -> Option<Vec<u8>> {
        self.chunks.write().remove(address)
    }

    pub fn get(&self, address: &ContentAddress) -> Option<Vec<u8>> {
        self.chunks.read().get(address).cloned()
    }

    pub fn contains(&self, address: &ContentAddress) -> bool {
        self.chunks.read().contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.chunks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// How many times `address` was loaded, found or not.
    pub fn load_count(&self, address: &ContentAddress) -> usize {
        self.loads.read().get(address).copied().unwrap_or(0)
    }

    /// Total loads across all addresses.
    pub fn total_loads(&self) -> usize {
        self.loads.read().values().sum()
    }

    pub fn reset_counters(&self) {
        self.loads.write().clear();
    }
}

#[async_trait]
impl ChunkLoader for MemoryChunkStore {
    async fn load(&self, address: &ContentAddress) -> Result<Vec<u8>, LoadError> {
        *self.loads.write().entry(*address).or_default() += 1;
        self.get(address).ok_or(LoadError::NotFound)
    }
}
