//! Chunk graph to block.
//!
//! Reassembly loads the header at the root address, then walks the
//! transaction merkle from the header's `tx` link. The walk uses an explicit
//! stack and visits the left child before the right one, so transactions come
//! out in block order. A branch whose two children are equal pads an odd
//! layer and its subtree is walked once; a missing left child marks the
//! coinbase omitted from a witness merkle.
//!
//! Decoded chunks are kept in a [`ChunkCache`] so that an address reached
//! along two paths is loaded once.

use crate::chunk::{decode_header_chunk, decode_tx_chunk, HeaderChunk, TxChunk};
use crate::config::AssembleConfig;
use crate::error::{GraphError, Result, StructuralError};
use crate::store::ChunkLoader;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, warn};
use zdag_core::{Codec, ContentAddress, Hasher};
use zdag_zcash::{Block, Transaction};

/// Decoded `zcash-tx` chunks by address.
///
/// Chunks are immutable, so a cache can be kept across calls, even for
/// different roots.
#[derive(Clone, Debug, Default)]
pub struct ChunkCache {
    entries: HashMap<ContentAddress, TxChunk>,
}

impl ChunkCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, address: &ContentAddress) -> Option<&TxChunk> {
        self.entries.get(address)
    }

    pub fn insert(&mut self, address: ContentAddress, chunk: TxChunk) {
        self.entries.insert(address, chunk);
    }

    pub fn contains(&self, address: &ContentAddress) -> bool {
        self.entries.contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Counters gathered while reassembling.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssembleStats {
    /// Loader calls that returned bytes, header included.
    pub chunks_loaded: usize,
    /// Visits answered from the cache.
    pub cache_hits: usize,
    pub transactions: usize,
    pub merkle_nodes: usize,
}

/// A reassembled block in object and binary form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssembledBlock {
    pub block: Block,
    /// Canonical encoding of `block`.
    pub binary: Vec<u8>,
    /// The header's link to the previous block.
    pub parent: Option<ContentAddress>,
    pub stats: AssembleStats,
}

/// Rebuilds blocks from their chunk graphs.
#[derive(Clone, Debug, Default)]
pub struct GraphReassembler {
    config: AssembleConfig,
}

impl GraphReassembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AssembleConfig) -> Self {
        GraphReassembler { config }
    }

    pub fn config(&self) -> &AssembleConfig {
        &self.config
    }

    /// Reassemble the block whose header chunk is at `root`.
    pub async fn reassemble<L>(&self, loader: &L, root: &ContentAddress) -> Result<AssembledBlock>
    where
        L: ChunkLoader + ?Sized,
    {
        let mut cache = ChunkCache::new();
        self.reassemble_with_cache(loader, root, &mut cache).await
    }

    /// Like [`reassemble`](Self::reassemble), reading and filling `cache`.
    pub async fn reassemble_with_cache<L>(
        &self,
        loader: &L,
        root: &ContentAddress,
        cache: &mut ChunkCache,
    ) -> Result<AssembledBlock>
    where
        L: ChunkLoader + ?Sized,
    {
        expect_codec(root, Codec::ZcashBlock)?;
        let mut stats = AssembleStats::default();

        let bytes = self.fetch(loader, root, &mut stats).await?;
        let HeaderChunk { header, tx, parent } =
            decode_header_chunk(&bytes).map_err(|e| e.at(*root))?;

        let transactions = self.descend(loader, &tx, cache, &mut stats).await?;
        if transactions.is_empty() {
            return Err(StructuralError::EmptyBlock { root: *root }.into());
        }

        let block = Block::new(header, transactions);
        match block.compute_merkle_root() {
            Some(actual) if actual == block.header.merkle_root => {}
            actual => {
                return Err(StructuralError::MerkleRootMismatch {
                    expected: block.header.merkle_root,
                    actual: actual.unwrap_or_default(),
                }
                .into())
            }
        }
        let binary = block.encode();

        info!(
            root = %root,
            chunks_loaded = stats.chunks_loaded,
            cache_hits = stats.cache_hits,
            transactions = stats.transactions,
            merkle_nodes = stats.merkle_nodes,
            bytes = binary.len(),
            "reassembled block"
        );

        Ok(AssembledBlock {
            block,
            binary,
            parent,
            stats,
        })
    }

    /// Walk the merkle rooted at `tree_root` alone, returning its
    /// transactions in order. For a witness root the coinbase is absent.
    pub async fn collect_transactions<L>(
        &self,
        loader: &L,
        tree_root: &ContentAddress,
    ) -> Result<Vec<Transaction>>
    where
        L: ChunkLoader + ?Sized,
    {
        let mut cache = ChunkCache::new();
        let mut stats = AssembleStats::default();
        self.descend(loader, tree_root, &mut cache, &mut stats).await
    }

    async fn descend<L>(
        &self,
        loader: &L,
        tree_root: &ContentAddress,
        cache: &mut ChunkCache,
        stats: &mut AssembleStats,
    ) -> Result<Vec<Transaction>>
    where
        L: ChunkLoader + ?Sized,
    {
        expect_codec(tree_root, Codec::ZcashTx)?;

        let mut transactions = Vec::new();
        let mut stack = vec![(*tree_root, 0usize)];

        while let Some((address, depth)) = stack.pop() {
            if depth > self.config.max_depth {
                return Err(StructuralError::MaxDepthExceeded {
                    max_depth: self.config.max_depth,
                }
                .into());
            }

            let chunk = match cache.get(&address) {
                Some(chunk) => {
                    stats.cache_hits += 1;
                    chunk.clone()
                }
                None => {
                    let bytes = self.fetch(loader, &address, stats).await?;
                    let chunk = decode_tx_chunk(&bytes).map_err(|e| e.at(address))?;
                    cache.insert(address, chunk.clone());
                    chunk
                }
            };

            match chunk {
                TxChunk::Transaction(linked) => {
                    stats.transactions += 1;
                    transactions.push(linked.transaction);
                }
                TxChunk::Node(links) => {
                    stats.merkle_nodes += 1;
                    // pushed right first so the left subtree is finished first
                    if !links.is_duplicate_pad() {
                        stack.push((links.right, depth + 1));
                    }
                    if let Some(left) = links.left {
                        stack.push((left, depth + 1));
                    }
                }
            }
        }

        Ok(transactions)
    }

    async fn fetch<L>(
        &self,
        loader: &L,
        address: &ContentAddress,
        stats: &mut AssembleStats,
    ) -> Result<Vec<u8>>
    where
        L: ChunkLoader + ?Sized,
    {
        let bytes = loader
            .load(address)
            .await
            .map_err(|source| GraphError::MissingChunk {
                address: *address,
                source,
            })?;
        stats.chunks_loaded += 1;
        debug!(address = %address, len = bytes.len(), "loaded chunk");

        if self.config.verify_chunks {
            let actual = Hasher::hash(&bytes);
            if &actual != address.digest() {
                warn!(address = %address, actual = %actual, "chunk does not match its address");
                return Err(GraphError::DigestMismatch {
                    address: *address,
                    actual,
                });
            }
        }
        Ok(bytes)
    }
}

fn expect_codec(address: &ContentAddress, expected: Codec) -> Result<()> {
    if address.codec() != expected {
        return Err(StructuralError::UnexpectedCodec {
            address: *address,
            expected,
        }
        .into());
    }
    Ok(())
}
