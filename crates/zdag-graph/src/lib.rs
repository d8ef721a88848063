//! # zdag-graph
//!
//! Content-addressed block graphs for Zcash.
//!
//! A block is split into independently addressed chunks: the header, every
//! transaction, and every branch of the transaction merkle. The header links
//! to the merkle root, each branch to its two children. Given the header's
//! address and a [`ChunkLoader`], the original block is rebuilt byte for byte.
//!
//! ## Architecture
//!
//! - [`GraphEncoder`]: block to deduplicated chunk sequence, header first
//! - [`decode_tx_chunk`] / [`decode_header_chunk`]: chunk bytes to links
//! - [`GraphReassembler`]: minimal-read descent from a root address
//! - [`MemoryChunkStore`]: in-memory [`ChunkLoader`] with load counters
//!
//! ## Example
//!
//! ```rust
//! use zdag_graph::{GraphEncoder, GraphReassembler, MemoryChunkStore};
//! use zdag_zcash::sample::sample_block;
//!
//! # tokio_test::block_on(async {
//! let block = sample_block(3, 1);
//! let graph = GraphEncoder::new().encode(&block).unwrap();
//!
//! let store = MemoryChunkStore::new();
//! store.put_all(&graph.chunks);
//!
//! let assembled = GraphReassembler::new()
//!     .reassemble(&store, &graph.root)
//!     .await
//!     .unwrap();
//! assert_eq!(assembled.binary, block.encode());
//! # });
//! ```

mod assemble;
mod chunk;
mod config;
mod encoder;
mod error;
mod store;

pub use assemble::{AssembleStats, AssembledBlock, ChunkCache, GraphReassembler};
pub use chunk::{
    decode_header_chunk, decode_tx_chunk, HeaderChunk, LinkedTransaction, MerkleLinks, TxChunk,
};
pub use config::{AssembleConfig, AssembleConfigBuilder, EncoderConfig, EncoderConfigBuilder};
pub use encoder::{Chunk, EncodeStats, EncodedGraph, GraphEncoder};
pub use error::{GraphError, LoadError, Result, StructuralError};
pub use store::{ChunkLoader, MemoryChunkStore};
