//! Block to chunk graph.
//!
//! Emission order is fixed: the header, every transaction in block order,
//! the transaction merkle branches bottom-up, then (when enabled) the witness
//! merkle branches. An address already emitted by the same call is counted as
//! a duplicate and skipped.

use crate::config::EncoderConfig;
use crate::error::{GraphError, Result, StructuralError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};
use zdag_core::{Codec, ContentAddress, Digest};
use zdag_merkle::{MerkleBuilder, MerkleError, MerkleTree, BRANCH_LEN};
use zdag_zcash::Block;

/// One content-addressed unit of a block graph.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub address: ContentAddress,
    #[serde(with = "hex_bytes")]
    pub bytes: Vec<u8>,
}

impl Chunk {
    /// Address `bytes` under `codec`.
    pub fn new(codec: Codec, bytes: Vec<u8>) -> Self {
        Chunk {
            address: ContentAddress::of(codec, &bytes),
            bytes,
        }
    }

    /// Chunks of branch length count as merkle nodes.
    pub fn is_node_sized(&self) -> bool {
        self.bytes.len() == BRANCH_LEN
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use zdag_core::Blob;

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        Blob::new(bytes).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        Ok(Blob::deserialize(deserializer)?.0)
    }
}

/// Counters gathered while encoding.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodeStats {
    /// Chunks emitted, header included.
    pub chunks: usize,
    pub transactions: usize,
    pub tx_merkle_nodes: usize,
    pub witness_merkle_nodes: usize,
    /// Chunks skipped because their address had already been emitted.
    pub duplicates: usize,
}

/// The chunks of one block and the addresses that enter them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedGraph {
    /// Address of the header chunk.
    pub root: ContentAddress,
    /// Root of the transaction merkle (the coinbase itself for one transaction).
    pub tx_root: ContentAddress,
    /// Root of the witness merkle, when one was emitted.
    pub witness_root: Option<ContentAddress>,
    pub chunks: Vec<Chunk>,
    pub stats: EncodeStats,
}

impl EncodedGraph {
    /// The header chunk, always first.
    pub fn header(&self) -> &Chunk {
        &self.chunks[0]
    }

    pub fn get(&self, address: &ContentAddress) -> Option<&Chunk> {
        self.chunks.iter().find(|chunk| &chunk.address == address)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn into_chunks(self) -> Vec<Chunk> {
        self.chunks
    }
}

#[derive(Clone, Copy)]
enum Pass {
    Header,
    Transactions,
    TxMerkle,
    WitnessMerkle,
}

/// Accumulates chunks for one encode call.
struct Emitter {
    seen: HashSet<ContentAddress>,
    chunks: Vec<Chunk>,
    stats: EncodeStats,
}

impl Emitter {
    fn new(capacity: usize) -> Self {
        Emitter {
            seen: HashSet::with_capacity(capacity),
            chunks: Vec::with_capacity(capacity),
            stats: EncodeStats::default(),
        }
    }

    fn emit(&mut self, chunk: Chunk, pass: Pass) -> bool {
        if !self.seen.insert(chunk.address) {
            debug!(address = %chunk.address, "skipping duplicate chunk");
            self.stats.duplicates += 1;
            return false;
        }
        match (pass, chunk.is_node_sized()) {
            (Pass::Header, _) => {}
            (Pass::WitnessMerkle, true) => self.stats.witness_merkle_nodes += 1,
            (_, true) => self.stats.tx_merkle_nodes += 1,
            (_, false) => self.stats.transactions += 1,
        }
        self.stats.chunks += 1;
        self.chunks.push(chunk);
        true
    }

    fn emit_tree(&mut self, tree: &MerkleTree, pass: Pass) -> usize {
        tree.branches()
            .iter()
            .filter(|branch| {
                let chunk = Chunk {
                    address: ContentAddress::tx(*branch.digest()),
                    bytes: branch.payload().to_vec(),
                };
                self.emit(chunk, pass)
            })
            .count()
    }
}

/// Decomposes blocks into content-addressed chunks.
#[derive(Clone, Debug, Default)]
pub struct GraphEncoder {
    config: EncoderConfig,
}

impl GraphEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EncoderConfig) -> Self {
        GraphEncoder { config }
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Encode `block` into its chunk graph.
    pub fn encode(&self, block: &Block) -> Result<EncodedGraph> {
        if block.transactions.is_empty() {
            return Err(GraphError::Configuration(
                "a block needs at least its coinbase transaction".into(),
            ));
        }

        let mut emitter = Emitter::new(2 * block.transactions.len() + 1);

        let header = Chunk::new(Codec::ZcashBlock, block.header.encode());
        let root = header.address;
        emitter.emit(header, Pass::Header);

        let mut txids = Vec::with_capacity(block.transactions.len());
        for tx in &block.transactions {
            let chunk = Chunk::new(Codec::ZcashTx, tx.encode());
            txids.push(*chunk.address.digest());
            emitter.emit(chunk, Pass::Transactions);
        }

        let tree = MerkleBuilder::new().build(&txids).map_err(empty_leaves)?;
        let tx_root = tree.root();
        if tx_root != block.header.merkle_root {
            return Err(StructuralError::MerkleRootMismatch {
                expected: block.header.merkle_root,
                actual: tx_root,
            }
            .into());
        }
        emitter.emit_tree(&tree, Pass::TxMerkle);

        let witness_root = if self.config.witness_merkle {
            self.witness_pass(&mut emitter, &txids)?
        } else {
            None
        };

        let stats = emitter.stats;
        info!(
            block = %block.hash(),
            chunks = stats.chunks,
            transactions = stats.transactions,
            tx_merkle_nodes = stats.tx_merkle_nodes,
            witness_merkle_nodes = stats.witness_merkle_nodes,
            duplicates = stats.duplicates,
            "encoded block graph"
        );

        Ok(EncodedGraph {
            root,
            tx_root: ContentAddress::tx(tx_root),
            witness_root,
            chunks: emitter.chunks,
            stats,
        })
    }

    /// Emit the witness merkle. The coinbase leaf is zeroed, so a single
    /// transaction block has no witness tree at all.
    fn witness_pass(
        &self,
        emitter: &mut Emitter,
        txids: &[Digest],
    ) -> Result<Option<ContentAddress>> {
        let tree = MerkleBuilder::witness()
            .build(txids)
            .map_err(empty_leaves)?;
        if tree.branches().is_empty() {
            if txids.len() == 1 {
                return Ok(None);
            }
            return Err(StructuralError::MissingWitnessRoot {
                transactions: txids.len(),
            }
            .into());
        }
        emitter.emit_tree(&tree, Pass::WitnessMerkle);
        Ok(Some(ContentAddress::tx(tree.root())))
    }
}

fn empty_leaves(err: MerkleError) -> GraphError {
    GraphError::Configuration(err.to_string())
}
