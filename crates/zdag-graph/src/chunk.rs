//! Decoding of individual chunks.
//!
//! A `zcash-tx` chunk is either a transaction or a merkle branch, and both can
//! be 64 bytes long. The rules, in order:
//!
//! 1. A chunk that is not 64 bytes, or whose first 32 bytes are not all zero,
//!    is parsed as a transaction. Failure is fatal unless the chunk is 64 bytes.
//! 2. A 64-byte parse with no inputs or no outputs is discarded.
//! 3. Anything left is a branch. An all-zero left half means "no left child".
//! 4. A transaction links to the transactions its inputs spend.

use crate::error::{GraphError, Result};
use serde::{Deserialize, Serialize};
use zdag_core::{ContentAddress, Digest, Hasher};
use zdag_merkle::MerkleBranch;
use zdag_zcash::{BlockHeader, Transaction};

/// A transaction with explicit links to the transactions it spends.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedTransaction {
    pub transaction: Transaction,
    pub txid: Digest,
    /// One entry per non-coinbase input, in input order.
    pub spends: Vec<ContentAddress>,
}

impl LinkedTransaction {
    fn new(transaction: Transaction, txid: Digest) -> Self {
        let spends = transaction
            .spent_txids()
            .map(|txid| ContentAddress::tx(*txid))
            .collect();
        LinkedTransaction {
            transaction,
            txid,
            spends,
        }
    }

    pub fn address(&self) -> ContentAddress {
        ContentAddress::tx(self.txid)
    }
}

/// The two children of a merkle branch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleLinks {
    /// `None` where the witness merkle left out the coinbase.
    pub left: Option<ContentAddress>,
    pub right: ContentAddress,
}

impl MerkleLinks {
    pub fn from_branch(branch: &MerkleBranch) -> Self {
        MerkleLinks {
            left: (!branch.has_null_left()).then(|| ContentAddress::tx(*branch.left())),
            right: ContentAddress::tx(*branch.right()),
        }
    }

    /// Whether the right child repeats the left one (odd-layer padding).
    pub fn is_duplicate_pad(&self) -> bool {
        self.left == Some(self.right)
    }
}

/// A decoded `zcash-tx` chunk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TxChunk {
    Transaction(LinkedTransaction),
    Node(MerkleLinks),
}

impl TxChunk {
    pub fn is_node(&self) -> bool {
        matches!(self, TxChunk::Node(_))
    }
}

/// Decode a `zcash-tx` chunk.
pub fn decode_tx_chunk(bytes: &[u8]) -> Result<TxChunk> {
    let branch = match MerkleBranch::from_payload(bytes) {
        Some(branch) => branch,
        None => {
            let tx = Transaction::decode(bytes).map_err(|source| GraphError::Decode {
                address: None,
                source,
            })?;
            return Ok(linked(tx, bytes));
        }
    };

    if !branch.has_null_left() {
        if let Ok(tx) = Transaction::decode(bytes) {
            if !tx.inputs.is_empty() && !tx.outputs.is_empty() {
                return Ok(linked(tx, bytes));
            }
        }
    }
    Ok(TxChunk::Node(MerkleLinks::from_branch(&branch)))
}

fn linked(tx: Transaction, bytes: &[u8]) -> TxChunk {
    let txid = Hasher::hash(bytes);
    TxChunk::Transaction(LinkedTransaction::new(tx, txid))
}

/// A decoded `zcash-block` chunk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderChunk {
    pub header: BlockHeader,
    /// Root of the transaction merkle.
    pub tx: ContentAddress,
    /// `None` for a genesis header.
    pub parent: Option<ContentAddress>,
}

/// Decode a `zcash-block` chunk. The bytes must hold a header and nothing else.
pub fn decode_header_chunk(bytes: &[u8]) -> Result<HeaderChunk> {
    let header = BlockHeader::decode(bytes).map_err(|source| GraphError::Decode {
        address: None,
        source,
    })?;
    let parent = (!header.is_genesis()).then(|| ContentAddress::block(header.prev_hash));
    Ok(HeaderChunk {
        tx: ContentAddress::tx(header.merkle_root),
        parent,
        header,
    })
}
