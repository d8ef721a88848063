//! Full block grammar: header, transaction count, transactions.

use crate::error::Result;
use crate::header::BlockHeader;
use crate::transaction::Transaction;
use serde::{Deserialize, Serialize};
use zdag_core::{Digest, Reader, Writer};
use zdag_merkle::merkle_root;

/// A complete block. `transactions[0]` is the coinbase.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// Combine a header with its ordered transactions.
    pub fn new(header: BlockHeader, transactions: Vec<Transaction>) -> Self {
        Block {
            header,
            transactions,
        }
    }

    /// Decode a full block; every byte must be consumed.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes);
        let header = BlockHeader::decode_from(&mut reader)?;
        // a v1 transaction is never shorter than 10 bytes
        let count = reader.read_count(10)?;
        let mut transactions = Vec::with_capacity(count);
        for _ in 0..count {
            transactions.push(Transaction::decode_from(&mut reader)?);
        }
        reader.finish()?;
        Ok(Block {
            header,
            transactions,
        })
    }

    /// Canonical encoding; `decode(encode(b)) == b`.
    pub fn encode(&self) -> Vec<u8> {
        let mut w = Writer::new();
        self.header.encode_into(&mut w);
        w.write_compact_size(self.transactions.len() as u64);
        for tx in &self.transactions {
            tx.encode_into(&mut w);
        }
        w.into_bytes()
    }

    /// The block hash (hash of the header alone).
    pub fn hash(&self) -> Digest {
        self.header.hash()
    }

    pub fn txids(&self) -> Vec<Digest> {
        self.transactions.iter().map(Transaction::txid).collect()
    }

    /// Merkle root over the txids, `None` for a block without transactions.
    pub fn compute_merkle_root(&self) -> Option<Digest> {
        merkle_root(&self.txids())
    }

    /// Whether the header commits to these transactions.
    pub fn check_merkle_root(&self) -> bool {
        self.compute_merkle_root() == Some(self.header.merkle_root)
    }

    /// Set the header's merkle root from the transactions.
    pub fn with_computed_merkle_root(mut self) -> Self {
        if let Some(root) = self.compute_merkle_root() {
            self.header.merkle_root = root;
        }
        self
    }
}
