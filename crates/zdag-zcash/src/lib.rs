//! # zdag-zcash
//!
//! Zcash block and transaction grammar.
//!
//! Decoding is strict: a buffer that holds more than the value it encodes is
//! rejected. [`Transaction::decode_from`] reads from the front of a
//! [`zdag_core::Reader`] for callers that need to walk a larger buffer.
//!
//! ```
//! use zdag_zcash::{sample::sample_block, Block};
//!
//! let block = sample_block(3, 7);
//! let bytes = block.encode();
//! let decoded = Block::decode(&bytes).unwrap();
//! assert_eq!(decoded.hash(), block.hash());
//! assert!(decoded.check_merkle_root());
//! ```

mod block;
mod error;
mod header;
pub mod sample;
mod transaction;

pub use block::Block;
pub use error::{Result, ZcashError};
pub use header::{BlockHeader, EQUIHASH_SOLUTION_LEN, HEADER_LEN};
pub use transaction::{
    JoinSplit, JoinSplitAuth, OutPoint, OutputDescription, SaplingBundle, SpendDescription,
    Transaction, TxIn, TxOut, GROTH_PROOF_LEN, JOIN_SPLIT_CIPHERTEXT_LEN,
    OUTPUT_DESCRIPTION_LEN, OVERWINTER_VERSION_GROUP_ID, PHGR_PROOF_LEN,
    SAPLING_VERSION_GROUP_ID, SPEND_DESCRIPTION_LEN,
};
