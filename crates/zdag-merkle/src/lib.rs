//! # zdag-merkle
//!
//! Transaction merkle trees as committed to by Zcash block headers.
//!
//! This crate provides:
//! - [`MerkleBuilder`]: layered construction with the duplicate-last rule
//! - [`MerkleVariant::Witness`]: the variant with the coinbase replaced by zeros
//! - [`MerkleBranch`]: 64-byte interior node payloads and their digests
//!
//! ## Example
//!
//! ```rust
//! use zdag_core::Hasher;
//! use zdag_merkle::MerkleBuilder;
//!
//! let leaves: Vec<_> = [b"a", b"b", b"c"].iter().map(|l| Hasher::hash(*l)).collect();
//! let tree = MerkleBuilder::new().build(&leaves).unwrap();
//!
//! // ceil(3/2) parents, then the root
//! assert_eq!(tree.branches().len(), 3);
//! assert!(tree.branches()[1].is_duplicate_pad());
//! ```

mod branch;
mod tree;

pub use branch::{MerkleBranch, BRANCH_LEN};
pub use tree::{
    branch_count, layer_sizes, merkle_root, MerkleBuilder, MerkleError, MerkleTree, MerkleVariant,
};
