//! Layered merkle construction.
//!
//! The tree follows the Bitcoin-family rule used by Zcash headers: adjacent
//! digests are paired and hashed, and an odd layer pairs its last element with
//! itself rather than promoting it. Building stops at a layer of one digest,
//! the root.

use crate::branch::MerkleBranch;
use thiserror::Error;
use zdag_core::Digest;

/// Errors raised while building a tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MerkleError {
    /// A block has at least its coinbase, so an empty leaf list is a caller bug.
    #[error("cannot build a merkle tree without leaves")]
    EmptyLeaves,
}

/// Which leaves the tree commits to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MerkleVariant {
    /// Leaves used as given.
    #[default]
    Transactions,
    /// Leaf 0 (the coinbase) replaced by the zero digest.
    Witness,
}

/// A fully built tree: every layer plus the branches in emission order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerkleTree {
    variant: MerkleVariant,
    /// `layers[0]` holds the leaves, the last layer holds the root alone.
    layers: Vec<Vec<Digest>>,
    /// Bottom-up, left to right.
    branches: Vec<MerkleBranch>,
}

impl MerkleTree {
    pub fn variant(&self) -> MerkleVariant {
        self.variant
    }

    /// The root digest. For a single leaf this is the leaf itself.
    pub fn root(&self) -> Digest {
        // construction guarantees a final layer of exactly one digest
        self.layers
            .last()
            .and_then(|layer| layer.first())
            .copied()
            .unwrap_or_default()
    }

    pub fn leaf_count(&self) -> usize {
        self.layers[0].len()
    }

    pub fn layers(&self) -> &[Vec<Digest>] {
        &self.layers
    }

    /// Interior nodes, layer by layer from the leaves up.
    pub fn branches(&self) -> &[MerkleBranch] {
        &self.branches
    }

    /// Number of branch layers between the leaves and the root.
    pub fn depth(&self) -> usize {
        self.layers.len() - 1
    }
}

/// Builds [`MerkleTree`]s from ordered leaf digests.
#[derive(Clone, Debug, Default)]
pub struct MerkleBuilder {
    variant: MerkleVariant,
}

impl MerkleBuilder {
    /// Builder for the transaction merkle.
    pub fn new() -> Self {
        MerkleBuilder {
            variant: MerkleVariant::Transactions,
        }
    }

    /// Builder for the witness merkle (coinbase omitted).
    pub fn witness() -> Self {
        MerkleBuilder {
            variant: MerkleVariant::Witness,
        }
    }

    pub fn with_variant(mut self, variant: MerkleVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Build the tree over `leaves`.
    pub fn build(&self, leaves: &[Digest]) -> Result<MerkleTree, MerkleError> {
        if leaves.is_empty() {
            return Err(MerkleError::EmptyLeaves);
        }

        let mut base = leaves.to_vec();
        if self.variant == MerkleVariant::Witness {
            base[0] = Digest::zero();
        }

        let mut layers = vec![base];
        let mut branches = Vec::with_capacity(leaves.len());

        while layers[layers.len() - 1].len() > 1 {
            let current = &layers[layers.len() - 1];
            let mut next = Vec::with_capacity(current.len().div_ceil(2));
            for pair in current.chunks(2) {
                let left = pair[0];
                let right = pair.get(1).copied().unwrap_or(left);
                let branch = MerkleBranch::new(left, right);
                next.push(*branch.digest());
                branches.push(branch);
            }
            layers.push(next);
        }

        Ok(MerkleTree {
            variant: self.variant,
            layers,
            branches,
        })
    }
}

/// Sizes of every layer for `leaf_count` leaves, leaves first, root last.
pub fn layer_sizes(leaf_count: usize) -> Vec<usize> {
    if leaf_count == 0 {
        return Vec::new();
    }
    let mut sizes = vec![leaf_count];
    let mut last = leaf_count;
    while last > 1 {
        last = last.div_ceil(2);
        sizes.push(last);
    }
    sizes
}

/// Number of branches a tree over `leaf_count` leaves emits.
pub fn branch_count(leaf_count: usize) -> usize {
    layer_sizes(leaf_count).iter().skip(1).sum()
}

/// Root of the transaction merkle, or `None` without leaves.
pub fn merkle_root(leaves: &[Digest]) -> Option<Digest> {
    MerkleBuilder::new().build(leaves).ok().map(|tree| tree.root())
}
