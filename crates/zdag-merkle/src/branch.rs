//! Interior merkle nodes.

use zdag_core::{Digest, Hasher, DIGEST_LEN};

/// Byte length of a branch payload: two concatenated digests.
pub const BRANCH_LEN: usize = 2 * DIGEST_LEN;

/// An interior node: the digests of its two children.
///
/// Three shapes occur in practice:
/// - a normal pair
/// - a duplicate pad (`left == right`), closing an odd layer
/// - a null-left pair, where the omitted coinbase of a witness merkle sits on
///   the left as the zero digest
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MerkleBranch {
    left: Digest,
    right: Digest,
    digest: Digest,
}

impl MerkleBranch {
    /// Combine two children, computing the branch digest.
    pub fn new(left: Digest, right: Digest) -> Self {
        let digest = Hasher::hash_all(&[left.as_bytes(), right.as_bytes()]);
        MerkleBranch {
            left,
            right,
            digest,
        }
    }

    /// Parse a 64-byte payload.
    pub fn from_payload(payload: &[u8]) -> Option<Self> {
        if payload.len() != BRANCH_LEN {
            return None;
        }
        let left = Digest::from_slice(&payload[..DIGEST_LEN])?;
        let right = Digest::from_slice(&payload[DIGEST_LEN..])?;
        Some(Self::new(left, right))
    }

    pub fn left(&self) -> &Digest {
        &self.left
    }

    pub fn right(&self) -> &Digest {
        &self.right
    }

    /// `sha256d(left || right)`.
    pub fn digest(&self) -> &Digest {
        &self.digest
    }

    /// The stored form of the branch.
    pub fn payload(&self) -> [u8; BRANCH_LEN] {
        let mut out = [0u8; BRANCH_LEN];
        out[..DIGEST_LEN].copy_from_slice(self.left.as_bytes());
        out[DIGEST_LEN..].copy_from_slice(self.right.as_bytes());
        out
    }

    /// Whether this branch pads an odd layer by pairing an element with itself.
    pub fn is_duplicate_pad(&self) -> bool {
        self.left == self.right
    }

    /// Whether the left child is the omitted-coinbase marker.
    pub fn has_null_left(&self) -> bool {
        self.left.is_zero()
    }
}
