//! Double SHA-256 digests.
//!
//! Zcash identifies blocks, transactions and merkle branches by `sha256d`,
//! SHA-256 applied twice. Digests are kept in internal byte order; tools print
//! them byte-reversed ("display order").

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest as _, Sha256};
use std::fmt;

/// Width of every digest in bytes.
pub const DIGEST_LEN: usize = 32;

/// A 32-byte `sha256d` digest in internal byte order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest([u8; DIGEST_LEN]);

impl Digest {
    /// Create a digest from raw bytes.
    pub const fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Digest(bytes)
    }

    /// Create a digest from a slice, which must be exactly 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let array: [u8; DIGEST_LEN] = bytes.try_into().ok()?;
        Some(Digest(array))
    }

    /// Get the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// The all-zero digest. Marks the omitted coinbase in witness merkles and
    /// the missing parent of a genesis header.
    pub const fn zero() -> Self {
        Digest([0u8; DIGEST_LEN])
    }

    /// Check if this is the zero digest.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; DIGEST_LEN]
    }

    /// Hex in internal byte order.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse hex in internal byte order.
    pub fn from_hex(s: &str) -> Option<Self> {
        let bytes = hex::decode(s).ok()?;
        Self::from_slice(&bytes)
    }

    /// Hex in display order, the form used for block hashes and txids.
    pub fn to_display_hex(&self) -> String {
        let mut reversed = self.0;
        reversed.reverse();
        hex::encode(reversed)
    }

    /// Parse display-order hex (as printed by `zcash-cli`).
    pub fn from_display_hex(s: &str) -> Option<Self> {
        let mut digest = Self::from_hex(s)?;
        digest.0.reverse();
        Some(digest)
    }

    /// Truncated display (first 8 chars, display order).
    pub fn short(&self) -> String {
        self.to_display_hex()[..8].to_string()
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({}...)", self.short())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_display_hex())
    }
}

impl Default for Digest {
    fn default() -> Self {
        Digest::zero()
    }
}

impl From<[u8; DIGEST_LEN]> for Digest {
    fn from(bytes: [u8; DIGEST_LEN]) -> Self {
        Digest(bytes)
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_display_hex())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Digest::from_display_hex(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid digest hex: {}", s)))
    }
}

/// Incremental `sha256d` hasher.
pub struct Hasher {
    inner: Sha256,
}

impl Hasher {
    /// Create a new hasher.
    pub fn new() -> Self {
        Hasher {
            inner: Sha256::new(),
        }
    }

    /// Update the hasher with data.
    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    /// Finalize: hash the first-round output once more.
    pub fn finalize(self) -> Digest {
        let first = self.inner.finalize();
        let second = Sha256::digest(first);
        let mut bytes = [0u8; DIGEST_LEN];
        bytes.copy_from_slice(&second);
        Digest(bytes)
    }

    /// Hash data directly.
    pub fn hash(data: &[u8]) -> Digest {
        let mut hasher = Self::new();
        hasher.update(data);
        hasher.finalize()
    }

    /// Hash the concatenation of several parts.
    pub fn hash_all(parts: &[&[u8]]) -> Digest {
        let mut hasher = Self::new();
        for part in parts {
            hasher.update(part);
        }
        hasher.finalize()
    }
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}
