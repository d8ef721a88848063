//! Content addresses for block graph chunks.
//!
//! A [`ContentAddress`] pairs a [`Codec`] with the `sha256d` digest of a chunk.
//! Its canonical external form is a CIDv1 whose multihash is `dbl-sha2-256`,
//! printed as base32-lower (`bahaacvra...` for headers, `bahaqcvra...` for
//! transactions and merkle branches).

use crate::hash::{Digest, Hasher, DIGEST_LEN};
use cid::multihash::Multihash;
use cid::Cid;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Multihash code for `dbl-sha2-256`.
pub const DBL_SHA2_256: u64 = 0x56;

/// Errors converting to or from a content address.
#[derive(Error, Debug)]
pub enum AddressError {
    #[error("invalid CID: {0}")]
    Cid(#[from] cid::Error),

    #[error("unknown codec: {0:#x}")]
    UnknownCodec(u64),

    #[error("unsupported multihash code: {0:#x}")]
    UnsupportedHash(u64),

    #[error("digest must be {DIGEST_LEN} bytes, got {0}")]
    DigestLength(usize),

    #[error("invalid hash hex: {0}")]
    InvalidHex(String),
}

/// Content type discriminator carried by every address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Codec {
    /// A block header (`zcash-block`).
    ZcashBlock,
    /// A transaction or a transaction merkle branch (`zcash-tx`).
    ZcashTx,
}

impl Codec {
    /// Multicodec code.
    pub fn code(self) -> u64 {
        match self {
            Codec::ZcashBlock => 0xc0,
            Codec::ZcashTx => 0xc1,
        }
    }

    /// Multicodec name.
    pub fn name(self) -> &'static str {
        match self {
            Codec::ZcashBlock => "zcash-block",
            Codec::ZcashTx => "zcash-tx",
        }
    }

    /// Look a codec up by multicodec code.
    pub fn from_code(code: u64) -> Result<Self, AddressError> {
        match code {
            0xc0 => Ok(Codec::ZcashBlock),
            0xc1 => Ok(Codec::ZcashTx),
            other => Err(AddressError::UnknownCodec(other)),
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Value-derived identifier of a chunk: codec plus `sha256d` digest.
///
/// Equal bytes under the same codec always yield equal addresses, so the
/// address doubles as a map key for deduplication and caching.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentAddress {
    codec: Codec,
    digest: Digest,
}

impl ContentAddress {
    /// Address a digest under a codec.
    pub fn new(codec: Codec, digest: Digest) -> Self {
        ContentAddress { codec, digest }
    }

    /// Hash `bytes` and address the result.
    pub fn of(codec: Codec, bytes: &[u8]) -> Self {
        Self::new(codec, Hasher::hash(bytes))
    }

    /// Address of a block header with the given block hash.
    pub fn block(digest: Digest) -> Self {
        Self::new(Codec::ZcashBlock, digest)
    }

    /// Address of a transaction or merkle branch with the given digest.
    pub fn tx(digest: Digest) -> Self {
        Self::new(Codec::ZcashTx, digest)
    }

    pub fn codec(&self) -> Codec {
        self.codec
    }

    pub fn digest(&self) -> &Digest {
        &self.digest
    }

    /// Build an address from a block hash or txid in display order.
    pub fn from_display_hex(codec: Codec, hex: &str) -> Result<Self, AddressError> {
        let digest =
            Digest::from_display_hex(hex).ok_or_else(|| AddressError::InvalidHex(hex.to_string()))?;
        Ok(Self::new(codec, digest))
    }

    /// The block hash or txid this address encodes, in display order.
    pub fn to_display_hex(&self) -> String {
        self.digest.to_display_hex()
    }

    /// Convert to a CIDv1 with a `dbl-sha2-256` multihash.
    pub fn to_cid(&self) -> Cid {
        // wrap only fails when the digest exceeds the 64-byte multihash capacity
        let mh = Multihash::<64>::wrap(DBL_SHA2_256, self.digest.as_bytes())
            .expect("32-byte digest fits a 64-byte multihash");
        Cid::new_v1(self.codec.code(), mh)
    }

    /// Convert from a CID, checking codec, hash function and digest width.
    pub fn from_cid(cid: &Cid) -> Result<Self, AddressError> {
        let codec = Codec::from_code(cid.codec())?;
        let mh = cid.hash();
        if mh.code() != DBL_SHA2_256 {
            return Err(AddressError::UnsupportedHash(mh.code()));
        }
        let digest =
            Digest::from_slice(mh.digest()).ok_or(AddressError::DigestLength(mh.digest().len()))?;
        Ok(Self::new(codec, digest))
    }

    /// Binary CID form.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_cid().to_bytes()
    }

    /// Whether `bytes` hash to this address.
    pub fn verifies(&self, bytes: &[u8]) -> bool {
        Hasher::hash(bytes) == self.digest
    }

    /// Truncated display for logs.
    pub fn short(&self) -> String {
        format!("{}:{}", self.codec.name(), self.digest.short())
    }
}

impl fmt::Display for ContentAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_cid())
    }
}

impl fmt::Debug for ContentAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentAddress({})", self.short())
    }
}

impl FromStr for ContentAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cid = Cid::try_from(s)?;
        Self::from_cid(&cid)
    }
}

impl Serialize for ContentAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ContentAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
