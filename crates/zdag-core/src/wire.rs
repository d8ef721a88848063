//! Little-endian wire primitives shared by the header and transaction grammars.
//!
//! - [`Reader`]: bounds-checked cursor over a byte slice
//! - [`Writer`]: append-only encoder into a `Vec<u8>`
//! - Bitcoin-style compact-size integers, canonical form enforced on read

use crate::hash::{Digest, DIGEST_LEN};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Upper bound on any compact-size value (matches the node's `MAX_SIZE`).
pub const MAX_COMPACT_SIZE: u64 = 0x0200_0000;

/// Errors raised while reading wire data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    #[error("unexpected end of input at offset {offset}: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    #[error("{remaining} trailing bytes after offset {offset}")]
    TrailingBytes { offset: usize, remaining: usize },

    #[error("non-canonical compact size at offset {offset}")]
    NonCanonicalCompactSize { offset: usize },

    #[error("count {count} at offset {offset} exceeds what the input can hold")]
    CountTooLarge { offset: usize, count: u64 },
}

/// Cursor over a byte slice.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Reader { buf, pos: 0 }
    }

    /// Current offset into the input.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Fail unless every byte has been consumed.
    pub fn finish(&self) -> Result<(), WireError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(WireError::TrailingBytes {
                offset: self.pos,
                remaining: self.remaining(),
            })
        }
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], WireError> {
        if len > self.remaining() {
            return Err(WireError::UnexpectedEof {
                offset: self.pos,
                needed: len,
                remaining: self.remaining(),
            });
        }
        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], WireError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, WireError> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16_le(&mut self) -> Result<u16, WireError> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32_le(&mut self) -> Result<u32, WireError> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_i32_le(&mut self) -> Result<i32, WireError> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u64_le(&mut self) -> Result<u64, WireError> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    pub fn read_i64_le(&mut self) -> Result<i64, WireError> {
        Ok(i64::from_le_bytes(self.read_array()?))
    }

    pub fn read_digest(&mut self) -> Result<Digest, WireError> {
        Ok(Digest::from_bytes(self.read_array::<DIGEST_LEN>()?))
    }

    /// Read a compact-size integer, rejecting non-minimal encodings and values
    /// above [`MAX_COMPACT_SIZE`].
    pub fn read_compact_size(&mut self) -> Result<u64, WireError> {
        let offset = self.pos;
        let value = match self.read_u8()? {
            0xfd => {
                let v = self.read_u16_le()? as u64;
                if v < 0xfd {
                    return Err(WireError::NonCanonicalCompactSize { offset });
                }
                v
            }
            0xfe => {
                let v = self.read_u32_le()? as u64;
                if v < 0x1_0000 {
                    return Err(WireError::NonCanonicalCompactSize { offset });
                }
                v
            }
            0xff => {
                let v = self.read_u64_le()?;
                if v < 0x1_0000_0000 {
                    return Err(WireError::NonCanonicalCompactSize { offset });
                }
                v
            }
            small => small as u64,
        };
        if value > MAX_COMPACT_SIZE {
            return Err(WireError::CountTooLarge {
                offset,
                count: value,
            });
        }
        Ok(value)
    }

    /// Read an element count whose elements take at least `min_element_len`
    /// bytes each. Counts the remaining input cannot satisfy are rejected
    /// before anything is allocated.
    pub fn read_count(&mut self, min_element_len: usize) -> Result<usize, WireError> {
        let offset = self.pos;
        let count = self.read_compact_size()?;
        let max = if min_element_len == 0 {
            MAX_COMPACT_SIZE
        } else {
            (self.remaining() / min_element_len) as u64
        };
        if count > max {
            return Err(WireError::CountTooLarge { offset, count });
        }
        Ok(count as usize)
    }

    /// Read compact-size prefixed bytes.
    pub fn read_var_bytes(&mut self) -> Result<Vec<u8>, WireError> {
        let len = self.read_count(1)?;
        Ok(self.read_bytes(len)?.to_vec())
    }
}

/// Append-only encoder.
#[derive(Debug, Default, Clone)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Writer { buf: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Writer {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn write_u16_le(&mut self, v: u16) {
        self.write_bytes(&v.to_le_bytes());
    }

    pub fn write_u32_le(&mut self, v: u32) {
        self.write_bytes(&v.to_le_bytes());
    }

    pub fn write_i32_le(&mut self, v: i32) {
        self.write_bytes(&v.to_le_bytes());
    }

    pub fn write_u64_le(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    pub fn write_i64_le(&mut self, v: i64) {
        self.write_bytes(&v.to_le_bytes());
    }

    pub fn write_digest(&mut self, digest: &Digest) {
        self.write_bytes(digest.as_bytes());
    }

    /// Write the minimal compact-size encoding of `v`.
    pub fn write_compact_size(&mut self, v: u64) {
        match v {
            0..=0xfc => self.write_u8(v as u8),
            0xfd..=0xffff => {
                self.write_u8(0xfd);
                self.write_u16_le(v as u16);
            }
            0x1_0000..=0xffff_ffff => {
                self.write_u8(0xfe);
                self.write_u32_le(v as u32);
            }
            _ => {
                self.write_u8(0xff);
                self.write_u64_le(v);
            }
        }
    }

    pub fn write_var_bytes(&mut self, bytes: &[u8]) {
        self.write_compact_size(bytes.len() as u64);
        self.write_bytes(bytes);
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Opaque byte string that serializes as hex (scripts, proofs, ciphertexts).
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Blob(pub Vec<u8>);

impl Blob {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Blob(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.len() <= 16 {
            write!(f, "Blob({})", hex::encode(&self.0))
        } else {
            write!(f, "Blob({}.. {} bytes)", hex::encode(&self.0[..8]), self.0.len())
        }
    }
}

impl From<Vec<u8>> for Blob {
    fn from(bytes: Vec<u8>) -> Self {
        Blob(bytes)
    }
}

impl Serialize for Blob {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for Blob {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(&s).map(Blob).map_err(serde::de::Error::custom)
    }
}
