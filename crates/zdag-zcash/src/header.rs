//! Zcash block header grammar.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use zdag_core::{Blob, Digest, Hasher, Reader, Writer};

/// Equihash (200, 9) solution length on mainnet and testnet.
pub const EQUIHASH_SOLUTION_LEN: usize = 1344;
/// Encoded header length with a mainnet solution.
pub const HEADER_LEN: usize = 4 + 32 + 32 + 32 + 4 + 4 + 32 + 3 + EQUIHASH_SOLUTION_LEN;

/// A Zcash block header. Its `sha256d` is the block hash.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub version: i32,
    pub prev_hash: Digest,
    pub merkle_root: Digest,
    /// `hashFinalSaplingRoot` since Sapling, reserved (zero) before.
    pub final_sapling_root: Digest,
    pub time: u32,
    pub bits: u32,
    pub nonce: Digest,
    pub solution: Blob,
}

impl BlockHeader {
    /// Decode a header that must span all of `bytes`.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes);
        let header = Self::decode_from(&mut reader)?;
        reader.finish()?;
        Ok(header)
    }

    pub fn decode_from(reader: &mut Reader<'_>) -> Result<Self> {
        Ok(BlockHeader {
            version: reader.read_i32_le()?,
            prev_hash: reader.read_digest()?,
            merkle_root: reader.read_digest()?,
            final_sapling_root: reader.read_digest()?,
            time: reader.read_u32_le()?,
            bits: reader.read_u32_le()?,
            nonce: reader.read_digest()?,
            solution: Blob(reader.read_var_bytes()?),
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut w = Writer::with_capacity(HEADER_LEN);
        self.encode_into(&mut w);
        w.into_bytes()
    }

    pub fn encode_into(&self, w: &mut Writer) {
        w.write_i32_le(self.version);
        w.write_digest(&self.prev_hash);
        w.write_digest(&self.merkle_root);
        w.write_digest(&self.final_sapling_root);
        w.write_u32_le(self.time);
        w.write_u32_le(self.bits);
        w.write_digest(&self.nonce);
        w.write_var_bytes(self.solution.as_bytes());
    }

    /// The block hash.
    pub fn hash(&self) -> Digest {
        Hasher::hash(&self.encode())
    }

    /// Genesis headers point at the zero hash.
    pub fn is_genesis(&self) -> bool {
        self.prev_hash.is_zero()
    }
}
