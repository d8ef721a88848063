//! Zcash transaction grammar, versions 1 to 4.
//!
//! Layout by version:
//! - v1: header, inputs, outputs, lock time
//! - v2: v1 + join-split descriptions (PHGR proofs)
//! - v3 (Overwinter): version group, expiry height, join-splits
//! - v4 (Sapling): v3 + value balance, shielded spends and outputs, Groth
//!   join-split proofs, binding signature

use crate::error::{Result, ZcashError};
use serde::{Deserialize, Serialize};
use zdag_core::{Blob, Digest, Hasher, Reader, Writer};

/// Version group id carried by v3 transactions.
pub const OVERWINTER_VERSION_GROUP_ID: u32 = 0x03C4_8270;
/// Version group id carried by v4 transactions.
pub const SAPLING_VERSION_GROUP_ID: u32 = 0x892F_2085;

const OVERWINTERED_FLAG: u32 = 1 << 31;

pub const SPEND_DESCRIPTION_LEN: usize = 384;
pub const OUTPUT_DESCRIPTION_LEN: usize = 948;
pub const PHGR_PROOF_LEN: usize = 296;
pub const GROTH_PROOF_LEN: usize = 192;
pub const JOIN_SPLIT_CIPHERTEXT_LEN: usize = 601;
const JOIN_SPLIT_FIXED_LEN: usize = 8 + 8 + 32 + 64 + 64 + 32 + 32 + 64 + 2 * JOIN_SPLIT_CIPHERTEXT_LEN;
const SIGNATURE_LEN: usize = 64;
const MIN_INPUT_LEN: usize = 32 + 4 + 1 + 4;
const MIN_OUTPUT_LEN: usize = 8 + 1;

/// Reference to an output of a previous transaction.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    pub txid: Digest,
    pub index: u32,
}

impl OutPoint {
    /// The prevout of a coinbase input.
    pub fn null() -> Self {
        OutPoint {
            txid: Digest::zero(),
            index: u32::MAX,
        }
    }

    pub fn is_null(&self) -> bool {
        self.txid.is_zero() && self.index == u32::MAX
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxIn {
    pub prevout: OutPoint,
    pub script_sig: Blob,
    pub sequence: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOut {
    /// Zatoshis.
    pub value: i64,
    pub script_pubkey: Blob,
}

/// Sapling spend description (384 bytes on the wire).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendDescription {
    pub cv: Digest,
    pub anchor: Digest,
    pub nullifier: Digest,
    pub rk: Digest,
    pub zkproof: Blob,
    pub spend_auth_sig: Blob,
}

/// Sapling output description (948 bytes on the wire).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputDescription {
    pub cv: Digest,
    pub cmu: Digest,
    pub ephemeral_key: Digest,
    pub enc_ciphertext: Blob,
    pub out_ciphertext: Blob,
    pub zkproof: Blob,
}

/// Sprout join-split description.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinSplit {
    pub vpub_old: i64,
    pub vpub_new: i64,
    pub anchor: Digest,
    pub nullifiers: [Digest; 2],
    pub commitments: [Digest; 2],
    pub ephemeral_key: Digest,
    pub random_seed: Digest,
    pub macs: [Digest; 2],
    /// 296 bytes (PHGR) before Sapling, 192 bytes (Groth) from v4.
    pub proof: Blob,
    pub ciphertexts: [Blob; 2],
}

/// Sapling fields of a v4 transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaplingBundle {
    pub value_balance: i64,
    pub spends: Vec<SpendDescription>,
    pub outputs: Vec<OutputDescription>,
    /// Present exactly when there is at least one spend or output.
    pub binding_sig: Option<Blob>,
}

impl SaplingBundle {
    pub fn is_empty(&self) -> bool {
        self.spends.is_empty() && self.outputs.is_empty()
    }
}

/// Signing key and signature over the join-splits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinSplitAuth {
    pub pubkey: Digest,
    pub sig: Blob,
}

/// A Zcash transaction, v1 to v4.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub overwintered: bool,
    pub version: u32,
    pub version_group_id: Option<u32>,
    pub inputs: Vec<TxIn>,
    pub outputs: Vec<TxOut>,
    pub lock_time: u32,
    pub expiry_height: Option<u32>,
    /// `Some` for every v4 transaction.
    pub sapling: Option<SaplingBundle>,
    pub join_splits: Vec<JoinSplit>,
    /// Present exactly when `join_splits` is non-empty.
    pub join_split_auth: Option<JoinSplitAuth>,
}

impl Transaction {
    /// Decode a transaction that must span all of `bytes`.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes);
        let tx = Self::decode_from(&mut reader)?;
        reader.finish()?;
        Ok(tx)
    }

    /// Decode a transaction from the front of `reader`, leaving any bytes that
    /// follow it unread.
    pub fn decode_from(reader: &mut Reader<'_>) -> Result<Self> {
        let header = reader.read_u32_le()?;
        let overwintered = header & OVERWINTERED_FLAG != 0;
        let version = header & !OVERWINTERED_FLAG;

        let version_group_id = if overwintered {
            let group_id = reader.read_u32_le()?;
            let expected = match version {
                3 => OVERWINTER_VERSION_GROUP_ID,
                4 => SAPLING_VERSION_GROUP_ID,
                _ => {
                    return Err(ZcashError::UnsupportedVersion {
                        version,
                        overwintered,
                    })
                }
            };
            if group_id != expected {
                return Err(ZcashError::VersionGroupMismatch { version, group_id });
            }
            Some(group_id)
        } else {
            if !(1..=2).contains(&version) {
                return Err(ZcashError::UnsupportedVersion {
                    version,
                    overwintered,
                });
            }
            None
        };

        let input_count = reader.read_count(MIN_INPUT_LEN)?;
        let mut inputs = Vec::with_capacity(input_count);
        for _ in 0..input_count {
            inputs.push(TxIn {
                prevout: OutPoint {
                    txid: reader.read_digest()?,
                    index: reader.read_u32_le()?,
                },
                script_sig: Blob(reader.read_var_bytes()?),
                sequence: reader.read_u32_le()?,
            });
        }

        let output_count = reader.read_count(MIN_OUTPUT_LEN)?;
        let mut outputs = Vec::with_capacity(output_count);
        for _ in 0..output_count {
            outputs.push(TxOut {
                value: reader.read_i64_le()?,
                script_pubkey: Blob(reader.read_var_bytes()?),
            });
        }

        let lock_time = reader.read_u32_le()?;
        let expiry_height = if overwintered {
            Some(reader.read_u32_le()?)
        } else {
            None
        };

        let is_sapling = overwintered && version >= 4;
        let mut sapling = if is_sapling {
            let value_balance = reader.read_i64_le()?;
            let spend_count = reader.read_count(SPEND_DESCRIPTION_LEN)?;
            let mut spends = Vec::with_capacity(spend_count);
            for _ in 0..spend_count {
                spends.push(decode_spend(reader)?);
            }
            let output_count = reader.read_count(OUTPUT_DESCRIPTION_LEN)?;
            let mut shielded_outputs = Vec::with_capacity(output_count);
            for _ in 0..output_count {
                shielded_outputs.push(decode_output(reader)?);
            }
            Some(SaplingBundle {
                value_balance,
                spends,
                outputs: shielded_outputs,
                binding_sig: None,
            })
        } else {
            None
        };

        let mut join_splits = Vec::new();
        let mut join_split_auth = None;
        if version >= 2 {
            let proof_len = if is_sapling {
                GROTH_PROOF_LEN
            } else {
                PHGR_PROOF_LEN
            };
            let count = reader.read_count(JOIN_SPLIT_FIXED_LEN + proof_len)?;
            join_splits.reserve(count);
            for _ in 0..count {
                join_splits.push(decode_join_split(reader, proof_len)?);
            }
            if count > 0 {
                join_split_auth = Some(JoinSplitAuth {
                    pubkey: reader.read_digest()?,
                    sig: Blob(reader.read_bytes(SIGNATURE_LEN)?.to_vec()),
                });
            }
        }

        if let Some(bundle) = sapling.as_mut() {
            if !bundle.is_empty() {
                bundle.binding_sig = Some(Blob(reader.read_bytes(SIGNATURE_LEN)?.to_vec()));
            }
        }

        Ok(Transaction {
            overwintered,
            version,
            version_group_id,
            inputs,
            outputs,
            lock_time,
            expiry_height,
            sapling,
            join_splits,
            join_split_auth,
        })
    }

    /// Canonical encoding. Fields are written as the version calls for them;
    /// a missing join-split or binding signature is written as zeros.
    pub fn encode(&self) -> Vec<u8> {
        let mut w = Writer::with_capacity(256);
        self.encode_into(&mut w);
        w.into_bytes()
    }

    pub fn encode_into(&self, w: &mut Writer) {
        let header = if self.overwintered {
            self.version | OVERWINTERED_FLAG
        } else {
            self.version
        };
        w.write_u32_le(header);
        if self.overwintered {
            w.write_u32_le(self.version_group_id.unwrap_or_default());
        }

        w.write_compact_size(self.inputs.len() as u64);
        for input in &self.inputs {
            w.write_digest(&input.prevout.txid);
            w.write_u32_le(input.prevout.index);
            w.write_var_bytes(input.script_sig.as_bytes());
            w.write_u32_le(input.sequence);
        }

        w.write_compact_size(self.outputs.len() as u64);
        for output in &self.outputs {
            w.write_i64_le(output.value);
            w.write_var_bytes(output.script_pubkey.as_bytes());
        }

        w.write_u32_le(self.lock_time);
        if self.overwintered {
            w.write_u32_le(self.expiry_height.unwrap_or_default());
        }

        let empty = SaplingBundle::default();
        let sapling = self.sapling.as_ref().unwrap_or(&empty);
        if self.is_sapling() {
            w.write_i64_le(sapling.value_balance);
            w.write_compact_size(sapling.spends.len() as u64);
            for spend in &sapling.spends {
                encode_spend(w, spend);
            }
            w.write_compact_size(sapling.outputs.len() as u64);
            for output in &sapling.outputs {
                encode_output(w, output);
            }
        }

        if self.version >= 2 {
            w.write_compact_size(self.join_splits.len() as u64);
            for js in &self.join_splits {
                encode_join_split(w, js);
            }
            if !self.join_splits.is_empty() {
                match &self.join_split_auth {
                    Some(auth) => {
                        w.write_digest(&auth.pubkey);
                        w.write_bytes(auth.sig.as_bytes());
                    }
                    None => w.write_bytes(&[0u8; 32 + SIGNATURE_LEN]),
                }
            }
        }

        if self.is_sapling() && !sapling.is_empty() {
            match &sapling.binding_sig {
                Some(sig) => w.write_bytes(sig.as_bytes()),
                None => w.write_bytes(&[0u8; SIGNATURE_LEN]),
            }
        }
    }

    /// `sha256d` of the encoding.
    pub fn txid(&self) -> Digest {
        Hasher::hash(&self.encode())
    }

    /// Whether this is a v4 (Sapling) transaction.
    pub fn is_sapling(&self) -> bool {
        self.overwintered && self.version >= 4
    }

    /// A coinbase has a single input spending the null outpoint.
    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1 && self.inputs[0].prevout.is_null()
    }

    /// Txids of the transactions whose outputs this one spends.
    pub fn spent_txids(&self) -> impl Iterator<Item = &Digest> {
        self.inputs
            .iter()
            .filter(|input| !input.prevout.is_null())
            .map(|input| &input.prevout.txid)
    }
}

fn decode_spend(reader: &mut Reader<'_>) -> Result<SpendDescription> {
    Ok(SpendDescription {
        cv: reader.read_digest()?,
        anchor: reader.read_digest()?,
        nullifier: reader.read_digest()?,
        rk: reader.read_digest()?,
        zkproof: Blob(reader.read_bytes(GROTH_PROOF_LEN)?.to_vec()),
        spend_auth_sig: Blob(reader.read_bytes(SIGNATURE_LEN)?.to_vec()),
    })
}

fn encode_spend(w: &mut Writer, spend: &SpendDescription) {
    w.write_digest(&spend.cv);
    w.write_digest(&spend.anchor);
    w.write_digest(&spend.nullifier);
    w.write_digest(&spend.rk);
    w.write_bytes(spend.zkproof.as_bytes());
    w.write_bytes(spend.spend_auth_sig.as_bytes());
}

fn decode_output(reader: &mut Reader<'_>) -> Result<OutputDescription> {
    Ok(OutputDescription {
        cv: reader.read_digest()?,
        cmu: reader.read_digest()?,
        ephemeral_key: reader.read_digest()?,
        enc_ciphertext: Blob(reader.read_bytes(580)?.to_vec()),
        out_ciphertext: Blob(reader.read_bytes(80)?.to_vec()),
        zkproof: Blob(reader.read_bytes(GROTH_PROOF_LEN)?.to_vec()),
    })
}

fn encode_output(w: &mut Writer, output: &OutputDescription) {
    w.write_digest(&output.cv);
    w.write_digest(&output.cmu);
    w.write_digest(&output.ephemeral_key);
    w.write_bytes(output.enc_ciphertext.as_bytes());
    w.write_bytes(output.out_ciphertext.as_bytes());
    w.write_bytes(output.zkproof.as_bytes());
}

fn decode_join_split(reader: &mut Reader<'_>, proof_len: usize) -> Result<JoinSplit> {
    Ok(JoinSplit {
        vpub_old: reader.read_i64_le()?,
        vpub_new: reader.read_i64_le()?,
        anchor: reader.read_digest()?,
        nullifiers: [reader.read_digest()?, reader.read_digest()?],
        commitments: [reader.read_digest()?, reader.read_digest()?],
        ephemeral_key: reader.read_digest()?,
        random_seed: reader.read_digest()?,
        macs: [reader.read_digest()?, reader.read_digest()?],
        proof: Blob(reader.read_bytes(proof_len)?.to_vec()),
        ciphertexts: [
            Blob(reader.read_bytes(JOIN_SPLIT_CIPHERTEXT_LEN)?.to_vec()),
            Blob(reader.read_bytes(JOIN_SPLIT_CIPHERTEXT_LEN)?.to_vec()),
        ],
    })
}

fn encode_join_split(w: &mut Writer, js: &JoinSplit) {
    w.write_i64_le(js.vpub_old);
    w.write_i64_le(js.vpub_new);
    w.write_digest(&js.anchor);
    for d in js.nullifiers.iter().chain(&js.commitments) {
        w.write_digest(d);
    }
    w.write_digest(&js.ephemeral_key);
    w.write_digest(&js.random_seed);
    for mac in &js.macs {
        w.write_digest(mac);
    }
    w.write_bytes(js.proof.as_bytes());
    for ct in &js.ciphertexts {
        w.write_bytes(ct.as_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::{sample_transaction, TxShape};
    use zdag_core::WireError;

    fn v1_transfer(script_sig_len: usize) -> Transaction {
        Transaction {
            overwintered: false,
            version: 1,
            version_group_id: None,
            inputs: vec![TxIn {
                prevout: OutPoint {
                    txid: Hasher::hash(b"prev"),
                    index: 0,
                },
                script_sig: Blob(vec![0x51; script_sig_len]),
                sequence: u32::MAX,
            }],
            outputs: vec![TxOut {
                value: 50_000,
                script_pubkey: Blob(vec![]),
            }],
            lock_time: 0,
            expiry_height: None,
            sapling: None,
            join_splits: vec![],
            join_split_auth: None,
        }
    }

    #[test]
    fn test_v1_layout_length() {
        // 4 + 1 + (32 + 4 + 1 + 4 + 4) + 1 + (8 + 1) + 4
        assert_eq!(v1_transfer(4).encode().len(), 64);
    }

    #[test]
    fn test_v1_roundtrip() {
        let tx = v1_transfer(10);
        let bytes = tx.encode();
        assert_eq!(Transaction::decode(&bytes).unwrap(), tx);
    }

    #[test]
    fn test_every_shape_roundtrips() {
        for (i, shape) in TxShape::ALL.iter().enumerate() {
            let tx = sample_transaction(*shape, i as u64);
            let bytes = tx.encode();
            let decoded = Transaction::decode(&bytes).unwrap();
            assert_eq!(decoded, tx, "shape {:?}", shape);
            assert_eq!(decoded.encode(), bytes);
        }
    }

    #[test]
    fn test_sapling_binding_sig_presence() {
        let tx = sample_transaction(TxShape::SaplingShielded, 7);
        assert!(tx.sapling.as_ref().unwrap().binding_sig.is_some());

        let transparent = sample_transaction(TxShape::SaplingTransparent, 7);
        let bundle = transparent.sapling.as_ref().unwrap();
        assert!(bundle.is_empty());
        assert!(bundle.binding_sig.is_none());
    }

    #[test]
    fn test_join_split_sizes() {
        let sprout = sample_transaction(TxShape::SproutJoinSplit, 1);
        assert_eq!(sprout.join_splits[0].proof.len(), PHGR_PROOF_LEN);
        let with_auth = sprout.encode().len();
        let mut bare = sprout.clone();
        bare.join_splits.clear();
        bare.join_split_auth = None;
        assert_eq!(with_auth - bare.encode().len(), 1802 + 32 + 64);
    }

    #[test]
    fn test_strict_decode_rejects_trailing() {
        let mut bytes = v1_transfer(4).encode();
        bytes.push(0);
        assert!(matches!(
            Transaction::decode(&bytes),
            Err(ZcashError::Wire(WireError::TrailingBytes { .. }))
        ));
    }

    #[test]
    fn test_decode_from_leaves_rest() {
        let mut bytes = v1_transfer(4).encode();
        bytes.extend_from_slice(&[9, 9]);
        let mut reader = Reader::new(&bytes);
        Transaction::decode_from(&mut reader).unwrap();
        assert_eq!(reader.remaining(), 2);
    }

    #[test]
    fn test_truncated() {
        let bytes = v1_transfer(4).encode();
        // the input count is checked against what is left before reading inputs
        assert_eq!(
            Transaction::decode(&bytes[..40]),
            Err(ZcashError::Wire(WireError::CountTooLarge { offset: 4, count: 1 }))
        );
        // cut inside the lock time
        assert_eq!(
            Transaction::decode(&bytes[..bytes.len() - 2]),
            Err(ZcashError::Wire(WireError::UnexpectedEof {
                offset: bytes.len() - 4,
                needed: 4,
                remaining: 2,
            }))
        );
    }

    #[test]
    fn test_unsupported_versions() {
        let mut bytes = v1_transfer(4).encode();
        bytes[0] = 0;
        assert!(matches!(
            Transaction::decode(&bytes),
            Err(ZcashError::UnsupportedVersion { version: 0, .. })
        ));
        // overwintered v5
        let header = (5u32 | OVERWINTERED_FLAG).to_le_bytes();
        bytes[..4].copy_from_slice(&header);
        assert!(matches!(
            Transaction::decode(&bytes),
            Err(ZcashError::UnsupportedVersion { version: 5, overwintered: true })
        ));
    }

    #[test]
    fn test_version_group_checked() {
        let mut tx = sample_transaction(TxShape::SaplingTransparent, 3);
        tx.version_group_id = Some(OVERWINTER_VERSION_GROUP_ID);
        assert!(matches!(
            Transaction::decode(&tx.encode()),
            Err(ZcashError::VersionGroupMismatch { version: 4, .. })
        ));
    }

    #[test]
    fn test_coinbase_detection() {
        let coinbase = sample_transaction(TxShape::Coinbase, 0);
        assert!(coinbase.is_coinbase());
        assert_eq!(coinbase.spent_txids().count(), 0);

        let transfer = v1_transfer(4);
        assert!(!transfer.is_coinbase());
        assert_eq!(transfer.spent_txids().next(), Some(&Hasher::hash(b"prev")));
    }

    #[test]
    fn test_txid_is_sha256d_of_encoding() {
        let tx = v1_transfer(4);
        assert_eq!(tx.txid(), Hasher::hash(&tx.encode()));
    }
}
