//! Deterministic synthetic blocks.
//!
//! Real chain data is large and awkward to vendor, so tests, the stress run
//! and the CLI demo build structurally valid blocks from a seed. Every
//! transaction version and shielded component the grammar knows about is
//! represented.

use crate::block::Block;
use crate::header::{BlockHeader, EQUIHASH_SOLUTION_LEN};
use crate::transaction::{
    JoinSplit, JoinSplitAuth, OutPoint, OutputDescription, SaplingBundle, SpendDescription,
    Transaction, TxIn, TxOut, GROTH_PROOF_LEN, JOIN_SPLIT_CIPHERTEXT_LEN, PHGR_PROOF_LEN,
    OVERWINTER_VERSION_GROUP_ID, SAPLING_VERSION_GROUP_ID,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use zdag_core::{Blob, Digest};

/// The kinds of transaction the generator produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TxShape {
    /// v4 coinbase.
    Coinbase,
    /// v1, transparent only.
    TransparentV1,
    /// v2 with one PHGR join-split.
    SproutJoinSplit,
    /// v3, transparent only.
    OverwinterTransparent,
    /// v4 with an empty Sapling bundle.
    SaplingTransparent,
    /// v4 with one spend and two outputs.
    SaplingShielded,
    /// v4 with one Groth join-split.
    SaplingJoinSplit,
}

impl TxShape {
    pub const ALL: [TxShape; 7] = [
        TxShape::Coinbase,
        TxShape::TransparentV1,
        TxShape::SproutJoinSplit,
        TxShape::OverwinterTransparent,
        TxShape::SaplingTransparent,
        TxShape::SaplingShielded,
        TxShape::SaplingJoinSplit,
    ];

    /// Shapes used for the non-coinbase positions of a block, cycled.
    const BODY: [TxShape; 6] = [
        TxShape::SaplingTransparent,
        TxShape::TransparentV1,
        TxShape::SaplingShielded,
        TxShape::OverwinterTransparent,
        TxShape::SproutJoinSplit,
        TxShape::SaplingJoinSplit,
    ];
}

fn digest(rng: &mut StdRng) -> Digest {
    Digest::from_bytes(rng.gen())
}

fn blob(rng: &mut StdRng, len: usize) -> Blob {
    let mut bytes = vec![0u8; len];
    rng.fill(&mut bytes[..]);
    Blob(bytes)
}

fn transparent_parts(rng: &mut StdRng) -> (Vec<TxIn>, Vec<TxOut>) {
    let input_count = rng.gen_range(1..=3);
    let inputs = (0..input_count)
        .map(|_| TxIn {
            prevout: OutPoint {
                txid: digest(rng),
                index: rng.gen_range(0..4),
            },
            script_sig: blob(rng, 106),
            sequence: u32::MAX,
        })
        .collect();
    let output_count = rng.gen_range(1..=3);
    let outputs = (0..output_count)
        .map(|_| TxOut {
            value: rng.gen_range(1_000..5_000_000_000),
            script_pubkey: blob(rng, 25),
        })
        .collect();
    (inputs, outputs)
}

fn join_split(rng: &mut StdRng, proof_len: usize) -> JoinSplit {
    JoinSplit {
        vpub_old: rng.gen_range(0..1_000_000),
        vpub_new: 0,
        anchor: digest(rng),
        nullifiers: [digest(rng), digest(rng)],
        commitments: [digest(rng), digest(rng)],
        ephemeral_key: digest(rng),
        random_seed: digest(rng),
        macs: [digest(rng), digest(rng)],
        proof: blob(rng, proof_len),
        ciphertexts: [
            blob(rng, JOIN_SPLIT_CIPHERTEXT_LEN),
            blob(rng, JOIN_SPLIT_CIPHERTEXT_LEN),
        ],
    }
}

fn join_split_auth(rng: &mut StdRng) -> JoinSplitAuth {
    JoinSplitAuth {
        pubkey: digest(rng),
        sig: blob(rng, 64),
    }
}

fn spend(rng: &mut StdRng) -> SpendDescription {
    SpendDescription {
        cv: digest(rng),
        anchor: digest(rng),
        nullifier: digest(rng),
        rk: digest(rng),
        zkproof: blob(rng, GROTH_PROOF_LEN),
        spend_auth_sig: blob(rng, 64),
    }
}

fn shielded_output(rng: &mut StdRng) -> OutputDescription {
    OutputDescription {
        cv: digest(rng),
        cmu: digest(rng),
        ephemeral_key: digest(rng),
        enc_ciphertext: blob(rng, 580),
        out_ciphertext: blob(rng, 80),
        zkproof: blob(rng, GROTH_PROOF_LEN),
    }
}

fn base(version: u32, inputs: Vec<TxIn>, outputs: Vec<TxOut>) -> Transaction {
    let (overwintered, version_group_id, expiry_height) = match version {
        3 => (true, Some(OVERWINTER_VERSION_GROUP_ID), Some(0)),
        4 => (true, Some(SAPLING_VERSION_GROUP_ID), Some(0)),
        _ => (false, None, None),
    };
    Transaction {
        overwintered,
        version,
        version_group_id,
        inputs,
        outputs,
        lock_time: 0,
        expiry_height,
        sapling: (version >= 4).then(SaplingBundle::default),
        join_splits: Vec::new(),
        join_split_auth: None,
    }
}

/// Build one transaction of the given shape from `seed`.
pub fn sample_transaction(shape: TxShape, seed: u64) -> Transaction {
    let mut rng = StdRng::seed_from_u64(seed.wrapping_mul(31).wrapping_add(shape as u64));
    let (inputs, outputs) = transparent_parts(&mut rng);
    match shape {
        TxShape::Coinbase => {
            let mut script_sig = seed.to_le_bytes().to_vec();
            script_sig.extend_from_slice(b"zcash-dag");
            let coinbase_in = TxIn {
                prevout: OutPoint::null(),
                script_sig: Blob(script_sig),
                sequence: u32::MAX,
            };
            let mut tx = base(4, vec![coinbase_in], outputs);
            tx.expiry_height = Some(rng.gen_range(400_000..2_000_000));
            tx
        }
        TxShape::TransparentV1 => base(1, inputs, outputs),
        TxShape::SproutJoinSplit => {
            let mut tx = base(2, inputs, outputs);
            tx.join_splits = vec![join_split(&mut rng, PHGR_PROOF_LEN)];
            tx.join_split_auth = Some(join_split_auth(&mut rng));
            tx
        }
        TxShape::OverwinterTransparent => {
            let mut tx = base(3, inputs, outputs);
            tx.expiry_height = Some(rng.gen_range(300_000..400_000));
            tx
        }
        TxShape::SaplingTransparent => base(4, inputs, outputs),
        TxShape::SaplingShielded => {
            let mut tx = base(4, inputs, outputs);
            tx.sapling = Some(SaplingBundle {
                value_balance: rng.gen_range(-100_000..100_000),
                spends: vec![spend(&mut rng)],
                outputs: vec![shielded_output(&mut rng), shielded_output(&mut rng)],
                binding_sig: Some(blob(&mut rng, 64)),
            });
            tx
        }
        TxShape::SaplingJoinSplit => {
            let mut tx = base(4, inputs, outputs);
            tx.join_splits = vec![join_split(&mut rng, GROTH_PROOF_LEN)];
            tx.join_split_auth = Some(join_split_auth(&mut rng));
            tx
        }
    }
}

/// A header with a mainnet-sized solution. The merkle root is left zero.
pub fn sample_header(seed: u64) -> BlockHeader {
    let mut rng = StdRng::seed_from_u64(seed);
    BlockHeader {
        version: 4,
        prev_hash: digest(&mut rng),
        merkle_root: Digest::zero(),
        final_sapling_root: digest(&mut rng),
        time: rng.gen_range(1_540_000_000..1_700_000_000),
        bits: 0x1c01_2345,
        nonce: digest(&mut rng),
        solution: blob(&mut rng, EQUIHASH_SOLUTION_LEN),
    }
}

/// A block of `tx_count` transactions (coinbase first) committing to its
/// merkle root. `tx_count == 0` yields a block with no transactions.
pub fn sample_block(tx_count: usize, seed: u64) -> Block {
    let transactions = (0..tx_count)
        .map(|i| {
            let tx_seed = seed.wrapping_mul(1_000_003).wrapping_add(i as u64);
            if i == 0 {
                sample_transaction(TxShape::Coinbase, tx_seed)
            } else {
                sample_transaction(TxShape::BODY[(i - 1) % TxShape::BODY.len()], tx_seed)
            }
        })
        .collect();
    Block::new(sample_header(seed), transactions).with_computed_merkle_root()
}

/// Like [`sample_block`] but without a parent.
pub fn sample_genesis_block(seed: u64) -> Block {
    let mut block = sample_block(1, seed);
    block.header.prev_hash = Digest::zero();
    block
}
