//! Property tests for the block and transaction grammar.

use proptest::prelude::*;
use zdag_zcash::sample::{sample_block, sample_transaction, TxShape};
use zdag_zcash::{Block, Transaction, ZcashError};

fn shape() -> impl Strategy<Value = TxShape> {
    prop::sample::select(TxShape::ALL.to_vec())
}

proptest! {
    #[test]
    fn prop_transaction_roundtrip(shape in shape(), seed in any::<u64>()) {
        let tx = sample_transaction(shape, seed);
        let bytes = tx.encode();
        let decoded = Transaction::decode(&bytes).unwrap();
        prop_assert_eq!(decoded.encode(), bytes);
        prop_assert_eq!(decoded, tx);
    }

    #[test]
    fn prop_truncation_fails(shape in shape(), seed in any::<u64>(), cut in 1usize..64) {
        let bytes = sample_transaction(shape, seed).encode();
        let end = bytes.len().saturating_sub(cut);
        prop_assert!(matches!(Transaction::decode(&bytes[..end]), Err(ZcashError::Wire(_))));
    }

    #[test]
    fn prop_block_roundtrip(tx_count in 1usize..24, seed in any::<u64>()) {
        let block = sample_block(tx_count, seed);
        let bytes = block.encode();
        let decoded = Block::decode(&bytes).unwrap();
        prop_assert!(decoded.check_merkle_root());
        prop_assert_eq!(decoded.encode(), bytes);
        prop_assert_eq!(decoded, block);
    }
}
