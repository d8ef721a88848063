//! Property-based tests for merkle construction
//!
//!  - Determinism: identical leaves give identical branches and root
//!  - Shape: every layer halves (rounding up) until one digest remains
//!  - Odd layers end in a duplicate pad
//!  - Every branch payload hashes to the digest its parent layer holds

use proptest::prelude::*;
use zdag_core::{Digest, Hasher};
use zdag_merkle::{branch_count, layer_sizes, MerkleBranch, MerkleBuilder};

fn leaves_strategy() -> impl Strategy<Value = Vec<Digest>> {
    prop::collection::vec(any::<[u8; 32]>(), 1..80)
        .prop_map(|raw| raw.into_iter().map(Digest::from_bytes).collect())
}

proptest! {
    #[test]
    fn build_is_deterministic(leaves in leaves_strategy()) {
        let a = MerkleBuilder::new().build(&leaves).unwrap();
        let b = MerkleBuilder::new().build(&leaves).unwrap();
        prop_assert_eq!(a.root(), b.root());
        prop_assert_eq!(a.branches(), b.branches());
    }

    #[test]
    fn layers_halve_rounding_up(leaves in leaves_strategy()) {
        let tree = MerkleBuilder::new().build(&leaves).unwrap();
        let sizes: Vec<usize> = tree.layers().iter().map(|l| l.len()).collect();
        prop_assert_eq!(&sizes, &layer_sizes(leaves.len()));
        prop_assert_eq!(tree.branches().len(), branch_count(leaves.len()));
        prop_assert_eq!(*sizes.last().unwrap(), 1);
    }

    #[test]
    fn odd_layers_end_in_duplicate_pad(leaves in leaves_strategy()) {
        let tree = MerkleBuilder::new().build(&leaves).unwrap();
        let mut offset = 0;
        for window in tree.layers().windows(2) {
            let (below, above) = (&window[0], &window[1]);
            let last = &tree.branches()[offset + above.len() - 1];
            if below.len() % 2 == 1 {
                prop_assert!(last.is_duplicate_pad());
                prop_assert_eq!(last.left(), below.last().unwrap());
            } else {
                prop_assert_eq!(last.right(), below.last().unwrap());
            }
            offset += above.len();
        }
    }

    #[test]
    fn branches_link_to_children(leaves in leaves_strategy()) {
        let tree = MerkleBuilder::new().build(&leaves).unwrap();
        let mut offset = 0;
        for window in tree.layers().windows(2) {
            let (below, above) = (&window[0], &window[1]);
            for (i, parent) in above.iter().enumerate() {
                let branch = &tree.branches()[offset + i];
                prop_assert_eq!(branch.digest(), parent);
                prop_assert_eq!(branch.left(), &below[2 * i]);
                prop_assert_eq!(Hasher::hash(&branch.payload()), *parent);
                let parsed = MerkleBranch::from_payload(&branch.payload());
                prop_assert_eq!(parsed, Some(*branch));
            }
            offset += above.len();
        }
    }

    #[test]
    fn witness_differs_only_in_coinbase(leaves in leaves_strategy()) {
        let witness = MerkleBuilder::witness().build(&leaves).unwrap();
        let mut nulled = leaves.clone();
        nulled[0] = Digest::zero();
        let plain = MerkleBuilder::new().build(&nulled).unwrap();
        prop_assert_eq!(witness.root(), plain.root());
    }
}
