//! Property-based tests for digests, addresses and wire primitives
//!
//!  - Display order is the byte reversal of internal order
//!  - Addresses survive the CID string and display-hex forms
//!  - Compact sizes read back as written, in canonical length

use proptest::prelude::*;
use zdag_core::wire::MAX_COMPACT_SIZE;
use zdag_core::{Codec, ContentAddress, Digest, Reader, Writer};

fn digest_strategy() -> impl Strategy<Value = Digest> {
    any::<[u8; 32]>().prop_map(Digest::from_bytes)
}

fn codec_strategy() -> impl Strategy<Value = Codec> {
    prop_oneof![Just(Codec::ZcashBlock), Just(Codec::ZcashTx)]
}

proptest! {
    #[test]
    fn display_hex_reverses_bytes(digest in digest_strategy()) {
        let mut reversed = *digest.as_bytes();
        reversed.reverse();
        prop_assert_eq!(digest.to_display_hex(), hex::encode(reversed));
        prop_assert_eq!(Digest::from_display_hex(&digest.to_display_hex()), Some(digest));
        prop_assert_eq!(Digest::from_hex(&digest.to_hex()), Some(digest));
    }

    #[test]
    fn address_string_forms_agree(codec in codec_strategy(), digest in digest_strategy()) {
        let address = ContentAddress::new(codec, digest);

        let text = address.to_string();
        let prefix = match codec {
            Codec::ZcashBlock => "bahaacvra",
            Codec::ZcashTx => "bahaqcvra",
        };
        prop_assert!(text.starts_with(prefix), "{} lacks {}", text, prefix);
        prop_assert_eq!(text.parse::<ContentAddress>().unwrap(), address);

        prop_assert_eq!(ContentAddress::from_cid(&address.to_cid()).unwrap(), address);
        let from_hex = ContentAddress::from_display_hex(codec, &address.to_display_hex()).unwrap();
        prop_assert_eq!(from_hex, address);
    }

    #[test]
    fn address_verifies_its_own_bytes(
        codec in codec_strategy(),
        bytes in prop::collection::vec(any::<u8>(), 0..200),
        flip in any::<usize>(),
    ) {
        let address = ContentAddress::of(codec, &bytes);
        prop_assert!(address.verifies(&bytes));

        if !bytes.is_empty() {
            let mut corrupted = bytes.clone();
            corrupted[flip % bytes.len()] ^= 0x01;
            prop_assert!(!address.verifies(&corrupted));
        }
    }

    #[test]
    fn compact_size_reads_back(value in 0..=MAX_COMPACT_SIZE) {
        let mut writer = Writer::new();
        writer.write_compact_size(value);
        let bytes = writer.into_bytes();

        let expected_len = match value {
            0..=0xfc => 1,
            0xfd..=0xffff => 3,
            _ => 5,
        };
        prop_assert_eq!(bytes.len(), expected_len);

        let mut reader = Reader::new(&bytes);
        prop_assert_eq!(reader.read_compact_size().unwrap(), value);
        prop_assert!(reader.finish().is_ok());
    }
}
