//! # zdag-core
//!
//! Shared primitives for the zcash-dag block transcoder.
//!
//! This crate provides:
//! - `sha256d` digests and an incremental hasher
//! - Content addresses (codec + digest) with their CIDv1 string form
//! - Little-endian wire readers/writers with canonical compact sizes
//!
//! ## Example
//!
//! ```rust
//! use zdag_core::{Codec, ContentAddress};
//!
//! let genesis = ContentAddress::from_display_hex(
//!     Codec::ZcashBlock,
//!     "00040fe8ec8471911baa1db1266ea15dd06b4a8a5c453883c000b031973dce08",
//! )
//! .unwrap();
//! assert!(genesis.to_string().starts_with("bahaacvra"));
//! ```

mod address;
mod hash;
pub mod wire;

pub use address::{AddressError, Codec, ContentAddress, DBL_SHA2_256};
pub use hash::{Digest, Hasher, DIGEST_LEN};
pub use wire::{Blob, Reader, WireError, Writer};
