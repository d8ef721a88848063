//! Error types for the Zcash grammar.

use thiserror::Error;
use zdag_core::WireError;

/// Errors that can occur decoding headers, transactions or blocks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ZcashError {
    #[error("malformed encoding: {0}")]
    Wire(#[from] WireError),

    #[error("unsupported transaction version {version} (overwintered: {overwintered})")]
    UnsupportedVersion { version: u32, overwintered: bool },

    #[error("version group {group_id:#010x} does not match transaction version {version}")]
    VersionGroupMismatch { version: u32, group_id: u32 },
}

pub type Result<T> = std::result::Result<T, ZcashError>;
