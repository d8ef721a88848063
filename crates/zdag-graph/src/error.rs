//! Error types for graph encoding and reassembly.

use thiserror::Error;
use zdag_core::{Codec, ContentAddress, Digest};
use zdag_zcash::ZcashError;

/// Errors raised by a [`ChunkLoader`](crate::ChunkLoader).
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("chunk not found")]
    NotFound,

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Decoded data that violates the shape of a block graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralError {
    #[error("merkle root mismatch: header commits to {expected}, transactions give {actual}")]
    MerkleRootMismatch { expected: Digest, actual: Digest },

    #[error("witness merkle of a {transactions}-transaction block produced no root")]
    MissingWitnessRoot { transactions: usize },

    #[error("merkle descent exceeded depth {max_depth}")]
    MaxDepthExceeded { max_depth: usize },

    #[error("{address} has codec {}, expected {}", address.codec(), expected)]
    UnexpectedCodec {
        address: ContentAddress,
        expected: Codec,
    },

    #[error("block graph at {root} has no transactions")]
    EmptyBlock { root: ContentAddress },
}

/// Errors that can occur encoding or reassembling a block graph.
#[derive(Error, Debug)]
pub enum GraphError {
    /// The caller handed over an input that cannot form a graph.
    #[error("invalid input: {0}")]
    Configuration(String),

    /// Chunk bytes that are neither a transaction nor a merkle node.
    #[error("undecodable chunk{}: {source}", address.as_ref().map(|a| format!(" {}", a)).unwrap_or_default())]
    Decode {
        address: Option<ContentAddress>,
        #[source]
        source: ZcashError,
    },

    #[error(transparent)]
    Structural(#[from] StructuralError),

    #[error("missing chunk {address}: {source}")]
    MissingChunk {
        address: ContentAddress,
        #[source]
        source: LoadError,
    },

    /// A loaded chunk does not hash to its address.
    #[error("chunk {address} hashes to {actual}")]
    DigestMismatch {
        address: ContentAddress,
        actual: Digest,
    },
}

impl GraphError {
    /// Attach the address of the chunk being decoded, if not already set.
    pub(crate) fn at(self, at: ContentAddress) -> Self {
        match self {
            GraphError::Decode {
                address: None,
                source,
            } => GraphError::Decode {
                address: Some(at),
                source,
            },
            other => other,
        }
    }

    /// The address this error is about, when there is one.
    pub fn address(&self) -> Option<&ContentAddress> {
        match self {
            GraphError::Decode { address, .. } => address.as_ref(),
            GraphError::MissingChunk { address, .. } | GraphError::DigestMismatch { address, .. } => {
                Some(address)
            }
            GraphError::Structural(StructuralError::UnexpectedCodec { address, .. }) => {
                Some(address)
            }
            _ => None,
        }
    }
}

/// Result type for graph operations.
pub type Result<T> = std::result::Result<T, GraphError>;
