//! Encoder and reassembler configuration.

use serde::{Deserialize, Serialize};

/// Configuration for [`GraphEncoder`](crate::GraphEncoder).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderConfig {
    /// Also emit the witness merkle (coinbase replaced by the zero digest).
    pub witness_merkle: bool,
}

impl EncoderConfig {
    pub fn builder() -> EncoderConfigBuilder {
        EncoderConfigBuilder::new()
    }
}

/// Builder for encoder configuration.
pub struct EncoderConfigBuilder {
    config: EncoderConfig,
}

impl EncoderConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: EncoderConfig::default(),
        }
    }

    pub fn witness_merkle(mut self, enabled: bool) -> Self {
        self.config.witness_merkle = enabled;
        self
    }

    pub fn build(self) -> EncoderConfig {
        self.config
    }
}

impl Default for EncoderConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for [`GraphReassembler`](crate::GraphReassembler).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssembleConfig {
    /// Check that every loaded chunk hashes to its address.
    pub verify_chunks: bool,

    /// Maximum merkle depth to descend. 64 covers any block that fits in memory.
    pub max_depth: usize,
}

impl Default for AssembleConfig {
    fn default() -> Self {
        AssembleConfig {
            verify_chunks: true,
            max_depth: 64,
        }
    }
}

impl AssembleConfig {
    pub fn builder() -> AssembleConfigBuilder {
        AssembleConfigBuilder::new()
    }
}

/// Builder for reassembly configuration.
pub struct AssembleConfigBuilder {
    config: AssembleConfig,
}

impl AssembleConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: AssembleConfig::default(),
        }
    }

    pub fn verify_chunks(mut self, enabled: bool) -> Self {
        self.config.verify_chunks = enabled;
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = depth;
        self
    }

    pub fn build(self) -> AssembleConfig {
        self.config
    }
}

impl Default for AssembleConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
