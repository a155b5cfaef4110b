//! Container configuration.
//!
//! This module provides configuration for MSF block allocation.

/// Block sizes the MSF format accepts.
pub const VALID_BLOCK_SIZES: [u32; 4] = [512, 1024, 2048, 4096];

/// MSF container configuration parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MsfConfig {
    /// Block size in bytes (default: 4096).
    ///
    /// Every stream is stored as a list of blocks of this size.
    pub block_size: u32,
}

impl Default for MsfConfig {
    fn default() -> Self {
        MsfConfig { block_size: 4096 }
    }
}

impl MsfConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set block size (builder pattern).
    pub fn with_block_size(mut self, block_size: u32) -> Self {
        self.block_size = block_size;
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), MsfConfigError> {
        if !VALID_BLOCK_SIZES.contains(&self.block_size) {
            return Err(MsfConfigError::InvalidBlockSize(self.block_size));
        }
        Ok(())
    }

    /// Create a configuration optimized for testing (small blocks).
    ///
    /// Small blocks make even short streams span several blocks.
    pub fn for_testing() -> Self {
        MsfConfig { block_size: 512 }
    }
}

/// Container configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MsfConfigError {
    /// Block size is not one of 512, 1024, 2048, 4096.
    #[error("Invalid block size {0}: must be 512, 1024, 2048 or 4096")]
    InvalidBlockSize(u32),
}
