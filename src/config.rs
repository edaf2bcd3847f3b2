//! Configuration for huffpack

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CodecError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Largest input accepted by `Codec::compress`, in bytes.
    pub max_input_size: usize,
    /// Decode every container right after encoding it and compare.
    pub verify_roundtrip: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_input_size: 256 * 1024 * 1024, // 256 MB
            verify_roundtrip: false,
        }
    }
}

impl CodecConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: CodecConfig =
            serde_json::from_str(json).map_err(|e| CodecError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Frequencies travel as 4-byte fields, so no limit may exceed `u32::MAX`.
    pub fn validate(&self) -> Result<()> {
        if self.max_input_size == 0 {
            return Err(CodecError::Config("max_input_size must be non-zero".into()));
        }
        if self.max_input_size as u64 > u32::MAX as u64 {
            return Err(CodecError::Config(format!(
                "max_input_size {} exceeds {}",
                self.max_input_size,
                u32::MAX
            )));
        }
        Ok(())
    }
}
