//! # World Configuration
//!
//! Storage limits, loaded once at startup from TOML.
//!
//! ```toml
//! chunk_capacity = 1024
//! max_chunks = 256
//! max_archetypes = 64
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{StrataError, StrataResult};

/// Default number of slots per hive chunk.
pub const DEFAULT_CHUNK_CAPACITY: u16 = 1024;

/// Storage limits for a [`World`](crate::World).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldConfig {
    /// Slots per hive chunk.
    pub chunk_capacity: u16,
    /// Chunks an archetype may allocate.
    ///
    /// Chunk id `0xFFFF` is never handed out: together with slot `0xFFFF`
    /// it encodes the end of the free list.
    pub max_chunks: u16,
    /// Archetypes a world may create.
    pub max_archetypes: u16,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            chunk_capacity: DEFAULT_CHUNK_CAPACITY,
            max_chunks: u16::MAX,
            max_archetypes: u16::MAX,
        }
    }
}

impl WorldConfig {
    /// Parses and validates a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::InvalidConfig`] on malformed TOML, unknown keys
    /// or out-of-range values.
    pub fn from_toml_str(text: &str) -> StrataResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| StrataError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::InvalidConfig`] if the file cannot be read or
    /// does not hold a valid configuration.
    pub fn load(path: impl AsRef<Path>) -> StrataResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            StrataError::InvalidConfig(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks every limit is usable.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> StrataResult<()> {
        if self.chunk_capacity == 0 {
            return Err(StrataError::InvalidConfig(
                "chunk_capacity must be at least 1".into(),
            ));
        }
        if self.max_chunks == 0 {
            return Err(StrataError::InvalidConfig(
                "max_chunks must be at least 1".into(),
            ));
        }
        if self.max_archetypes == 0 {
            return Err(StrataError::InvalidConfig(
                "max_archetypes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = WorldConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.chunk_capacity, 1024);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = WorldConfig::from_toml_str("chunk_capacity = 64").unwrap();
        assert_eq!(config.chunk_capacity, 64);
        assert_eq!(config.max_archetypes, u16::MAX);
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let err = WorldConfig::from_toml_str("chunk_capacity = 0").unwrap_err();
        assert!(matches!(err, StrataError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_unknown_keys() {
        let err = WorldConfig::from_toml_str("chunk_size = 64").unwrap_err();
        assert!(matches!(err, StrataError::InvalidConfig(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = WorldConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, StrataError::InvalidConfig(msg) if msg.contains("failed to read")));
    }
}
