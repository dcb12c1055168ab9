//! Repository configuration.
//!
//! Locations of the key file and the record table are passed explicitly to the
//! key manager and the record store, so separate repositories (and separate
//! test runs) never share state.

use std::path::{Path, PathBuf};

/// Key file name used when no location is configured.
pub const DEFAULT_KEY_FILENAME: &str = "key.key";

/// Record table file name used when no location is configured.
pub const DEFAULT_TABLE_FILENAME: &str = "data.csv";

/// Environment variable overriding the key file location.
pub const KEY_PATH_ENV: &str = "PICVAULT_KEY_PATH";

/// Environment variable overriding the record table location.
pub const TABLE_PATH_ENV: &str = "PICVAULT_TABLE_PATH";

/// Where a repository keeps its two persisted artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryConfig {
    /// Raw symmetric key material (created on first use)
    pub key_location: PathBuf,
    /// Record table, one row per stored image
    pub table_location: PathBuf,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self::in_dir(".")
    }
}

impl RepositoryConfig {
    pub fn new(key_location: impl Into<PathBuf>, table_location: impl Into<PathBuf>) -> Self {
        Self {
            key_location: key_location.into(),
            table_location: table_location.into(),
        }
    }

    /// Keep both artifacts under a single directory.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self::new(
            dir.join(DEFAULT_KEY_FILENAME),
            dir.join(DEFAULT_TABLE_FILENAME),
        )
    }

    /// Load configuration from environment variables.
    ///
    /// Optional: `PICVAULT_KEY_PATH`, `PICVAULT_TABLE_PATH` (each falls back
    /// to its file name in the current directory).
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let key_location = lookup(KEY_PATH_ENV)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.key_location);

        let table_location = lookup(TABLE_PATH_ENV)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.table_location);

        Self {
            key_location,
            table_location,
        }
    }

    pub fn with_key_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.key_location = path.into();
        self
    }

    pub fn with_table_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.table_location = path.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_locations() {
        let config = RepositoryConfig::default();
        assert_eq!(config.key_location, Path::new(".").join("key.key"));
        assert_eq!(config.table_location, Path::new(".").join("data.csv"));
    }

    #[test]
    fn test_in_dir() {
        let config = RepositoryConfig::in_dir("/srv/images");
        assert_eq!(config.key_location, PathBuf::from("/srv/images/key.key"));
        assert_eq!(config.table_location, PathBuf::from("/srv/images/data.csv"));
    }

    #[test]
    fn test_lookup_overrides_and_blank_values() {
        let config = RepositoryConfig::from_lookup(|name| match name {
            KEY_PATH_ENV => Some("/keys/vault.key".to_string()),
            TABLE_PATH_ENV => Some("   ".to_string()),
            _ => None,
        });

        assert_eq!(config.key_location, PathBuf::from("/keys/vault.key"));
        assert_eq!(config.table_location, RepositoryConfig::default().table_location);
    }

    #[test]
    fn test_builder_overrides() {
        let config = RepositoryConfig::default()
            .with_key_location("a.key")
            .with_table_location("b.csv");
        assert_eq!(config, RepositoryConfig::new("a.key", "b.csv"));
    }
}
