//! Key lifecycle for the repository's single symmetric key.
//!
//! The key is created once, persisted as raw bytes, and loaded verbatim on
//! every later run. There is no rotation: replacing the key file orphans every
//! payload already stored in the table.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use rand::rngs::OsRng;
use rand::RngCore;
use sha3::{Digest, Sha3_256};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::config::RepositoryConfig;
use crate::error::{Result, VaultError};

/// AES-256-GCM key size in bytes.
pub const KEY_LEN: usize = 32;

/// Symmetric key material, wiped from memory on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EncryptionKey {
    bytes: [u8; KEY_LEN],
}

impl EncryptionKey {
    /// Generate a fresh key from the operating system RNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Wrap existing key material. Returns `None` unless exactly `KEY_LEN` bytes are given.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let bytes: [u8; KEY_LEN] = bytes.try_into().ok()?;
        Some(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }

    /// Short, non-reversible identifier for display (first 8 bytes of SHA3-256).
    pub fn fingerprint(&self) -> String {
        let digest = Sha3_256::digest(self.bytes);
        hex::encode(&digest[..8])
    }
}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Owns the location of the key file and hands out the key.
#[derive(Debug, Clone)]
pub struct KeyManager {
    location: PathBuf,
}

impl KeyManager {
    pub fn new(location: impl Into<PathBuf>) -> Self {
        Self {
            location: location.into(),
        }
    }

    pub fn from_config(config: &RepositoryConfig) -> Self {
        Self::new(&config.key_location)
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Load the key if the file exists, otherwise create and persist a new one.
    ///
    /// Creation is race-safe: the key is written to a temporary file next to
    /// the target and linked into place without clobbering. If another process
    /// created the key first, that key is loaded and returned instead.
    pub fn get_or_create_key(&self) -> Result<EncryptionKey> {
        match self.load() {
            Ok(key) => Ok(key),
            Err(VaultError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
                self.create()
            }
            Err(e) => Err(e),
        }
    }

    /// Read an existing key file. Missing files surface as `VaultError::Io`.
    fn load(&self) -> Result<EncryptionKey> {
        let bytes = match fs::read(&self.location) {
            Ok(bytes) => Zeroizing::new(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(VaultError::io(&self.location, e));
            }
            Err(e) => return Err(VaultError::initialization(&self.location, e)),
        };

        let key = EncryptionKey::from_slice(&bytes).ok_or_else(|| {
            VaultError::initialization(
                &self.location,
                format!("expected {KEY_LEN} bytes of key material, found {}", bytes.len()),
            )
        })?;

        debug!(path = %self.location.display(), fingerprint = %key.fingerprint(), "Loaded encryption key");
        Ok(key)
    }

    fn create(&self) -> Result<EncryptionKey> {
        let dir = match self.location.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|e| VaultError::initialization(&self.location, e))?;

        let key = EncryptionKey::generate();

        // NamedTempFile is created with owner-only permissions on Unix.
        let mut tmp = NamedTempFile::new_in(&dir)
            .map_err(|e| VaultError::initialization(&self.location, e))?;
        tmp.write_all(key.as_bytes())
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| VaultError::initialization(&self.location, e))?;

        match tmp.persist_noclobber(&self.location) {
            Ok(_) => {
                info!(
                    path = %self.location.display(),
                    fingerprint = %key.fingerprint(),
                    "Created new encryption key"
                );
                Ok(key)
            }
            Err(e) if e.error.kind() == ErrorKind::AlreadyExists => {
                warn!(
                    path = %self.location.display(),
                    "Key file appeared during creation, using the existing key"
                );
                self.load()
            }
            Err(e) => Err(VaultError::initialization(&self.location, e.error)),
        }
    }
}
