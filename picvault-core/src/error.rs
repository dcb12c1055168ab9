use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VaultError {
    /// The key file could not be read, written, or holds the wrong amount of material.
    #[error("Key initialization failed at {}: {reason}", .path.display())]
    Initialization { path: PathBuf, reason: String },

    /// Ciphertext failed authentication (wrong key or altered bytes).
    #[error("Integrity check failed: {0}")]
    Integrity(String),

    #[error("Malformed {context}: {reason}")]
    Format { context: String, reason: String },

    #[error("Invalid value for {field}: {value:?}")]
    Validation { field: &'static str, value: String },

    #[error("Credential rejected for {0}")]
    Credential(String),

    #[error("No record named {0:?}")]
    NotFound(String),

    /// The metadata provider could not supply an answer (e.g. input closed).
    #[error("Metadata provider failed: {0}")]
    Metadata(String),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl VaultError {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn format(context: impl Into<String>, reason: impl ToString) -> Self {
        Self::Format {
            context: context.into(),
            reason: reason.to_string(),
        }
    }

    pub fn initialization(path: impl AsRef<Path>, reason: impl ToString) -> Self {
        Self::Initialization {
            path: path.as_ref().to_path_buf(),
            reason: reason.to_string(),
        }
    }

    /// Errors that only concern a single ingested file.
    ///
    /// A batch records these against the offending path and moves on to the
    /// next candidate; anything else aborts the batch.
    pub fn is_item_scoped(&self) -> bool {
        matches!(self, Self::Format { .. } | Self::Io { .. })
    }
}

pub type Result<T> = std::result::Result<T, VaultError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_path_context() {
        let err = VaultError::io(
            "/tmp/missing.png",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        let message = err.to_string();
        assert!(message.contains("/tmp/missing.png"));
        assert!(message.contains("gone"));
    }

    #[test]
    fn test_item_scoped_classification() {
        assert!(VaultError::format("image", "bad header").is_item_scoped());
        assert!(!VaultError::Integrity("tag mismatch".into()).is_item_scoped());
        assert!(!VaultError::Metadata("stdin closed".into()).is_item_scoped());
        assert!(!VaultError::initialization("key.key", "unwritable").is_item_scoped());
    }
}
