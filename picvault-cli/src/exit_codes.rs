//! Exit codes following sysexits.h conventions.
//!
//! These codes give scripts a stable way to tell a tampered repository from
//! a missing image or a rejected password.

use std::io::ErrorKind;

use picvault_core::VaultError;

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// General error (catch-all).
pub const GENERAL_ERROR: i32 = 1;

/// Command line usage error (invalid arguments or unanswerable prompt).
/// Maps to EX_USAGE from sysexits.h.
pub const USAGE_ERROR: i32 = 64;

/// Data format error (payload failed authentication, malformed table).
/// Maps to EX_DATAERR from sysexits.h.
pub const DATA_ERROR: i32 = 65;

/// Cannot open input (unknown image name, missing source path).
/// Maps to EX_NOINPUT from sysexits.h.
pub const INPUT_ERROR: i32 = 66;

/// Output file already exists and overwriting was not requested.
/// Maps to EX_CANTCREAT from sysexits.h.
pub const CANT_CREATE: i32 = 73;

/// I/O error (key or table unreadable, output not writable).
/// Maps to EX_IOERR from sysexits.h.
pub const IO_ERROR: i32 = 74;

/// Credential rejected.
/// Maps to EX_NOPERM from sysexits.h.
pub const PERMISSION_DENIED: i32 = 77;

/// Represents an exit code with optional error context.
#[derive(Debug)]
pub struct ExitCode {
    pub code: i32,
    pub message: Option<String>,
}

impl ExitCode {
    pub const fn success() -> Self {
        Self {
            code: SUCCESS,
            message: None,
        }
    }

    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        let code = err
            .chain()
            .find_map(|cause| {
                if let Some(vault) = cause.downcast_ref::<VaultError>() {
                    Some(classify(vault))
                } else {
                    cause.downcast_ref::<std::io::Error>().map(classify_io)
                }
            })
            .unwrap_or(GENERAL_ERROR);

        Self {
            code,
            message: Some(format!("{err:#}")),
        }
    }
}

fn classify(err: &VaultError) -> i32 {
    match err {
        VaultError::Integrity(_) | VaultError::Format { .. } => DATA_ERROR,
        VaultError::NotFound(_) => INPUT_ERROR,
        VaultError::Credential(_) => PERMISSION_DENIED,
        VaultError::Validation { .. } | VaultError::Metadata(_) => USAGE_ERROR,
        VaultError::Io { source, .. } => classify_io(source),
        VaultError::Initialization { .. } => IO_ERROR,
    }
}

fn classify_io(err: &std::io::Error) -> i32 {
    match err.kind() {
        ErrorKind::NotFound => INPUT_ERROR,
        ErrorKind::AlreadyExists => CANT_CREATE,
        _ => IO_ERROR,
    }
}
