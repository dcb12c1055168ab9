//! Enumeration of candidate files for ingestion.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Result, VaultError};

/// Yields the files a batch should consider. Extension filtering is not
/// the source's job; the ingestion pipeline applies its own allow-list.
pub trait CandidateSource {
    fn candidates(&self, root: &Path) -> Result<Vec<PathBuf>>;
}

/// Filesystem source: a file yields itself, a directory yields its
/// immediate, non-hidden files sorted by name. Symlinks to files are
/// listed under the link's own name.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectoryCandidates;

impl CandidateSource for DirectoryCandidates {
    fn candidates(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let metadata = fs::metadata(root).map_err(|e| VaultError::io(root, e))?;
        if metadata.is_file() {
            return Ok(vec![root.to_path_buf()]);
        }

        let mut paths = Vec::new();
        for entry in WalkDir::new(root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(root).to_path_buf();
                VaultError::io(path, e.into())
            })?;

            let hidden = entry.file_name().to_string_lossy().starts_with('.');
            // Links count when they resolve to anything but a directory; a
            // dangling one is kept so it surfaces as a per-file failure.
            let file_type = entry.file_type();
            let listed =
                file_type.is_file() || (file_type.is_symlink() && !entry.path().is_dir());
            if listed && !hidden {
                paths.push(entry.into_path());
            }
        }
        Ok(paths)
    }
}

/// Fixed list of paths, for tests and programmatic callers.
#[derive(Debug, Clone, Default)]
pub struct ListedCandidates(pub Vec<PathBuf>);

impl CandidateSource for ListedCandidates {
    fn candidates(&self, _root: &Path) -> Result<Vec<PathBuf>> {
        Ok(self.0.clone())
    }
}
