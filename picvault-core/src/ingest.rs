//! Ingestion: source image plus metadata in, encrypted record out.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::cipher;
use crate::error::{Result, VaultError};
use crate::imaging::ImageCodec;
use crate::key::EncryptionKey;
use crate::metadata::MetadataProvider;
use crate::record::{AccessCredential, Record, TagList};
use crate::source::CandidateSource;
use crate::store::RecordStore;
use crate::table::RecordTable;

/// Extensions accepted for ingestion. Matching is case-sensitive.
pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["bmp", "jpeg", "jpg", "png", "tiff"];

/// Whether the path's extension is on the allow-list, compared verbatim.
pub fn is_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext))
}

/// Record name for a source file: its base name with the extension stripped.
pub fn image_name(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            VaultError::format(
                format!("file name {}", path.display()),
                "not valid UTF-8 or empty",
            )
        })
}

/// Outcome of ingesting one file.
#[derive(Debug)]
pub enum Ingested {
    /// A new record, ready to append.
    Stored(Record),
    /// A record with this name already exists; nothing was done.
    Duplicate(String),
}

/// Summary of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Names of newly stored records, in ingestion order
    pub stored: Vec<String>,
    /// Names skipped because they were already present
    pub duplicates: Vec<String>,
    /// Candidates whose extension is not on the allow-list
    pub unsupported: Vec<PathBuf>,
    /// Candidates that failed on their own (unreadable or undecodable image)
    pub failed: Vec<(PathBuf, VaultError)>,
}

impl BatchReport {
    /// Total number of candidates the batch looked at.
    pub fn candidates(&self) -> usize {
        self.stored.len() + self.duplicates.len() + self.unsupported.len() + self.failed.len()
    }
}

/// Builds records from source images using the repository key.
pub struct Ingestor<'a, C: ImageCodec + ?Sized> {
    key: &'a EncryptionKey,
    codec: &'a C,
}

impl<'a, C: ImageCodec + ?Sized> Ingestor<'a, C> {
    pub fn new(key: &'a EncryptionKey, codec: &'a C) -> Self {
        Self { key, codec }
    }

    /// Ingest a single file.
    ///
    /// Returns `Ingested::Duplicate` without touching the image or the
    /// provider when the name is already taken. The returned record is not
    /// appended; that is up to the caller.
    pub fn ingest<T: RecordTable>(
        &self,
        store: &RecordStore<T>,
        path: &Path,
        provider: &mut dyn MetadataProvider,
    ) -> Result<Ingested> {
        let name = image_name(path)?;
        if store.exists(&name) {
            info!(name = %name, "Duplicate image not added");
            return Ok(Ingested::Duplicate(name));
        }

        let payload = Zeroizing::new(self.codec.reencode(path)?);
        let image_code = cipher::encrypt(&payload, self.key)?;
        debug!(name = %name, plain = payload.len(), sealed = image_code.len(), "Encrypted payload");

        let image_keywords = TagList::from_input(&provider.keywords(&name)?);
        let image_features = TagList::from_input(&provider.features(&name)?);
        let image_access = provider.access(&name)?;

        let user_pass = match provider.credential(&name)?.map(Zeroizing::new) {
            Some(secret) => AccessCredential::hash(&secret)?,
            None => AccessCredential::Unset,
        };

        Ok(Ingested::Stored(Record {
            image_name: name,
            image_code,
            image_keywords,
            image_features,
            image_access,
            user_pass,
            unique_uuid: Uuid::new_v4(),
        }))
    }

    /// Ingest every supported candidate under `root`, then persist once.
    ///
    /// Unreadable or undecodable images are reported in `failed` and the batch
    /// carries on. Any other error aborts before the table is written, leaving
    /// it exactly as it was.
    pub fn ingest_batch<T: RecordTable>(
        &self,
        store: &mut RecordStore<T>,
        root: &Path,
        source: &dyn CandidateSource,
        provider: &mut dyn MetadataProvider,
    ) -> Result<BatchReport> {
        let mut report = BatchReport::default();

        for path in source.candidates(root)? {
            if !is_supported_extension(&path) {
                debug!(path = %path.display(), "Skipping unsupported extension");
                report.unsupported.push(path);
                continue;
            }

            match self.ingest(store, &path, provider) {
                Ok(Ingested::Stored(record)) => {
                    report.stored.push(record.image_name.clone());
                    store.append(record);
                }
                Ok(Ingested::Duplicate(name)) => report.duplicates.push(name),
                Err(e) if e.is_item_scoped() => {
                    warn!(path = %path.display(), error = %e, "Skipping image");
                    report.failed.push((path, e));
                }
                Err(e) => return Err(e),
            }
        }

        store.persist()?;
        info!(
            stored = report.stored.len(),
            duplicates = report.duplicates.len(),
            unsupported = report.unsupported.len(),
            failed = report.failed.len(),
            "Batch complete"
        );
        Ok(report)
    }
}
