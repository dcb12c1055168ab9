//! A repository opened from its configuration: key, records and codec together.

use std::path::Path;

use tracing::{debug, info};

use crate::cipher;
use crate::config::RepositoryConfig;
use crate::error::{Result, VaultError};
use crate::imaging::ImageCodec;
use crate::ingest::{BatchReport, Ingestor};
use crate::key::{EncryptionKey, KeyManager};
use crate::metadata::MetadataProvider;
use crate::record::{Record, TagField};
use crate::search::{self, QueryTerms};
use crate::source::{CandidateSource, DirectoryCandidates};
use crate::store::RecordStore;

#[cfg(feature = "raster")]
use crate::imaging::RasterCodec;

pub struct Vault<C: ImageCodec> {
    config: RepositoryConfig,
    key: EncryptionKey,
    store: RecordStore,
    codec: C,
}

#[cfg(feature = "raster")]
impl Vault<RasterCodec> {
    /// Open a repository, creating its key on first use.
    pub fn open(config: RepositoryConfig) -> Result<Self> {
        Self::open_with_codec(config, RasterCodec)
    }
}

impl<C: ImageCodec> Vault<C> {
    pub fn open_with_codec(config: RepositoryConfig, codec: C) -> Result<Self> {
        let key = KeyManager::from_config(&config).get_or_create_key()?;
        let store = RecordStore::open(&config)?;
        info!(
            table = %config.table_location.display(),
            records = store.len(),
            fingerprint = %key.fingerprint(),
            "Opened repository"
        );
        Ok(Self {
            config,
            key,
            store,
            codec,
        })
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    pub fn key_fingerprint(&self) -> String {
        self.key.fingerprint()
    }

    pub fn records(&self) -> &[Record] {
        self.store.records()
    }

    /// Ingest a file or every supported file in a directory.
    pub fn store(&mut self, path: &Path, provider: &mut dyn MetadataProvider) -> Result<BatchReport> {
        self.store_from(path, &DirectoryCandidates, provider)
    }

    pub fn store_from(
        &mut self,
        path: &Path,
        source: &dyn CandidateSource,
        provider: &mut dyn MetadataProvider,
    ) -> Result<BatchReport> {
        Ingestor::new(&self.key, &self.codec).ingest_batch(&mut self.store, path, source, provider)
    }

    pub fn search(&self, field: TagField, query: &QueryTerms) -> Vec<&Record> {
        let hits = search::search(self.store.records(), field, query);
        debug!(field = field.column(), terms = ?query.terms(), hits = hits.len(), "Search");
        hits
    }

    /// Decrypt the stored payload of a record after checking its credential.
    pub fn extract(&self, name: &str, secret: Option<&str>) -> Result<Vec<u8>> {
        let record = self
            .store
            .get(name)
            .ok_or_else(|| VaultError::NotFound(name.to_string()))?;
        record.check_credential(secret)?;
        cipher::decrypt(&record.image_code, &self.key)
    }
}
