//! Picvault Core - encrypted image repository with keyword search
//!
//! This crate stores images as authenticated ciphertext alongside free-text
//! keyword and feature tags, and finds them again by exact tag match.
//!
//! # Features
//!
//! - AES-256-GCM payload encryption under a single persisted repository key
//! - Race-safe key creation and atomic table rewrites
//! - Exact-name deduplication at ingestion time
//! - Case-normalized query terms matched against stored tag tokens
//! - Optional per-record Argon2id access credential
//! - Key material zeroized on drop
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use picvault_core::{QueryTerms, RepositoryConfig, StaticMetadata, TagField, Vault};
//!
//! # fn example() -> picvault_core::Result<()> {
//! let mut vault = Vault::open(RepositoryConfig::in_dir("./repo"))?;
//!
//! // Ingest every supported image in a directory with fixed tags
//! let mut metadata = StaticMetadata::new("dog, park", "brown");
//! let report = vault.store(Path::new("./photos"), &mut metadata)?;
//! println!("stored {} new images", report.stored.len());
//!
//! for record in vault.search(TagField::Keywords, &QueryTerms::parse("Dog")) {
//!     let image = vault.extract(&record.image_name, None)?;
//!     println!("{}: {} bytes", record.image_name, image.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod cipher;
pub mod config;
pub mod error;
pub mod imaging;
pub mod ingest;
pub mod key;
pub mod metadata;
pub mod record;
pub mod search;
pub mod source;
pub mod store;
pub mod table;
pub mod vault;

// Re-export main types for convenience
pub use config::RepositoryConfig;
pub use error::{Result, VaultError};
pub use imaging::{ImageCodec, PassthroughCodec};
pub use ingest::{
    image_name, is_supported_extension, BatchReport, Ingested, Ingestor, SUPPORTED_EXTENSIONS,
};
pub use key::{EncryptionKey, KeyManager, KEY_LEN};
pub use metadata::{MetadataProvider, StaticMetadata};
pub use record::{Access, AccessCredential, Record, TagField, TagList};
pub use search::{search, QueryTerms};
pub use source::{CandidateSource, DirectoryCandidates, ListedCandidates};
pub use store::RecordStore;
pub use table::{CsvTable, MemoryTable, RecordTable};
pub use vault::Vault;

#[cfg(feature = "raster")]
pub use imaging::{guess_extension, RasterCodec};
