//! Per-image metadata supplied at ingestion time.

use crate::error::Result;
use crate::record::Access;

/// Supplies tags, visibility and an optional credential for each ingested image.
///
/// Implementations may prompt a human or return fixed values. Tag answers are
/// free-form comma-separated strings; the pipeline does the splitting.
/// `access` must only return once it has a definite answer.
pub trait MetadataProvider {
    fn keywords(&mut self, image_name: &str) -> Result<String>;

    fn features(&mut self, image_name: &str) -> Result<String>;

    fn access(&mut self, image_name: &str) -> Result<Access>;

    /// Optional secret gating later extraction of this image.
    fn credential(&mut self, _image_name: &str) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Same answers for every image.
#[derive(Debug, Clone, Default)]
pub struct StaticMetadata {
    keywords: String,
    features: String,
    access: Access,
    credential: Option<String>,
}

impl StaticMetadata {
    pub fn new(keywords: impl Into<String>, features: impl Into<String>) -> Self {
        Self {
            keywords: keywords.into(),
            features: features.into(),
            ..Self::default()
        }
    }

    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    pub fn with_credential(mut self, secret: impl Into<String>) -> Self {
        self.credential = Some(secret.into());
        self
    }
}

impl MetadataProvider for StaticMetadata {
    fn keywords(&mut self, _image_name: &str) -> Result<String> {
        Ok(self.keywords.clone())
    }

    fn features(&mut self, _image_name: &str) -> Result<String> {
        Ok(self.features.clone())
    }

    fn access(&mut self, _image_name: &str) -> Result<Access> {
        Ok(self.access)
    }

    fn credential(&mut self, _image_name: &str) -> Result<Option<String>> {
        Ok(self.credential.clone())
    }
}
