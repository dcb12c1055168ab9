//! The catalogued image record and its field types.

use std::fmt;
use std::str::FromStr;

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::rngs::OsRng;
use rand::RngCore;
use uuid::Uuid;

use crate::error::{Result, VaultError};

/// Delimiter between tokens in a serialized tag field.
pub const TAG_DELIMITER: char = ',';

/// Ordered tokens of a keyword or feature field.
///
/// Tokens are kept as entered: trimmed, never lower-cased or deduplicated,
/// and empty tokens survive (an empty answer is a single empty token).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagList(Vec<String>);

impl TagList {
    /// Build from free-form user input: split on the delimiter and trim each element.
    pub fn from_input(raw: &str) -> Self {
        Self(
            raw.split(TAG_DELIMITER)
                .map(|token| token.trim().to_string())
                .collect(),
        )
    }

    /// Recover tokens from a stored field, split verbatim.
    pub fn from_field(field: &str) -> Self {
        Self(field.split(TAG_DELIMITER).map(str::to_string).collect())
    }

    pub fn to_field(&self) -> String {
        self.0.join(&TAG_DELIMITER.to_string())
    }

    pub fn tokens(&self) -> &[String] {
        &self.0
    }

    /// Exact, case-sensitive token membership.
    pub fn contains(&self, token: &str) -> bool {
        self.0.iter().any(|t| t == token)
    }
}

impl fmt::Display for TagList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_field())
    }
}

/// Visibility of a stored image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Access {
    Public,
    #[default]
    Private,
}

impl Access {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Access {
    type Err = VaultError;

    /// Only the exact strings `public` and `private` are accepted.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "public" => Ok(Self::Public),
            "private" => Ok(Self::Private),
            other => Err(VaultError::Validation {
                field: "image_access",
                value: other.to_string(),
            }),
        }
    }
}

/// Per-record access credential.
///
/// Either no credential at all, or an Argon2id hash (PHC string) of a secret
/// supplied at ingestion time. The secret itself is never stored.
#[derive(Clone, PartialEq, Eq)]
pub enum AccessCredential {
    Unset,
    Hashed(String),
}

impl AccessCredential {
    /// Stored column value for records without a credential.
    pub const UNSET_MARKER: &'static str = "unset";

    /// Hash a secret with a random salt.
    pub fn hash(secret: &str) -> Result<Self> {
        let mut salt = [0u8; 16];
        OsRng.fill_bytes(&mut salt);
        let salt = SaltString::encode_b64(&salt)
            .map_err(|e| VaultError::format("credential salt", e))?;

        let phc = Argon2::default()
            .hash_password(secret.as_bytes(), &salt)
            .map_err(|e| VaultError::format("credential", e))?
            .to_string();

        Ok(Self::Hashed(phc))
    }

    pub fn is_set(&self) -> bool {
        matches!(self, Self::Hashed(_))
    }

    /// Check a presented secret. Unset credentials accept anything.
    pub fn verify(&self, secret: Option<&str>) -> bool {
        match self {
            Self::Unset => true,
            Self::Hashed(phc) => {
                let Some(secret) = secret else {
                    return false;
                };
                match PasswordHash::new(phc) {
                    Ok(parsed) => Argon2::default()
                        .verify_password(secret.as_bytes(), &parsed)
                        .is_ok(),
                    Err(_) => false,
                }
            }
        }
    }

    pub fn to_field(&self) -> String {
        match self {
            Self::Unset => Self::UNSET_MARKER.to_string(),
            Self::Hashed(phc) => phc.clone(),
        }
    }

    pub fn from_field(field: &str) -> Result<Self> {
        if field == Self::UNSET_MARKER {
            return Ok(Self::Unset);
        }
        PasswordHash::new(field).map_err(|e| VaultError::format("user_pass", e))?;
        Ok(Self::Hashed(field.to_string()))
    }
}

impl fmt::Debug for AccessCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset => f.write_str("Unset"),
            Self::Hashed(_) => f.write_str("Hashed([REDACTED])"),
        }
    }
}

/// Which tag field a search targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagField {
    Keywords,
    Features,
}

impl TagField {
    /// Column name in the record table.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Keywords => "image_keywords",
            Self::Features => "image_features",
        }
    }
}

/// One catalogued image.
///
/// Created once at ingestion time and never updated afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct Record {
    /// Source file base name without extension; unique across the store
    pub image_name: String,
    /// AES-256-GCM ciphertext of the re-encoded image
    pub image_code: Vec<u8>,
    pub image_keywords: TagList,
    pub image_features: TagList,
    pub image_access: Access,
    pub user_pass: AccessCredential,
    /// Random v4 identifier, stable primary key candidate
    pub unique_uuid: Uuid,
}

impl Record {
    pub fn tags(&self, field: TagField) -> &TagList {
        match field {
            TagField::Keywords => &self.image_keywords,
            TagField::Features => &self.image_features,
        }
    }

    /// Gate access to the payload on the record's credential.
    pub fn check_credential(&self, secret: Option<&str>) -> Result<()> {
        if self.user_pass.verify(secret) {
            Ok(())
        } else {
            Err(VaultError::Credential(self.image_name.clone()))
        }
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("image_name", &self.image_name)
            .field("image_code", &format_args!("<{} bytes>", self.image_code.len()))
            .field("image_keywords", &self.image_keywords.to_field())
            .field("image_features", &self.image_features.to_field())
            .field("image_access", &self.image_access)
            .field("user_pass", &self.user_pass)
            .field("unique_uuid", &self.unique_uuid)
            .finish()
    }
}
