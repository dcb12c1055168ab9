//! Common utility functions shared across CLI commands.

use std::path::{Path, PathBuf};

use colored::Colorize;
use picvault_core::{guess_extension, Record, RepositoryConfig};
use serde::Serialize;

/// Build the repository configuration from flags, falling back to the environment.
///
/// `--repo` replaces the environment lookup; `--key` and `--table` then
/// override individual locations.
pub fn resolve_config(
    repo: Option<&Path>,
    key: Option<PathBuf>,
    table: Option<PathBuf>,
) -> RepositoryConfig {
    let mut config = match repo {
        Some(dir) => RepositoryConfig::in_dir(dir),
        None => RepositoryConfig::from_env(),
    };
    if let Some(key) = key {
        config = config.with_key_location(key);
    }
    if let Some(table) = table {
        config = config.with_table_location(table);
    }
    config
}

/// Default output path for an extracted image.
///
/// Transforms `name` into `name.<ext>`, sniffing the extension from the
/// decrypted bytes.
pub fn build_output_path(name: &str, bytes: &[u8]) -> PathBuf {
    PathBuf::from(format!("{}.{}", name, guess_extension(bytes).unwrap_or("bin")))
}

/// Public view of a record for listing and JSON output. Never carries the payload.
#[derive(Debug, Serialize)]
pub struct RecordSummary {
    pub name: String,
    pub keywords: Vec<String>,
    pub features: Vec<String>,
    pub access: String,
    pub protected: bool,
    pub uuid: String,
    pub payload_bytes: usize,
}

impl From<&Record> for RecordSummary {
    fn from(record: &Record) -> Self {
        Self {
            name: record.image_name.clone(),
            keywords: record.image_keywords.tokens().to_vec(),
            features: record.image_features.tokens().to_vec(),
            access: record.image_access.to_string(),
            protected: record.user_pass.is_set(),
            uuid: record.unique_uuid.to_string(),
            payload_bytes: record.image_code.len(),
        }
    }
}

/// Print records as a human-readable block list.
pub fn print_records(records: &[&Record]) {
    for record in records {
        let summary = RecordSummary::from(*record);
        println!("   {}", summary.name.bold());
        println!("      {} {}", "Keywords:".dimmed(), record.image_keywords);
        println!("      {} {}", "Features:".dimmed(), record.image_features);
        let lock = if summary.protected { " (password)" } else { "" };
        println!("      {} {}{}", "Access:".dimmed(), summary.access, lock);
        println!("      {} {}", "UUID:".dimmed(), summary.uuid);
    }
}

/// Print records as a JSON array of summaries.
pub fn print_records_json(records: &[&Record]) -> anyhow::Result<()> {
    let summaries: Vec<RecordSummary> = records.iter().map(|r| RecordSummary::from(*r)).collect();
    println!("{}", serde_json::to_string_pretty(&summaries)?);
    Ok(())
}
