//! Search and list command implementations.

use anyhow::{Context, Result};
use clap::ValueEnum;
use colored::Colorize;
use picvault_core::{search, QueryTerms, Record, RecordStore, RepositoryConfig, TagField};
use tracing::debug;

use crate::utils::{print_records, print_records_json};

/// Searchable tag field as named on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SearchField {
    Keywords,
    Features,
}

impl From<SearchField> for TagField {
    fn from(field: SearchField) -> Self {
        match field {
            SearchField::Keywords => TagField::Keywords,
            SearchField::Features => TagField::Features,
        }
    }
}

fn open_store(config: &RepositoryConfig) -> Result<RecordStore> {
    RecordStore::open(config).with_context(|| {
        format!(
            "Failed to read record table: {}",
            config.table_location.display()
        )
    })
}

/// Execute the search command.
pub fn execute(
    config: &RepositoryConfig,
    field: SearchField,
    terms: &str,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let store = open_store(config)?;
    let query = QueryTerms::parse(terms);
    let hits = search(store.records(), field.into(), &query);
    debug!(terms = ?query.terms(), hits = hits.len(), "Searched {:?}", field);

    if query.is_empty() && !json && !quiet {
        eprintln!("{}", "No search terms given".yellow());
    }
    show(&hits, json, quiet, "No images matched")
}

/// Execute the list command.
pub fn list(config: &RepositoryConfig, json: bool, quiet: bool) -> Result<()> {
    let store = open_store(config)?;
    let all: Vec<&Record> = store.records().iter().collect();
    show(&all, json, quiet, "Repository is empty")
}

fn show(records: &[&Record], json: bool, quiet: bool, empty_message: &str) -> Result<()> {
    if json {
        return print_records_json(records);
    }
    if quiet {
        for record in records {
            println!("{}", record.image_name);
        }
        return Ok(());
    }
    if records.is_empty() {
        println!("{}", empty_message.dimmed());
        return Ok(());
    }

    println!("{} {} image(s)", "Found".green(), records.len().to_string().bold());
    print_records(records);
    Ok(())
}
