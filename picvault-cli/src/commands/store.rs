//! Store command implementation.

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;
use picvault_core::{
    image_name, is_supported_extension, Access, BatchReport, CandidateSource,
    DirectoryCandidates, MetadataProvider, RecordStore, RecordTable, RepositoryConfig, Vault,
    VaultError,
};
use tracing::{debug, info};

use crate::prompt::PromptMetadata;

/// Arguments of the store subcommand.
pub struct StoreArgs {
    pub path: PathBuf,
    pub keywords: Option<String>,
    pub features: Option<String>,
    pub public: bool,
    pub private: bool,
    pub password: Option<String>,
    pub dry_run: bool,
}

impl StoreArgs {
    /// Visibility to apply without asking, if the flags settle it.
    ///
    /// Supplying both tag fields on the command line means nothing is asked
    /// at all, so visibility then defaults to private.
    fn fixed_access(&self) -> Option<Access> {
        if self.public {
            Some(Access::Public)
        } else if self.private || (self.keywords.is_some() && self.features.is_some()) {
            Some(Access::Private)
        } else {
            None
        }
    }
}

/// Execute the store command.
pub fn execute(config: &RepositoryConfig, args: StoreArgs, quiet: bool) -> Result<()> {
    if args.dry_run {
        return preview(config, &args.path);
    }

    let mut vault = Vault::open(config.clone()).context("Failed to open repository")?;

    let access = args.fixed_access();
    let stdin = io::stdin();
    let mut metadata = FixedAnswers {
        keywords: args.keywords,
        features: args.features,
        // Prompts share stderr with diagnostics so stdout stays scriptable
        prompt: PromptMetadata::new(stdin.lock(), io::stderr())
            .with_access(access)
            .with_credential(args.password),
    };

    let report = vault
        .store(&args.path, &mut metadata)
        .with_context(|| format!("Failed to store images from {}", args.path.display()))?;

    info!(
        path = %args.path.display(),
        stored = report.stored.len(),
        duplicates = report.duplicates.len(),
        "Store finished"
    );

    print_report(&report, quiet);
    Ok(())
}

/// Tag answers given as flags take precedence over prompting.
struct FixedAnswers<P> {
    keywords: Option<String>,
    features: Option<String>,
    prompt: P,
}

impl<P: MetadataProvider> MetadataProvider for FixedAnswers<P> {
    fn keywords(&mut self, image_name: &str) -> picvault_core::Result<String> {
        match &self.keywords {
            Some(keywords) => Ok(keywords.clone()),
            None => self.prompt.keywords(image_name),
        }
    }

    fn features(&mut self, image_name: &str) -> picvault_core::Result<String> {
        match &self.features {
            Some(features) => Ok(features.clone()),
            None => self.prompt.features(image_name),
        }
    }

    fn access(&mut self, image_name: &str) -> picvault_core::Result<Access> {
        self.prompt.access(image_name)
    }

    fn credential(&mut self, image_name: &str) -> picvault_core::Result<Option<String>> {
        self.prompt.credential(image_name)
    }
}

fn print_report(report: &BatchReport, quiet: bool) {
    for (path, err) in &report.failed {
        eprintln!("{} {}: {}", "Skipped".yellow(), path.display(), err);
    }

    if quiet {
        for name in &report.stored {
            println!("{name}");
        }
        return;
    }

    println!(
        "{} {} stored, {} duplicate, {} unsupported, {} failed",
        "✓".green(),
        report.stored.len().to_string().bold(),
        report.duplicates.len(),
        report.unsupported.len(),
        report.failed.len()
    );
    for name in &report.stored {
        println!("   {} {}", "+".green(), name);
    }
    for name in &report.duplicates {
        println!("   {} {} {}", "=".yellow(), name, "(duplicate image not added)".dimmed());
    }
    for path in &report.unsupported {
        println!("   {} {} {}", "-".dimmed(), path.display(), "(unsupported type)".dimmed());
    }
}

/// List what a store run would do without opening the key or touching the table.
fn preview(config: &RepositoryConfig, path: &Path) -> Result<()> {
    let store = RecordStore::open(config).with_context(|| {
        format!(
            "Failed to read record table: {}",
            config.table_location.display()
        )
    })?;
    let candidates = DirectoryCandidates
        .candidates(path)
        .with_context(|| format!("Failed to read input: {}", path.display()))?;
    debug!(candidates = candidates.len(), "Previewing store");

    println!("{}", "[DRY RUN] No images will be encrypted or stored".yellow().bold());
    println!("   {} {}", "Input:".dimmed(), path.display());
    println!("   {} {}", "Table:".dimmed(), config.table_location.display());
    println!();

    for (candidate, planned) in plan(&store, candidates) {
        let shown = candidate.display();
        match planned {
            Planned::Unsupported => {
                println!("   {} {} {}", "-".dimmed(), shown, "(unsupported type)".dimmed());
            }
            Planned::Duplicate => {
                println!("   {} {} {}", "=".yellow(), shown, "(duplicate, would skip)".dimmed());
            }
            Planned::Store(name) => {
                println!("   {} {} {} {}", "+".green(), shown, "as".dimmed(), name);
            }
            Planned::Fail(err) => {
                println!("   {} {} {}", "!".red(), shown, format!("(would fail: {err})").dimmed());
            }
        }
    }
    Ok(())
}

/// What a store run would do with one candidate.
#[derive(Debug)]
enum Planned {
    Unsupported,
    Duplicate,
    Store(String),
    Fail(VaultError),
}

fn plan<T: RecordTable>(store: &RecordStore<T>, candidates: Vec<PathBuf>) -> Vec<(PathBuf, Planned)> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .map(|candidate| {
            let planned = if !is_supported_extension(&candidate) {
                Planned::Unsupported
            } else {
                match image_name(&candidate) {
                    Ok(name) if store.exists(&name) || !seen.insert(name.clone()) => {
                        Planned::Duplicate
                    }
                    Ok(name) => Planned::Store(name),
                    Err(err) => Planned::Fail(err),
                }
            };
            (candidate, planned)
        })
        .collect()
}
