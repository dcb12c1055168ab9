//! Init command implementation.

use anyhow::{Context, Result};
use colored::Colorize;
use picvault_core::{KeyManager, RecordStore, RepositoryConfig};
use tracing::info;

/// Execute the init command.
pub fn execute(config: &RepositoryConfig, quiet: bool) -> Result<()> {
    let existed = config.key_location.exists();

    let key = KeyManager::from_config(config)
        .get_or_create_key()
        .with_context(|| {
            format!(
                "Failed to initialize key: {}",
                config.key_location.display()
            )
        })?;
    let store = RecordStore::open(config).with_context(|| {
        format!(
            "Failed to read record table: {}",
            config.table_location.display()
        )
    })?;

    info!(
        key = %config.key_location.display(),
        created = !existed,
        records = store.len(),
        "Repository ready"
    );

    if quiet {
        println!("{}", key.fingerprint());
        return Ok(());
    }

    let status = if existed {
        "Loaded existing key".green()
    } else {
        "Created new key".green().bold()
    };
    println!("{} {}", "✓".green(), status);
    println!("   {} {}", "Key file:".dimmed(), config.key_location.display());
    println!("   {} {}", "Fingerprint:".dimmed(), key.fingerprint());
    println!(
        "   {} {} ({} records)",
        "Table:".dimmed(),
        config.table_location.display(),
        store.len()
    );
    Ok(())
}
