//! Extract command implementation.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;
use picvault_core::{RepositoryConfig, Vault};
use tracing::info;

use crate::utils::build_output_path;

/// Execute the extract command.
pub fn execute(
    config: &RepositoryConfig,
    name: &str,
    output: Option<PathBuf>,
    force: bool,
    password: Option<String>,
    quiet: bool,
) -> Result<()> {
    let vault = Vault::open(config.clone()).context("Failed to open repository")?;

    let bytes = vault
        .extract(name, password.as_deref())
        .with_context(|| format!("Failed to extract {name:?}"))?;

    // An explicit --output is taken as consent to replace that file
    let overwrite = force || output.is_some();
    let path = output.unwrap_or_else(|| build_output_path(name, &bytes));
    write_image(&path, &bytes, overwrite).with_context(|| {
        if overwrite {
            format!("Failed to write image: {}", path.display())
        } else {
            format!(
                "Failed to write image: {} (use --force or --output to replace it)",
                path.display()
            )
        }
    })?;

    info!(name = %name, path = %path.display(), bytes = bytes.len(), "Extracted image");

    if quiet {
        println!("{}", path.display());
    } else {
        println!("{} {}", "✓".green(), "Image decrypted".green().bold());
        println!("   {} {}", "Name:".dimmed(), name);
        println!("   {} {}", "Written to:".dimmed(), path.display());
        println!("   {} {}", "Size:".dimmed(), format!("{} bytes", bytes.len()));
    }
    Ok(())
}

fn write_image(path: &Path, bytes: &[u8], overwrite: bool) -> io::Result<()> {
    let mut file = if overwrite {
        File::create(path)?
    } else {
        OpenOptions::new().write(true).create_new(true).open(path)?
    };
    file.write_all(bytes)?;
    file.sync_all()
}
