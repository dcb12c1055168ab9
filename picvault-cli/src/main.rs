//! Picvault CLI - encrypted image repository with keyword search.

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

mod commands;
mod exit_codes;
mod prompt;
mod utils;

use commands::search::SearchField;
use commands::store::StoreArgs;
use exit_codes::ExitCode;

const EXIT_CODES_HELP: &str = "\
Exit codes:
  0   Success
  1   General error
  64  Usage error (bad arguments, no answer to a prompt)
  65  Data error (payload failed authentication, malformed table)
  66  Input not found (unknown image name, missing source path)
  73  Output exists (extract without --output or --force)
  74  I/O error (key or table unreadable or unwritable)
  77  Permission denied (wrong or missing password)";

#[derive(Parser)]
#[command(name = "picvault")]
#[command(author, version, about = "Encrypted image repository with keyword search", long_about = None)]
#[command(after_help = EXIT_CODES_HELP)]
struct Cli {
    /// Repository directory holding key.key and data.csv
    #[arg(long, global = true, value_name = "DIR")]
    repo: Option<PathBuf>,

    /// Key file location (overrides --repo and PICVAULT_KEY_PATH)
    #[arg(long, global = true, value_name = "FILE")]
    key: Option<PathBuf>,

    /// Record table location (overrides --repo and PICVAULT_TABLE_PATH)
    #[arg(long, global = true, value_name = "FILE")]
    table: Option<PathBuf>,

    /// Only print essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// When to use colored output
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    color: ColorChoice,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum ColorChoice {
    Auto,
    Always,
    Never,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the repository key (or load it) and show its fingerprint
    Init,

    /// Encrypt and store an image, or every supported image in a directory
    Store {
        /// Image file or directory of images
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Keywords for every stored image (comma-separated); prompts if omitted
        #[arg(short, long)]
        keywords: Option<String>,

        /// Features for every stored image (comma-separated); prompts if omitted
        #[arg(short, long)]
        features: Option<String>,

        /// Mark stored images public
        #[arg(long, conflicts_with = "private")]
        public: bool,

        /// Mark stored images private
        #[arg(long)]
        private: bool,

        /// Require this password to extract the stored images
        #[arg(long)]
        password: Option<String>,

        /// Show what would be stored without encrypting or writing anything
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// Find images whose keywords or features contain any of the terms
    Search {
        /// Field to search
        #[arg(value_enum)]
        field: SearchField,

        /// Comma-separated search terms (case-insensitive)
        #[arg(value_name = "TERMS")]
        terms: String,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// List every stored image
    List {
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Decrypt a stored image to a file
    Extract {
        /// Name of the stored image
        #[arg(value_name = "NAME")]
        name: String,

        /// Output path (defaults to <NAME>.<detected extension>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite the default output file if it already exists
        #[arg(long)]
        force: bool,

        /// Password, if the image was stored with one
        #[arg(long)]
        password: Option<String>,
    },
}

fn init_tracing(verbose: u8, quiet: bool) {
    let default = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "picvault=debug,picvault_core=debug",
        (false, _) => "picvault=trace,picvault_core=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = utils::resolve_config(cli.repo.as_deref(), cli.key, cli.table);
    let quiet = cli.quiet;

    match cli.command {
        Commands::Init => commands::init::execute(&config, quiet),
        Commands::Store {
            path,
            keywords,
            features,
            public,
            private,
            password,
            dry_run,
        } => {
            let args = StoreArgs {
                path,
                keywords,
                features,
                public,
                private,
                password,
                dry_run,
            };
            commands::store::execute(&config, args, quiet)
        }
        Commands::Search { field, terms, json } => {
            commands::search::execute(&config, field, &terms, json, quiet)
        }
        Commands::List { json } => commands::search::list(&config, json, quiet),
        Commands::Extract {
            name,
            output,
            force,
            password,
        } => commands::extract::execute(&config, &name, output, force, password, quiet),
    }
}

fn main() {
    let cli = Cli::parse();

    match cli.color {
        ColorChoice::Always => colored::control::set_override(true),
        ColorChoice::Never => colored::control::set_override(false),
        ColorChoice::Auto => {}
    }
    init_tracing(cli.verbose, cli.quiet);

    let exit = match run(cli) {
        Ok(()) => ExitCode::success(),
        Err(err) => {
            let exit = ExitCode::from_anyhow(&err);
            if let Some(message) = &exit.message {
                eprintln!("{} {}", "Error:".red().bold(), message);
            }
            exit
        }
    };
    std::process::exit(exit.code);
}
