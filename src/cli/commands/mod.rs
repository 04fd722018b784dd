//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod index;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use vsbridge::config::{load_settings_with_options, LoadOptions};
use vsbridge::IndexRequest;

#[derive(Parser)]
#[command(name = "vsbridge")]
#[command(about = "Export CoreShop catalog objects into Vue Storefront indexes")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Resolve relative paths from current working directory instead of config file location
    #[arg(long, global = true)]
    cwd: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Indexing objects of given type in vuestorefront
    #[command(name = "vsbridge:index-objects", visible_alias = "index-objects")]
    IndexObjects {
        /// Site to index
        site: Option<String>,
        /// Object types to index
        #[arg(value_name = "TYPE")]
        object_type: Option<String>,
        /// Language to index
        language: Option<String>,
        /// Site store to index
        store: Option<String>,
        /// Fetch objects updated in the relative timeframe ("-5minute", "-2hour", "-1day", "yesterday" etc)
        #[arg(
            short = 's',
            long = "updated-since",
            value_name = "EXPR",
            allow_hyphen_values = true
        )]
        updated_since: Option<String>,
    },
}

pub async fn run() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
        use_cwd: cli.cwd,
    };
    let (settings, _config) = load_settings_with_options(options).await?;

    match cli.command {
        Commands::IndexObjects {
            site,
            object_type,
            language,
            store,
            updated_since,
        } => {
            let request = IndexRequest {
                site,
                object_type,
                language,
                store,
                updated_since,
            };
            index::cmd_index_objects(&settings, &request).await
        }
    }
}
