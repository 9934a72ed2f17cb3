//! MaskStore CLI
//!
//! Command-line tools for inspecting and editing a mask store file.
//!
//! # Commands
//!
//! - `inspect` - Display snapshot metadata and load status
//! - `list` / `show` - Display masks
//! - `create` / `update` / `delete` - Edit user masks
//! - `search` - Find masks by name or seed conversation
//! - `migrate` - Upgrade a snapshot written by an older build

mod commands;

use clap::{Parser, Subcommand};
use commands::{OutputFormat, StoreOptions};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// MaskStore command-line tools.
#[derive(Parser)]
#[command(name = "maskstore")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the snapshot file, or a directory holding `mask-store.json`
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// JSON file with the built-in mask catalog
    #[arg(global = true, short, long)]
    catalog: Option<PathBuf>,

    /// Locale for new masks
    #[arg(global = true, long)]
    lang: Option<String>,

    /// Hide built-in masks from listings
    #[arg(global = true, long)]
    hide_builtins: bool,

    /// Write snapshots as indented JSON
    #[arg(global = true, long)]
    pretty: bool,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display snapshot metadata and load status
    Inspect {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// List masks, newest first
    List {
        /// Include the built-in catalog
        #[arg(short, long)]
        builtins: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Show one mask as JSON
    Show {
        /// Mask id (user or built-in)
        id: String,
    },

    /// Create a mask
    Create {
        /// Display name
        #[arg(short, long)]
        name: Option<String>,

        /// Avatar code point
        #[arg(short, long)]
        avatar: Option<String>,

        /// Locale tag, overriding --lang
        #[arg(long = "mask-lang")]
        mask_lang: Option<String>,

        /// Hide the seed conversation
        #[arg(long)]
        hide_context: Option<bool>,

        /// Keep a private model config instead of tracking the global one
        #[arg(long)]
        no_sync_config: bool,
    },

    /// Update a user mask
    Update {
        /// Mask id
        id: String,

        /// New display name
        #[arg(short, long)]
        name: Option<String>,

        /// New avatar code point
        #[arg(short, long)]
        avatar: Option<String>,

        /// New locale tag
        #[arg(long = "mask-lang")]
        mask_lang: Option<String>,

        /// New sampling temperature
        #[arg(short, long)]
        temperature: Option<f64>,
    },

    /// Delete a user mask
    Delete {
        /// Mask id
        id: String,
    },

    /// Search user masks by name and seed conversation
    Search {
        /// Case-insensitive substring
        query: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Upgrade the snapshot to the current schema version
    Migrate {
        /// Show the steps that would run without writing anything
        #[arg(short, long)]
        dry_run: bool,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let options = StoreOptions {
        path: cli.path,
        catalog: cli.catalog,
        lang: cli.lang,
        hide_builtins: cli.hide_builtins,
        pretty: cli.pretty,
    };

    match cli.command {
        Commands::Inspect { format } => commands::inspect::run(&options, format)?,
        Commands::List { builtins, format } => commands::list::run(&options, builtins, format)?,
        Commands::Show { id } => commands::list::show(&options, &id)?,
        Commands::Create {
            name,
            avatar,
            mask_lang,
            hide_context,
            no_sync_config,
        } => {
            let args = commands::create::CreateArgs {
                name,
                avatar,
                lang: mask_lang,
                hide_context,
                sync_global_config: !no_sync_config,
            };
            commands::create::run(&options, args)?;
        }
        Commands::Update {
            id,
            name,
            avatar,
            mask_lang,
            temperature,
        } => {
            let args = commands::update::UpdateArgs {
                name,
                avatar,
                lang: mask_lang,
                temperature,
            };
            commands::update::run(&options, &id, args)?;
        }
        Commands::Delete { id } => commands::delete::run(&options, &id)?,
        Commands::Search { query, format } => commands::search::run(&options, &query, format)?,
        Commands::Migrate { dry_run } => commands::migrate::run(&options, dry_run)?,
        Commands::Version => {
            println!("MaskStore CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("MaskStore Core v{}", maskstore_core::VERSION);
            println!("Snapshot schema v{}", maskstore_core::CURRENT_VERSION);
        }
    }

    Ok(())
}
