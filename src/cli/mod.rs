pub mod columns;
pub mod import;
pub mod init;
pub mod seed;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::seed::SeedSet;
use crate::settings::{load_settings, CustomerPolicy, Settings};

#[derive(Parser)]
#[command(
    name = "finseed",
    about = "Seed a personal-finance MongoDB database from bank CSV exports and demo fixtures."
)]
pub struct Cli {
    /// Settings file (default: ~/.config/finseed/settings.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Log progress and per-row decisions to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a settings file with defaults and any overrides given.
    Init {
        /// MongoDB connection string
        #[arg(long)]
        uri: Option<String>,
        /// Database to use when the connection string names none
        #[arg(long)]
        database: Option<String>,
    },
    /// Load a bank transaction CSV into the transactions collection.
    Import {
        /// Path to the CSV export
        file: PathBuf,
        /// MongoDB connection string
        #[arg(long, env = "MONGODB_URI", hide_env_values = true)]
        uri: Option<String>,
        /// Target collection (default: transactions)
        #[arg(long)]
        collection: Option<String>,
        /// What to do with customer ids outside the valid pool
        #[arg(long, value_enum)]
        policy: Option<CustomerPolicy>,
    },
    /// Show how a CSV header maps onto transaction fields.
    Columns {
        /// Path to the CSV export
        file: PathBuf,
    },
    /// Insert the demo users, bills, budgets and goals.
    Seed {
        #[arg(value_enum)]
        set: SeedSet,
        /// MongoDB connection string
        #[arg(long, env = "MONGODB_URI", hide_env_values = true)]
        uri: Option<String>,
    },
}

/// Settings from disk with the connection string override applied.
pub(crate) fn settings_with_uri(config: Option<&std::path::Path>, uri: Option<String>) -> crate::error::Result<Settings> {
    let mut settings = load_settings(config)?;
    if let Some(uri) = uri {
        settings.mongodb_uri = uri;
    }
    Ok(settings)
}
