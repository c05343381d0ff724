mod cli;
mod columns;
mod db;
mod error;
mod importer;
mod models;
mod seed;
mod settings;
mod transformer;
mod writer;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

fn setup_logging(verbose: bool) {
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::WARN };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);
    let config = cli.config.as_deref();

    let result = match cli.command {
        Commands::Init { uri, database } => cli::init::run(config, uri, database),
        Commands::Import {
            file,
            uri,
            collection,
            policy,
        } => cli::import::run(&file, config, uri, collection, policy),
        Commands::Columns { file } => cli::columns::run(&file, config),
        Commands::Seed { set, uri } => cli::seed::run(set, config, uri),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
