//! hashcopy CLI
//!
//! Publishes build assets under content-hashed names and keeps the
//! manifest that maps logical asset paths to published ones.

mod cli;
mod commands;
mod console;
mod error;
mod logging;
mod settings;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use commands::PublishRequest;
use error::{CliError, Result};
use logging::Verbosity;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let verbosity = Verbosity::from_flags(cli.verbose, cli.quiet);
    logging::init(verbosity)
        .map_err(|e| CliError::user(format!("Failed to initialise logging: {e}")))?;
    tracing::debug!(config = %cli.config.display(), "Starting");

    match cli.command {
        Commands::Publish {
            build,
            no_hash,
            json,
            command,
        } => {
            let request = PublishRequest {
                overrides: build,
                no_hash,
                json,
                quiet: verbosity == Verbosity::Quiet,
                command,
            };
            commands::run_publish(&cli.config, &request)
        }
        Commands::Lookup { logical, build } => commands::run_lookup(&cli.config, &logical, &build),
    }
}
