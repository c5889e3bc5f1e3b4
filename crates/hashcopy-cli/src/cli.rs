//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use hashcopy_core::SourcemapMode;

/// hashcopy - Publish build assets under content-hashed names
#[derive(Parser, Debug)]
#[command(name = "hashcopy")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log warnings and errors; no size report
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Configuration file (toml, json or yaml)
    #[arg(short, long, global = true, default_value = "hashcopy.toml")]
    pub config: PathBuf,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Fingerprint and publish configured assets, then update the manifest
    ///
    /// Examples:
    ///   hashcopy publish                         # Assume the build already succeeded
    ///   hashcopy publish --format esm -- npm run build
    ///   hashcopy publish --no-hash --json
    Publish {
        #[command(flatten)]
        build: BuildOverrides,

        /// Publish without a fingerprint in file names
        #[arg(long)]
        no_hash: bool,

        /// Print the pass summary as JSON
        #[arg(long)]
        json: bool,

        /// Build command to run between task resolution and publishing
        #[arg(last = true)]
        command: Vec<String>,
    },

    /// Print the published path of a logical asset from the manifest
    Lookup {
        /// Logical path, e.g. img/logo.png
        logical: String,

        #[command(flatten)]
        build: BuildOverrides,
    },
}

/// Flags that override the configuration file.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOverrides {
    /// Output directory of the build
    #[arg(long)]
    pub outdir: Option<PathBuf>,

    /// Sourcemap mode: false, true, inline, external, linked or both
    #[arg(long)]
    pub sourcemap: Option<SourcemapMode>,

    /// Output format name, e.g. esm
    #[arg(long)]
    pub format: Option<String>,

    /// Manifest path relative to the destination; `{format}` is expanded
    #[arg(long)]
    pub manifest: Option<String>,
}
