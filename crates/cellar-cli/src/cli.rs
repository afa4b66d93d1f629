//! CLI argument definitions for the Cellar deploy ingestion core.
//!
//! Uses `clap` derive macros. Each command corresponds to a handler in the
//! [`super::commands`] module.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "cellar",
    version,
    about = "Maven-compatible deploy ingestion core",
    long_about = "Cellar accepts Maven-style HTTP PUT deploys, validates them, and \
                  publishes the resulting release to a blob store, metadata DB, \
                  and search index."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the repository config file (defaults to `~/.cellar/config.toml`)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP deploy ingestion server
    Serve {
        /// Override the configured listen address (e.g. 0.0.0.0:8080)
        #[arg(long)]
        listen: Option<String>,
    },

    /// Load and print the resolved repository configuration
    CheckConfig,
}

pub fn parse() -> Cli {
    Cli::parse()
}
