//! CLI argument definitions using clap
//!
//! Commands:
//! - querygate serve --config <path>
//! - querygate schema

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// querygate - A read-only, queryable HTTP API over structured record
/// collections
#[derive(Parser, Debug)]
#[command(name = "querygate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the API server with the sample dataset
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./querygate.json")]
        config: PathBuf,
    },

    /// Print the machine-readable schema description and exit
    Schema,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
