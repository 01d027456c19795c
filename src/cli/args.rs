//! CLI argument definitions using clap
//!
//! Commands:
//! - pecas serve [--config <path>] [--port <port>] [--in-memory]
//! - pecas status [--config <path>]
//! - pecas next-id <ID>...

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Inventory parts API over spreadsheet worksheets
#[derive(Parser, Debug)]
#[command(name = "pecas")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server
    Serve {
        /// Path to configuration file (optional)
        #[arg(long, default_value = "./pecas.json")]
        config: PathBuf,

        /// Port to listen on, overriding config and environment
        #[arg(long)]
        port: Option<u16>,

        /// Serve from an in-process spreadsheet instead of Google Sheets
        #[arg(long)]
        in_memory: bool,
    },

    /// Check that the spreadsheet is reachable
    Status {
        /// Path to configuration file (optional)
        #[arg(long, default_value = "./pecas.json")]
        config: PathBuf,
    },

    /// Print the identifier that would follow the given ones
    NextId {
        /// Existing identifiers
        ids: Vec<String>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
