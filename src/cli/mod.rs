//! Command-line interface for the parts API
//!
//! - serve: Boot the HTTP server
//! - status: Check access to the spreadsheet
//! - next-id: Run the identifier allocator over a list of ids

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{build_store, next_id, run, run_command, serve, status, IN_MEMORY_TITLE};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::write_response;
