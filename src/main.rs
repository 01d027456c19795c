//! `pecas` entry point
//!
//! Parses arguments, runs the selected command and exits non-zero on failure.

use pecas_api::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
