//! pecas-api - Inventory parts API backed by spreadsheet worksheets
//!
//! One worksheet per part category; an ephemeral cache in front of the
//! spreadsheet and a heuristic allocator for new identifiers.

pub mod cache;
pub mod cli;
pub mod config;
pub mod http_server;
pub mod inventory;
pub mod observability;
pub mod sheets;
