//! # Spreadsheet Store
//!
//! Access to the remote spreadsheet holding one worksheet per part category.
//! The service talks to a `TabularStore`; `SheetsClient` is the Google Sheets
//! implementation and `InMemoryStore` the local one.

pub mod auth;
pub mod client;
pub mod errors;
pub mod memory;
pub mod store;

pub use auth::{ServiceAccountKey, TokenProvider};
pub use client::{SheetsClient, SheetsClientConfig};
pub use errors::{SheetsError, SheetsResult};
pub use memory::InMemoryStore;
pub use store::{Record, TabularStore, Worksheet};
