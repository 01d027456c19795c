//! # HTTP Server Module
//!
//! Axum server exposing the parts API.
//!
//! # Endpoints
//!
//! - `GET /pecas` - List or search a category
//! - `POST /pecas` - Add a part
//! - `PUT /pecas/:id` - Edit a part
//! - `DELETE /pecas/:id` - Remove a part
//! - `GET /status` - Spreadsheet connectivity

pub mod config;
pub mod errors;
pub mod parts_routes;
pub mod server;
pub mod status_routes;

pub use config::HttpServerConfig;
pub use errors::ErrorResponse;
pub use server::HttpServer;
