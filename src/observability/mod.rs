//! Observability for the parts API
//!
//! Structured logging through `tracing`. One log line = one event; the JSON
//! format emits a single object per line with the event's fields.
//!
//! # Usage
//!
//! ```ignore
//! use pecas_api::observability::{init_logging, LogFormat};
//!
//! init_logging(LogFormat::Json);
//! tracing::info!(collection = "freios", id = "4", "part created");
//! ```

mod logger;

pub use logger::{init_logging, LogFormat};
