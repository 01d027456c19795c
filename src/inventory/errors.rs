//! # Inventory Errors
//!
//! The closed set of failures a request can end in. Translated into HTTP
//! status codes once, at the HTTP boundary.

use thiserror::Error;

use crate::sheets::SheetsError;

/// Result type for inventory operations
pub type InventoryResult<T> = Result<T, InventoryError>;

/// Inventory operation errors
#[derive(Debug, Clone, Error)]
pub enum InventoryError {
    /// Missing or malformed client input
    #[error("{0}")]
    InvalidInput(String),

    /// Unknown collection or unknown part identifier
    #[error("{0}")]
    NotFound(String),

    /// The spreadsheet service failed; status and message are passed through
    #[error("Upstream error {status}: {message}")]
    Upstream { status: u16, message: String },

    /// Anything else
    #[error("Internal error: {0}")]
    Internal(String),
}

impl InventoryError {
    pub fn page_not_found(page: &str) -> Self {
        InventoryError::NotFound(format!("Página '{}' não encontrada", page))
    }

    pub fn part_not_found(id: &str) -> Self {
        InventoryError::NotFound(format!("Peça com ID '{}' não encontrada", id))
    }
}

impl From<SheetsError> for InventoryError {
    fn from(err: SheetsError) -> Self {
        match err {
            SheetsError::WorksheetNotFound(page) => InventoryError::page_not_found(&page),
            SheetsError::Api { status, message } => InventoryError::Upstream { status, message },
            SheetsError::Transport(message) => InventoryError::Upstream {
                status: 502,
                message,
            },
            other => InventoryError::Internal(other.to_string()),
        }
    }
}
