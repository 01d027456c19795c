//! # Sheets Errors
//!
//! Error types for the tabular store layer.

use thiserror::Error;

/// Result type for store operations
pub type SheetsResult<T> = Result<T, SheetsError>;

/// Tabular store errors
#[derive(Debug, Clone, Error)]
pub enum SheetsError {
    // ==================
    // Lookup Errors
    // ==================
    /// No worksheet with this title exists in the spreadsheet
    #[error("Worksheet not found: {0}")]
    WorksheetNotFound(String),

    // ==================
    // Upstream Errors
    // ==================
    /// The remote API answered with a non-success status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// The request never produced a response (connect, timeout, TLS)
    #[error("Transport error: {0}")]
    Transport(String),

    // ==================
    // Local Errors
    // ==================
    /// Service-account credentials could not be loaded
    #[error("Invalid credentials: {0}")]
    Credentials(String),

    /// Access token could not be obtained
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The API answered with a body we cannot interpret
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for SheetsError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SheetsError::InvalidResponse(err.to_string())
        } else {
            SheetsError::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_status() {
        let err = SheetsError::Api {
            status: 503,
            message: "backend unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "API error 503: backend unavailable");
    }
}
