//! # HTTP Error Mapping
//!
//! The single place where `InventoryError` becomes a status code and body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::inventory::InventoryError;

const UPSTREAM_MESSAGE: &str = "Erro na API do Google Sheets";
const INTERNAL_MESSAGE: &str = "Erro interno do servidor";

impl InventoryError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            InventoryError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            InventoryError::NotFound(_) => StatusCode::NOT_FOUND,
            InventoryError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            InventoryError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub erro: String,

    /// Upstream HTTP status, only for gateway errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,

    /// Upstream message, only for gateway errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detalhes: Option<String>,
}

impl From<InventoryError> for ErrorResponse {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::InvalidInput(message) | InventoryError::NotFound(message) => Self {
                erro: message,
                status: None,
                detalhes: None,
            },
            InventoryError::Upstream { status, message } => Self {
                erro: UPSTREAM_MESSAGE.to_string(),
                status: Some(status),
                detalhes: Some(message),
            },
            // Detail stays in the server log
            InventoryError::Internal(_) => Self {
                erro: INTERNAL_MESSAGE.to_string(),
                status: None,
                detalhes: None,
            },
        }
    }
}

impl IntoResponse for InventoryError {
    fn into_response(self) -> Response {
        match &self {
            InventoryError::Upstream { status, message } => {
                tracing::warn!(upstream_status = status, error = %message, "upstream failure");
            }
            InventoryError::Internal(message) => {
                tracing::error!(error = %message, "internal failure");
            }
            _ => {}
        }

        let status = self.status_code();
        let body = Json(ErrorResponse::from(self));
        (status, body).into_response()
    }
}
