//! Status HTTP Routes
//!
//! Liveness plus a round trip to the spreadsheet.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::inventory::InventoryService;

/// Name reported by `/status`
pub const SERVICE_NAME: &str = "API de Peças";

/// Healthy status response
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub planilha: String,
}

/// Degraded status response
#[derive(Debug, Serialize)]
pub struct DegradedResponse {
    pub status: String,
    pub error: String,
    pub details: String,
}

/// Create status routes
pub fn status_routes(service: Arc<InventoryService>) -> Router {
    Router::new()
        .route("/status", get(status_handler))
        .with_state(service)
}

async fn status_handler(State(service): State<Arc<InventoryService>>) -> Response {
    match service.spreadsheet_title().await {
        Ok(title) => {
            let response = StatusResponse {
                status: "online".to_string(),
                service: SERVICE_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                planilha: title,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => {
            tracing::warn!(error = %err, "status check failed");
            let response = DegradedResponse {
                status: "degraded".to_string(),
                error: "Falha ao acessar a planilha".to_string(),
                details: err.to_string(),
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(response)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_response_serialization() {
        let response = StatusResponse {
            status: "online".to_string(),
            service: SERVICE_NAME.to_string(),
            version: "0.1.0".to_string(),
            planilha: "Estoque".to_string(),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("online"));
        assert!(json.contains("Estoque"));
    }
}
