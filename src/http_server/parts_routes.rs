//! Parts HTTP Routes
//!
//! CRUD endpoints over category worksheets.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::inventory::{InventoryError, InventoryResult, InventoryService, PartPayload};

// ==================
// Request/Response Types
// ==================

#[derive(Debug, Deserialize)]
pub struct ListPartsQuery {
    #[serde(default)]
    pub pagina: Option<String>,
    #[serde(default)]
    pub busca: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub mensagem: String,
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub mensagem: String,
}

impl MessageResponse {
    fn new(mensagem: &str) -> Json<Self> {
        Json(Self {
            mensagem: mensagem.to_string(),
        })
    }
}

// ==================
// Parts Routes
// ==================

/// Create parts routes
pub fn parts_routes(service: Arc<InventoryService>) -> Router {
    Router::new()
        .route("/pecas", get(list_parts_handler).post(create_part_handler))
        .route("/pecas/:id", put(update_part_handler).delete(delete_part_handler))
        .with_state(service)
}

/// Validate a JSON body before anything reaches the store
fn parse_payload(body: Result<Json<Value>, JsonRejection>) -> InventoryResult<PartPayload> {
    let Json(body) = body.map_err(|rejection| {
        tracing::debug!(error = %rejection, "rejected request body");
        InventoryError::InvalidInput("Corpo da requisição ausente ou inválido".to_string())
    })?;
    PartPayload::from_json(body)
}

fn parse_query(
    query: Result<Query<ListPartsQuery>, QueryRejection>,
) -> InventoryResult<ListPartsQuery> {
    let Query(query) = query.map_err(|rejection| {
        tracing::debug!(error = %rejection, "rejected query string");
        InventoryError::InvalidInput("Parâmetros de consulta inválidos".to_string())
    })?;
    Ok(query)
}

// ==================
// Handlers
// ==================

async fn list_parts_handler(
    State(service): State<Arc<InventoryService>>,
    query: Result<Query<ListPartsQuery>, QueryRejection>,
) -> InventoryResult<Json<Value>> {
    let query = parse_query(query)?;
    let listing = service
        .list(query.pagina.as_deref(), query.busca.as_deref())
        .await?;
    Ok(Json(listing))
}

async fn create_part_handler(
    State(service): State<Arc<InventoryService>>,
    body: Result<Json<Value>, JsonRejection>,
) -> InventoryResult<(StatusCode, Json<CreatedResponse>)> {
    let payload = parse_payload(body)?;
    let id = service.create(&payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            mensagem: "Peça adicionada com sucesso".to_string(),
            id,
        }),
    ))
}

async fn update_part_handler(
    State(service): State<Arc<InventoryService>>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> InventoryResult<Json<MessageResponse>> {
    let payload = parse_payload(body)?;
    service.update(&id, &payload).await?;
    Ok(MessageResponse::new("Peça atualizada com sucesso"))
}

async fn delete_part_handler(
    State(service): State<Arc<InventoryService>>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> InventoryResult<Json<MessageResponse>> {
    let payload = parse_payload(body)?;
    service.delete(&id, payload.category()).await?;
    Ok(MessageResponse::new("Peça removida com sucesso"))
}
