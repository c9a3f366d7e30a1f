//! HTTP API handlers.

pub mod doc;
pub mod health;
pub mod ingestion;
pub mod properties;
pub mod sources;

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};
use utoipa::ToSchema;

use crate::state::AppState;

pub use health::health;
pub use ingestion::trigger_ingestion;
pub use properties::{
    properties_create, properties_delete, properties_get, properties_list,
    properties_query, properties_statistics, properties_update,
};
pub use sources::{
    sources_create, sources_delete, sources_get, sources_list, sources_list_active,
    sources_update,
};

/// Uniform error body for non-2xx responses.
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Helper: extract pg_pool or return 503.
pub(crate) fn require_pg(state: &AppState) -> Result<&sqlx::PgPool, (StatusCode, Json<Value>)> {
    state.pg_pool.as_ref().ok_or_else(|| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": "PostgreSQL not configured" })),
        )
    })
}

/// Build an error response from any store error exposing a status code.
pub(crate) fn error_response(
    status: u16,
    message: impl std::fmt::Display,
) -> (StatusCode, Json<Value>) {
    (
        StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(json!({ "error": message.to_string() })),
    )
}
