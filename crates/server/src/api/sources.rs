//! CRUD handlers for data sources (PostgreSQL-backed).

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::sources::{CreateSource, Source, SourceStore, SourceStoreError, UpdateSource};
use crate::state::AppState;

use super::{error_response, require_pg};

fn store_err(e: SourceStoreError) -> (StatusCode, Json<Value>) {
    error_response(e.status_code(), e)
}

#[utoipa::path(
    get,
    path = "/api/sources",
    tag = "Sources",
    responses(
        (status = 200, description = "All registered sources, newest first", body = Vec<Source>),
        (status = 503, description = "PostgreSQL not configured", body = super::ErrorResponse)
    )
)]
pub async fn sources_list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let pool = require_pg(&state)?;
    let sources = SourceStore::list(pool).await.map_err(store_err)?;
    Ok(Json(serde_json::to_value(sources).unwrap_or_default()))
}

#[utoipa::path(
    get,
    path = "/api/sources/active",
    tag = "Sources",
    responses(
        (status = 200, description = "Only active sources, oldest first", body = Vec<Source>),
        (status = 503, description = "PostgreSQL not configured", body = super::ErrorResponse)
    )
)]
pub async fn sources_list_active(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let pool = require_pg(&state)?;
    let sources = SourceStore::list_active(pool).await.map_err(store_err)?;
    Ok(Json(serde_json::to_value(sources).unwrap_or_default()))
}

#[utoipa::path(
    post,
    path = "/api/sources",
    tag = "Sources",
    request_body = CreateSource,
    responses(
        (status = 201, description = "Source created", body = Source),
        (status = 409, description = "A source with this name already exists", body = super::ErrorResponse)
    )
)]
pub async fn sources_create(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSource>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    let pool = require_pg(&state)?;
    let source = SourceStore::create(pool, req).await.map_err(store_err)?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::to_value(source).unwrap_or_default()),
    ))
}

#[utoipa::path(
    get,
    path = "/api/sources/{id}",
    tag = "Sources",
    params(
        ("id" = Uuid, Path, description = "Source ID")
    ),
    responses(
        (status = 200, description = "Source details", body = Source),
        (status = 404, description = "Source not found", body = super::ErrorResponse)
    )
)]
pub async fn sources_get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let pool = require_pg(&state)?;
    let source = SourceStore::get(pool, id)
        .await
        .map_err(store_err)?
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": format!("source not found: {}", id) })),
            )
        })?;
    Ok(Json(serde_json::to_value(source).unwrap_or_default()))
}

#[utoipa::path(
    put,
    path = "/api/sources/{id}",
    tag = "Sources",
    params(
        ("id" = Uuid, Path, description = "Source ID")
    ),
    request_body = UpdateSource,
    responses(
        (status = 200, description = "Updated source", body = Source),
        (status = 404, description = "Source not found", body = super::ErrorResponse),
        (status = 409, description = "A source with this name already exists", body = super::ErrorResponse)
    )
)]
pub async fn sources_update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateSource>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let pool = require_pg(&state)?;
    let source = SourceStore::update(pool, id, req)
        .await
        .map_err(store_err)?;
    Ok(Json(serde_json::to_value(source).unwrap_or_default()))
}

#[utoipa::path(
    delete,
    path = "/api/sources/{id}",
    tag = "Sources",
    params(
        ("id" = Uuid, Path, description = "Source ID")
    ),
    responses(
        (status = 204, description = "Source deleted"),
        (status = 404, description = "Source not found", body = super::ErrorResponse)
    )
)]
pub async fn sources_delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, Json<Value>)> {
    let pool = require_pg(&state)?;
    SourceStore::delete(pool, id).await.map_err(store_err)?;
    Ok(StatusCode::NO_CONTENT)
}
