//! CRUD, query, and statistics handlers for properties (PostgreSQL-backed).

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use crate::properties::{
    CreateProperty, ListPropertiesParams, Property, PropertyQuery, PropertyStatistics,
    PropertyStore, PropertyStoreError, UpdateProperty,
};
use crate::state::AppState;

use super::{error_response, require_pg};

fn store_err(e: PropertyStoreError) -> (StatusCode, Json<Value>) {
    error_response(e.status_code(), e)
}

#[utoipa::path(
    get,
    path = "/api/properties",
    tag = "Properties",
    params(ListPropertiesParams),
    responses(
        (status = 200, description = "Properties matching the optional filters", body = Vec<Property>),
        (status = 503, description = "PostgreSQL not configured", body = super::ErrorResponse)
    )
)]
pub async fn properties_list(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListPropertiesParams>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let pool = require_pg(&state)?;

    // First filter present wins, mirroring one-filter-at-a-time clients.
    let rows = if let Some(city) = params.city.as_deref() {
        PropertyStore::find_by_city(pool, city).await
    } else if let Some(availability) = params.availability {
        PropertyStore::find_available(pool, availability).await
    } else if let Some(source_id) = params.source_id {
        PropertyStore::find_by_source(pool, source_id).await
    } else {
        PropertyStore::list(pool).await
    }
    .map_err(store_err)?;

    Ok(Json(serde_json::to_value(rows).unwrap_or_default()))
}

#[utoipa::path(
    post,
    path = "/api/properties",
    tag = "Properties",
    request_body = CreateProperty,
    responses(
        (status = 201, description = "Property created", body = Property),
        (status = 409, description = "A property with this id already exists", body = super::ErrorResponse)
    )
)]
pub async fn properties_create(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateProperty>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    let pool = require_pg(&state)?;
    let property = PropertyStore::create(pool, req.into())
        .await
        .map_err(store_err)?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::to_value(property).unwrap_or_default()),
    ))
}

#[utoipa::path(
    post,
    path = "/api/properties/query",
    tag = "Properties",
    request_body = PropertyQuery,
    responses(
        (status = 200, description = "Properties matching all provided filters (capped at 100)", body = Vec<Property>),
        (status = 503, description = "PostgreSQL not configured", body = super::ErrorResponse)
    )
)]
pub async fn properties_query(
    State(state): State<Arc<AppState>>,
    Json(filters): Json<PropertyQuery>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let pool = require_pg(&state)?;
    let rows = PropertyStore::query(pool, filters).await.map_err(store_err)?;
    Ok(Json(serde_json::to_value(rows).unwrap_or_default()))
}

#[utoipa::path(
    get,
    path = "/api/properties/statistics",
    tag = "Properties",
    responses(
        (status = 200, description = "Counts and price aggregates over all properties", body = PropertyStatistics),
        (status = 503, description = "PostgreSQL not configured", body = super::ErrorResponse)
    )
)]
pub async fn properties_statistics(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let pool = require_pg(&state)?;
    let stats = PropertyStore::statistics(pool).await.map_err(store_err)?;
    Ok(Json(serde_json::to_value(stats).unwrap_or_default()))
}

#[utoipa::path(
    get,
    path = "/api/properties/{id}",
    tag = "Properties",
    params(
        ("id" = String, Path, description = "External listing ID")
    ),
    responses(
        (status = 200, description = "Property details", body = Property),
        (status = 404, description = "Property not found", body = super::ErrorResponse)
    )
)]
pub async fn properties_get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let pool = require_pg(&state)?;
    let property = PropertyStore::get(pool, &id)
        .await
        .map_err(store_err)?
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": format!("property not found: {}", id) })),
            )
        })?;
    Ok(Json(serde_json::to_value(property).unwrap_or_default()))
}

#[utoipa::path(
    put,
    path = "/api/properties/{id}",
    tag = "Properties",
    params(
        ("id" = String, Path, description = "External listing ID")
    ),
    request_body = UpdateProperty,
    responses(
        (status = 200, description = "Updated property", body = Property),
        (status = 404, description = "Property not found", body = super::ErrorResponse)
    )
)]
pub async fn properties_update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateProperty>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let pool = require_pg(&state)?;
    let property = PropertyStore::update(pool, &id, req)
        .await
        .map_err(store_err)?;
    Ok(Json(serde_json::to_value(property).unwrap_or_default()))
}

#[utoipa::path(
    delete,
    path = "/api/properties/{id}",
    tag = "Properties",
    params(
        ("id" = String, Path, description = "External listing ID")
    ),
    responses(
        (status = 204, description = "Property deleted"),
        (status = 404, description = "Property not found", body = super::ErrorResponse)
    )
)]
pub async fn properties_delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, Json<Value>)> {
    let pool = require_pg(&state)?;
    PropertyStore::delete(pool, &id).await.map_err(store_err)?;
    Ok(StatusCode::NO_CONTENT)
}
