//! HTTP router construction.
//!
//! Assembles all Axum routes, middleware, and OpenAPI docs into a single `Router`.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::api;
use crate::state::AppState;

/// Build the complete application router with all routes and middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    let app = Router::new()
        .route("/health", get(api::health))
        // Sources: /active MUST precede /{id} to avoid "active" being captured
        .route(
            "/api/sources",
            get(api::sources_list).post(api::sources_create),
        )
        .route("/api/sources/active", get(api::sources_list_active))
        .route(
            "/api/sources/{id}",
            get(api::sources_get)
                .put(api::sources_update)
                .delete(api::sources_delete),
        )
        // Properties: query and statistics MUST precede /{id}
        .route(
            "/api/properties",
            get(api::properties_list).post(api::properties_create),
        )
        .route("/api/properties/query", post(api::properties_query))
        .route("/api/properties/statistics", get(api::properties_statistics))
        .route(
            "/api/properties/{id}",
            get(api::properties_get)
                .put(api::properties_update)
                .delete(api::properties_delete),
        )
        // Ingestion
        .route("/api/ingestion/trigger", post(api::trigger_ingestion));

    app.layer(CorsLayer::permissive())
        .with_state(state)
        .merge(Scalar::with_url("/docs", api::doc::ApiDoc::openapi()))
}
