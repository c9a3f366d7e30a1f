//! OpenAPI documentation aggregator.
//!
//! Collects all `#[utoipa::path]`-annotated handlers and `ToSchema`-derived
//! types into a single OpenAPI spec, served via Scalar UI at `/docs`.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "wohnfeed API",
        version = "0.1.0",
        description = "Periodic ingestion of property listings from remote JSON feeds, normalized through per-source declarative mapping schemas.",
    ),
    tags(
        (name = "Health", description = "Server readiness"),
        (name = "Sources", description = "Data source CRUD and mapping schema management"),
        (name = "Properties", description = "Normalized property CRUD, filtered queries, and statistics"),
        (name = "Ingestion", description = "Manual ingestion cycle trigger"),
    ),
    paths(
        // Health
        crate::api::health::health,
        // Sources
        crate::api::sources::sources_list,
        crate::api::sources::sources_list_active,
        crate::api::sources::sources_create,
        crate::api::sources::sources_get,
        crate::api::sources::sources_update,
        crate::api::sources::sources_delete,
        // Properties
        crate::api::properties::properties_list,
        crate::api::properties::properties_create,
        crate::api::properties::properties_query,
        crate::api::properties::properties_statistics,
        crate::api::properties::properties_get,
        crate::api::properties::properties_update,
        crate::api::properties::properties_delete,
        // Ingestion
        crate::api::ingestion::trigger_ingestion,
    ),
    components(schemas(
        crate::api::ErrorResponse,
        crate::api::health::HealthResponse,
        crate::sources::Source,
        crate::sources::CreateSource,
        crate::sources::UpdateSource,
        crate::properties::Property,
        crate::properties::CreateProperty,
        crate::properties::UpdateProperty,
        crate::properties::PropertyQuery,
        crate::properties::PropertyStatistics,
        crate::ingestion::CycleSummary,
    ))
)]
pub struct ApiDoc;
