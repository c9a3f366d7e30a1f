//! Row and request types for the source registry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use wohnfeed_core::MappingSchema;

/// Row from the `sources` table.
///
/// `mapping_schema` is stored as raw JSONB and parsed into a typed
/// [`MappingSchema`] only when a cycle actually uses it — a malformed
/// schema fails that source's ingestion task, never the CRUD surface.
#[derive(Debug, Clone, Serialize, ToSchema, sqlx::FromRow)]
pub struct Source {
    pub id: Uuid,
    pub name: String,
    pub url: String,
    pub description: Option<String>,
    pub active: bool,
    #[schema(value_type = Object)]
    pub mapping_schema: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Source {
    /// Deserialize the stored `mapping_schema` into a typed [`MappingSchema`].
    pub fn mapping_schema(&self) -> Result<MappingSchema, serde_json::Error> {
        MappingSchema::from_value(&self.mapping_schema)
    }
}

/// Request body for creating a source.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSource {
    pub name: String,
    pub url: String,
    pub description: Option<String>,
    /// Defaults to `true` if not provided.
    pub active: Option<bool>,
    /// Map of target path → source path, both dot-delimited.
    /// Defaults to `{}` if not provided.
    #[schema(value_type = Object)]
    pub mapping_schema: Option<serde_json::Value>,
}

/// Request body for updating a source (all fields optional).
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSource {
    pub name: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub active: Option<bool>,
    #[schema(value_type = Object)]
    pub mapping_schema: Option<serde_json::Value>,
}
