//! CRUD operations for the `sources` PostgreSQL table.
//!
//! [`SourceStore`] is a stateless unit struct with async methods that take
//! a `&PgPool`. The mapping schema is stored as opaque JSONB; its contents
//! are not validated ahead of use.

use sqlx::PgPool;
use tracing::error;
use uuid::Uuid;

use super::types::{CreateSource, Source, UpdateSource};

const SOURCE_COLUMNS: &str =
    "id, name, url, description, active, mapping_schema, created_at, updated_at";

// ── Error type ───────────────────────────────────────────────────────

/// Errors from source store operations.
#[derive(Debug)]
pub enum SourceStoreError {
    NotFound(Uuid),
    DuplicateName(String),
    Database(sqlx::Error),
}

impl std::fmt::Display for SourceStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "source not found: {}", id),
            Self::DuplicateName(name) => write!(
                f,
                "duplicate name '{}': a source with this name already exists",
                name
            ),
            Self::Database(e) => write!(f, "database error: {}", e),
        }
    }
}

impl std::error::Error for SourceStoreError {}

impl From<sqlx::Error> for SourceStoreError {
    fn from(e: sqlx::Error) -> Self {
        Self::Database(e)
    }
}

impl SourceStoreError {
    /// Map to an HTTP status code for API responses.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::DuplicateName(_) => 409,
            Self::Database(_) => 500,
        }
    }
}

// ── Store ────────────────────────────────────────────────────────────

/// Stateless CRUD store for `sources`.
pub struct SourceStore;

impl SourceStore {
    /// Create a new source.
    pub async fn create(pool: &PgPool, req: CreateSource) -> Result<Source, SourceStoreError> {
        let active = req.active.unwrap_or(true);
        let mapping_schema = req
            .mapping_schema
            .unwrap_or_else(|| serde_json::json!({}));

        let result = sqlx::query_as::<_, Source>(
            "INSERT INTO sources (name, url, description, active, mapping_schema)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, name, url, description, active, mapping_schema,
                       created_at, updated_at",
        )
        .bind(&req.name)
        .bind(&req.url)
        .bind(&req.description)
        .bind(active)
        .bind(&mapping_schema)
        .fetch_one(pool)
        .await;

        match result {
            Ok(row) => Ok(row),
            Err(e) => Err(map_unique_violation(e, &req.name)),
        }
    }

    /// List all sources, ordered by creation time (newest first).
    pub async fn list(pool: &PgPool) -> Result<Vec<Source>, SourceStoreError> {
        let rows = sqlx::query_as::<_, Source>(&format!(
            "SELECT {SOURCE_COLUMNS} FROM sources ORDER BY created_at DESC"
        ))
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    /// List only active sources — the registry view the ingestion cycle uses.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<Source>, SourceStoreError> {
        let rows = sqlx::query_as::<_, Source>(&format!(
            "SELECT {SOURCE_COLUMNS} FROM sources WHERE active = true ORDER BY created_at"
        ))
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    /// Get a single source by ID.
    pub async fn get(pool: &PgPool, id: Uuid) -> Result<Option<Source>, SourceStoreError> {
        let row = sqlx::query_as::<_, Source>(&format!(
            "SELECT {SOURCE_COLUMNS} FROM sources WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(row)
    }

    /// Partial update of a source.
    ///
    /// Uses `COALESCE` so only provided fields are changed.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        req: UpdateSource,
    ) -> Result<Source, SourceStoreError> {
        let result = sqlx::query_as::<_, Source>(
            "UPDATE sources SET
                name = COALESCE($2, name),
                url = COALESCE($3, url),
                description = COALESCE($4, description),
                active = COALESCE($5, active),
                mapping_schema = COALESCE($6, mapping_schema),
                updated_at = now()
             WHERE id = $1
             RETURNING id, name, url, description, active, mapping_schema,
                       created_at, updated_at",
        )
        .bind(id)
        .bind(&req.name)
        .bind(&req.url)
        .bind(&req.description)
        .bind(req.active)
        .bind(&req.mapping_schema)
        .fetch_optional(pool)
        .await;

        match result {
            Ok(Some(row)) => Ok(row),
            Ok(None) => Err(SourceStoreError::NotFound(id)),
            Err(e) => Err(update_conflict(e, req.name.as_deref())),
        }
    }

    /// Delete a source by ID.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), SourceStoreError> {
        let result = sqlx::query("DELETE FROM sources WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(SourceStoreError::NotFound(id));
        }

        Ok(())
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

/// Map a PostgreSQL unique violation (23505) to a friendly `DuplicateName` error.
fn map_unique_violation(e: sqlx::Error, name: &str) -> SourceStoreError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.code().as_deref() == Some("23505") {
            return SourceStoreError::DuplicateName(name.to_string());
        }
    }
    error!("source store database error: {}", e);
    SourceStoreError::Database(e)
}

/// Error mapping for `update`: a unique violation can only name a duplicate
/// when the request actually carried a new name. Without one, surface the
/// raw database error instead of a `DuplicateName` with an empty name.
fn update_conflict(e: sqlx::Error, requested_name: Option<&str>) -> SourceStoreError {
    match requested_name {
        Some(name) => map_unique_violation(e, name),
        None => {
            error!("source store database error: {}", e);
            SourceStoreError::Database(e)
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let id = Uuid::new_v4();
        let err = SourceStoreError::NotFound(id);
        assert!(err.to_string().contains(&id.to_string()));
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn test_duplicate_name_error() {
        let err = SourceStoreError::DuplicateName("json-feed".to_string());
        assert!(err.to_string().contains("json-feed"));
        assert_eq!(err.status_code(), 409);
    }

    #[test]
    fn test_database_error_status() {
        let err = SourceStoreError::Database(sqlx::Error::PoolTimedOut);
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_update_conflict_without_name_never_claims_duplicate() {
        let err = update_conflict(sqlx::Error::PoolTimedOut, None);
        assert!(matches!(err, SourceStoreError::Database(_)));
        assert!(!err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_update_conflict_with_name_uses_violation_mapping() {
        // Non-23505 errors keep their database classification either way.
        let err = update_conflict(sqlx::Error::PoolTimedOut, Some("json-feed"));
        assert!(matches!(err, SourceStoreError::Database(_)));
    }
}
