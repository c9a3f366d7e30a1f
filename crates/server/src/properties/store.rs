//! CRUD and query operations for the `properties` PostgreSQL table.
//!
//! No upsert anywhere: a conflicting listing id is a failure, not an
//! update. Whether re-ingestion should update instead is an open product
//! question; until decided, conflicts surface as `DuplicateId`.

use sqlx::PgPool;
use tracing::error;
use uuid::Uuid;

use super::types::{
    NewProperty, Property, PropertyQuery, PropertyStatistics, UpdateProperty,
};

const PROPERTY_COLUMNS: &str =
    "id, source_id, city, availability, price, raw_data, created_at, updated_at";

/// Result cap for the flexible query endpoint.
const QUERY_LIMIT: i64 = 100;

// ── Error type ───────────────────────────────────────────────────────

/// Errors from property store operations.
#[derive(Debug)]
pub enum PropertyStoreError {
    NotFound(String),
    DuplicateId(String),
    /// The record could not be shaped into the persisted column set.
    Malformed(String),
    Database(sqlx::Error),
}

impl std::fmt::Display for PropertyStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "property not found: {}", id),
            Self::DuplicateId(id) => write!(
                f,
                "duplicate id '{}': a property with this id already exists",
                id
            ),
            Self::Malformed(cause) => write!(f, "malformed property record: {}", cause),
            Self::Database(e) => write!(f, "database error: {}", e),
        }
    }
}

impl std::error::Error for PropertyStoreError {}

impl From<sqlx::Error> for PropertyStoreError {
    fn from(e: sqlx::Error) -> Self {
        Self::Database(e)
    }
}

impl PropertyStoreError {
    /// Map to an HTTP status code for API responses.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::DuplicateId(_) => 409,
            Self::Malformed(_) => 400,
            Self::Database(_) => 500,
        }
    }
}

// ── Store ────────────────────────────────────────────────────────────

/// Stateless CRUD/query store for `properties`.
pub struct PropertyStore;

impl PropertyStore {
    /// Persist a new property record. A unique violation on the listing id
    /// is a `DuplicateId` failure — never an update.
    pub async fn create(
        pool: &PgPool,
        record: NewProperty,
    ) -> Result<Property, PropertyStoreError> {
        let result = sqlx::query_as::<_, Property>(
            "INSERT INTO properties (id, source_id, city, availability, price, raw_data)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id, source_id, city, availability, price, raw_data,
                       created_at, updated_at",
        )
        .bind(&record.id)
        .bind(record.source_id)
        .bind(&record.city)
        .bind(record.availability)
        .bind(record.price)
        .bind(&record.raw_data)
        .fetch_one(pool)
        .await;

        match result {
            Ok(row) => Ok(row),
            Err(e) => Err(map_unique_violation(e, &record.id)),
        }
    }

    /// List all properties, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Property>, PropertyStoreError> {
        let rows = sqlx::query_as::<_, Property>(&format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties ORDER BY created_at DESC"
        ))
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    /// Get a single property by its external listing id.
    pub async fn get(pool: &PgPool, id: &str) -> Result<Option<Property>, PropertyStoreError> {
        let row = sqlx::query_as::<_, Property>(&format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(row)
    }

    /// Case-insensitive city substring match.
    pub async fn find_by_city(
        pool: &PgPool,
        city: &str,
    ) -> Result<Vec<Property>, PropertyStoreError> {
        let rows = sqlx::query_as::<_, Property>(&format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties
             WHERE city ILIKE '%' || $1 || '%'
             ORDER BY created_at DESC"
        ))
        .bind(city)
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    pub async fn find_available(
        pool: &PgPool,
        availability: bool,
    ) -> Result<Vec<Property>, PropertyStoreError> {
        let rows = sqlx::query_as::<_, Property>(&format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties
             WHERE availability = $1
             ORDER BY created_at DESC"
        ))
        .bind(availability)
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    pub async fn find_by_source(
        pool: &PgPool,
        source_id: Uuid,
    ) -> Result<Vec<Property>, PropertyStoreError> {
        let rows = sqlx::query_as::<_, Property>(&format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties
             WHERE source_id = $1
             ORDER BY created_at DESC"
        ))
        .bind(source_id)
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    /// Partial update of a property.
    pub async fn update(
        pool: &PgPool,
        id: &str,
        req: UpdateProperty,
    ) -> Result<Property, PropertyStoreError> {
        let row = sqlx::query_as::<_, Property>(
            "UPDATE properties SET
                source_id = COALESCE($2, source_id),
                city = COALESCE($3, city),
                availability = COALESCE($4, availability),
                price = COALESCE($5, price),
                raw_data = COALESCE($6, raw_data),
                updated_at = now()
             WHERE id = $1
             RETURNING id, source_id, city, availability, price, raw_data,
                       created_at, updated_at",
        )
        .bind(id)
        .bind(req.source_id)
        .bind(&req.city)
        .bind(req.availability)
        .bind(req.price)
        .bind(&req.raw_data)
        .fetch_optional(pool)
        .await?;

        row.ok_or_else(|| PropertyStoreError::NotFound(id.to_string()))
    }

    /// Delete a property by its external listing id.
    pub async fn delete(pool: &PgPool, id: &str) -> Result<(), PropertyStoreError> {
        let result = sqlx::query("DELETE FROM properties WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(PropertyStoreError::NotFound(id.to_string()));
        }

        Ok(())
    }

    /// Flexible filtered query, capped at [`QUERY_LIMIT`] rows.
    pub async fn query(
        pool: &PgPool,
        filters: PropertyQuery,
    ) -> Result<Vec<Property>, PropertyStoreError> {
        let rows = sqlx::query_as::<_, Property>(&format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties
             WHERE ($1::text IS NULL OR id = $1)
               AND ($2::uuid IS NULL OR source_id = $2)
               AND ($3::text IS NULL OR city ILIKE '%' || $3 || '%')
               AND ($4::boolean IS NULL OR availability = $4)
               AND ($5::double precision IS NULL OR price >= $5)
               AND ($6::double precision IS NULL OR price <= $6)
             ORDER BY created_at DESC
             LIMIT {QUERY_LIMIT}"
        ))
        .bind(&filters.id)
        .bind(filters.source_id)
        .bind(&filters.city)
        .bind(filters.availability)
        .bind(filters.min_price)
        .bind(filters.max_price)
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    /// Aggregate counts and pricing statistics.
    pub async fn statistics(pool: &PgPool) -> Result<PropertyStatistics, PropertyStoreError> {
        let (total, available, unavailable, average_price, min_price, max_price) =
            sqlx::query_as::<_, (i64, i64, i64, Option<f64>, Option<f64>, Option<f64>)>(
                "SELECT COUNT(*),
                        COUNT(*) FILTER (WHERE availability),
                        COUNT(*) FILTER (WHERE NOT availability),
                        AVG(price), MIN(price), MAX(price)
                 FROM properties",
            )
            .fetch_one(pool)
            .await?;

        Ok(PropertyStatistics {
            total,
            available,
            unavailable,
            average_price,
            min_price,
            max_price,
        })
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

/// Map a PostgreSQL unique violation (23505) to a friendly `DuplicateId` error.
fn map_unique_violation(e: sqlx::Error, id: &str) -> PropertyStoreError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.code().as_deref() == Some("23505") {
            return PropertyStoreError::DuplicateId(id.to_string());
        }
    }
    error!("property store database error: {}", e);
    PropertyStoreError::Database(e)
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let err = PropertyStoreError::NotFound("L-404".to_string());
        assert!(err.to_string().contains("L-404"));
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn test_duplicate_id_error() {
        let err = PropertyStoreError::DuplicateId("L-1".to_string());
        assert!(err.to_string().contains("L-1"));
        assert_eq!(err.status_code(), 409);
    }

    #[test]
    fn test_malformed_error() {
        let err = PropertyStoreError::Malformed("missing string field 'id'".to_string());
        assert!(err.to_string().contains("missing string field 'id'"));
        assert_eq!(err.status_code(), 400);
    }
}
