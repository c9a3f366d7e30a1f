//! PostgreSQL-backed registry and sink adapters for the ingestion cycle.

use async_trait::async_trait;
use sqlx::PgPool;

use wohnfeed_core::IngestError;

use crate::properties::{NewProperty, PropertyStore};
use crate::sources::SourceStore;

use super::{ActiveSource, NormalizedRecord, RecordSink, SourceRegistry};

/// Lists active sources from the `sources` table.
#[derive(Clone)]
pub struct PgSourceRegistry {
    pool: PgPool,
}

impl PgSourceRegistry {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SourceRegistry for PgSourceRegistry {
    async fn list_active(&self) -> Result<Vec<ActiveSource>, IngestError> {
        let sources = SourceStore::list_active(&self.pool)
            .await
            .map_err(IngestError::registry)?;

        Ok(sources
            .into_iter()
            .map(|s| ActiveSource {
                id: s.id,
                name: s.name,
                url: s.url,
                mapping_schema: s.mapping_schema,
            })
            .collect())
    }
}

/// Persists mapped records into the `properties` table.
#[derive(Clone)]
pub struct PgRecordSink {
    pool: PgPool,
}

impl PgRecordSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordSink for PgRecordSink {
    async fn persist(&self, record: NormalizedRecord) -> Result<(), IngestError> {
        let row = NewProperty::from_mapped(&record.fields, record.source_id, record.raw_data)
            .map_err(IngestError::persist)?;

        PropertyStore::create(&self.pool, row)
            .await
            .map_err(IngestError::persist)?;

        Ok(())
    }
}
