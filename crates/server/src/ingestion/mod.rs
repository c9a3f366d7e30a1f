//! Periodic ingestion: fetch JSON arrays from active sources, map each
//! item through the source's declarative schema, and persist the results.
//!
//! The orchestrator is written against three seams so the cycle can be
//! exercised without Postgres or a live feed:
//! - [`SourceRegistry`] lists the active sources,
//! - [`SourceFetcher`] pulls a source's payload,
//! - [`RecordSink`] persists one mapped record.

pub mod fetcher;
pub mod limiter;
pub mod orchestrator;
pub mod pg;
pub mod scheduler;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use wohnfeed_core::IngestError;

pub use fetcher::HttpFetcher;
pub use orchestrator::Ingestor;
pub use pg::{PgRecordSink, PgSourceRegistry};
pub use scheduler::run_ingestion_scheduler;

/// An active source as seen by the ingestion cycle.
///
/// Carries the raw mapping schema; parsing is deferred to the cycle so a
/// malformed schema fails only that source's task.
#[derive(Debug, Clone)]
pub struct ActiveSource {
    pub id: Uuid,
    pub name: String,
    pub url: String,
    pub mapping_schema: Value,
}

/// One mapped item headed for persistence.
#[derive(Debug, Clone)]
pub struct NormalizedRecord {
    /// Output of the mapping engine (nested object).
    pub fields: Value,
    pub source_id: Uuid,
    /// The original item, retained verbatim.
    pub raw_data: Value,
}

/// Tally of one ingestion cycle, per source.
#[derive(Debug, Clone, Copy, Default, Serialize, ToSchema)]
pub struct CycleSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Lists the sources an ingestion cycle should process.
#[async_trait]
pub trait SourceRegistry: Send + Sync {
    async fn list_active(&self) -> Result<Vec<ActiveSource>, IngestError>;
}

/// Fetches one source's payload, which must be a JSON array.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch(&self, source: &ActiveSource) -> Result<Vec<Value>, IngestError>;
}

/// Persists one mapped record.
#[async_trait]
pub trait RecordSink: Send + Sync {
    async fn persist(&self, record: NormalizedRecord) -> Result<(), IngestError>;
}
