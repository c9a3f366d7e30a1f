//! Shared application state.

use sqlx::PgPool;

use wohnfeed_core::Config;

use crate::ingestion::Ingestor;

/// State shared across all HTTP handlers and background tasks.
///
/// Both `pg_pool` and `ingestor` are `None` when PostgreSQL is not
/// configured; handlers that need them respond 503.
pub struct AppState {
    pub config: Config,
    pub pg_pool: Option<PgPool>,
    pub ingestor: Option<Ingestor>,
}
