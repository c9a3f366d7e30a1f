use sqlx::PgPool;
use tracing::{info, warn};

use wohnfeed_core::config::PostgresConfig;

/// Create a PostgreSQL connection pool and run migrations.
/// Returns None if PostgreSQL is not configured or unreachable.
pub async fn init_pg_pool(config: &PostgresConfig) -> Option<PgPool> {
    if !config.is_configured() {
        warn!("PostgreSQL not configured — sources, properties, and ingestion disabled");
        return None;
    }

    match PgPool::connect(&config.database_url()).await {
        Ok(pool) => {
            info!("PostgreSQL connected: {}", config.host);
            match sqlx::migrate!("../../migrations").run(&pool).await {
                Ok(_) => {
                    info!("Database migrations applied successfully");
                    Some(pool)
                }
                Err(e) => {
                    warn!("Failed to run migrations: {} — database features disabled", e);
                    None
                }
            }
        }
        Err(e) => {
            warn!("Failed to connect to PostgreSQL: {} — database features disabled", e);
            None
        }
    }
}
