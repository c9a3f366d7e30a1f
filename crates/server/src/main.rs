mod api;
mod db;
mod ingestion;
mod properties;
mod router;
mod sources;
mod state;

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use ingestion::{HttpFetcher, Ingestor, PgRecordSink, PgSourceRegistry};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    wohnfeed_core::config::load_dotenv();
    let config = wohnfeed_core::Config::from_env();
    config.log_summary();

    let pg_pool = db::init_pg_pool(&config.postgres).await;

    let ingestor = pg_pool.as_ref().map(|pool| {
        Ingestor::new(
            Arc::new(PgSourceRegistry::new(pool.clone())),
            Arc::new(HttpFetcher::new(Duration::from_secs(
                config.ingest.fetch_timeout_secs,
            ))),
            Arc::new(PgRecordSink::new(pool.clone())),
            config.ingest.max_concurrent,
        )
    });

    let state = Arc::new(AppState {
        config: config.clone(),
        pg_pool,
        ingestor,
    });

    tokio::spawn(ingestion::run_ingestion_scheduler(state.clone()));

    let app = router::build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://localhost:{}", config.server.port);
    axum::serve(listener, app).await?;

    Ok(())
}
