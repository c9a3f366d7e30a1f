//! Ingestion cycle orchestration.
//!
//! One cycle lists the active sources, then processes every source in its
//! own task. Sources are isolated from each other: a failing source is
//! logged and tallied, and the rest of the cycle proceeds. Items within a
//! source are not isolated; the first failing item fails its source.

use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::{error, info};

use wohnfeed_core::{IngestError, MappingSchema};

use super::limiter::run_limited;
use super::{
    ActiveSource, CycleSummary, NormalizedRecord, RecordSink, SourceFetcher, SourceRegistry,
};

/// Runs ingestion cycles over a registry, fetcher, and sink.
#[derive(Clone)]
pub struct Ingestor {
    registry: Arc<dyn SourceRegistry>,
    fetcher: Arc<dyn SourceFetcher>,
    sink: Arc<dyn RecordSink>,
    max_concurrent: usize,
}

impl Ingestor {
    pub fn new(
        registry: Arc<dyn SourceRegistry>,
        fetcher: Arc<dyn SourceFetcher>,
        sink: Arc<dyn RecordSink>,
        max_concurrent: usize,
    ) -> Self {
        Self {
            registry,
            fetcher,
            sink,
            max_concurrent,
        }
    }

    /// Run one full ingestion cycle.
    ///
    /// Only a registry failure is fatal; per-source failures are tallied
    /// into the returned summary.
    pub async fn run_cycle(&self) -> Result<CycleSummary, IngestError> {
        let sources = self.registry.list_active().await?;

        if sources.is_empty() {
            info!("ingestion cycle: no active sources");
            return Ok(CycleSummary::default());
        }

        let mut summary = CycleSummary {
            attempted: sources.len(),
            ..CycleSummary::default()
        };

        let handles: Vec<_> = sources
            .into_iter()
            .map(|source| {
                let ingestor = self.clone();
                let name = source.name.clone();
                (name, tokio::spawn(async move { ingestor.ingest_source(source).await }))
            })
            .collect();

        for (name, handle) in handles {
            let outcome = match handle.await {
                Ok(result) => result,
                Err(e) => Err(IngestError::persist(format!("task panicked: {}", e))),
            };
            match outcome {
                Ok(()) => summary.succeeded += 1,
                Err(e) => {
                    summary.failed += 1;
                    error!("ingestion failed for source '{}': {}", name, e);
                }
            }
        }

        info!(
            "ingestion cycle complete: {} attempted, {} succeeded, {} failed",
            summary.attempted, summary.succeeded, summary.failed
        );

        Ok(summary)
    }

    /// Fetch, map, and persist every item of one source.
    async fn ingest_source(&self, source: ActiveSource) -> Result<(), IngestError> {
        let schema = MappingSchema::from_value(&source.mapping_schema)
            .map_err(|e| IngestError::schema(e))?;

        let items = self.fetcher.fetch(&source).await?;
        info!("source '{}': fetched {} items", source.name, items.len());

        let tasks: Vec<BoxFuture<'_, Result<(), IngestError>>> = items
            .into_iter()
            .map(|item| {
                let schema = &schema;
                let sink = &self.sink;
                let source_id = source.id;
                async move {
                    let fields = schema.apply(&item);
                    sink.persist(NormalizedRecord {
                        fields,
                        source_id,
                        raw_data: item,
                    })
                    .await
                }
                .boxed()
            })
            .collect();

        run_limited(tasks, self.max_concurrent).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Mutex;
    use uuid::Uuid;

    struct MockRegistry {
        result: Result<Vec<ActiveSource>, String>,
    }

    #[async_trait]
    impl SourceRegistry for MockRegistry {
        async fn list_active(&self) -> Result<Vec<ActiveSource>, IngestError> {
            match &self.result {
                Ok(sources) => Ok(sources.clone()),
                Err(cause) => Err(IngestError::registry(cause.clone())),
            }
        }
    }

    /// Serves a canned payload per source name; unknown names fail.
    struct MockFetcher {
        payloads: Vec<(String, Vec<Value>)>,
    }

    #[async_trait]
    impl SourceFetcher for MockFetcher {
        async fn fetch(&self, source: &ActiveSource) -> Result<Vec<Value>, IngestError> {
            self.payloads
                .iter()
                .find(|(name, _)| *name == source.name)
                .map(|(_, items)| items.clone())
                .ok_or_else(|| IngestError::fetch(&source.name, "connection refused"))
        }
    }

    /// Records persisted fields; items whose `id` field equals `poison`
    /// fail persistence.
    struct MockSink {
        persisted: Mutex<Vec<Value>>,
        poison: Option<String>,
    }

    impl MockSink {
        fn new(poison: Option<&str>) -> Self {
            Self {
                persisted: Mutex::new(Vec::new()),
                poison: poison.map(String::from),
            }
        }
    }

    #[async_trait]
    impl RecordSink for MockSink {
        async fn persist(&self, record: NormalizedRecord) -> Result<(), IngestError> {
            if let Some(poison) = &self.poison {
                if record.fields.get("id").and_then(Value::as_str) == Some(poison) {
                    return Err(IngestError::persist(format!("rejected item {}", poison)));
                }
            }
            self.persisted.lock().unwrap().push(record.fields);
            Ok(())
        }
    }

    fn source(name: &str) -> ActiveSource {
        ActiveSource {
            id: Uuid::new_v4(),
            name: name.to_string(),
            url: format!("https://example.com/{name}.json"),
            mapping_schema: json!({ "id": "listing.id", "city": "listing.city" }),
        }
    }

    fn ingestor(
        sources: Vec<ActiveSource>,
        payloads: Vec<(String, Vec<Value>)>,
        sink: Arc<MockSink>,
    ) -> Ingestor {
        Ingestor::new(
            Arc::new(MockRegistry {
                result: Ok(sources),
            }),
            Arc::new(MockFetcher { payloads }),
            sink,
            100,
        )
    }

    #[tokio::test]
    async fn test_cycle_maps_and_persists_items() {
        let sink = Arc::new(MockSink::new(None));
        let items = vec![
            json!({ "listing": { "id": "L-1", "city": "Berlin" } }),
            json!({ "listing": { "id": "L-2", "city": "Hamburg" } }),
        ];
        let ing = ingestor(
            vec![source("feed")],
            vec![("feed".to_string(), items)],
            sink.clone(),
        );

        let summary = ing.run_cycle().await.unwrap();
        assert_eq!(summary.attempted, 1);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 0);

        let persisted = sink.persisted.lock().unwrap();
        assert_eq!(persisted.len(), 2);
        assert_eq!(persisted[0], json!({ "id": "L-1", "city": "Berlin" }));
    }

    #[tokio::test]
    async fn test_failing_source_does_not_stop_others() {
        let sink = Arc::new(MockSink::new(None));
        let good_items = vec![json!({ "listing": { "id": "L-1", "city": "Berlin" } })];
        // "down" has no canned payload, so its fetch fails.
        let ing = ingestor(
            vec![source("down"), source("up")],
            vec![("up".to_string(), good_items)],
            sink.clone(),
        );

        let summary = ing.run_cycle().await.unwrap();
        assert_eq!(summary.attempted, 2);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(sink.persisted.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_persist_failure_fails_its_source() {
        let sink = Arc::new(MockSink::new(Some("L-2")));
        let items = vec![
            json!({ "listing": { "id": "L-1", "city": "Berlin" } }),
            json!({ "listing": { "id": "L-2", "city": "Hamburg" } }),
        ];
        let ing = ingestor(
            vec![source("feed")],
            vec![("feed".to_string(), items)],
            sink.clone(),
        );

        let summary = ing.run_cycle().await.unwrap();
        assert_eq!(summary.succeeded, 0);
        assert_eq!(summary.failed, 1);
    }

    #[tokio::test]
    async fn test_malformed_schema_fails_its_source() {
        let sink = Arc::new(MockSink::new(None));
        let mut bad = source("feed");
        bad.mapping_schema = json!({ "id": 42 });
        let ing = ingestor(
            vec![bad],
            vec![("feed".to_string(), vec![json!({})])],
            sink.clone(),
        );

        let summary = ing.run_cycle().await.unwrap();
        assert_eq!(summary.failed, 1);
        assert!(sink.persisted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_no_active_sources_yields_empty_summary() {
        let sink = Arc::new(MockSink::new(None));
        let ing = ingestor(Vec::new(), Vec::new(), sink);

        let summary = ing.run_cycle().await.unwrap();
        assert_eq!(summary.attempted, 0);
        assert_eq!(summary.succeeded, 0);
        assert_eq!(summary.failed, 0);
    }

    #[tokio::test]
    async fn test_registry_failure_is_fatal() {
        let ing = Ingestor::new(
            Arc::new(MockRegistry {
                result: Err("connection pool exhausted".to_string()),
            }),
            Arc::new(MockFetcher {
                payloads: Vec::new(),
            }),
            Arc::new(MockSink::new(None)),
            100,
        );

        let err = ing.run_cycle().await.unwrap_err();
        assert!(err.is_fatal());
    }
}
