//! HTTP fetcher for source payloads.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use wohnfeed_core::IngestError;

use super::{ActiveSource, SourceFetcher};

/// Fetches a source's payload with a single GET request.
///
/// The response body must be a JSON array; anything else is a fetch
/// failure for that source.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }
}

#[async_trait]
impl SourceFetcher for HttpFetcher {
    async fn fetch(&self, source: &ActiveSource) -> Result<Vec<Value>, IngestError> {
        debug!("fetching source '{}' from {}", source.name, source.url);

        let response = self
            .client
            .get(&source.url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| IngestError::fetch(&source.name, e))?;

        if !response.status().is_success() {
            return Err(IngestError::fetch(
                &source.name,
                format!("unexpected status {}", response.status()),
            ));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| IngestError::fetch(&source.name, e))?;

        match body {
            Value::Array(items) => Ok(items),
            other => Err(IngestError::fetch(
                &source.name,
                format!(
                    "expected a JSON array, got {}",
                    json_type_name(&other)
                ),
            )),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use uuid::Uuid;

    async fn spawn_fixture(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn source_for(url: String) -> ActiveSource {
        ActiveSource {
            id: Uuid::new_v4(),
            name: "fixture".to_string(),
            url,
            mapping_schema: json!({}),
        }
    }

    #[tokio::test]
    async fn test_fetch_array_payload() {
        let router = Router::new().route(
            "/feed",
            get(|| async { Json(json!([{ "id": "a" }, { "id": "b" }])) }),
        );
        let base = spawn_fixture(router).await;

        let fetcher = HttpFetcher::new(Duration::from_secs(5));
        let items = fetcher
            .fetch(&source_for(format!("{base}/feed")))
            .await
            .unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["id"], "a");
    }

    #[tokio::test]
    async fn test_fetch_rejects_non_array_payload() {
        let router = Router::new().route(
            "/feed",
            get(|| async { Json(json!({ "items": [] })) }),
        );
        let base = spawn_fixture(router).await;

        let fetcher = HttpFetcher::new(Duration::from_secs(5));
        let err = fetcher
            .fetch(&source_for(format!("{base}/feed")))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("expected a JSON array"));
    }

    #[tokio::test]
    async fn test_fetch_rejects_error_status() {
        let router = Router::new().route(
            "/feed",
            get(|| async {
                (axum::http::StatusCode::INTERNAL_SERVER_ERROR, "nope")
            }),
        );
        let base = spawn_fixture(router).await;

        let fetcher = HttpFetcher::new(Duration::from_secs(5));
        let err = fetcher
            .fetch(&source_for(format!("{base}/feed")))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("unexpected status"));
    }

    #[tokio::test]
    async fn test_fetch_connection_failure_names_source() {
        // Port 1 is never listening locally.
        let fetcher = HttpFetcher::new(Duration::from_secs(1));
        let err = fetcher
            .fetch(&source_for("http://127.0.0.1:1/feed".to_string()))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("fixture"));
    }
}
