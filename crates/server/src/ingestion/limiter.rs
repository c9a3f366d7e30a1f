//! Bounded-concurrency task driver for per-item ingestion work.

use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use futures::StreamExt;

use wohnfeed_core::IngestError;

/// Drive `tasks` with at most `max_concurrent` running at once.
///
/// Tasks are launched in submission order. On the first failure no further
/// queued tasks are launched; tasks already in flight run to completion and
/// the first error is returned. There is no per-item isolation: one failed
/// item fails the whole batch.
pub async fn run_limited(
    tasks: Vec<BoxFuture<'_, Result<(), IngestError>>>,
    max_concurrent: usize,
) -> Result<(), IngestError> {
    let cap = max_concurrent.max(1);
    let mut queue = tasks.into_iter();
    let mut in_flight = FuturesUnordered::new();

    for task in queue.by_ref().take(cap) {
        in_flight.push(task);
    }

    let mut first_error = None;

    while let Some(result) = in_flight.next().await {
        if let Err(e) = result {
            if first_error.is_none() {
                first_error = Some(e);
            }
            continue;
        }
        if first_error.is_none() {
            if let Some(task) = queue.next() {
                in_flight.push(task);
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use futures::FutureExt;

    #[tokio::test]
    async fn test_concurrency_never_exceeds_cap() {
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<BoxFuture<'_, Result<(), IngestError>>> = (0..8)
            .map(|_| {
                let running = running.clone();
                let peak = peak.clone();
                async move {
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(15)).await;
                    running.fetch_sub(1, Ordering::SeqCst);
                    Ok(())
                }
                .boxed()
            })
            .collect();

        run_limited(tasks, 3).await.unwrap();
        assert!(peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn test_first_error_stops_queued_tasks() {
        let started = Arc::new(AtomicUsize::new(0));

        let mut tasks: Vec<BoxFuture<'_, Result<(), IngestError>>> = Vec::new();
        for i in 0..3 {
            let started = started.clone();
            tasks.push(
                async move {
                    started.fetch_add(1, Ordering::SeqCst);
                    if i == 1 {
                        Err(IngestError::persist("boom"))
                    } else {
                        Ok(())
                    }
                }
                .boxed(),
            );
        }

        let err = run_limited(tasks, 1).await.unwrap_err();
        assert!(err.to_string().contains("boom"));
        // With cap 1 the failing second task prevents the third from launching.
        assert_eq!(started.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_batch_is_ok() {
        run_limited(Vec::new(), 100).await.unwrap();
    }

    #[tokio::test]
    async fn test_zero_cap_still_makes_progress() {
        let tasks: Vec<BoxFuture<'_, Result<(), IngestError>>> =
            vec![async { Ok(()) }.boxed()];
        run_limited(tasks, 0).await.unwrap();
    }
}
