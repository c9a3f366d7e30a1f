//! Cron-driven background loop that runs ingestion cycles.

use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use cron::Schedule;
use tracing::{error, info, warn};

use crate::state::AppState;

/// Run ingestion cycles on the configured cron schedule, forever.
///
/// Silently returns if ingestion is not wired up (no PostgreSQL pool) or
/// the configured cron expression fails to parse.
pub async fn run_ingestion_scheduler(state: Arc<AppState>) {
    let ingestor = match state.ingestor.as_ref() {
        Some(i) => i.clone(),
        None => return, // no PG — ingestion disabled
    };

    let cron_expr = &state.config.ingest.cron;
    let schedule = match parse_cron(cron_expr) {
        Ok(s) => s,
        Err(e) => {
            error!(cron = %cron_expr, error = %e, "invalid ingestion cron expression; scheduler disabled");
            return;
        }
    };

    info!("ingestion scheduler started (cron: {})", cron_expr);

    loop {
        let next_fire = match schedule.upcoming(Utc).next() {
            Some(t) => t,
            None => {
                warn!(cron = %cron_expr, "cron schedule yields no future fire time; scheduler stopping");
                return;
            }
        };

        let wait = (next_fire - Utc::now())
            .to_std()
            .unwrap_or_default();
        tokio::time::sleep(wait).await;

        match ingestor.run_cycle().await {
            Ok(summary) => info!(
                attempted = summary.attempted,
                succeeded = summary.succeeded,
                failed = summary.failed,
                "scheduled ingestion cycle finished"
            ),
            Err(e) => error!(error = %e, "scheduled ingestion cycle failed"),
        }
    }
}

/// Parse a cron expression, auto-prepending "0 " for 5-field expressions.
///
/// The `cron` crate requires 6 fields (sec min hr dom mon dow), but users
/// typically write 5-field cron (min hr dom mon dow). We detect and adapt.
fn parse_cron(expr: &str) -> Result<Schedule, cron::error::Error> {
    let parts: Vec<&str> = expr.split_whitespace().collect();
    if parts.len() == 5 {
        // Standard 5-field cron — prepend seconds field
        let six_field = format!("0 {}", expr);
        Schedule::from_str(&six_field)
    } else {
        Schedule::from_str(expr)
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cron_six_field_default() {
        // The default schedule: every 10 minutes.
        let schedule = parse_cron("0 */10 * * * *").unwrap();
        let next = schedule.upcoming(Utc).next();
        assert!(next.is_some(), "should compute a next fire time");
    }

    #[test]
    fn test_parse_cron_five_field_auto_prefix() {
        // 5-field: every hour at :00
        let schedule = parse_cron("0 * * * *").unwrap();
        let next = schedule.upcoming(Utc).next();
        assert!(next.is_some(), "should compute a next fire time");
    }

    #[test]
    fn test_parse_cron_invalid() {
        let result = parse_cron("not a cron");
        assert!(result.is_err(), "should fail on invalid cron expression");
    }

    #[test]
    fn test_parse_cron_next_fire_is_future() {
        let schedule = parse_cron("0 */10 * * * *").unwrap();
        let next = schedule.upcoming(Utc).next().unwrap();
        assert!(next > Utc::now(), "next fire time should be in the future");
    }
}
