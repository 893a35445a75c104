use std::future::Future;

use tokio::time::{Duration, sleep};
use tracing::{debug, info, warn};

use crate::models::retry::RetryConfig;

/// Retries `operation` with jittered exponential backoff. Used for
/// configuration lookups only; notification dispatch is never retried.
pub async fn retry_with_backoff<F, Fut, T, E>(
    config: &RetryConfig,
    label: &str,
    operation: F,
) -> Result<T, E>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;
    let mut delay_ms = config.initial_delay_ms;

    loop {
        attempt += 1;

        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    info!(label, attempt, max_attempts, "Lookup succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) if attempt >= max_attempts => {
                warn!(label, max_attempts, error = %e, "Lookup failed, retries exhausted");
                return Err(e);
            }
            Err(e) => {
                debug!(label, attempt, delay_ms, error = %e, "Lookup failed, backing off");

                let jitter = rand::random_range(-0.1..=0.1);
                sleep(Duration::from_millis((delay_ms as f64 * (1.0 + jitter)) as u64)).await;

                delay_ms = delay_ms
                    .saturating_mul(config.backoff_multiplier)
                    .min(config.max_delay_ms);
            }
        }
    }
}
