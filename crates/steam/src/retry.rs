//! Fixed-delay retry for upstream calls.
//!
//! Unlike the exponential backoff used for long-lived reconnects, polling
//! retries wait the same delay between every attempt and give up after a
//! fixed number of tries.

use std::future::Future;
use std::time::Duration;

use crate::error::SteamError;

/// How many times to try an upstream call and how long to wait between
/// tries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Treated as at least 1.
    pub max_attempts: u32,
    /// Pause between consecutive attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(30),
        }
    }
}

/// Run `op` until it succeeds or the policy's attempts are used up.
///
/// Sleeps `policy.delay` between attempts but not after the last one. On
/// exhaustion the last error is wrapped in [`SteamError::RetriesExhausted`].
pub async fn retry<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, SteamError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SteamError>>,
{
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= attempts => {
                return Err(SteamError::RetriesExhausted {
                    attempts,
                    source: Box::new(e),
                });
            }
            Err(e) => {
                tracing::warn!(
                    attempt,
                    max_attempts = attempts,
                    delay_ms = policy.delay.as_millis() as u64,
                    error = %e,
                    "Upstream call failed, retrying",
                );
                tokio::time::sleep(policy.delay).await;
            }
        }
    }
}
