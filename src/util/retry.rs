//! Retry with exponential backoff and jitter.

use std::future::Future;
use std::time::Duration;

use rand::Rng;

use crate::error::LookoutError;

/// Retry policy configuration.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Initial backoff duration.
    pub initial_backoff: Duration,
    /// Maximum backoff duration.
    pub max_backoff: Duration,
    /// Backoff multiplier.
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(8),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// A policy that makes exactly one attempt.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay before the attempt following `failed_attempt` (1-based).
    ///
    /// Exponential backoff with 75%-125% jitter, never shorter than a delay
    /// the server asked for.
    pub fn delay_after(&self, failed_attempt: u32, err: &LookoutError) -> Duration {
        let exponent = failed_attempt.saturating_sub(1).min(16) as i32;
        let base = (self.initial_backoff.as_secs_f64() * self.multiplier.powi(exponent))
            .min(self.max_backoff.as_secs_f64());
        let jittered = Duration::from_secs_f64(base * rand::thread_rng().gen_range(0.75..=1.25));

        match err.retry_after() {
            Some(requested) => jittered.max(requested),
            None => jittered,
        }
    }

    /// Run `operation` until it succeeds, fails with a non-retryable error,
    /// or the attempts run out. The last error is returned as-is.
    pub async fn execute<F, Fut, T>(&self, mut operation: F) -> Result<T, LookoutError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, LookoutError>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            let err = match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            if attempt >= attempts || !err.is_retryable() {
                return Err(err);
            }

            let delay = self.delay_after(attempt, &err);
            tracing::warn!(
                attempt,
                max_attempts = attempts,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "retrying"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}
