//! Bounded retry with exponential backoff and jitter.
//!
//! `RetryAdapter` wraps any concrete adapter so retry behavior stays inside
//! the adapter layer: the dispatcher only ever sees settled outcomes.

use super::ProviderAdapter;
use crate::config::DispatchConfig;
use crate::error::ProviderResult;
use crate::types::{Payload, Prompt, ProviderSpec};
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;

/// Backoff cap: no single sleep exceeds this.
const MAX_BACKOFF_MS: u64 = 30_000;

/// Retry policy applied around one adapter.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Max retries after the initial attempt
    pub attempts: u32,
    /// Base backoff delay in milliseconds
    pub base_delay_ms: u64,
}

impl RetryPolicy {
    pub fn from_config(config: &DispatchConfig) -> Self {
        Self {
            attempts: config.retry_attempts,
            base_delay_ms: config.retry_delay_ms,
        }
    }

    /// No retries; every error settles immediately.
    pub fn none() -> Self {
        Self {
            attempts: 0,
            base_delay_ms: 1,
        }
    }
}

/// Calculate exponential backoff duration for a given attempt.
///
/// Uses `base_delay * 2^attempt` with a cap at 30 seconds.
pub fn backoff_duration(attempt: u32, base_delay_ms: u64) -> Duration {
    let delay = base_delay_ms.saturating_mul(2u64.saturating_pow(attempt));
    Duration::from_millis(delay.min(MAX_BACKOFF_MS))
}

/// Apply jitter to a backoff duration: uniform in [delay/2, delay].
///
/// Keeps concurrently throttled adapters from retrying in lockstep.
pub fn with_jitter(delay: Duration) -> Duration {
    let millis = delay.as_millis() as u64;
    if millis < 2 {
        return delay;
    }
    let jittered = rand::thread_rng().gen_range(millis / 2..=millis);
    Duration::from_millis(jittered)
}

/// Wraps an adapter with retry-on-transient-failure behavior.
pub struct RetryAdapter {
    inner: Box<dyn ProviderAdapter>,
    policy: RetryPolicy,
}

impl RetryAdapter {
    pub fn new(inner: Box<dyn ProviderAdapter>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl ProviderAdapter for RetryAdapter {
    fn spec(&self) -> &ProviderSpec {
        self.inner.spec()
    }

    async fn generate(&self, prompt: &Prompt) -> ProviderResult<Payload> {
        let mut attempt = 0u32;
        loop {
            match self.inner.generate(prompt).await {
                Ok(payload) => return Ok(payload),
                Err(err) if err.is_retryable() && attempt < self.policy.attempts => {
                    let delay = with_jitter(backoff_duration(attempt, self.policy.base_delay_ms));
                    tracing::debug!(
                        provider = %self.inner.spec(),
                        "Retry {}/{} after {delay:?}: {err}",
                        attempt + 1,
                        self.policy.attempts
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
