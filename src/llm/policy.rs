//! Call policies for the text-generation backend: bounded retries and a
//! rolling calls-per-minute cap. Both pass the final failure through
//! unchanged.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::client::{GenerationRequest, TextGenerator};
use crate::error::UpstreamError;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.initial_delay.saturating_mul(factor).min(self.max_delay)
    }
}

pub struct RetryingGenerator {
    inner: Arc<dyn TextGenerator>,
    policy: RetryPolicy,
}

impl RetryingGenerator {
    pub fn new(inner: Arc<dyn TextGenerator>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl TextGenerator for RetryingGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<String, UpstreamError> {
        let mut attempt = 0;
        loop {
            match self.inner.generate(request.clone()).await {
                Ok(text) => return Ok(text),
                Err(e) if attempt < self.policy.max_retries && e.is_retryable() => {
                    let delay = self.policy.delay_for(attempt);
                    warn!(
                        attempt = attempt + 1,
                        max_retries = self.policy.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Retrying generation request"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}

/// Allows at most `max_calls` calls to start within any rolling `window`.
pub struct RateLimitedGenerator {
    inner: Arc<dyn TextGenerator>,
    max_calls: usize,
    window: Duration,
    started: Mutex<VecDeque<Instant>>,
}

impl RateLimitedGenerator {
    pub fn per_minute(inner: Arc<dyn TextGenerator>, max_calls: usize) -> Self {
        Self::with_window(inner, max_calls, Duration::from_secs(60))
    }

    pub fn with_window(inner: Arc<dyn TextGenerator>, max_calls: usize, window: Duration) -> Self {
        Self {
            inner,
            max_calls: max_calls.max(1),
            window,
            started: Mutex::new(VecDeque::with_capacity(max_calls)),
        }
    }

    async fn acquire(&self) {
        loop {
            let wait = {
                let mut started = self.started.lock();
                let now = Instant::now();
                while started
                    .front()
                    .is_some_and(|t| now.duration_since(*t) >= self.window)
                {
                    started.pop_front();
                }
                if started.len() < self.max_calls {
                    started.push_back(now);
                    return;
                }
                let oldest = started[0];
                self.window.saturating_sub(now.duration_since(oldest))
            };
            debug!(wait_ms = wait.as_millis() as u64, "Generation rate limit reached");
            tokio::time::sleep(wait).await;
        }
    }
}

#[async_trait]
impl TextGenerator for RateLimitedGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<String, UpstreamError> {
        self.acquire().await;
        self.inner.generate(request).await
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}
