//! Text-generation backend: the client trait, an OpenAI-compatible client,
//! and the retry / rate-limit policies layered on top of it.

pub mod client;
pub mod openai;
pub mod policy;

pub use client::{GenerationRequest, TextGenerator};
pub use openai::OpenAiGenerator;
pub use policy::{RateLimitedGenerator, RetryPolicy, RetryingGenerator};

use std::sync::Arc;
use std::time::Duration;

use crate::config::LlmConfig;
use crate::error::{AnalyzerError, Result};

/// Build the generator stack: client, then the rate limit, then retries.
///
/// A missing API key is not an error here; it surfaces on the first call.
pub fn build_generator(config: &LlmConfig) -> Result<Arc<dyn TextGenerator>> {
    let client = OpenAiGenerator::new(
        config.api_url.clone(),
        config.model.clone(),
        config.api_key.clone(),
        Duration::from_secs(config.timeout_secs),
    )
    .map_err(|e| AnalyzerError::Config(format!("failed to build HTTP client: {e}")))?
    .with_sampling(config.temperature, config.max_tokens);

    let mut generator: Arc<dyn TextGenerator> = Arc::new(client);

    // Rate limit sits under the retries so every attempt takes a slot.
    if let Some(max_calls) = config.max_requests_per_minute {
        generator = Arc::new(RateLimitedGenerator::per_minute(generator, max_calls));
    }

    if config.max_retries > 0 {
        let policy = RetryPolicy {
            max_retries: config.max_retries,
            ..RetryPolicy::default()
        };
        generator = Arc::new(RetryingGenerator::new(generator, policy));
    }

    Ok(generator)
}
