//! Web search backend used to add outside context to analysis steps.

pub mod serper;

pub use serper::SerperSearch;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::SearchConfig;
use crate::error::{AnalyzerError, Result, UpstreamError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub snippet: String,
}

#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str) -> std::result::Result<Vec<SearchHit>, UpstreamError>;
}

/// `None` when search is disabled in configuration.
pub fn build_search(config: &SearchConfig) -> Result<Option<Arc<dyn WebSearch>>> {
    if !config.enabled {
        return Ok(None);
    }
    let client = SerperSearch::new(
        config.api_url.clone(),
        config.api_key.clone(),
        config.num_results,
        Duration::from_secs(config.timeout_secs),
    )
    .map_err(|e| AnalyzerError::Config(format!("failed to build HTTP client: {e}")))?;
    Ok(Some(Arc::new(client)))
}

/// Render hits as a compact bullet list for a prompt.
pub fn format_hits(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(|h| {
            if h.snippet.is_empty() {
                format!("- {} ({})", h.title, h.link)
            } else {
                format!("- {} ({}): {}", h.title, h.link, h.snippet)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
