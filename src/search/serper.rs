use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{SearchHit, WebSearch};
use crate::error::UpstreamError;

const SERVICE: &str = "Serper";

#[derive(Serialize)]
struct SearchRequest<'a> {
    q: &'a str,
    num: usize,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    organic: Vec<SearchHit>,
}

/// Client for the Serper Google search API.
pub struct SerperSearch {
    base_url: String,
    api_key: Option<String>,
    num_results: usize,
    http_client: reqwest::Client,
}

impl SerperSearch {
    pub fn new(
        base_url: String,
        api_key: Option<String>,
        num_results: usize,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            num_results,
            http_client,
        })
    }
}

#[async_trait]
impl WebSearch for SerperSearch {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, UpstreamError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(UpstreamError::MissingCredential { service: SERVICE })?;

        debug!(query = %query, "Searching the web");
        let response = self
            .http_client
            .post(format!("{}/search", self.base_url))
            .header("X-API-KEY", api_key)
            .json(&SearchRequest {
                q: query,
                num: self.num_results,
            })
            .send()
            .await
            .map_err(|e| UpstreamError::transport(SERVICE, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                service: SERVICE,
                status: status.as_u16(),
                body,
            });
        }

        let parsed: SearchResponse = response.json().await.map_err(|e| UpstreamError::Decode {
            service: SERVICE,
            message: e.to_string(),
        })?;

        let mut hits = parsed.organic;
        hits.truncate(self.num_results);
        Ok(hits)
    }
}
