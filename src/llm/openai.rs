use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::client::{GenerationRequest, TextGenerator};
use crate::error::UpstreamError;

pub const DEFAULT_API_URL: &str = "https://api.openai.com";
const HOSTED_API_HOST: &str = "api.openai.com";
const SERVICE: &str = "OpenAI";

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Client for any OpenAI-compatible `/v1/chat/completions` endpoint.
pub struct OpenAiGenerator {
    base_url: String,
    model: String,
    api_key: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    http_client: reqwest::Client,
}

impl OpenAiGenerator {
    pub fn new(
        base_url: Option<String>,
        model: String,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: normalize_base_url(base_url.as_deref().unwrap_or(DEFAULT_API_URL)),
            model,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            temperature: None,
            max_tokens: None,
            http_client,
        })
    }

    pub fn with_sampling(mut self, temperature: Option<f32>, max_tokens: Option<u32>) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    fn build_body(&self, request: GenerationRequest) -> ChatRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = request.system_prompt {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: Some(system),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: Some(request.prompt),
        });

        ChatRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }

    /// The hosted endpoint always needs a key; self-hosted ones may not.
    fn requires_key(&self) -> bool {
        reqwest::Url::parse(&self.base_url)
            .ok()
            .and_then(|url| url.host_str().map(|h| h.eq_ignore_ascii_case(HOSTED_API_HOST)))
            .unwrap_or(false)
    }
}

/// Accept both `https://host` and the conventional `https://host/v1`.
fn normalize_base_url(url: &str) -> String {
    let url = url.trim().trim_end_matches('/');
    url.strip_suffix("/v1").unwrap_or(url).to_string()
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<String, UpstreamError> {
        if self.api_key.is_none() && self.requires_key() {
            return Err(UpstreamError::MissingCredential { service: SERVICE });
        }

        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = self.build_body(request);

        let mut http_req = self.http_client.post(&url).json(&body);
        if let Some(ref key) = self.api_key {
            http_req = http_req.bearer_auth(key);
        }

        debug!(model = %self.model, "Sending chat completion");
        let response = http_req
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

        let parsed: ChatResponse = response.json().await.map_err(|e| UpstreamError::Decode {
            service: SERVICE,
            message: e.to_string(),
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(UpstreamError::Empty { service: SERVICE })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
