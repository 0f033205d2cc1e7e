use serde::{Deserialize, Serialize};

use crate::orchestrator::StepKind;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub gateway: GatewayConfig,
    pub storage: StorageConfig,
    pub llm: LlmConfig,
    pub search: SearchConfig,
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
    /// Whole-request timeout; unset means no limit.
    pub request_timeout_secs: Option<u64>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            max_upload_bytes: 20 * 1024 * 1024,
            request_timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    pub work_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            work_dir: "data".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LlmConfig {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub max_requests_per_minute: Option<usize>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            temperature: Some(0.2),
            max_tokens: None,
            timeout_secs: 120,
            max_retries: 2,
            max_requests_per_minute: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    pub enabled: bool,
    pub api_url: String,
    pub api_key: Option<String>,
    pub num_results: usize,
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_url: "https://google.serper.dev".to_string(),
            api_key: None,
            num_results: 5,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    pub steps: Vec<StepKind>,
    /// Document text beyond this many characters is left out of prompts.
    pub max_context_chars: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            steps: vec![StepKind::Analyze],
            max_context_chars: 102_400,
        }
    }
}
