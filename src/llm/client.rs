use crate::error::UpstreamError;
use async_trait::async_trait;

/// One prompt for the text-generation backend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationRequest {
    pub system_prompt: Option<String>,
    pub prompt: String,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: None,
            prompt: prompt.into(),
        }
    }

    pub fn with_system_prompt(mut self, system: impl Into<String>) -> Self {
        self.system_prompt = Some(system.into());
        self
    }
}

/// An opaque text-generation backend.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> Result<String, UpstreamError>;
    fn model_name(&self) -> &str;
}

