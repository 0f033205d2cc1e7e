//! Shared helpers for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use findoc::config::GatewayConfig;
use findoc::document::DocumentStore;
use findoc::llm::{GenerationRequest, TextGenerator};
use findoc::orchestrator::{Orchestrator, StepKind};
use findoc::{create_router, AnalysisHandler, AppState, UpstreamError};
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;

pub use findoc::document::extract::fixtures::pdf_bytes;

/// Answers every prompt with a canned analysis and remembers the prompts.
pub struct StubGenerator {
    pub prompts: Mutex<Vec<String>>,
    pub fail: bool,
}

impl StubGenerator {
    pub fn ok() -> Arc<Self> {
        Arc::new(Self {
            prompts: Mutex::new(Vec::new()),
            fail: false,
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            prompts: Mutex::new(Vec::new()),
            fail: true,
        })
    }
}

#[async_trait]
impl TextGenerator for StubGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<String, UpstreamError> {
        self.prompts.lock().push(request.prompt);
        if self.fail {
            return Err(UpstreamError::Status {
                service: "OpenAI",
                status: 429,
                body: "rate limit exceeded".to_string(),
            });
        }
        Ok("The document reports revenue of $10M for the period.".to_string())
    }

    fn model_name(&self) -> &str {
        "stub"
    }
}

/// Serve the gateway on a random port; returns the base URL.
pub async fn start_server(
    work_dir: &Path,
    generator: Arc<StubGenerator>,
    steps: &[StepKind],
) -> String {
    let handler = AnalysisHandler::new(
        DocumentStore::new(work_dir.to_str().unwrap()),
        Orchestrator::from_kinds(generator, steps),
    );
    let state = Arc::new(AppState::new(handler));
    let router = create_router(state, &GatewayConfig::default());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://{}", addr)
}

pub fn file_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}
