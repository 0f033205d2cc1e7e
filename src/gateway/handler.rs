use tracing::{info, warn};

use crate::document::DocumentStore;
use crate::error::Result;
use crate::orchestrator::{AnalysisStep, Orchestrator};

pub const DEFAULT_QUERY: &str = "Analyze this financial document for investment insights";

/// The outcome of one successful upload.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub query: String,
    pub analysis: String,
    pub filename: String,
    pub steps: Vec<AnalysisStep>,
}

/// Stores an upload, runs the pipeline over it and always cleans up.
pub struct AnalysisHandler {
    store: DocumentStore,
    orchestrator: Orchestrator,
}

impl AnalysisHandler {
    pub fn new(store: DocumentStore, orchestrator: Orchestrator) -> Self {
        Self {
            store,
            orchestrator,
        }
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub async fn handle(
        &self,
        bytes: &[u8],
        filename: &str,
        query: Option<&str>,
    ) -> Result<AnalysisResult> {
        let query = normalize_query(query);
        let doc = self.store.store(bytes).await?;
        info!(
            id = %doc.id(),
            filename = %filename,
            bytes = doc.size(),
            "Analyzing upload"
        );

        let outcome = self.orchestrator.run(&query, doc.path()).await;

        if let Err(e) = self.store.release(&doc).await {
            warn!(id = %doc.id(), error = %e, "Failed to remove upload");
        }

        let report = outcome?;
        Ok(AnalysisResult {
            query,
            analysis: report.aggregate,
            filename: filename.to_string(),
            steps: report.steps,
        })
    }
}

/// Trimmed query, or the default instruction when absent or blank.
pub fn normalize_query(query: Option<&str>) -> String {
    match query.map(str::trim) {
        Some(q) if !q.is_empty() => q.to_string(),
        _ => DEFAULT_QUERY.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::extract::fixtures::pdf_bytes;
    use crate::error::{AnalyzerError, UpstreamError};
    use crate::llm::{GenerationRequest, TextGenerator};
    use crate::orchestrator::StepKind;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::path::Path;
    use std::sync::Arc;

    /// Echoes a fixed answer, or fails, and keeps the prompts it saw.
    struct Scripted {
        prompts: Mutex<Vec<String>>,
        fail: bool,
    }

    impl Scripted {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                prompts: Mutex::new(Vec::new()),
                fail,
            })
        }
    }

    #[async_trait]
    impl TextGenerator for Scripted {
        async fn generate(
            &self,
            request: GenerationRequest,
        ) -> std::result::Result<String, UpstreamError> {
            self.prompts.lock().push(request.prompt);
            if self.fail {
                Err(UpstreamError::Transport {
                    service: "OpenAI",
                    message: "connection reset".to_string(),
                    timeout: false,
                })
            } else {
                Ok("Revenue was $10M.".to_string())
            }
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    fn handler(dir: &Path, gen: Arc<Scripted>) -> AnalysisHandler {
        AnalysisHandler::new(
            DocumentStore::new(dir.to_str().unwrap()),
            Orchestrator::from_kinds(gen, &[StepKind::Analyze]),
        )
    }

    fn leftover_files(dir: &Path) -> usize {
        match std::fs::read_dir(dir) {
            Ok(entries) => entries.count(),
            Err(_) => 0,
        }
    }

    #[test]
    fn blank_or_missing_query_uses_default() {
        assert_eq!(normalize_query(None), DEFAULT_QUERY);
        assert_eq!(normalize_query(Some("")), DEFAULT_QUERY);
        assert_eq!(normalize_query(Some("   \n")), DEFAULT_QUERY);
        assert_eq!(normalize_query(Some("  What is the revenue? ")), "What is the revenue?");
    }

    #[tokio::test]
    async fn success_returns_result_and_removes_upload() {
        let tmp = tempfile::tempdir().unwrap();
        let gen = Scripted::new(false);
        let handler = handler(tmp.path(), gen.clone());

        let result = handler
            .handle(&pdf_bytes(&["Revenue: $10M"]), "q2.pdf", Some("What is the revenue?"))
            .await
            .unwrap();

        assert_eq!(result.query, "What is the revenue?");
        assert_eq!(result.analysis, "Revenue was $10M.");
        assert_eq!(result.filename, "q2.pdf");
        assert_eq!(result.steps.len(), 1);
        assert_eq!(leftover_files(tmp.path()), 0);
    }

    #[tokio::test]
    async fn orchestrator_receives_the_default_query() {
        let tmp = tempfile::tempdir().unwrap();
        let gen = Scripted::new(false);
        let handler = handler(tmp.path(), gen.clone());

        let result = handler
            .handle(&pdf_bytes(&["Revenue: $10M"]), "q2.pdf", Some(""))
            .await
            .unwrap();

        assert_eq!(result.query, DEFAULT_QUERY);
        let prompts = gen.prompts.lock();
        assert!(prompts[0].contains(&format!("User query: {DEFAULT_QUERY}")));
    }

    #[tokio::test]
    async fn generation_failure_still_removes_upload() {
        let tmp = tempfile::tempdir().unwrap();
        let handler = handler(tmp.path(), Scripted::new(true));

        let err = handler
            .handle(&pdf_bytes(&["Revenue: $10M"]), "q2.pdf", None)
            .await
            .unwrap_err();

        assert!(matches!(err, AnalyzerError::Generation(_)));
        assert_eq!(leftover_files(tmp.path()), 0);
    }

    #[tokio::test]
    async fn unparseable_upload_is_a_format_error_and_removed() {
        let tmp = tempfile::tempdir().unwrap();
        let gen = Scripted::new(false);
        let handler = handler(tmp.path(), gen.clone());

        let err = handler
            .handle(b"GIF89a not a pdf", "image.gif", None)
            .await
            .unwrap_err();

        assert!(matches!(err, AnalyzerError::Format(_)));
        assert!(gen.prompts.lock().is_empty());
        assert_eq!(leftover_files(tmp.path()), 0);
    }

    #[tokio::test]
    async fn concurrent_requests_do_not_collide() {
        let tmp = tempfile::tempdir().unwrap();
        let handler = Arc::new(handler(tmp.path(), Scripted::new(false)));

        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let handler = handler.clone();
                tokio::spawn(async move {
                    let bytes = pdf_bytes(&[&format!("Quarter {i}")]);
                    handler.handle(&bytes, &format!("{i}.pdf"), None).await
                })
            })
            .collect();

        for task in tasks {
            assert!(task.await.unwrap().is_ok());
        }
        assert_eq!(leftover_files(tmp.path()), 0);
    }
}
