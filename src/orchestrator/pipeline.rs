use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use super::step::{fill_query, Capability, StepDescriptor, StepKind};
use crate::document::{self, extract::truncate_chars};
use crate::error::Result;
use crate::llm::{GenerationRequest, TextGenerator};
use crate::search::{format_hits, WebSearch};

/// Output of one executed step.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisStep {
    pub kind: StepKind,
    pub role: String,
    pub output: String,
}

/// Everything a pipeline run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub steps: Vec<AnalysisStep>,
    pub aggregate: String,
}

/// Runs a fixed list of steps, one after another, against one document.
///
/// Each step sees the query, the document text and every earlier step's
/// output. There is no retry here: a failing step ends the run.
pub struct Orchestrator {
    generator: Arc<dyn TextGenerator>,
    search: Option<Arc<dyn WebSearch>>,
    steps: Vec<StepDescriptor>,
    max_context_chars: usize,
}

impl Orchestrator {
    pub fn new(generator: Arc<dyn TextGenerator>, steps: Vec<StepDescriptor>) -> Self {
        Self {
            generator,
            search: None,
            steps,
            max_context_chars: 102_400,
        }
    }

    pub fn from_kinds(generator: Arc<dyn TextGenerator>, kinds: &[StepKind]) -> Self {
        Self::new(
            generator,
            kinds.iter().copied().map(StepDescriptor::builtin).collect(),
        )
    }

    pub fn with_search(mut self, search: Option<Arc<dyn WebSearch>>) -> Self {
        self.search = search;
        self
    }

    pub fn with_max_context_chars(mut self, max_chars: usize) -> Self {
        self.max_context_chars = max_chars;
        self
    }

    pub fn steps(&self) -> &[StepDescriptor] {
        &self.steps
    }

    /// Extract the document at `path`, then run every step in order.
    pub async fn run(&self, query: &str, path: &Path) -> Result<AnalysisReport> {
        let text = document::extract(path.to_path_buf()).await?;
        info!(
            pages = text.page_count(),
            chars = text.as_str().len(),
            "Extracted document text"
        );
        let context = truncate_chars(text.as_str(), self.max_context_chars);

        let mut steps: Vec<AnalysisStep> = Vec::with_capacity(self.steps.len());
        for step in &self.steps {
            let started = Instant::now();
            let output = self.run_step(step, query, context, &steps).await?;
            info!(
                step = %step.kind,
                role = %step.role,
                model = %self.generator.model_name(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Step finished"
            );
            steps.push(AnalysisStep {
                kind: step.kind,
                role: step.role.clone(),
                output,
            });
        }

        let aggregate = aggregate(&steps);
        Ok(AnalysisReport { steps, aggregate })
    }

    async fn run_step(
        &self,
        step: &StepDescriptor,
        query: &str,
        document_text: &str,
        prior: &[AnalysisStep],
    ) -> Result<String> {
        let search_results = match (&self.search, step.has(Capability::WebSearch)) {
            (Some(search), true) => {
                let hits = search.search(query).await?;
                debug!(step = %step.kind, hits = hits.len(), "Web search done");
                Some(format_hits(&hits))
            }
            _ => None,
        };

        let request = GenerationRequest::new(build_prompt(
            step,
            query,
            document_text,
            prior,
            search_results.as_deref(),
        ))
        .with_system_prompt(system_prompt(step, query));

        Ok(self.generator.generate(request).await?)
    }
}

fn system_prompt(step: &StepDescriptor, query: &str) -> String {
    format!(
        "You are a {}.\nGoal: {}\nBackground: {}",
        step.role,
        fill_query(&step.goal, query),
        step.backstory
    )
}

fn build_prompt(
    step: &StepDescriptor,
    query: &str,
    document_text: &str,
    prior: &[AnalysisStep],
    search_results: Option<&str>,
) -> String {
    let mut prompt = format!(
        "{}\n\nExpected output: {}\n\nUser query: {}",
        fill_query(&step.instructions, query),
        step.expected_output,
        query
    );

    if step.has(Capability::ReadDocument) {
        let body = if document_text.is_empty() {
            "(the document contains no extractable text)"
        } else {
            document_text
        };
        prompt.push_str("\n\n--- Document ---\n");
        prompt.push_str(body);
        prompt.push_str("\n--- End of document ---");
    }

    if !prior.is_empty() {
        prompt.push_str("\n\n--- Findings from earlier steps ---");
        for earlier in prior {
            prompt.push_str(&format!("\n\n### {}\n{}", earlier.role, earlier.output));
        }
    }

    if let Some(results) = search_results.filter(|r| !r.is_empty()) {
        prompt.push_str("\n\n--- Web search results ---\n");
        prompt.push_str(results);
    }

    prompt
}

/// One step: its output as is. Several: each under its role heading.
pub fn aggregate(steps: &[AnalysisStep]) -> String {
    match steps {
        [only] => only.output.clone(),
        _ => steps
            .iter()
            .map(|s| format!("## {}\n\n{}", s.role, s.output.trim()))
            .collect::<Vec<_>>()
            .join("\n\n"),
    }
}
