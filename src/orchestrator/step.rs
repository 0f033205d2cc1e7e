use serde::{Deserialize, Serialize};
use std::fmt;

/// The built-in analysis steps, in the order they are usually chained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Verify,
    Analyze,
    Investment,
    Risk,
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Verify => "verify",
            Self::Analyze => "analyze",
            Self::Investment => "investment",
            Self::Risk => "risk",
        };
        f.write_str(name)
    }
}

/// What a step may draw on besides earlier step outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// The extracted document text is included in the prompt.
    ReadDocument,
    /// Web search results for the query are included in the prompt.
    WebSearch,
}

/// A role-scoped unit of generation, described as plain data.
///
/// `instructions` and `goal` may contain a `{query}` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub struct StepDescriptor {
    pub kind: StepKind,
    pub role: String,
    pub goal: String,
    pub backstory: String,
    pub instructions: String,
    pub expected_output: String,
    pub capabilities: Vec<Capability>,
}

impl StepDescriptor {
    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    pub fn builtin(kind: StepKind) -> Self {
        match kind {
            StepKind::Verify => Self {
                kind,
                role: "Financial Document Verifier".into(),
                goal: "Confirm that the supplied file is a financial document and summarise \
                       the information relevant to the user's query: {query}."
                    .into(),
                backstory: "You come from regulatory compliance and review documents carefully \
                            for relevance and accuracy."
                    .into(),
                instructions: "Verify that the uploaded file is a financial document and give a \
                               short summary of its contents."
                    .into(),
                expected_output: "Confirmation of the document type and a brief summary of its \
                                  key sections."
                    .into(),
                capabilities: vec![Capability::ReadDocument],
            },
            StepKind::Analyze => Self {
                kind,
                role: "Senior Financial Analyst".into(),
                goal: "Analyse financial documents and answer the user's query: {query}. \
                       Give factual, well reasoned insights and state any uncertainty plainly."
                    .into(),
                backstory: "You have long experience reading financial statements and market \
                            trends, and your advice rests on data and sound financial principles."
                    .into(),
                instructions: "Examine the financial document and address the user's query: \
                               {query}. Use the document and, where provided, the web search \
                               results for extra context. Summarise the key findings and present \
                               actionable insights."
                    .into(),
                expected_output: "A clear, structured analysis citing the relevant figures from \
                                  the document and any supporting information found online."
                    .into(),
                capabilities: vec![Capability::ReadDocument, Capability::WebSearch],
            },
            StepKind::Investment => Self {
                kind,
                role: "Investment Advisor".into(),
                goal: "Suggest suitable investment approaches from the available financial \
                       information while outlining the risks."
                    .into(),
                backstory: "You build diversified portfolios and follow industry practice and \
                            regulation."
                    .into(),
                instructions: "Using the financial document, discuss possible investment \
                               opportunities and considerations related to the user's question: \
                               {query}."
                    .into(),
                expected_output: "A list of potential investment ideas, each with a short \
                                  explanation and its risk factors."
                    .into(),
                capabilities: vec![Capability::ReadDocument, Capability::WebSearch],
            },
            StepKind::Risk => Self {
                kind,
                role: "Risk Assessment Specialist".into(),
                goal: "Identify and explain the risks the financial document highlights and \
                       give balanced recommendations for mitigating them."
                    .into(),
                backstory: "You work in risk management and help investors see both the upside \
                            and the downside of a decision."
                    .into(),
                instructions: "Review the document for significant risks or uncertainties \
                               relevant to: {query}."
                    .into(),
                expected_output: "An overview of the key risk factors and, where possible, ways \
                                  to mitigate them."
                    .into(),
                capabilities: vec![Capability::ReadDocument],
            },
        }
    }
}

pub(crate) fn fill_query(template: &str, query: &str) -> String {
    template.replace("{query}", query)
}
