//! Sequential, role-scoped analysis steps over one document and one query.

pub mod pipeline;
pub mod step;

pub use pipeline::{aggregate, AnalysisReport, AnalysisStep, Orchestrator};
pub use step::{Capability, StepDescriptor, StepKind};
