//! findoc: upload a financial PDF, get a language-model analysis back.
//!
//! A request flows through four parts:
//!
//! - [`document`] stores the upload under a unique name and extracts its text
//! - [`orchestrator`] runs a fixed sequence of role-scoped steps over it
//! - [`llm`] and [`search`] are the text-generation and web-search backends
//! - [`gateway`] exposes it all over HTTP and cleans up after every request

pub mod config;
pub mod document;
pub mod error;
pub mod gateway;
pub mod llm;
pub mod orchestrator;
pub mod search;

pub use config::Config;
pub use error::{AnalyzerError, Result, UpstreamError};
pub use gateway::{create_router, serve, AnalysisHandler, AnalysisResult, AppState};
