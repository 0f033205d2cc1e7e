//! Error types for the document analysis pipeline.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// The uploaded file could not be persisted or removed.
    #[error("storage error: {0}")]
    Storage(String),

    /// Extraction was attempted on a path with no backing file.
    #[error("PDF file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The file is not a parseable PDF.
    #[error("invalid document: {0}")]
    Format(String),

    /// The language-model or search collaborator failed.
    #[error("generation failed: {0}")]
    Generation(String),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;

/// Failure talking to an external text-generation or search service.
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("{service}: no API key configured")]
    MissingCredential { service: &'static str },

    #[error("{service} API error {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("{service} request failed: {message}")]
    Transport {
        service: &'static str,
        message: String,
        timeout: bool,
    },

    #[error("failed to parse {service} response: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },

    #[error("{service} returned an empty completion")]
    Empty { service: &'static str },
}

impl UpstreamError {
    pub(crate) fn transport(service: &'static str, err: reqwest::Error) -> Self {
        Self::Transport {
            service,
            timeout: err.is_timeout(),
            message: err.to_string(),
        }
    }

    /// Rate limiting, server-side failures and transport hiccups may succeed on a later try.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Transport { .. } => true,
            Self::MissingCredential { .. } | Self::Decode { .. } | Self::Empty { .. } => false,
        }
    }
}

impl From<UpstreamError> for AnalyzerError {
    fn from(err: UpstreamError) -> Self {
        AnalyzerError::Generation(err.to_string())
    }
}
