//! HTTP route handlers.

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::error;

use super::AppState;
use crate::error::AnalyzerError;

pub const HEALTH_MESSAGE: &str = "Financial Document Analyzer API is running";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub message: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        message: HEALTH_MESSAGE,
    })
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub status: &'static str,
    pub query: String,
    pub analysis: String,
    pub file_processed: String,
}

/// Error body shared by every failure: `{"detail": "..."}`.
#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

#[derive(Debug)]
pub enum ApiError {
    /// Anything that went wrong while storing, extracting or analyzing.
    Processing(AnalyzerError),
    /// The request itself was unusable.
    Invalid { status: StatusCode, detail: String },
}

impl ApiError {
    /// Unreadable uploads are 422, except bodies over the size limit.
    fn unreadable(status: StatusCode, detail: String) -> Self {
        let status = if status == StatusCode::PAYLOAD_TOO_LARGE {
            status
        } else {
            StatusCode::UNPROCESSABLE_ENTITY
        };
        ApiError::Invalid { status, detail }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::unreadable(err.status(), err.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::unreadable(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::Processing(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error processing financial document: {e}"),
            ),
            ApiError::Invalid { status, detail } => (status, detail),
        };
        (status, Json(ErrorBody { detail })).into_response()
    }
}

struct Upload {
    filename: String,
    bytes: Vec<u8>,
    query: Option<String>,
}

async fn read_upload(mut multipart: Multipart) -> Result<Upload, ApiError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut query = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                file = Some((filename, bytes.to_vec()));
            }
            Some("query") => query = Some(field.text().await?),
            _ => {}
        }
    }

    let (filename, bytes) = file.ok_or_else(|| ApiError::Invalid {
        status: StatusCode::UNPROCESSABLE_ENTITY,
        detail: "Field required: file".to_string(),
    })?;

    Ok(Upload {
        filename,
        bytes,
        query,
    })
}

/// `POST /analyze`: multipart `file` plus optional `query`.
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let upload = read_upload(multipart?).await?;

    let result = state
        .handler
        .handle(&upload.bytes, &upload.filename, upload.query.as_deref())
        .await
        .map_err(|e| {
            error!(filename = %upload.filename, error = %e, "Analysis failed");
            ApiError::Processing(e)
        })?;

    Ok(Json(AnalyzeResponse {
        status: "success",
        query: result.query,
        analysis: result.analysis,
        file_processed: result.filename,
    }))
}
