//! HTTP gateway: `GET /` liveness and `POST /analyze` uploads.

pub mod handler;
pub mod routes;

pub use handler::{normalize_query, AnalysisHandler, AnalysisResult, DEFAULT_QUERY};

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::{Config, GatewayConfig};
use crate::document::DocumentStore;
use crate::llm::build_generator;
use crate::orchestrator::Orchestrator;
use crate::search::build_search;

/// Shared, read-only state for every request.
pub struct AppState {
    pub handler: AnalysisHandler,
}

impl AppState {
    pub fn new(handler: AnalysisHandler) -> Self {
        Self { handler }
    }

    /// Wire the store, collaborators and pipeline from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let generator = build_generator(&config.llm)?;
        let search = build_search(&config.search)?;
        let orchestrator = Orchestrator::from_kinds(generator, &config.pipeline.steps)
            .with_search(search)
            .with_max_context_chars(config.pipeline.max_context_chars);
        let store = DocumentStore::new(&config.storage.work_dir);

        info!(
            work_dir = %store.base_dir().display(),
            steps = ?config.pipeline.steps,
            model = %config.llm.model,
            search = config.search.enabled,
            "Pipeline configured"
        );

        Ok(Self::new(AnalysisHandler::new(store, orchestrator)))
    }
}

pub fn create_router(state: Arc<AppState>, config: &GatewayConfig) -> Router {
    let router = Router::new()
        .route("/", get(routes::health))
        .route("/analyze", post(routes::analyze))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    match config.request_timeout_secs {
        Some(secs) => router.layer(TimeoutLayer::new(Duration::from_secs(secs))),
        None => router,
    }
}

/// Bind and serve until Ctrl-C.
pub async fn serve(state: Arc<AppState>, config: &GatewayConfig) -> Result<()> {
    let listener = TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", config.host, config.port))?;
    info!(addr = %listener.local_addr()?, "Starting findoc gateway");

    axum::serve(listener, create_router(state, config))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Gateway server error")?;

    info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
