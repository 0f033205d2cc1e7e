use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use findoc::{AppState, Config};

/// Financial document analysis service.
#[derive(Parser, Debug)]
#[command(name = "findoc", version, about)]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, env = "FINDOC_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory for request-scoped uploads
    #[arg(long)]
    work_dir: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(host) = cli.host {
        config.gateway.host = host;
    }
    if let Some(port) = cli.port {
        config.gateway.port = port;
    }
    if let Some(dir) = cli.work_dir {
        config.storage.work_dir = dir;
    }

    if config.llm.api_key.is_none() {
        tracing::warn!(
            "OPENAI_API_KEY not set; analysis requests will fail unless llm.api_url points at a \
             server that needs no key"
        );
    }

    let state = Arc::new(AppState::from_config(&config)?);
    findoc::serve(state, &config.gateway).await
}
