//! Service configuration: TOML file, then environment overrides.

pub mod schema;

pub use schema::{Config, GatewayConfig, LlmConfig, PipelineConfig, SearchConfig, StorageConfig};

use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default config location, e.g. `~/.config/findoc/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "findoc").map(|dirs| dirs.config_dir().join("config.toml"))
}

impl Config {
    /// Load from `path` (must exist), else from the default location if
    /// present, else built-in defaults. Environment overrides apply last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path().filter(|p| p.is_file()) {
                Some(path) => Self::from_file(&path)?,
                None => {
                    info!("No config file found, using defaults");
                    Self::default()
                }
            },
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let expanded = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).to_string());
        let raw = std::fs::read_to_string(&expanded)
            .with_context(|| format!("Failed to read config file {}", expanded.display()))?;
        let config: Self = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", expanded.display()))?;
        info!(path = %expanded.display(), "Loaded configuration");
        Ok(config)
    }

    /// Apply environment overrides using `lookup` to read variables.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(host) = non_empty("FINDOC_HOST") {
            self.gateway.host = host;
        }
        if let Some(port) = non_empty("FINDOC_PORT").and_then(|p| p.trim().parse().ok()) {
            self.gateway.port = port;
        }
        if let Some(dir) = non_empty("FINDOC_WORK_DIR") {
            self.storage.work_dir = dir;
        }
        if let Some(url) = non_empty("OPENAI_API_BASE") {
            self.llm.api_url = Some(url);
        }
        if let Some(key) = non_empty("OPENAI_API_KEY") {
            self.llm.api_key = Some(key);
        }
        if let Some(model) = non_empty("OPENAI_MODEL_NAME") {
            self.llm.model = model;
        }
        if let Some(key) = non_empty("SERPER_API_KEY") {
            self.search.api_key = Some(key);
            self.search.enabled = true;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.pipeline.steps.is_empty() {
            bail!("pipeline.steps must name at least one step");
        }
        if self.pipeline.max_context_chars == 0 {
            bail!("pipeline.max_context_chars must be greater than zero");
        }
        if self.gateway.max_upload_bytes == 0 {
            bail!("gateway.max_upload_bytes must be greater than zero");
        }
        if self.llm.max_requests_per_minute == Some(0) {
            bail!("llm.max_requests_per_minute must be greater than zero when set");
        }
        if self.llm.model.trim().is_empty() {
            bail!("llm.model must not be empty");
        }
        Ok(())
    }
}
