use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Environment variable consulted when no config file is present.
pub const BASE_URL_ENV: &str = "CLQ_BACKEND_URL";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub backend: BackendConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    /// Base URL of the inference backend, e.g. `http://localhost:5000`.
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RegistryConfig {
    /// Seconds between automatic document-list refreshes in `clq watch`.
    #[serde(default = "default_poll_secs")]
    pub poll_secs: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            poll_secs: default_poll_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}
fn default_poll_secs() -> u64 {
    10
}

impl Config {
    /// Build a default config pointing at the given backend.
    ///
    /// Used when no config file exists but a base URL is known (for example
    /// from the `CLQ_BACKEND_URL` environment variable).
    pub fn from_base_url(base_url: &str) -> Self {
        Self {
            backend: BackendConfig {
                base_url: base_url.trim_end_matches('/').to_string(),
                timeout_secs: default_timeout_secs(),
            },
            registry: RegistryConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config: Config =
        toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    config.backend.base_url = config.backend.base_url.trim_end_matches('/').to_string();

    if config.backend.base_url.is_empty() {
        anyhow::bail!("backend.base_url must not be empty");
    }
    if config.backend.timeout_secs == 0 {
        anyhow::bail!("backend.timeout_secs must be >= 1");
    }
    if config.registry.poll_secs == 0 {
        anyhow::bail!("registry.poll_secs must be >= 1");
    }

    Ok(config)
}

/// Resolve configuration for the CLI.
///
/// Prefers the config file at `path`; falls back to `CLQ_BACKEND_URL` when
/// the file does not exist.
pub fn resolve_config(path: &Path) -> Result<Config> {
    if path.exists() {
        return load_config(path);
    }
    if let Ok(url) = std::env::var(BASE_URL_ENV) {
        if !url.trim().is_empty() {
            return Ok(Config::from_base_url(url.trim()));
        }
    }
    anyhow::bail!(
        "No config file at {} and {} is not set",
        path.display(),
        BASE_URL_ENV
    )
}
