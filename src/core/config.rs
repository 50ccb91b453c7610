use anyhow::{Result, anyhow};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use url::Url;

use crate::core::market::UserSeed;
use crate::core::relay::{Agent, PollSettings};

pub const DEFAULT_BASE_URL: &str = "https://api-f1db6c.stack.tryrelevance.com/latest/";
pub const CONFIG_ENV: &str = "AGENTMART_CONFIG";
pub const BASE_URL_ENV: &str = "AGENTMART_BASE_URL";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub relay: RelayConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub users: Vec<UserSeed>,

    #[serde(default)]
    pub agents: Vec<Agent>,

    /// File the config was read from, if any.
    #[serde(skip)]
    pub source: Option<PathBuf>,

    #[serde(skip)]
    pub base_url_from_env: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Per-request HTTP timeout.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_max_attempts() -> u32 {
    10
}
fn default_poll_interval_secs() -> u64 {
    3
}
fn default_request_timeout_secs() -> u64 {
    30
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            max_attempts: default_max_attempts(),
            poll_interval_secs: default_poll_interval_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl RelayConfig {
    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            max_attempts: self.max_attempts,
            interval: Duration::from_secs(self.poll_interval_secs),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// `~/.agentmart/config.toml`, unless `AGENTMART_CONFIG` points elsewhere.
pub fn default_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV)
        && !path.is_empty()
    {
        return Some(PathBuf::from(path));
    }
    dirs::home_dir().map(|home| home.join(".agentmart").join("config.toml"))
}

impl AppConfig {
    /// Loads and validates the config. A missing file yields defaults.
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => default_config_path(),
        };
        let mut config = match path {
            Some(ref p) if p.exists() => {
                let content = tokio::fs::read_to_string(p).await?;
                let mut parsed: AppConfig = toml::from_str(&content)
                    .map_err(|e| anyhow!("Invalid config {}: {}", p.display(), e))?;
                parsed.source = Some(p.clone());
                parsed
            }
            _ => AppConfig::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup(BASE_URL_ENV).filter(|v| !v.is_empty()) {
            self.relay.base_url = base_url;
            self.base_url_from_env = true;
        }
    }

    /// Loading happens before the subscriber exists, so where the config
    /// came from is reported once logging is up.
    pub fn log_source(&self) {
        match &self.source {
            Some(path) => info!("Loaded config from {}", path.display()),
            None => info!("No config file found, using defaults."),
        }
        if self.base_url_from_env {
            info!("Using base URL from {}", BASE_URL_ENV);
        }
    }

    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.relay.base_url)
            .map_err(|e| anyhow!("relay.base_url '{}' is invalid: {}", self.relay.base_url, e))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(anyhow!(
                "relay.base_url must be http(s), got '{}'",
                url.scheme()
            ));
        }
        if self.relay.max_attempts == 0 {
            return Err(anyhow!("relay.max_attempts must be at least 1"));
        }
        Ok(())
    }
}
