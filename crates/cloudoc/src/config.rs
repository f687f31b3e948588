use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::auth::TokenKind;

const APP_NAME: &str = "cloudoc";
const CONFIG_FILE: &str = "config.json";

pub const DEFAULT_BASE_URL: &str = "https://open.feishu.cn";

/// Transport and credential settings for a [`Client`](crate::Client)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Upper bound for every outbound call, token refreshes included
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Tokens are refreshed once they have less than this long left to live
    #[serde(default = "default_refresh_margin")]
    pub token_refresh_margin_secs: i64,
    #[serde(default)]
    pub token_kind: TokenKind,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_refresh_margin() -> i64 {
    300
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            token_refresh_margin_secs: default_refresh_margin(),
            token_kind: TokenKind::default(),
        }
    }
}

impl ClientConfig {
    /// Creates a configuration pointing at `base_url` with default settings
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_refresh_margin(mut self, secs: i64) -> Self {
        self.token_refresh_margin_secs = secs;
        self
    }

    pub fn with_token_kind(mut self, kind: TokenKind) -> Self {
        self.token_kind = kind;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn refresh_margin(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.token_refresh_margin_secs.max(0))
    }

    /// Joins `path` onto the base URL
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Loads `<config dir>/cloudoc/config.json`, falling back to defaults
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_dir()?.join(CONFIG_FILE))
    }

    /// Loads configuration from `path`; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&data).context("Failed to parse config file")
    }

    /// Returns the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        Ok(dirs::config_dir()
            .context("Could not determine config directory")?
            .join(APP_NAME))
    }
}
