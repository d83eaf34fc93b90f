//! Configuration Management
//!
//! Handles the persistent configuration file for netctl and the precedence
//! between CLI flags, environment and the file.

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENDPOINT_ENV: &str = "NETCTL_ENDPOINT";
pub const TOKEN_ENV: &str = "NETCTL_TOKEN";

/// User configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Control-plane API endpoint
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Bearer token sent with every request
    #[serde(default)]
    pub token: Option<String>,
    /// Per-command timeout in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Get the default config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("netctl").join("config.json"))
    }

    /// Load configuration from `path`, or the default location
    ///
    /// A missing file gives the defaults. An unreadable or malformed file also
    /// gives the defaults, with a warning.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path.map(Path::to_path_buf).or_else(Self::config_path) else {
            return Self::default();
        };

        if !path.exists() {
            tracing::debug!("No config file at {:?}", path);
            return Self::default();
        }

        match Self::read(&path) {
            Ok(config) => {
                tracing::debug!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                tracing::warn!("Ignoring config file {:?}: {:#}", path, e);
                Self::default()
            }
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).context("failed to read config")?;
        serde_json::from_str(&content).context("failed to parse config")
    }

    /// Get effective endpoint (CLI > env > config > default)
    pub fn effective_endpoint<E>(&self, cli: Option<&str>, env: E) -> String
    where
        E: Fn(&str) -> Option<String>,
    {
        cli.map(str::to_string)
            .or_else(|| non_empty(env(ENDPOINT_ENV)))
            .or_else(|| non_empty(self.endpoint.clone()))
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
    }

    /// Get effective token (env > config)
    pub fn effective_token<E>(&self, env: E) -> Option<String>
    where
        E: Fn(&str) -> Option<String>,
    {
        non_empty(env(TOKEN_ENV)).or_else(|| non_empty(self.token.clone()))
    }

    /// Get effective timeout (CLI > config > default); zero disables it
    pub fn effective_timeout(&self, cli: Option<u64>) -> Option<Duration> {
        let secs = cli
            .or(self.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        (secs > 0).then(|| Duration::from_secs(secs))
    }
}

/// Process environment lookup for the `effective_*` methods
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
