//! Client configuration loaded with figment
//!
//! Sources are merged in precedence order (later overrides earlier):
//! 1. Built-in defaults
//! 2. An optional config file (TOML, YAML or JSON, chosen by extension)
//! 3. Environment variables prefixed with `KANBAN_SYNC_`

use crate::error::{Result, SyncError};
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Prefix for environment overrides, e.g. `KANBAN_SYNC_BASE_URL`
pub const ENV_PREFIX: &str = "KANBAN_SYNC_";

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_REALTIME_CAPACITY: usize = 64;

/// Settings for talking to the board store and the realtime channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Root of the REST API; endpoint paths are appended to it
    pub base_url: String,
    /// Per-request timeout. Requests are never retried.
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Sent as a bearer token when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    /// Events buffered per board before slow subscribers start lagging
    pub realtime_capacity: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: format!("kanban-sync/{}", env!("CARGO_PKG_VERSION")),
            api_token: None,
            realtime_capacity: DEFAULT_REALTIME_CAPACITY,
        }
    }
}

impl SyncConfig {
    /// Build the figment with every source in precedence order
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(path) = file {
            debug!("Loading config file: {}", path.display());
            figment = match path.extension().and_then(|e| e.to_str()) {
                Some("yaml") | Some("yml") => figment.merge(Yaml::file(path)),
                Some("json") => figment.merge(Json::file(path)),
                _ => figment.merge(Toml::file(path)),
            };
        }

        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Load and validate configuration
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let config: Self = Self::figment(file).extract()?;
        config.validate()?;
        debug!(base_url = %config.base_url, "Loaded sync configuration");
        Ok(config)
    }

    /// Reject values that would only fail later, at request time
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.base_url)?;
        if url.cannot_be_a_base() {
            return Err(SyncError::invalid_config(
                "base_url",
                "must be a hierarchical URL such as http://host/api/",
            ));
        }
        if self.timeout_secs == 0 {
            return Err(SyncError::invalid_config("timeout_secs", "must be at least 1"));
        }
        if self.realtime_capacity == 0 {
            return Err(SyncError::invalid_config(
                "realtime_capacity",
                "must be at least 1",
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
