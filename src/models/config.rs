//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::Location;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Open-data endpoint and HTTP behavior
    #[serde(default)]
    pub api: ApiConfig,

    /// Alert poller settings
    #[serde(default)]
    pub poller: PollerConfig,

    /// Files used by the application
    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Location used when none is given on the command line
    #[serde(default)]
    pub location: Location,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Replace the API key with `CWA_API_KEY` when that variable is set.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var(defaults::API_KEY_ENV) {
            if !key.trim().is_empty() {
                self.api.api_key = key;
            }
        }
        self
    }

    /// Validate configuration values for basic sanity.
    ///
    /// The API key is checked separately by [`require_api_key`](Self::require_api_key),
    /// since local-only commands run without it.
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(AppError::validation("api.base_url is empty"));
        }
        if self.api.alert_dataset.trim().is_empty() {
            return Err(AppError::validation("api.alert_dataset is empty"));
        }
        if self.api.user_agent.trim().is_empty() {
            return Err(AppError::validation("api.user_agent is empty"));
        }
        if self.api.timeout_secs == 0 {
            return Err(AppError::validation("api.timeout_secs must be > 0"));
        }
        if self.poller.interval_secs == 0 {
            return Err(AppError::validation("poller.interval_secs must be > 0"));
        }
        if self.poller.fingerprint_key.trim().is_empty() {
            return Err(AppError::validation("poller.fingerprint_key is empty"));
        }
        url::Url::parse(&self.api.base_url)?;
        Ok(())
    }

    /// Fail unless an API key is configured. Needed before any feed request.
    pub fn require_api_key(&self) -> Result<()> {
        if self.api.api_key.trim().is_empty() {
            return Err(AppError::validation(
                "api.api_key is empty (set it in config or CWA_API_KEY)",
            ));
        }
        Ok(())
    }
}

/// Open-data REST endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Datastore root; dataset ids are appended as a path segment
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Value of the `Authorization` query parameter
    #[serde(default = "defaults::api_key")]
    pub api_key: String,

    /// Dataset id of the weather alert feed
    #[serde(default = "defaults::alert_dataset")]
    pub alert_dataset: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            api_key: defaults::api_key(),
            alert_dataset: defaults::alert_dataset(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Alert poller settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerConfig {
    /// Delay between poll cycles in seconds
    #[serde(default = "defaults::interval")]
    pub interval_secs: u64,

    /// Storage key of the persisted alert fingerprint
    #[serde(default = "defaults::fingerprint_key")]
    pub fingerprint_key: String,

    /// Delay before the host restarts a poller run that failed
    #[serde(default = "defaults::restart_delay")]
    pub restart_delay_secs: u64,
}

impl PollerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn restart_delay(&self) -> Duration {
        Duration::from_secs(self.restart_delay_secs)
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_secs: defaults::interval(),
            fingerprint_key: defaults::fingerprint_key(),
            restart_delay_secs: defaults::restart_delay(),
        }
    }
}

/// File locations, relative to the working directory unless absolute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Key/value state file (alert fingerprint, saved locations)
    #[serde(default = "defaults::state_file")]
    pub state_file: String,

    /// County/township table
    #[serde(default = "defaults::gazetteer_file")]
    pub gazetteer_file: String,
}

impl PathsConfig {
    /// Key/value state file, resolved against `base` when relative.
    pub fn state_path(&self, base: &Path) -> PathBuf {
        base.join(&self.state_file)
    }

    /// Gazetteer file, resolved against `base` when relative.
    pub fn gazetteer_path(&self, base: &Path) -> PathBuf {
        base.join(&self.gazetteer_file)
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            state_file: defaults::state_file(),
            gazetteer_file: defaults::gazetteer_file(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    pub const API_KEY_ENV: &str = "CWA_API_KEY";

    // API defaults
    pub fn base_url() -> String {
        "https://opendata.cwa.gov.tw/api/v1/rest/datastore".into()
    }
    pub fn api_key() -> String {
        String::new()
    }
    pub fn alert_dataset() -> String {
        "W-C0033-002".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; rainbow-weather/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Poller defaults
    pub fn interval() -> u64 {
        60
    }
    pub fn fingerprint_key() -> String {
        "alertsId".into()
    }
    pub fn restart_delay() -> u64 {
        60
    }

    // Path defaults
    pub fn state_file() -> String {
        "state.json".into()
    }
    pub fn gazetteer_file() -> String {
        "counties.json".into()
    }

    pub fn log_level() -> String {
        "info".into()
    }
}
