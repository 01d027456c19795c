//! # Service Configuration
//!
//! JSON config file with serde defaults for every field, overridden by
//! environment variables (`SPREADSHEET_ID`, `PORT`; credentials come from
//! `GOOGLE_CREDENTIALS`).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cache::CacheConfig;
use crate::http_server::HttpServerConfig;
use crate::inventory::{ConsistencyConfig, ServiceOptions, DEFAULT_PAGE};
use crate::observability::LogFormat;
use crate::sheets::auth::CREDENTIALS_ENV;
use crate::sheets::{ServiceAccountKey, SheetsClientConfig};

/// Environment variable naming the spreadsheet
pub const SPREADSHEET_ID_ENV: &str = "SPREADSHEET_ID";

/// Environment variable overriding the listen port
pub const PORT_ENV: &str = "PORT";

/// Longest cache lifetime accepted, in seconds
pub const MAX_TTL_SECS: u64 = 60;

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {message}")]
    Read { path: String, message: String },

    #[error("Invalid config JSON: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error("Missing setting: {0}")]
    Missing(String),
}

/// Sheets API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetsApiConfig {
    /// API root (default: "https://sheets.googleapis.com/v4")
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Per-request timeout in seconds (default: 30)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_base() -> String {
    "https://sheets.googleapis.com/v4".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for SheetsApiConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    pub server: HttpServerConfig,

    /// Category listed when `pagina` is omitted (default: "freios")
    #[serde(default = "default_page")]
    pub default_page: String,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Spreadsheet id (overridden by `SPREADSHEET_ID`)
    #[serde(default)]
    pub spreadsheet_id: Option<String>,

    /// Service-account key file, used when `GOOGLE_CREDENTIALS` is unset
    #[serde(default)]
    pub credentials_path: Option<PathBuf>,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub consistency: ConsistencyConfig,

    #[serde(default)]
    pub sheets: SheetsApiConfig,
}

fn default_page() -> String {
    DEFAULT_PAGE.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: HttpServerConfig::default(),
            default_page: default_page(),
            log_format: LogFormat::default(),
            spreadsheet_id: None,
            credentials_path: None,
            cache: CacheConfig::default(),
            consistency: ConsistencyConfig::default(),
            sheets: SheetsApiConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let config: Config =
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Load from `path` if it exists, otherwise start from defaults.
    /// Environment overrides are applied either way.
    pub fn resolve(path: &Path) -> ConfigResult<Self> {
        Self::resolve_with(path, |name| std::env::var(name).ok())
    }

    /// `resolve` with overrides taken from `lookup` instead of the environment
    pub fn resolve_with(
        path: &Path,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> ConfigResult<Self> {
        let mut config = if path.exists() {
            Self::load(path)?
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Self::default()
        };

        config.apply_overrides(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment-style overrides from `lookup`
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> ConfigResult<()> {
        if let Some(id) = lookup(SPREADSHEET_ID_ENV).filter(|v| !v.trim().is_empty()) {
            self.spreadsheet_id = Some(id.trim().to_string());
        }

        if let Some(port) = lookup(PORT_ENV) {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("{} is not a port: '{}'", PORT_ENV, port)))?;
        }

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("port must be > 0".to_string()));
        }

        if self.default_page.trim().is_empty() {
            return Err(ConfigError::Invalid("default_page must not be empty".to_string()));
        }

        if self.cache.worksheet_ttl_secs > MAX_TTL_SECS || self.cache.listing_ttl_secs > MAX_TTL_SECS
        {
            return Err(ConfigError::Invalid(format!(
                "cache lifetimes must be at most {} seconds",
                MAX_TTL_SECS
            )));
        }

        if self.sheets.timeout_secs == 0 {
            return Err(ConfigError::Invalid("sheets.timeout_secs must be > 0".to_string()));
        }

        Ok(())
    }

    /// Options for the inventory service
    pub fn service_options(&self) -> ServiceOptions {
        ServiceOptions {
            default_page: self.default_page.clone(),
            cache: self.cache.clone(),
            consistency: self.consistency.clone(),
        }
    }

    /// Settings for the Sheets client; requires a spreadsheet id
    pub fn sheets_client_config(&self) -> ConfigResult<SheetsClientConfig> {
        let spreadsheet_id = self.spreadsheet_id.clone().ok_or_else(|| {
            ConfigError::Missing(format!(
                "spreadsheet id (set {} or spreadsheet_id)",
                SPREADSHEET_ID_ENV
            ))
        })?;

        Ok(SheetsClientConfig {
            api_base: self.sheets.api_base.clone(),
            spreadsheet_id,
            timeout: Duration::from_secs(self.sheets.timeout_secs),
        })
    }

    /// Service-account key from `GOOGLE_CREDENTIALS`, else from `credentials_path`
    pub fn credentials(&self) -> ConfigResult<ServiceAccountKey> {
        let key = if std::env::var_os(CREDENTIALS_ENV).is_some() {
            ServiceAccountKey::from_env()
        } else if let Some(path) = &self.credentials_path {
            ServiceAccountKey::from_file(path)
        } else {
            return Err(ConfigError::Missing(format!(
                "credentials (set {} or credentials_path)",
                CREDENTIALS_ENV
            )));
        };

        key.map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}
