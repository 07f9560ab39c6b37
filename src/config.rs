use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;

/// Env var naming an explicit configuration file
pub const CONFIG_PATH_ENV: &str = "PDF_TRANSLATE_CONFIG";
/// Prefix for overrides such as `PDF_TRANSLATE__API__BASE_URL`
pub const ENV_PREFIX: &str = "PDF_TRANSLATE";
/// Looked up as `pdf-translate.{toml,yaml,json}` in the working directory
pub const DEFAULT_CONFIG_STEM: &str = "pdf-translate";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Prefixed to `base_url` when it is a bare path such as `/api`
    #[serde(default = "default_origin")]
    pub origin: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_upload_timeout_ms")]
    pub upload_timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_base_url() -> String {
    "/api".to_string()
}

fn default_origin() -> String {
    "http://localhost:5000".to_string()
}

fn default_timeout_ms() -> u64 {
    300_000
}

fn default_upload_timeout_ms() -> u64 {
    60_000
}

fn default_log_filter() -> String {
    "pdf_translate_client=info".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            origin: default_origin(),
            timeout_ms: default_timeout_ms(),
            upload_timeout_ms: default_upload_timeout_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl AppConfig {
    /// Load from the file named by `PDF_TRANSLATE_CONFIG` (or the optional
    /// default file) and apply `PDF_TRANSLATE__*` environment overrides on top.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV).ok();
        Self::load_from(path.as_deref())
    }

    pub fn load_from(path: Option<&str>) -> Result<Self, ConfigError> {
        let builder = ::config::Config::builder();
        let builder = match path {
            Some(path) => builder.add_source(::config::File::from(Path::new(path))),
            None => builder.add_source(::config::File::with_name(DEFAULT_CONFIG_STEM).required(false)),
        };

        let settings = builder
            .add_source(::config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_millis(self.upload_timeout_ms)
    }

    /// Absolute base URL: `base_url` as-is when it already has a scheme,
    /// otherwise resolved against `origin`.
    pub fn resolved_base_url(&self) -> Result<String, ConfigError> {
        if let Ok(url) = reqwest::Url::parse(&self.base_url) {
            return Ok(url.to_string());
        }

        let origin = reqwest::Url::parse(&self.origin).map_err(|e| ConfigError::InvalidBaseUrl {
            url: self.origin.clone(),
            reason: e.to_string(),
        })?;
        let joined = origin
            .join(&self.base_url)
            .map_err(|e| ConfigError::InvalidBaseUrl {
                url: self.base_url.clone(),
                reason: e.to_string(),
            })?;
        Ok(joined.to_string())
    }
}
