//! Configuration module for hubfile.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, validation, defaults, and a builder pattern for programmatic use.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::usecases::upload_to_blob::UploadTimeouts;

/// File-upload REST API version understood by the hub.
pub const DEFAULT_API_VERSION: &str = "2016-11-14";

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for hubfile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub hub: HubConfig,
    pub upload: UploadConfig,
    pub logging: LoggingConfig,
}

/// Hub connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Hub host name, e.g. `my-hub.azure-devices.net`.
    pub host_name: String,
    /// Device identity registered with the hub.
    pub device_id: String,
    /// REST API version sent as the `api-version` query parameter.
    pub api_version: String,
    /// Device SAS token sent as the `Authorization` header. `None` when the
    /// transport authenticates by other means.
    pub sas_token: Option<String>,
}

/// Per-phase timeouts, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub credential_timeout_secs: u64,
    pub upload_timeout_secs: u64,
    pub notify_timeout_secs: u64,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
}

// ---------------------------------------------------------------------------
// Config::load()
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/hubfile/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("hubfile")
            .join("config.yaml")
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            host_name: String::new(),
            device_id: String::new(),
            api_version: DEFAULT_API_VERSION.to_string(),
            sas_token: None,
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            credential_timeout_secs: 30,
            upload_timeout_secs: 300,
            notify_timeout_secs: 30,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl From<&UploadConfig> for UploadTimeouts {
    fn from(cfg: &UploadConfig) -> Self {
        UploadTimeouts {
            credential: Duration::from_secs(cfg.credential_timeout_secs),
            upload: Duration::from_secs(cfg.upload_timeout_secs),
            notify: Duration::from_secs(cfg.notify_timeout_secs),
        }
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"upload.upload_timeout_secs"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- hub ---
        if self.hub.host_name.trim().is_empty() {
            errors.push(ValidationError {
                field: "hub.host_name".into(),
                message: "must not be empty".into(),
            });
        } else if self.hub.host_name.contains("://") || self.hub.host_name.contains('/') {
            errors.push(ValidationError {
                field: "hub.host_name".into(),
                message: format!(
                    "expected a bare host name, got '{}'",
                    self.hub.host_name
                ),
            });
        }
        if self.hub.device_id.trim().is_empty() {
            errors.push(ValidationError {
                field: "hub.device_id".into(),
                message: "must not be empty".into(),
            });
        }
        if self.hub.api_version.trim().is_empty() {
            errors.push(ValidationError {
                field: "hub.api_version".into(),
                message: "must not be empty".into(),
            });
        }

        // --- upload ---
        for (field, value) in [
            (
                "upload.credential_timeout_secs",
                self.upload.credential_timeout_secs,
            ),
            ("upload.upload_timeout_secs", self.upload.upload_timeout_secs),
            ("upload.notify_timeout_secs", self.upload.notify_timeout_secs),
        ] {
            if value == 0 {
                errors.push(ValidationError {
                    field: field.into(),
                    message: "must be greater than 0".into(),
                });
            }
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust
/// use hubfile_core::config::ConfigBuilder;
///
/// let config = ConfigBuilder::new()
///     .hub_host_name("my-hub.azure-devices.net")
///     .hub_device_id("sensor-01")
///     .upload_timeout_secs(120)
///     .build();
/// assert!(config.validate().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    // --- hub ---

    pub fn hub_host_name(mut self, host: impl Into<String>) -> Self {
        self.config.hub.host_name = host.into();
        self
    }

    pub fn hub_device_id(mut self, device_id: impl Into<String>) -> Self {
        self.config.hub.device_id = device_id.into();
        self
    }

    pub fn hub_api_version(mut self, version: impl Into<String>) -> Self {
        self.config.hub.api_version = version.into();
        self
    }

    pub fn hub_sas_token(mut self, token: impl Into<String>) -> Self {
        self.config.hub.sas_token = Some(token.into());
        self
    }

    // --- upload ---

    pub fn credential_timeout_secs(mut self, secs: u64) -> Self {
        self.config.upload.credential_timeout_secs = secs;
        self
    }

    pub fn upload_timeout_secs(mut self, secs: u64) -> Self {
        self.config.upload.upload_timeout_secs = secs;
        self
    }

    pub fn notify_timeout_secs(mut self, secs: u64) -> Self {
        self.config.upload.notify_timeout_secs = secs;
        self
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    /// Consume the builder and return the final [`Config`].
    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
