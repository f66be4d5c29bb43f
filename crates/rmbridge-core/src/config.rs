//! Client configuration.
//!
//! A `ClientConfig` is built once per client and never mutated afterwards.
//! Each client may point at its own config file, so independent sessions
//! can run side by side in one process.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::paths::{PathError, default_binary_path_with, expand_home};

/// Config file location used when none is given.
pub const DEFAULT_CONFIG_PATH: &str = "./.rmapi";

/// Default deadline for a single invocation of the external tool.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default deadline for one provisioning HTTP request, body included.
pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// Release index queried when the binary has to be provisioned.
pub const DEFAULT_RELEASE_INDEX_URL: &str =
    "https://api.github.com/repos/ddvk/rmapi/releases/latest";

/// Environment variables understood by the external tool.
pub const RMAPI_CONFIG_ENV: &str = "RMAPI_CONFIG";
pub const RMAPI_TRACE_ENV: &str = "RMAPI_TRACE";
pub const RMAPI_HIDDEN_ENV: &str = "RMAPI_USE_HIDDEN_FILES";

/// Environment variables understood by rmbridge itself.
pub const BIN_PATH_ENV: &str = "RMBRIDGE_BIN_PATH";
pub const TIMEOUT_ENV: &str = "RMBRIDGE_TIMEOUT_SECS";
pub const RELEASE_URL_ENV: &str = "RMBRIDGE_RELEASE_URL";
pub const DOWNLOAD_TIMEOUT_ENV: &str = "RMBRIDGE_DOWNLOAD_TIMEOUT_SECS";

/// Errors raised while assembling a configuration.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Path(#[from] PathError),

    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },
}

/// Immutable configuration owned by one client instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Authentication/config file of the external tool. Opaque to rmbridge.
    pub config_path: PathBuf,
    /// Verbose diagnostics from the external tool (`RMAPI_TRACE=1`).
    pub trace_enabled: bool,
    /// Include hidden entries in listings (`RMAPI_USE_HIDDEN_FILES=1`).
    pub include_hidden: bool,
    /// Where the managed executable lives.
    pub binary_path: PathBuf,
    /// Per-invocation deadline.
    pub timeout: Duration,
    /// Release index used by the provisioner.
    pub release_index_url: String,
    /// Deadline for each release index or archive request.
    pub download_timeout: Duration,
}

impl ClientConfig {
    /// Create a configuration for `config_path` with default settings.
    pub fn new(config_path: impl AsRef<str>) -> Result<Self, ConfigError> {
        let config_path = expand_home(config_path.as_ref())?;
        let binary_path = default_binary_path_with(|key| std::env::var(key).ok())?;
        Ok(Self {
            config_path,
            trace_enabled: false,
            include_hidden: false,
            binary_path,
            timeout: DEFAULT_TIMEOUT,
            release_index_url: DEFAULT_RELEASE_INDEX_URL.to_string(),
            download_timeout: DEFAULT_DOWNLOAD_TIMEOUT,
        })
    }

    /// Build a configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let config_path =
            expand_home(&lookup(RMAPI_CONFIG_ENV).unwrap_or_else(|| DEFAULT_CONFIG_PATH.into()))?;

        let binary_path = match lookup(BIN_PATH_ENV) {
            Some(raw) => expand_home(&raw)?,
            None => default_binary_path_with(&lookup)?,
        };

        let timeout = match lookup(TIMEOUT_ENV) {
            Some(raw) => parse_secs(TIMEOUT_ENV, &raw)?,
            None => DEFAULT_TIMEOUT,
        };
        let download_timeout = match lookup(DOWNLOAD_TIMEOUT_ENV) {
            Some(raw) => parse_secs(DOWNLOAD_TIMEOUT_ENV, &raw)?,
            None => DEFAULT_DOWNLOAD_TIMEOUT,
        };

        Ok(Self {
            config_path,
            trace_enabled: flag(lookup(RMAPI_TRACE_ENV)),
            include_hidden: flag(lookup(RMAPI_HIDDEN_ENV)),
            binary_path,
            timeout,
            release_index_url: lookup(RELEASE_URL_ENV)
                .unwrap_or_else(|| DEFAULT_RELEASE_INDEX_URL.to_string()),
            download_timeout,
        })
    }

    /// Replace the config file path.
    pub fn with_config_path(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.config_path = expand_home(raw)?;
        Ok(self)
    }

    /// Set the managed binary location.
    #[must_use]
    pub fn with_binary_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.binary_path = path.into();
        self
    }

    /// Enable or disable tool tracing.
    #[must_use]
    pub const fn with_trace(mut self, enabled: bool) -> Self {
        self.trace_enabled = enabled;
        self
    }

    /// Include or exclude hidden entries.
    #[must_use]
    pub const fn with_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// Set the invocation timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the release index URL.
    #[must_use]
    pub fn with_release_index_url(mut self, url: impl Into<String>) -> Self {
        self.release_index_url = url.into();
        self
    }

    /// Set the provisioning request deadline.
    #[must_use]
    pub const fn with_download_timeout(mut self, timeout: Duration) -> Self {
        self.download_timeout = timeout;
        self
    }

    /// Directory that holds the managed binary.
    pub fn install_dir(&self) -> &Path {
        self.binary_path.parent().unwrap_or_else(|| Path::new("."))
    }

    /// Environment overlay applied to every invocation.
    ///
    /// Both flags are always set so a value inherited from the parent
    /// environment can never leak into a client that disabled it.
    pub fn env_overrides(&self) -> BTreeMap<String, String> {
        let mut env = BTreeMap::new();
        env.insert(
            RMAPI_CONFIG_ENV.to_string(),
            self.config_path.to_string_lossy().into_owned(),
        );
        env.insert(RMAPI_TRACE_ENV.to_string(), bool_flag(self.trace_enabled));
        env.insert(RMAPI_HIDDEN_ENV.to_string(), bool_flag(self.include_hidden));
        env
    }
}

fn flag(value: Option<String>) -> bool {
    value.is_some_and(|v| matches!(v.trim(), "1" | "true" | "yes"))
}

fn bool_flag(enabled: bool) -> String {
    let value = if enabled { "1" } else { "0" };
    value.to_string()
}

fn parse_secs(key: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
        }),
    }
}
