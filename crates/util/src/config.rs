//! Runtime configuration for ceprace.
//!
//! Settings are layered, later layers winning:
//!
//! 1. built-in defaults
//! 2. a JSON file (`CEPRACE_CONFIG_PATH`, or `config.json` under the
//!    platform config directory, e.g. `~/.config/ceprace/config.json`)
//! 3. `CEPRACE_*` environment variables
//! 4. command-line overrides ([`SettingsOverrides`])
//!
//! A missing default config file is not an error; a missing file that was
//! asked for explicitly is.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ceprace_types::ProviderKind;
use dirs_next::config_dir;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::expand_tilde;

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "CEPRACE_CONFIG_PATH";
pub const TIMEOUT_ENV: &str = "CEPRACE_TIMEOUT_MS";
pub const BRASILAPI_BASE_ENV: &str = "CEPRACE_BRASILAPI_BASE";
pub const VIACEP_BASE_ENV: &str = "CEPRACE_VIACEP_BASE";
/// Comma-separated provider names, e.g. `viacep,brasilapi`.
pub const PROVIDERS_ENV: &str = "CEPRACE_PROVIDERS";

pub const CONFIG_FILE_NAME: &str = "config.json";

pub const DEFAULT_TIMEOUT_MS: u64 = 1000;
pub const DEFAULT_BRASILAPI_BASE_URL: &str = "https://brasilapi.com.br";
pub const DEFAULT_VIACEP_BASE_URL: &str = "http://viacep.com.br";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}

/// Effective settings for one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Overall race deadline in milliseconds.
    pub timeout_ms: u64,
    pub brasilapi_base_url: String,
    pub viacep_base_url: String,
    /// Providers to race, in dispatch order.
    pub providers: Vec<ProviderKind>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            brasilapi_base_url: DEFAULT_BRASILAPI_BASE_URL.to_string(),
            viacep_base_url: DEFAULT_VIACEP_BASE_URL.to_string(),
            providers: ProviderKind::ALL.to_vec(),
        }
    }
}

/// Values supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub timeout_ms: Option<u64>,
    pub providers: Option<Vec<ProviderKind>>,
}

impl Settings {
    /// Load settings from the file, the environment and `overrides`.
    ///
    /// `config_path` takes precedence over `CEPRACE_CONFIG_PATH` and the
    /// default location.
    pub fn load(config_path: Option<&Path>, overrides: SettingsOverrides) -> Result<Self, ConfigError> {
        let mut settings = match config_path {
            Some(path) => Self::from_file(path)?,
            None => {
                let path = default_config_path();
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    debug!(path = %path.display(), "no config file; using defaults");
                    Self::default()
                }
            }
        };
        settings.apply_env()?;
        settings.apply_overrides(overrides);
        settings.validate()?;
        Ok(settings)
    }

    /// Read a JSON config file. Fields it omits keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded config file");
        Ok(settings)
    }

    /// Apply `CEPRACE_*` environment variables. Blank values are ignored.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Some(raw) = env_value(TIMEOUT_ENV) {
            self.timeout_ms = raw
                .parse()
                .map_err(|_| ConfigError::invalid(TIMEOUT_ENV, format!("'{raw}' is not a whole number of milliseconds")))?;
        }
        if let Some(raw) = env_value(BRASILAPI_BASE_ENV) {
            self.brasilapi_base_url = raw;
        }
        if let Some(raw) = env_value(VIACEP_BASE_ENV) {
            self.viacep_base_url = raw;
        }
        if let Some(raw) = env_value(PROVIDERS_ENV) {
            self.providers = raw
                .split(',')
                .filter(|name| !name.trim().is_empty())
                .map(str::parse::<ProviderKind>)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|error| ConfigError::invalid(PROVIDERS_ENV, error.to_string()))?;
        }
        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: SettingsOverrides) {
        if let Some(timeout_ms) = overrides.timeout_ms {
            self.timeout_ms = timeout_ms;
        }
        if let Some(providers) = overrides.providers {
            self.providers = providers;
        }
    }

    /// Check invariants and drop duplicate providers, keeping first occurrence.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        if self.timeout_ms == 0 {
            return Err(ConfigError::invalid("timeout_ms", "must be greater than zero"));
        }
        let mut seen = Vec::with_capacity(self.providers.len());
        self.providers.retain(|kind| {
            let first = !seen.contains(kind);
            seen.push(*kind);
            first
        });
        if self.providers.is_empty() {
            return Err(ConfigError::invalid("providers", "at least one provider must be enabled"));
        }
        for (field, url) in [
            ("brasilapi_base_url", &self.brasilapi_base_url),
            ("viacep_base_url", &self.viacep_base_url),
        ] {
            if url.trim().is_empty() {
                return Err(ConfigError::invalid(field, "must not be empty"));
            }
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn base_url(&self, kind: ProviderKind) -> &str {
        match kind {
            ProviderKind::BrasilApi => &self.brasilapi_base_url,
            ProviderKind::ViaCep => &self.viacep_base_url,
        }
    }
}

fn env_value(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Resolve the config file path from `CEPRACE_CONFIG_PATH` or the platform
/// config directory.
pub fn default_config_path() -> PathBuf {
    if let Some(path) = env_value(CONFIG_PATH_ENV) {
        return expand_tilde(&path);
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ceprace")
        .join(CONFIG_FILE_NAME)
}
