mod bot;
mod socket_mode;
mod web_api;

pub use bot::*;
pub use socket_mode::*;
pub use web_api::*;

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub socket_mode: SocketModeConfig,
    #[serde(default)]
    pub web_api: WebApiConfig,
    #[serde(default)]
    pub bot: BotConfig,
}

impl Config {
    /// Parse a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }

    /// Load from file if it exists, otherwise return defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(Error::Io(_)) => Self::default(),
            Err(e) => {
                tracing::warn!(error = %e, "invalid config, falling back to defaults");
                Self::default()
            }
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.socket_mode.connections_open_url.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "socket_mode.connections_open_url".into(),
                message: "connections_open_url must not be empty".into(),
            });
        }

        if self.socket_mode.timeout_ms == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "socket_mode.timeout_ms".into(),
                message: "timeout must be greater than 0".into(),
            });
        }

        let reconnect = &self.socket_mode.reconnect;
        if reconnect.backoff_factor < 1.0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "socket_mode.reconnect.backoff_factor".into(),
                message: "backoff_factor below 1.0 shrinks the delay on every attempt".into(),
            });
        }
        if reconnect.max_delay_ms < reconnect.initial_delay_ms {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "socket_mode.reconnect.max_delay_ms".into(),
                message: "max_delay_ms is smaller than initial_delay_ms".into(),
            });
        }

        if self.web_api.base_url.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "web_api.base_url".into(),
                message: "base_url must not be empty".into(),
            });
        }

        if self.web_api.timeout_ms == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "web_api.timeout_ms".into(),
                message: "timeout must be greater than 0".into(),
            });
        }

        if matches!(self.bot.name.as_deref(), Some("")) {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "bot.name".into(),
                message: "empty bot name disables identity lookup".into(),
            });
        }

        errors
    }
}
