//! Environment-backed settings
//!
//! nettools reads its ambient configuration from environment variables
//! only; command-line flags always take precedence over these values.

use std::env;
use thiserror::Error;

/// Tracing filter directive for the binaries
pub const LOG_ENV: &str = "NETTOOLS_LOG";

/// Default `netmask` output mode when no mode flag is given
pub const DEFAULT_MODE_ENV: &str = "NETTOOLS_DEFAULT_MODE";

/// Names accepted by [`DEFAULT_MODE_ENV`]
pub const MODES: &[&str] = &["cidr", "range", "binary", "octal", "decimal", "hex", "cisco"];

/// Configuration errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is set to something unusable
    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },
}

/// Result type for configuration
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Settings gathered from the environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// Filter directive from [`LOG_ENV`]
    pub log_filter: Option<String>,
    /// Lower-cased mode name from [`DEFAULT_MODE_ENV`]
    pub default_mode: Option<String>,
}

impl Settings {
    /// Read settings from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read settings through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let log_filter = match lookup(LOG_ENV) {
            Some(value) if value.trim().is_empty() => {
                return Err(ConfigError::InvalidValue {
                    name: LOG_ENV,
                    reason: "filter is empty".to_string(),
                });
            }
            Some(value) => Some(value.trim().to_string()),
            None => None,
        };

        let default_mode = match lookup(DEFAULT_MODE_ENV) {
            Some(value) => {
                let mode = value.trim().to_ascii_lowercase();
                if !MODES.contains(&mode.as_str()) {
                    return Err(ConfigError::InvalidValue {
                        name: DEFAULT_MODE_ENV,
                        reason: format!(
                            "unknown mode '{}', expected one of {}",
                            value,
                            MODES.join(", ")
                        ),
                    });
                }
                Some(mode)
            }
            None => None,
        };

        Ok(Self {
            log_filter,
            default_mode,
        })
    }
}
