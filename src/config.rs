//! Runtime configuration loaded from TOML.
//!
//! ```toml
//! [oracle]
//! url = "http://127.0.0.1:8080/api/nextMove"
//! timeout_ms = 5000
//! enabled = true
//!
//! [pacing]
//! move_delay_ms = 500
//! ```

use crate::orchestrator::DriverSettings;
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Environment variable overriding `oracle.url`.
pub const ORACLE_URL_ENV: &str = "SQUARES_ORACLE_URL";
/// Environment variable overriding `oracle.timeout_ms`.
pub const ORACLE_TIMEOUT_ENV: &str = "SQUARES_ORACLE_TIMEOUT_MS";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct SquaresConfig {
    /// Oracle endpoint settings.
    #[serde(default)]
    oracle: OracleConfig,

    /// Move pacing.
    #[serde(default)]
    pacing: PacingConfig,
}

/// Where and how to reach the oracle.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Endpoint receiving the JSON move request.
    #[serde(default = "default_url")]
    url: String,

    /// Per-request bound in milliseconds.
    #[serde(default = "default_timeout_ms")]
    timeout_ms: u64,

    /// When false, oracle sides always play random moves.
    #[serde(default = "default_enabled")]
    enabled: bool,
}

/// Delay applied before oracle moves.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct PacingConfig {
    /// Minimum milliseconds between an oracle request and its move; 0 disables.
    #[serde(default = "default_move_delay_ms")]
    move_delay_ms: u64,
}

#[instrument]
fn default_url() -> String {
    "http://127.0.0.1:8080/api/nextMove".to_string()
}

#[instrument]
fn default_timeout_ms() -> u64 {
    5000
}

#[instrument]
fn default_enabled() -> bool {
    true
}

#[instrument]
fn default_move_delay_ms() -> u64 {
    500
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout_ms: default_timeout_ms(),
            enabled: default_enabled(),
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            move_delay_ms: default_move_delay_ms(),
        }
    }
}

impl SquaresConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        info!(url = %config.oracle.url, "Config loaded successfully");
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise defaults, then applies
    /// environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// Like [`SquaresConfig::load`] with overrides read through `lookup`.
    #[instrument(skip(path, lookup), fields(path = %path.as_ref().display()))]
    pub fn load_with(
        path: impl AsRef<Path>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = if path.as_ref().exists() {
            Self::from_file(path)?
        } else {
            info!("Config file not found, using defaults");
            Self::default()
        };
        config.apply_env_with(lookup)?;
        Ok(config)
    }

    /// Applies `SQUARES_ORACLE_URL` and `SQUARES_ORACLE_TIMEOUT_MS` as found
    /// by `lookup`.
    ///
    /// # Errors
    ///
    /// A timeout that is not a whole number of milliseconds.
    #[instrument(skip(self, lookup))]
    pub fn apply_env_with(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(url) = lookup(ORACLE_URL_ENV) {
            debug!(%url, "Oracle URL from environment");
            self.oracle.url = url;
        }
        if let Some(raw) = lookup(ORACLE_TIMEOUT_ENV) {
            self.oracle.timeout_ms = raw.trim().parse().map_err(|_| {
                warn!(%raw, "Invalid oracle timeout in environment");
                ConfigError::new(format!("{} must be milliseconds, got {:?}", ORACLE_TIMEOUT_ENV, raw))
            })?;
        }
        Ok(())
    }

    /// Replaces the oracle URL.
    pub fn set_oracle_url(&mut self, url: impl Into<String>) {
        self.oracle.url = url.into();
    }

    /// Turns the oracle off.
    pub fn disable_oracle(&mut self) {
        self.oracle.enabled = false;
    }

    /// Removes the pacing delay.
    pub fn disable_delay(&mut self) {
        self.pacing.move_delay_ms = 0;
    }

    /// Timing settings for [`MatchDriver`](crate::MatchDriver).
    pub fn driver_settings(&self) -> DriverSettings {
        DriverSettings::default()
            .with_oracle_timeout(Duration::from_millis(self.oracle.timeout_ms))
            .with_move_delay(Duration::from_millis(self.pacing.move_delay_ms))
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = SquaresConfig::from_toml("").unwrap();
        assert_eq!(config, SquaresConfig::default());
        assert_eq!(*config.oracle().timeout_ms(), 5000);
        assert!(*config.oracle().enabled());
    }

    #[test]
    fn test_partial_toml() {
        let config = SquaresConfig::from_toml(
            "[oracle]\nurl = \"http://oracle:9000/move\"\n[pacing]\nmove_delay_ms = 0\n",
        )
        .unwrap();
        assert_eq!(config.oracle().url(), "http://oracle:9000/move");
        assert_eq!(*config.oracle().timeout_ms(), 5000);
        let settings = config.driver_settings();
        assert_eq!(*settings.move_delay(), Duration::ZERO);
        assert_eq!(*settings.oracle_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_bad_toml_is_error() {
        let err = SquaresConfig::from_toml("[oracle]\ntimeout_ms = \"soon\"").unwrap_err();
        assert!(err.message.contains("Failed to parse config"));
    }
}
