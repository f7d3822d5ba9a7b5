//! `enroll.toml` settings.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use enroll_core::SlotConfig;
use enroll_core::submission::DEFAULT_SUBMIT_DELAY;
use enroll_core::validation::AcademicRules;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "enroll.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config '{path}': {message}")]
    Read { path: PathBuf, message: String },

    #[error("cannot parse config '{path}': {message}")]
    Parse { path: PathBuf, message: String },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// CLI configuration. Every section is optional; missing fields take the
/// defaults below.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrollConfig {
    pub storage: SlotConfig,
    pub submission: SubmissionConfig,
    pub validation: AcademicRules,
    pub pins: PinsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionConfig {
    /// Artificial latency of the simulated backend, in milliseconds.
    pub delay_ms: u64,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            delay_ms: DEFAULT_SUBMIT_DELAY.as_millis() as u64,
        }
    }
}

impl SubmissionConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinsConfig {
    /// CSV table replacing the built-in sample directory.
    pub table: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl EnrollConfig {
    pub fn from_toml_str(
        contents: &str,
        path: &Path,
    ) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.storage.resolve_location();
        config.validate()?;
        Ok(config)
    }

    /// Loads `path`, or `enroll.toml` when no path is given.
    ///
    /// An explicit path must exist. The implicit file may be missing, in
    /// which case the defaults apply.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };
        if !required && !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(&path).map_err(|e| ConfigError::Read {
            path: path.clone(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&contents, &path)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.backend.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "storage.backend must not be empty".to_string(),
            ));
        }
        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "logging.level must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Applies `--backend` / `--location`. Switching backend without a
    /// location picks that backend's default location.
    pub fn apply_overrides(
        &mut self,
        backend: Option<&str>,
        location: Option<&str>,
    ) {
        if let Some(backend) = backend {
            if location.is_none() {
                self.storage = SlotConfig::for_backend(backend);
            } else {
                self.storage.backend = backend.to_string();
            }
        }
        if let Some(location) = location {
            self.storage.location = location.to_string();
        }
    }
}
