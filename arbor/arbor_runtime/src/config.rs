//! Configuration for the Arbor runtime
//!
//! Handles loading and managing runtime configuration.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;
use tracing::{info, warn};

use crate::logging::LogLevel;

/// Errors that can occur in configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Which built-in definition loaders are registered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// JSON file loader
    #[serde(default = "default_enabled")]
    pub json: bool,

    /// TOML file loader
    #[serde(default = "default_enabled")]
    pub toml: bool,
}

fn default_enabled() -> bool {
    true
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            json: default_enabled(),
            toml: default_enabled(),
        }
    }
}

/// Runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Package name handed to node capabilities
    #[serde(default = "default_package")]
    pub package: String,

    /// Default log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Number of worker threads for the lifecycle phases
    #[serde(default = "default_worker_threads")]
    pub worker_threads: usize,

    /// Built-in loaders
    #[serde(default)]
    pub loaders: LoaderConfig,

    /// Additional configuration
    #[serde(default)]
    pub extra: HashMap<String, serde_json::Value>,
}

fn default_package() -> String {
    "arbor".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_worker_threads() -> usize {
    4
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            package: default_package(),
            log_level: default_log_level(),
            worker_threads: default_worker_threads(),
            loaders: LoaderConfig::default(),
            extra: HashMap::new(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file, or defaults when no path is
    /// given or the file does not exist
    pub async fn load(path: Option<&str>) -> Result<Self> {
        let mut config = RuntimeConfig::default();

        if let Some(path) = path {
            info!("Loading configuration from {}", path);

            if !Path::new(path).exists() {
                warn!("Configuration file not found: {}", path);
                return Ok(config);
            }

            let content = fs::read_to_string(path)
                .await
                .context(format!("Failed to read configuration file: {}", path))?;

            config = serde_json::from_str(&content)
                .context(format!("Failed to parse configuration file: {}", path))?;
        } else {
            info!("No configuration file specified, using defaults");
        }

        config.validate()?;

        Ok(config)
    }

    /// Load several configuration files in order, each one merged over the
    /// ones before it
    pub async fn load_layered<S: AsRef<str>>(paths: &[S]) -> Result<Self> {
        let mut config = RuntimeConfig::default();
        for path in paths {
            config.merge(Self::load(Some(path.as_ref())).await?);
        }

        config.validate()?;

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.package.is_empty() {
            return Err(ConfigError::Invalid("Package name cannot be empty".to_string()).into());
        }

        if self.worker_threads == 0 {
            return Err(ConfigError::Invalid("Worker threads cannot be zero".to_string()).into());
        }

        self.level()?;

        if !self.loaders.json && !self.loaders.toml {
            warn!("All built-in loaders are disabled");
        }

        Ok(())
    }

    /// The parsed log level
    pub fn level(&self) -> Result<LogLevel> {
        self.log_level
            .parse::<LogLevel>()
            .map_err(|e| ConfigError::Invalid(e).into())
    }

    /// Merge with another configuration; values differing from the
    /// defaults win
    pub fn merge(&mut self, other: RuntimeConfig) {
        let defaults = RuntimeConfig::default();

        if other.package != defaults.package && !other.package.is_empty() {
            self.package = other.package;
        }

        if other.log_level != defaults.log_level {
            self.log_level = other.log_level;
        }

        if other.worker_threads != defaults.worker_threads && other.worker_threads > 0 {
            self.worker_threads = other.worker_threads;
        }

        if other.loaders != defaults.loaders {
            self.loaders = other.loaders;
        }

        for (key, value) in other.extra {
            self.extra.insert(key, value);
        }
    }
}
