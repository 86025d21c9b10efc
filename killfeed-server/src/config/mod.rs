//! Configuration module for killfeed-server.
//!
//! Handles loading configuration from an optional TOML file, CLI arguments,
//! and environment variables.

pub mod file;

use crate::config::file::FileConfig;
use killfeed_core::config::{PollerConfig, StreamConfig};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("DATABASE_URL environment variable not set")]
    MissingDatabaseUrl,
}

/// Upstream source settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSettings {
    pub base_url: Url,
    pub request_timeout: Duration,
}

/// Validated configuration.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub listen: SocketAddr,
    pub source: SourceSettings,
    pub poller: PollerConfig,
    pub stream: StreamConfig,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: PathBuf,
    listen_override: Option<SocketAddr>,
    port_override: Option<u16>,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(
        config_path: impl AsRef<Path>,
        listen_override: Option<SocketAddr>,
        port_override: Option<u16>,
    ) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
            port_override,
        }
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file, or fall back to defaults if it does not exist
    /// 2. Apply CLI / environment overrides
    /// 3. Validate the configuration
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let file_config = if self.config_path.exists() {
            let config_content = std::fs::read_to_string(&self.config_path)?;
            toml::from_str(&config_content)?
        } else {
            tracing::info!(
                "Config file {:?} not found, using defaults",
                self.config_path
            );
            FileConfig::default()
        };

        self.build(file_config)
    }

    fn build(&self, mut file_config: FileConfig) -> Result<LoadedConfig, ConfigError> {
        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }
        if let Some(port) = self.port_override {
            file_config.server.listen.set_port(port);
        }

        validate(&file_config)?;

        Ok(LoadedConfig {
            listen: file_config.server.listen,
            source: SourceSettings {
                base_url: file_config.source.base_url,
                request_timeout: Duration::from_secs(file_config.source.request_timeout_secs),
            },
            poller: PollerConfig {
                base_interval: Duration::from_secs(file_config.poller.base_interval_secs),
                retry_delay: Duration::from_secs(file_config.poller.retry_delay_secs),
                ingest_concurrency: file_config.poller.ingest_concurrency,
            },
            stream: StreamConfig {
                cadence: Duration::from_secs(file_config.stream.cadence_secs),
            },
        })
    }
}

fn validate(config: &FileConfig) -> Result<(), ConfigError> {
    let non_zero = [
        ("source.request_timeout_secs", config.source.request_timeout_secs),
        ("poller.base_interval_secs", config.poller.base_interval_secs),
        ("poller.retry_delay_secs", config.poller.retry_delay_secs),
        ("poller.ingest_concurrency", config.poller.ingest_concurrency as u64),
        ("stream.cadence_secs", config.stream.cadence_secs),
    ];
    for (name, value) in non_zero {
        if value == 0 {
            return Err(ConfigError::ValidationError(format!("{name} must be greater than 0")));
        }
    }

    if !matches!(config.source.base_url.scheme(), "http" | "https") {
        return Err(ConfigError::ValidationError(format!(
            "source.base_url must be http or https, got {}",
            config.source.base_url
        )));
    }
    Ok(())
}

/// Get the database URL from the environment.
pub fn get_database_url() -> Result<String, ConfigError> {
    std::env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)
}
