//! TOML file configuration structures.
//!
//! These structs directly map to the `killfeed-config.toml` file format.
//! Every section and field is optional.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use url::Url;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub server: ServerConfig,
    pub source: SourceConfig,
    pub poller: PollerConfig,
    pub stream: StreamConfig,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "0.0.0.0:8080").
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 8080)),
        }
    }
}

/// Upstream game-info API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Base URL; `/events` and `/events/{id}` are appended to it.
    pub base_url: Url,
    /// Timeout applied to every upstream request.
    pub request_timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: 30,
        }
    }
}

fn default_base_url() -> Url {
    Url::parse(killfeed_core::source::GameInfoClient::DEFAULT_BASE_URL)
        .expect("valid default base url")
}

/// Poll scheduler section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
    pub base_interval_secs: u64,
    pub retry_delay_secs: u64,
    pub ingest_concurrency: usize,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            base_interval_secs: 25,
            retry_delay_secs: 5,
            ingest_concurrency: 4,
        }
    }
}

/// Stream broadcaster section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    pub cadence_secs: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self { cadence_secs: 15 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config_parsing() {
        let toml_str = r#"
[server]
listen = "127.0.0.1:3000"

[source]
base_url = "https://gameinfo.albiononline.com/api/gameinfo"
request_timeout_secs = 10

[poller]
base_interval_secs = 30
retry_delay_secs = 3
ingest_concurrency = 8

[stream]
cadence_secs = 5
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.listen.port(), 3000);
        assert_eq!(config.source.base_url.host_str(), Some("gameinfo.albiononline.com"));
        assert_eq!(config.source.request_timeout_secs, 10);
        assert_eq!(config.poller.base_interval_secs, 30);
        assert_eq!(config.poller.retry_delay_secs, 3);
        assert_eq!(config.poller.ingest_concurrency, 8);
        assert_eq!(config.stream.cadence_secs, 5);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml_str = r#"
[poller]
base_interval_secs = 60
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.listen.port(), 8080);
        assert_eq!(config.poller.base_interval_secs, 60);
        assert_eq!(config.poller.retry_delay_secs, 5);
        assert_eq!(config.stream.cadence_secs, 15);
        assert_eq!(
            config.source.base_url.as_str(),
            "https://gameinfo-sgp.albiononline.com/api/gameinfo"
        );
    }
}
