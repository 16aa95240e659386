//! Node configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use unswachh_geo::geocode::DEFAULT_NOMINATIM_URL;
use unswachh_media::upload::DEFAULT_UPLOAD_URL;
use unswachh_media::NormalizeOptions;

use crate::NodeError;

/// Configuration for an Unswachh node.
///
/// Can be loaded from a TOML file via [`NodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Data directory for the LMDB environment.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Maximum LMDB map size in bytes.
    #[serde(default = "default_map_size")]
    pub lmdb_map_size: usize,

    /// File holding this device's vote records.
    #[serde(default = "default_vote_file")]
    pub vote_file: PathBuf,

    /// Fixed admin password. When unset, the `admin.password` setting in
    /// the store is used instead.
    #[serde(default)]
    pub admin_password: Option<String>,

    /// Public base URL of the map, used for deep links.
    #[serde(default = "default_public_url")]
    pub public_url: String,

    /// Reverse geocoding service.
    #[serde(default = "default_nominatim_url")]
    pub nominatim_url: String,

    /// User-Agent sent to the geocoding service.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Image hosting endpoint.
    #[serde(default = "default_upload_url")]
    pub upload_url: String,

    /// Image hosting account name.
    #[serde(default)]
    pub cloud_name: String,

    /// Unsigned upload preset.
    #[serde(default)]
    pub upload_preset: String,

    /// Timeout for every outbound HTTP request, in seconds.
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// Buffered change events per feed before subscribers start lagging.
    #[serde(default = "default_feed_capacity")]
    pub feed_capacity: usize,

    /// How often a polling feed re-reads the store, in milliseconds. Catches
    /// writes made by other processes sharing the data directory.
    #[serde(default = "default_feed_poll_ms")]
    pub feed_poll_ms: u64,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Photo normalization settings.
    #[serde(default)]
    pub image: NormalizeOptions,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("./unswachh_data")
}

fn default_map_size() -> usize {
    1 << 30
}

fn default_vote_file() -> PathBuf {
    PathBuf::from("./unswachh_data/votes.json")
}

fn default_public_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_nominatim_url() -> String {
    DEFAULT_NOMINATIM_URL.to_string()
}

fn default_user_agent() -> String {
    concat!("unswachh/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_upload_url() -> String {
    DEFAULT_UPLOAD_URL.to_string()
}

fn default_http_timeout_secs() -> u64 {
    10
}

fn default_feed_capacity() -> usize {
    64
}

fn default_feed_poll_ms() -> u64 {
    1000
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, NodeError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| NodeError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn feed_poll_interval(&self) -> Duration {
        Duration::from_millis(self.feed_poll_ms.max(1))
    }

    /// Config rooted at `data_dir`, with the vote file inside it.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            vote_file: data_dir.join("votes.json"),
            data_dir,
            ..Self::default()
        }
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            lmdb_map_size: default_map_size(),
            vote_file: default_vote_file(),
            admin_password: None,
            public_url: default_public_url(),
            nominatim_url: default_nominatim_url(),
            user_agent: default_user_agent(),
            upload_url: default_upload_url(),
            cloud_name: String::new(),
            upload_preset: String::new(),
            http_timeout_secs: default_http_timeout_secs(),
            feed_capacity: default_feed_capacity(),
            feed_poll_ms: default_feed_poll_ms(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            image: NormalizeOptions::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = NodeConfig::default();
        let toml_str = config.to_toml_string().expect("should serialize");
        let parsed = NodeConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed.data_dir, config.data_dir);
        assert_eq!(parsed.feed_capacity, config.feed_capacity);
        assert_eq!(parsed.image, config.image);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = NodeConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.http_timeout(), Duration::from_secs(10));
        assert_eq!(config.admin_password, None);
        assert_eq!(config.log_format, "human");
        assert_eq!(config.feed_poll_interval(), Duration::from_secs(1));
        assert_eq!(config.image.max_dimension, 1600);
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            admin_password = "swachh"
            feed_capacity = 8

            [image]
            max_dimension = 800
            quality = 70
            max_upload_bytes = 1048576
        "#;
        let config = NodeConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.admin_password.as_deref(), Some("swachh"));
        assert_eq!(config.feed_capacity, 8);
        assert_eq!(config.image.max_dimension, 800);
        assert_eq!(config.log_level, "info"); // default
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = NodeConfig::from_toml_file("/nonexistent/unswachh.toml");
        assert!(matches!(result, Err(NodeError::Config(_))));
    }

    #[test]
    fn with_data_dir_moves_vote_file() {
        let config = NodeConfig::with_data_dir("/var/lib/unswachh");
        assert_eq!(config.vote_file, PathBuf::from("/var/lib/unswachh/votes.json"));
    }
}
