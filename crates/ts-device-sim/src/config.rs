//! Simulator configuration, loadable from TOML.
//!
//! Validation is a single gate before any connection attempt: every
//! required value must be present and non-empty, and a failure reports
//! the exact set of missing fields.

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use ts_mqtt_channel::MqttConfig;

/// Fatal configuration errors, detected before any network activity.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required configuration values: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

/// Top-level configuration for the device simulator.
#[derive(Debug, Clone, Deserialize)]
pub struct SimConfig {
    /// Topic the telemetry payloads are published to.
    #[serde(default)]
    pub topic: String,
    /// Interval between publish ticks, in milliseconds.
    #[serde(default = "default_publish_interval_ms")]
    pub publish_interval_ms: u64,
    /// Bounded wait for a graceful disconnect during shutdown, in milliseconds.
    #[serde(default = "default_shutdown_timeout_ms")]
    pub shutdown_timeout_ms: u64,
    /// Optional path for the local JSONL copy of published readings.
    #[serde(default)]
    pub store_path: Option<String>,
    /// MQTT connection settings.
    pub mqtt: MqttConfig,
}

fn default_publish_interval_ms() -> u64 {
    5000
}

fn default_shutdown_timeout_ms() -> u64 {
    2000
}

impl SimConfig {
    /// Load config from a TOML file path.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    /// Check that every required field is present and non-empty.
    ///
    /// Returns the precise set of missing fields, so the startup failure
    /// names everything that has to be fixed at once. Certificate paths
    /// are only required when TLS is enabled.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut required = vec![
            ("mqtt.endpoint", self.mqtt.endpoint.as_str()),
            ("mqtt.client_id", self.mqtt.client_id.as_str()),
            ("topic", self.topic.as_str()),
        ];
        if self.mqtt.use_tls {
            required.push(("mqtt.cert_path", self.mqtt.cert_path.as_str()));
            required.push(("mqtt.key_path", self.mqtt.key_path.as_str()));
            required.push(("mqtt.ca_path", self.mqtt.ca_path.as_str()));
        }

        let missing: Vec<String> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::MissingFields(missing))
        }
    }

    pub fn publish_interval(&self) -> Duration {
        Duration::from_millis(self.publish_interval_ms)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}
