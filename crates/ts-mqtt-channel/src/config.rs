use serde::Deserialize;

/// MQTT connection configuration, loadable from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct MqttConfig {
    /// Broker hostname (e.g., the AWS IoT ATS endpoint).
    #[serde(default)]
    pub endpoint: String,
    /// Broker port (default 8883 for TLS).
    #[serde(default = "default_port")]
    pub port: u16,
    /// MQTT client ID; also used as the `deviceId` in published payloads.
    #[serde(default)]
    pub client_id: String,
    /// Enable TLS (mTLS). When false, connects plaintext (local dev).
    #[serde(default = "default_use_tls")]
    pub use_tls: bool,
    /// Path to the device X.509 certificate (PEM).
    #[serde(default)]
    pub cert_path: String,
    /// Path to the device private key (PEM).
    #[serde(default)]
    pub key_path: String,
    /// Path to the CA certificate (e.g., AmazonRootCA1.pem).
    #[serde(default)]
    pub ca_path: String,
    /// Keep-alive interval in seconds.
    #[serde(default = "default_keepalive")]
    pub keepalive_secs: u16,
}

fn default_use_tls() -> bool {
    true
}

fn default_port() -> u16 {
    8883
}

fn default_keepalive() -> u16 {
    30
}
