//! TLS configuration for mTLS connections to AWS IoT Core.
//!
//! Reads the device certificate, private key, and CA certificate from
//! PEM files and builds rumqttc's TLS transport.

use rumqttc::Transport;

use crate::config::MqttConfig;
use crate::error::{MqttError, MqttResult};

/// Build a TLS transport from the certificate paths in the config.
pub fn load_tls_transport(config: &MqttConfig) -> MqttResult<Transport> {
    let ca = std::fs::read(&config.ca_path)
        .map_err(|e| MqttError::Tls(format!("failed to read CA cert '{}': {e}", config.ca_path)))?;

    let cert = std::fs::read(&config.cert_path).map_err(|e| {
        MqttError::Tls(format!(
            "failed to read device cert '{}': {e}",
            config.cert_path
        ))
    })?;

    let key = std::fs::read(&config.key_path).map_err(|e| {
        MqttError::Tls(format!(
            "failed to read device key '{}': {e}",
            config.key_path
        ))
    })?;

    Ok(Transport::tls_with_config(
        rumqttc::TlsConfiguration::Simple {
            ca,
            alpn: None,
            client_auth: Some((cert, key)),
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_ca_cert_returns_error() {
        let config = MqttConfig {
            endpoint: "localhost".into(),
            port: 8883,
            client_id: "test".into(),
            use_tls: true,
            cert_path: "/nonexistent/cert.pem".into(),
            key_path: "/nonexistent/key.pem".into(),
            ca_path: "/nonexistent/ca.pem".into(),
            keepalive_secs: 30,
        };
        let err = load_tls_transport(&config).err().expect("should fail");
        let msg = err.to_string();
        assert!(
            msg.contains("CA cert"),
            "error should mention CA cert: {msg}"
        );
    }
}
