//! MQTT channel — async client for broker communication.
//!
//! Wraps `rumqttc::AsyncClient` behind the `Channel` trait so the
//! simulator core never touches the broker client directly.

use async_trait::async_trait;
use rumqttc::{AsyncClient, EventLoop, MqttOptions, QoS};

use crate::config::MqttConfig;
use crate::error::{MqttError, MqttResult};
use crate::tls;

// ── Channel trait ─────────────────────────────────────────────

/// Abstraction over the broker connection.
///
/// The publish scheduler calls `publish`; the shutdown path calls
/// `disconnect`. Enables mocking in tests without a real broker.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Publish a raw payload to a topic. At QoS 0 this is fire-and-forget:
    /// no acknowledgment wait, no retry.
    async fn publish(&self, topic: &str, payload: &[u8], qos: QoS) -> MqttResult<()>;

    /// Request a graceful disconnect from the broker.
    async fn disconnect(&self) -> MqttResult<()>;
}

// ── MqttChannel ───────────────────────────────────────────────

/// MQTT channel backed by rumqttc.
///
/// Owns the `AsyncClient`. The `EventLoop` is returned separately from
/// `new()` — the caller must drive it in a task via `eventloop.poll()`,
/// which is also what performs the actual network I/O for publishes
/// and the disconnect.
pub struct MqttChannel {
    client: AsyncClient,
    client_id: String,
}

impl MqttChannel {
    /// Create a new MQTT channel with TLS (production mode).
    ///
    /// Returns `(channel, event_loop)`. The first `poll()` of the event
    /// loop dials the broker; a `ConnAck` signals the session is up.
    pub fn new(config: &MqttConfig) -> MqttResult<(Self, EventLoop)> {
        let mut options = MqttOptions::new(&config.client_id, &config.endpoint, config.port);
        options.set_keep_alive(std::time::Duration::from_secs(config.keepalive_secs.into()));

        let transport = tls::load_tls_transport(config)?;
        options.set_transport(transport);

        let (client, eventloop) = AsyncClient::new(options, 64);

        Ok((
            Self {
                client,
                client_id: config.client_id.clone(),
            },
            eventloop,
        ))
    }

    /// Create a channel for local development (no TLS).
    pub fn new_plaintext(host: &str, port: u16, client_id: &str) -> (Self, EventLoop) {
        let mut options = MqttOptions::new(client_id, host, port);
        options.set_keep_alive(std::time::Duration::from_secs(30));

        let (client, eventloop) = AsyncClient::new(options, 64);

        (
            Self {
                client,
                client_id: client_id.to_string(),
            },
            eventloop,
        )
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }
}

#[async_trait]
impl Channel for MqttChannel {
    async fn publish(&self, topic: &str, payload: &[u8], qos: QoS) -> MqttResult<()> {
        self.client
            .publish(topic, qos, false, payload)
            .await
            .map_err(|e| MqttError::Publish(e.to_string()))
    }

    async fn disconnect(&self) -> MqttResult<()> {
        self.client
            .disconnect()
            .await
            .map_err(|e| MqttError::Disconnect(e.to_string()))
    }
}
