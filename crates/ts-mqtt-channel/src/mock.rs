//! Mock MQTT channel for testing without a real broker.
//!
//! Records published messages (with the tokio instant of each publish,
//! so paused-clock tests can assert tick spacing), counts attempts, and
//! can be told to fail publishes or hang the disconnect.

use async_trait::async_trait;
use rumqttc::QoS;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::time::Instant;

use crate::channel::Channel;
use crate::error::{MqttError, MqttResult};

/// A recorded publish call.
#[derive(Debug, Clone)]
pub struct PublishedMessage {
    pub topic: String,
    pub payload: Vec<u8>,
    pub qos: QoS,
    /// Tokio instant at which the publish arrived. Advances with the
    /// paused test clock, unlike wall-clock timestamps in payloads.
    pub at: Instant,
}

/// Mock implementation of the `Channel` trait.
///
/// Thread-safe via `Mutex`/atomics (fine for test contexts).
pub struct MockChannel {
    published: Mutex<Vec<PublishedMessage>>,
    attempts: AtomicUsize,
    fail_remaining: AtomicUsize,
    disconnect_hangs: AtomicBool,
    disconnects: AtomicUsize,
}

impl MockChannel {
    pub fn new() -> Self {
        Self {
            published: Mutex::new(Vec::new()),
            attempts: AtomicUsize::new(0),
            fail_remaining: AtomicUsize::new(0),
            disconnect_hangs: AtomicBool::new(false),
            disconnects: AtomicUsize::new(0),
        }
    }

    /// Get all successfully published messages.
    pub fn published(&self) -> Vec<PublishedMessage> {
        self.published.lock().unwrap().clone()
    }

    /// Get the last successfully published message.
    pub fn last_published(&self) -> Option<PublishedMessage> {
        self.published.lock().unwrap().last().cloned()
    }

    /// Total publish attempts, including failed ones.
    pub fn attempt_count(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Make the next `n` publish calls return an error.
    pub fn fail_next_publishes(&self, n: usize) {
        self.fail_remaining.store(n, Ordering::SeqCst);
    }

    /// Make `disconnect` never resolve, simulating a hung broker close.
    pub fn set_disconnect_hangs(&self, hangs: bool) {
        self.disconnect_hangs.store(hangs, Ordering::SeqCst);
    }

    /// Number of completed disconnect calls.
    pub fn disconnect_count(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }
}

impl Default for MockChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Channel for MockChannel {
    async fn publish(&self, topic: &str, payload: &[u8], qos: QoS) -> MqttResult<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        let remaining = self.fail_remaining.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fail_remaining.store(remaining - 1, Ordering::SeqCst);
            return Err(MqttError::Publish("simulated publish failure".into()));
        }

        self.published.lock().unwrap().push(PublishedMessage {
            topic: topic.to_string(),
            payload: payload.to_vec(),
            qos,
            at: Instant::now(),
        });
        Ok(())
    }

    async fn disconnect(&self) -> MqttResult<()> {
        if self.disconnect_hangs.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
