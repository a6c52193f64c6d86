//! Timer-driven publish scheduler.
//!
//! Active only between a `Ready` and the next `Suspend` notification from
//! the connection manager. Each tick generates one reading, publishes it
//! at QoS 0 (fire-and-forget), and makes a best-effort local-store write.

use std::sync::Arc;
use std::time::Duration;

use rumqttc::QoS;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use ts_mqtt_channel::Channel;
use ts_protocol::TelemetryPayload;

use crate::connection::Notification;
use crate::generator;
use crate::store::ReadingStore;

/// Owns the recurring publish timer. At most one timer is live at a time;
/// an absent handle means "not scheduling".
pub struct PublishScheduler<C: Channel + 'static> {
    channel: Arc<C>,
    store: Option<Arc<dyn ReadingStore>>,
    device_id: String,
    topic: String,
    interval: Duration,
    handle: Option<JoinHandle<()>>,
}

impl<C: Channel + 'static> PublishScheduler<C> {
    pub fn new(
        channel: Arc<C>,
        store: Option<Arc<dyn ReadingStore>>,
        device_id: impl Into<String>,
        topic: impl Into<String>,
        interval: Duration,
    ) -> Self {
        Self {
            channel,
            store,
            device_id: device_id.into(),
            topic: topic.into(),
            interval,
            handle: None,
        }
    }

    /// Map a connection notification onto start/stop. Safe to call with
    /// duplicate notifications; both operations are idempotent.
    pub fn apply(&mut self, notification: Notification) {
        match notification {
            Notification::Ready => self.start(),
            Notification::Suspend => self.stop(),
        }
    }

    /// Start the recurring timer. A second call while a timer is live is
    /// a logged no-op — never two concurrent timers. The first tick fires
    /// one full interval after this call.
    pub fn start(&mut self) {
        if self.handle.is_some() {
            tracing::warn!("publish loop already running");
            return;
        }

        tracing::info!(
            interval_ms = self.interval.as_millis() as u64,
            topic = %self.topic,
            "starting publish loop"
        );

        let channel = Arc::clone(&self.channel);
        let store = self.store.clone();
        let device_id = self.device_id.clone();
        let topic = self.topic.clone();
        let interval = self.interval;

        self.handle = Some(tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick of a tokio interval fires immediately; skip
            // it so ticking starts a full interval from now.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                publish_once(&*channel, store.as_deref(), &device_id, &topic).await;
            }
        }));
    }

    /// Cancel the timer and clear the handle. No-op when not scheduling.
    /// No tick fires after this returns: aborting the task cancels it at
    /// its next await point and the interval is dropped with it.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            tracing::info!("stopping publish loop");
            handle.abort();
        }
    }

    /// Whether a timer is currently live.
    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

/// One publish tick: generate, serialize, publish, persist locally.
/// Every failure is absorbed here; a bad tick never stops the loop.
async fn publish_once<C: Channel + ?Sized>(
    channel: &C,
    store: Option<&dyn ReadingStore>,
    device_id: &str,
    topic: &str,
) {
    let reading = generator::generate();
    let payload = TelemetryPayload::new(device_id, &reading);

    let bytes = match serde_json::to_vec(&payload) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, "failed to serialize reading");
            return;
        }
    };

    match channel.publish(topic, &bytes, QoS::AtMostOnce).await {
        Ok(()) => tracing::debug!(
            timestamp = payload.timestamp,
            temperature = payload.temperature,
            humidity = payload.humidity,
            "published reading"
        ),
        Err(e) => tracing::warn!(error = %e, "publish failed, dropping reading"),
    }

    if let Some(store) = store {
        if let Err(e) = store.put_reading(&payload).await {
            tracing::warn!(error = %e, "local store write failed");
        }
    }
}

impl<C: Channel + 'static> Drop for PublishScheduler<C> {
    fn drop(&mut self) {
        self.stop();
    }
}
