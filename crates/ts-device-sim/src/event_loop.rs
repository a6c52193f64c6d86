//! MQTT event loop driver.
//!
//! Polls the rumqttc event loop, classifies each result into a transport
//! event, and forwards it to the runtime's control loop. rumqttc re-dials
//! on the next poll after a failure, so an error is followed by a pause
//! and a `Reconnect` before polling resumes.

use std::time::Duration;

use rumqttc::EventLoop;
use tokio::sync::mpsc;

use ts_mqtt_channel::{TransportEvent, classify};

/// Pause between a connection error and the next dial attempt.
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Drive the event loop until the control loop goes away.
///
/// All network I/O for the session (including publishes queued by the
/// scheduler and the shutdown disconnect) happens inside `poll()`.
pub async fn run(mut eventloop: EventLoop, events: mpsc::Sender<TransportEvent>) {
    loop {
        let result = eventloop.poll().await;
        let classified = classify(&result);

        if let Err(e) = &result {
            tracing::error!(error = %e, "MQTT event loop error, retrying in 5s");
        }

        if let Some(event) = classified {
            if events.send(event).await.is_err() {
                // Control loop dropped the receiver; we're shutting down.
                return;
            }
        }

        if result.is_err() {
            tokio::time::sleep(RECONNECT_DELAY).await;
            if events.send(TransportEvent::Reconnect).await.is_err() {
                return;
            }
        }
    }
}
