//! Graceful shutdown coordinator.
//!
//! Termination signals land here. The first call stops the publish loop,
//! gives the broker disconnect a bounded window, and hands back a single
//! termination intent; repeat calls (a second signal) are no-ops. Only
//! `main` turns the intent into an actual process exit, which keeps the
//! teardown path callable from tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use ts_mqtt_channel::Channel;

use crate::connection::ConnectionManager;
use crate::scheduler::PublishScheduler;

/// What the process should do once teardown is finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitIntent {
    pub code: u8,
    pub reason: &'static str,
}

impl ExitIntent {
    fn clean(reason: &'static str) -> Self {
        Self { code: 0, reason }
    }
}

/// Coordinates the one-and-only graceful teardown.
pub struct ShutdownCoordinator {
    initiated: AtomicBool,
    timeout: Duration,
}

impl ShutdownCoordinator {
    pub fn new(timeout: Duration) -> Self {
        Self {
            initiated: AtomicBool::new(false),
            timeout,
        }
    }

    /// Run the teardown. Returns `Some(intent)` on the first call and
    /// `None` on every later one — a second signal never starts a second
    /// teardown, timeout timer, or exit.
    pub async fn initiate<C: Channel + 'static>(
        &self,
        scheduler: &mut PublishScheduler<C>,
        manager: &mut ConnectionManager,
        channel: &C,
    ) -> Option<ExitIntent> {
        if self.initiated.swap(true, Ordering::SeqCst) {
            tracing::debug!("shutdown already in progress, ignoring signal");
            return None;
        }

        tracing::info!("initiating graceful shutdown");
        scheduler.stop();

        if !manager.has_connection() {
            tracing::info!("shutdown complete (no active connection)");
            return Some(ExitIntent::clean("no active connection"));
        }

        match tokio::time::timeout(self.timeout, manager.close(channel)).await {
            Ok(()) => {
                tracing::info!("disconnected from broker, shutdown complete");
                Some(ExitIntent::clean("graceful disconnect"))
            }
            Err(_) => {
                // In-flight close is abandoned; termination proceeds anyway.
                tracing::warn!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    "broker disconnect timed out, forcing exit"
                );
                Some(ExitIntent::clean("disconnect timeout"))
            }
        }
    }
}
