//! End-to-end lifecycle tests: connection events gating the publish
//! loop, and bounded graceful shutdown — all against the mock channel
//! with a paused clock.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::yield_now;
use tokio::time::{self, Instant};

use ts_device_sim::connection::{ConnectionManager, ConnectionState};
use ts_device_sim::scheduler::PublishScheduler;
use ts_device_sim::shutdown::ShutdownCoordinator;
use ts_device_sim::store::{MemoryStore, ReadingStore};
use ts_mqtt_channel::{MockChannel, TransportEvent};

const INTERVAL: Duration = Duration::from_millis(5000);

struct Harness {
    channel: Arc<MockChannel>,
    store: Arc<MemoryStore>,
    manager: ConnectionManager,
    scheduler: PublishScheduler<MockChannel>,
}

impl Harness {
    fn new() -> Self {
        let channel = Arc::new(MockChannel::new());
        let store = Arc::new(MemoryStore::new());
        let scheduler = PublishScheduler::new(
            Arc::clone(&channel),
            Some(Arc::clone(&store) as Arc<dyn ReadingStore>),
            "greenhouse-01",
            "devices/greenhouse-01/telemetry",
            INTERVAL,
        );
        Self {
            channel,
            store,
            manager: ConnectionManager::new(),
            scheduler,
        }
    }

    /// Feed one transport event through the manager into the scheduler,
    /// the way the runtime's control loop does.
    async fn feed(&mut self, event: TransportEvent) {
        if let Some(notification) = self.manager.handle_event(event) {
            self.scheduler.apply(notification);
        }
        yield_now().await;
    }
}

/// Scenario A: after a connect, three full intervals produce exactly
/// three publishes spaced by the interval.
#[tokio::test(start_paused = true)]
async fn three_intervals_yield_three_evenly_spaced_publishes() {
    let mut h = Harness::new();
    h.manager.start();
    h.feed(TransportEvent::Connect).await;
    assert!(h.scheduler.is_running());

    for _ in 0..3 {
        time::advance(INTERVAL).await;
        yield_now().await;
    }

    let msgs = h.channel.published();
    assert_eq!(msgs.len(), 3);
    for pair in msgs.windows(2) {
        let gap = pair[1].at.duration_since(pair[0].at);
        assert!(pair[1].at > pair[0].at, "publish instants must increase");
        assert_eq!(gap, INTERVAL, "publishes must be spaced by the interval");
    }

    // The local copy got the same readings, best-effort.
    assert_eq!(h.store.records().len(), 3);

    h.scheduler.stop();
}

/// Scenario C: an error while connected suspends scheduling at the very
/// next check; a later connect restores it.
#[tokio::test(start_paused = true)]
async fn error_suspends_and_reconnect_restores_scheduling() {
    let mut h = Harness::new();
    h.manager.start();
    h.feed(TransportEvent::Connect).await;

    time::advance(INTERVAL).await;
    yield_now().await;
    assert_eq!(h.channel.attempt_count(), 1);

    h.feed(TransportEvent::Error).await;
    assert!(!h.scheduler.is_running());
    assert_eq!(h.manager.state(), ConnectionState::Errored);

    // Nothing fires while suspended.
    time::advance(INTERVAL * 3).await;
    yield_now().await;
    assert_eq!(h.channel.attempt_count(), 1);

    // Transport recovers on its own and re-emits connect.
    h.feed(TransportEvent::Connect).await;
    assert!(h.scheduler.is_running());

    time::advance(INTERVAL).await;
    yield_now().await;
    assert_eq!(h.channel.attempt_count(), 2);

    h.scheduler.stop();
}

/// Offline behaves like error for the publish loop: suspend without a
/// duplicate notification when already suspended via reconnecting.
#[tokio::test(start_paused = true)]
async fn offline_after_reconnecting_keeps_loop_stopped() {
    let mut h = Harness::new();
    h.manager.start();
    h.feed(TransportEvent::Connect).await;
    h.feed(TransportEvent::Reconnect).await;
    assert!(!h.scheduler.is_running());

    h.feed(TransportEvent::Offline).await;
    assert!(!h.scheduler.is_running());
    assert_eq!(h.manager.state(), ConnectionState::Offline);

    time::advance(INTERVAL * 2).await;
    yield_now().await;
    assert_eq!(h.channel.attempt_count(), 0);
}

/// Scenario B: a close that never completes still terminates, at the
/// timeout but not unboundedly after it.
#[tokio::test(start_paused = true)]
async fn hung_close_terminates_at_the_shutdown_timeout() {
    let mut h = Harness::new();
    h.manager.start();
    h.feed(TransportEvent::Connect).await;
    h.channel.set_disconnect_hangs(true);

    let coordinator = ShutdownCoordinator::new(Duration::from_millis(2000));
    let started = Instant::now();
    let intent = coordinator
        .initiate(&mut h.scheduler, &mut h.manager, h.channel.as_ref())
        .await
        .expect("first initiate yields an intent");

    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(2000), "too early: {elapsed:?}");
    assert!(elapsed < Duration::from_millis(2100), "unbounded: {elapsed:?}");
    assert_eq!(intent.code, 0);
}

/// Two signals, one termination: the second initiate is a no-op and no
/// publishes happen after teardown.
#[tokio::test(start_paused = true)]
async fn double_signal_results_in_one_teardown() {
    let mut h = Harness::new();
    h.manager.start();
    h.feed(TransportEvent::Connect).await;

    let coordinator = ShutdownCoordinator::new(Duration::from_millis(2000));
    let first = coordinator
        .initiate(&mut h.scheduler, &mut h.manager, h.channel.as_ref())
        .await;
    let second = coordinator
        .initiate(&mut h.scheduler, &mut h.manager, h.channel.as_ref())
        .await;

    assert!(first.is_some());
    assert!(second.is_none());
    assert_eq!(h.channel.disconnect_count(), 1);
    assert_eq!(h.manager.state(), ConnectionState::Closed);

    let before = h.channel.attempt_count();
    time::advance(INTERVAL * 2).await;
    yield_now().await;
    assert_eq!(h.channel.attempt_count(), before);
}

/// A full session walk: connect, publish, drop offline, recover,
/// publish again, shut down cleanly.
#[tokio::test(start_paused = true)]
async fn full_session_walkthrough() {
    let mut h = Harness::new();
    h.manager.start();
    assert_eq!(h.manager.state(), ConnectionState::Connecting);

    h.feed(TransportEvent::Connect).await;
    time::advance(INTERVAL * 2).await;
    yield_now().await;
    assert_eq!(h.channel.published().len(), 2);

    h.feed(TransportEvent::Offline).await;
    time::advance(INTERVAL).await;
    yield_now().await;
    assert_eq!(h.channel.published().len(), 2);

    h.feed(TransportEvent::Connect).await;
    time::advance(INTERVAL).await;
    yield_now().await;
    assert_eq!(h.channel.published().len(), 3);

    let coordinator = ShutdownCoordinator::new(Duration::from_millis(2000));
    let intent = coordinator
        .initiate(&mut h.scheduler, &mut h.manager, h.channel.as_ref())
        .await
        .unwrap();
    assert_eq!(intent.code, 0);
    assert_eq!(h.manager.state(), ConnectionState::Closed);
    assert!(!h.scheduler.is_running());
}
