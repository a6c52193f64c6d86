//! TempSense virtual device — edge simulator binary.
//!
//! Publishes synthetic temperature/humidity readings to the broker on a
//! timer gated by the connection lifecycle, keeps a local JSONL copy,
//! and shuts down gracefully (bounded) on SIGINT/SIGTERM.

use std::process::ExitCode;
use std::sync::Arc;

use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use ts_device_sim::config::SimConfig;
use ts_device_sim::connection::ConnectionManager;
use ts_device_sim::event_loop;
use ts_device_sim::scheduler::PublishScheduler;
use ts_device_sim::shutdown::ShutdownCoordinator;
use ts_device_sim::store::{JsonlStore, ReadingStore};
use ts_mqtt_channel::MqttChannel;

/// Exit code for fatal configuration problems (distinct from a clean
/// shutdown so supervisors don't restart into the same failure).
const EXIT_CONFIG: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "ts-device-sim starting"
    );

    // ── Load and validate config ────────────────────────────────
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/etc/tempsense/device.toml".to_string());

    let config = match SimConfig::from_file(&config_path) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "failed to load configuration");
            return ExitCode::from(EXIT_CONFIG);
        }
    };
    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "invalid configuration");
        return ExitCode::from(EXIT_CONFIG);
    }
    tracing::info!(
        endpoint = %config.mqtt.endpoint,
        client_id = %config.mqtt.client_id,
        topic = %config.topic,
        cert_path = %config.mqtt.cert_path,
        key_path = %config.mqtt.key_path,
        ca_path = %config.mqtt.ca_path,
        "configuration loaded"
    );

    // ── MQTT channel ────────────────────────────────────────────
    let (channel, eventloop) = if config.mqtt.use_tls {
        match MqttChannel::new(&config.mqtt) {
            Ok(pair) => pair,
            Err(e) => {
                tracing::error!(error = %e, "failed to initialize MQTT transport");
                return ExitCode::from(EXIT_CONFIG);
            }
        }
    } else {
        tracing::info!("MQTT plaintext mode (no TLS)");
        MqttChannel::new_plaintext(
            &config.mqtt.endpoint,
            config.mqtt.port,
            &config.mqtt.client_id,
        )
    };
    let channel = Arc::new(channel);

    // ── Local reading store ─────────────────────────────────────
    let store: Option<Arc<dyn ReadingStore>> = config.store_path.as_ref().map(|path| {
        tracing::info!(path = %path, "local reading store enabled");
        Arc::new(JsonlStore::new(path)) as Arc<dyn ReadingStore>
    });

    // ── Core components ─────────────────────────────────────────
    let mut manager = ConnectionManager::new();
    let mut scheduler = PublishScheduler::new(
        Arc::clone(&channel),
        store,
        config.mqtt.client_id.clone(),
        config.topic.clone(),
        config.publish_interval(),
    );
    let coordinator = ShutdownCoordinator::new(config.shutdown_timeout());

    let (mut sigint, mut sigterm) = match (
        signal(SignalKind::interrupt()),
        signal(SignalKind::terminate()),
    ) {
        (Ok(sigint), Ok(sigterm)) => (sigint, sigterm),
        (Err(e), _) | (_, Err(e)) => {
            tracing::error!(error = %e, "failed to install signal handlers");
            return ExitCode::from(1);
        }
    };

    // ── Run ─────────────────────────────────────────────────────
    let (events_tx, mut events_rx) = mpsc::channel(16);
    tokio::spawn(event_loop::run(eventloop, events_tx));
    manager.start();

    // Single control loop: transport events and signals are handled one
    // at a time, so state and timer mutations never race.
    let intent = loop {
        tokio::select! {
            Some(event) = events_rx.recv() => {
                if let Some(notification) = manager.handle_event(event) {
                    scheduler.apply(notification);
                }
            }
            _ = sigint.recv() => {
                if let Some(intent) = coordinator
                    .initiate(&mut scheduler, &mut manager, channel.as_ref())
                    .await
                {
                    break intent;
                }
            }
            _ = sigterm.recv() => {
                if let Some(intent) = coordinator
                    .initiate(&mut scheduler, &mut manager, channel.as_ref())
                    .await
                {
                    break intent;
                }
            }
        }
    };

    tracing::info!(reason = intent.reason, "ts-device-sim stopped");
    ExitCode::from(intent.code)
}
