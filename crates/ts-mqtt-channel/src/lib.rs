//! MQTT transport channel for TempSense devices.
//!
//! Wraps `rumqttc` behind a small abstraction the simulator core consumes:
//! - `Channel` trait for publish/disconnect (mockable in tests)
//! - `MqttChannel` with TLS (mTLS) for AWS IoT Core
//! - `MockChannel` for testing without a broker
//! - `TransportEvent` classification of event-loop results

pub mod channel;
pub mod config;
pub mod error;
pub mod events;
pub mod mock;
pub mod tls;

// Re-exports for convenience.
pub use channel::{Channel, MqttChannel};
pub use config::MqttConfig;
pub use error::{MqttError, MqttResult};
pub use events::{TransportEvent, classify};
pub use mock::MockChannel;
