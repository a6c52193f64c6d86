use serde::{Deserialize, Serialize};

/// One synthetic sensor sample, produced by the telemetry generator.
///
/// Ephemeral: created on a publish tick and dropped once the publish
/// and local-store attempts are done.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Degrees celsius, two fractional digits, within [20.00, 30.00].
    pub temperature: f64,
    /// Relative humidity percent, two fractional digits, within [40.00, 50.00].
    pub humidity: f64,
    /// Unix epoch seconds at generation time.
    pub timestamp: i64,
}

/// The JSON payload published to the telemetry topic.
///
/// Field names and the numeric epoch-seconds timestamp are a compatibility
/// contract with the downstream rule engine (its sort key is the numeric
/// `timestamp`). Do not rename fields without a matching downstream change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TelemetryPayload {
    /// Configured client identifier of the publishing device.
    #[serde(rename = "deviceId")]
    pub device_id: String,
    /// Unix epoch seconds.
    pub timestamp: i64,
    pub temperature: f64,
    pub humidity: f64,
}

impl TelemetryPayload {
    pub fn new(device_id: impl Into<String>, reading: &Reading) -> Self {
        Self {
            device_id: device_id.into(),
            timestamp: reading.timestamp,
            temperature: reading.temperature,
            humidity: reading.humidity,
        }
    }
}
