//! Synthetic telemetry generator.

use chrono::Utc;
use rand::Rng;
use ts_protocol::Reading;

/// Produce one synthetic reading.
///
/// Temperature lands in [20.00, 30.00] and humidity in [40.00, 50.00],
/// both rounded to two decimals. The timestamp is captured at call time,
/// matching what the downstream rule engine uses as its sort key.
/// Cannot fail.
pub fn generate() -> Reading {
    let mut rng = rand::thread_rng();
    Reading {
        temperature: round2(20.0 + rng.r#gen::<f64>() * 10.0),
        humidity: round2(40.0 + rng.r#gen::<f64>() * 10.0),
        timestamp: Utc::now().timestamp(),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
