//! Shared wire types for TempSense devices and the downstream rule engine.

pub mod telemetry;

pub use telemetry::*;
