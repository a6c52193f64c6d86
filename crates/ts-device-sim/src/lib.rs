//! TempSense virtual device — library crate for the simulator runtime.
//!
//! Re-exports all modules so integration tests can drive the connection
//! state machine, publish scheduler, and shutdown coordinator directly.

pub mod config;
pub mod connection;
pub mod event_loop;
pub mod generator;
pub mod scheduler;
pub mod shutdown;
pub mod store;
