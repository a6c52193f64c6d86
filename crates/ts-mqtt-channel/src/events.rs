//! Transport event classification.
//!
//! Turns raw rumqttc event-loop results into the small set of transport
//! events the connection state machine consumes, so the state machine
//! can be driven (and tested) without a real broker.

use rumqttc::{ConnectionError, Event, Packet};

/// A lifecycle event observed on the broker connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportEvent {
    /// Session established (ConnAck received).
    Connect,
    /// The client is re-dialing after a lost session.
    Reconnect,
    /// The broker closed the session (server-side Disconnect).
    Offline,
    /// The event loop reported a connection error.
    Error,
}

/// Classify one event-loop poll result.
///
/// Returns `None` for packets that carry no lifecycle meaning
/// (publish acks, pings, outgoing traffic).
pub fn classify(result: &Result<Event, ConnectionError>) -> Option<TransportEvent> {
    match result {
        Ok(Event::Incoming(Packet::ConnAck(_))) => Some(TransportEvent::Connect),
        Ok(Event::Incoming(Packet::Disconnect)) => Some(TransportEvent::Offline),
        Ok(_) => None,
        Err(_) => Some(TransportEvent::Error),
    }
}
