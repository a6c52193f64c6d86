//! Connection lifecycle state machine.
//!
//! Transport events drive a strict transition function; the manager owns
//! the current state and tells interested parties when publishing may
//! run (`Ready`) or must pause (`Suspend`). The transition function is
//! pure so the whole lifecycle is unit-testable without a broker.

use ts_mqtt_channel::{Channel, TransportEvent};

/// Connection lifecycle states. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    Connecting,
    Connected,
    Reconnecting,
    Offline,
    Errored,
    Closed,
}

impl ConnectionState {
    pub fn is_terminal(self) -> bool {
        self == ConnectionState::Closed
    }
}

/// Notification emitted on entry to / exit from `Connected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    /// The session is up; publishing may run.
    Ready,
    /// The session is no longer usable; publishing must pause.
    Suspend,
}

/// Apply one transport event to a state.
///
/// Returns the next state and at most one notification. `Suspend` is
/// only emitted when leaving `Connected`, so consumers never see two
/// consecutive `Ready`s without a `Suspend` in between. Undefined
/// (state, event) pairs leave the state unchanged.
pub fn transition(
    state: ConnectionState,
    event: TransportEvent,
) -> (ConnectionState, Option<Notification>) {
    use ConnectionState::*;
    use TransportEvent as Ev;

    match (state, event) {
        // Events after close (or before start) carry no meaning.
        (Closed, _) | (Idle, Ev::Connect | Ev::Reconnect | Ev::Offline) => (state, None),

        (Connecting | Reconnecting | Offline | Errored, Ev::Connect) => {
            (Connected, Some(Notification::Ready))
        }
        (Connected, Ev::Connect) => (Connected, None),

        (Connected, Ev::Reconnect) => (Reconnecting, Some(Notification::Suspend)),

        (Connected, Ev::Offline) => (Offline, Some(Notification::Suspend)),
        (Reconnecting, Ev::Offline) => (Offline, None),
        (Connecting | Offline | Errored, Ev::Offline) => (state, None),

        (Connected, Ev::Error) => (Errored, Some(Notification::Suspend)),
        (_, Ev::Error) => (Errored, None),

        // Reconnect attempts from already-suspended states.
        (Connecting | Reconnecting | Offline | Errored, Ev::Reconnect) => (state, None),
    }
}

/// Owns the connection state and the transport session handle's lifecycle.
///
/// All mutation happens on the runtime's single control loop; no other
/// component reads or writes the state.
pub struct ConnectionManager {
    state: ConnectionState,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            state: ConnectionState::Idle,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Whether a connection attempt was ever made and not yet closed.
    pub fn has_connection(&self) -> bool {
        !matches!(self.state, ConnectionState::Idle | ConnectionState::Closed)
    }

    /// Begin connecting. The transport dials on its own; the `Connect`
    /// event confirms the session later.
    pub fn start(&mut self) {
        if self.state == ConnectionState::Idle {
            tracing::info!("connecting to broker");
            self.state = ConnectionState::Connecting;
        }
    }

    /// Apply one transport event, returning the notification (if any)
    /// the caller must forward to the publish scheduler.
    pub fn handle_event(&mut self, event: TransportEvent) -> Option<Notification> {
        let (next, notification) = transition(self.state, event);
        if next != self.state {
            tracing::info!(from = ?self.state, to = ?next, event = ?event, "connection state changed");
        }
        self.state = next;
        notification
    }

    /// Request a graceful disconnect and wait for the transport to
    /// confirm. Resolves only once the transport does — callers needing
    /// a bound must supply one (see the shutdown coordinator). Never
    /// errors; a failed disconnect request is logged and the state still
    /// moves to `Closed` since the session is unusable either way.
    pub async fn close<C: Channel>(&mut self, channel: &C) {
        if self.state.is_terminal() {
            return;
        }
        if let Err(e) = channel.disconnect().await {
            tracing::warn!(error = %e, "graceful disconnect request failed");
        }
        self.state = ConnectionState::Closed;
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}
