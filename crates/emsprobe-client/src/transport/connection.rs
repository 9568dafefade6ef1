//! Connection manager: one live WebSocket at a time.
//!
//! State machine per connection instance:
//! ```text
//! Disconnected --connect()--> Connecting
//! Connecting   --open-------> Connected
//! Connecting   --error------> Errored
//! Connected    --close------> Disconnected
//! Connected    --error------> Errored
//! Connected    --disconnect()-> Disconnected
//! ```
//! `Disconnected` and `Errored` are terminal. A new `connect()` creates a new
//! instance and retires the previous one (graceful close requested, state set
//! to `Disconnected` immediately) so two connections are never `Connected`
//! together. Events that the retired socket still produces are reported but do
//! not change its state.
//!
//! Transitions are applied by [`ConnectionManager::recv`] on the caller's task;
//! socket I/O runs in spawned tasks that only send events back. Nothing here is
//! shared across threads, so no locking is needed.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tokio::time::Duration;
use tracing::Instrument;

use emsprobe_core::error::{ProbeError, Result};
use emsprobe_core::log::ConnectionId;

use super::ws::{run_connection, Command, EventSender};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Errored,
}

impl ConnectionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ConnectionState::Disconnected | ConnectionState::Errored)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Errored => "errored",
        }
    }
}

/// What the socket task reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Opened,
    Frame(String),
    Closed,
    Failed(String),
}

/// A transport event after its state transition has been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionEvent {
    pub connection: ConnectionId,
    pub event: TransportEvent,
    /// State of that connection after the event.
    pub state: ConnectionState,
}

/// Caller-side reference to one connection instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionHandle {
    id: ConnectionId,
    url: String,
}

impl ConnectionHandle {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

struct ConnectionRecord {
    state: ConnectionState,
    // None once terminal.
    cmd_tx: Option<mpsc::UnboundedSender<Command>>,
}

pub struct ConnectionManager {
    next_id: u64,
    current: Option<ConnectionId>,
    records: HashMap<ConnectionId, ConnectionRecord>,
    events_tx: EventSender,
    events_rx: mpsc::UnboundedReceiver<(ConnectionId, TransportEvent)>,
    close_timeout: Duration,
}

impl ConnectionManager {
    pub fn new(close_timeout: Duration) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            next_id: 1,
            current: None,
            records: HashMap::new(),
            events_tx,
            events_rx,
            close_timeout,
        }
    }

    /// Start a new connection; returns immediately in `Connecting`.
    ///
    /// Must be called from within a tokio runtime (the socket task is spawned).
    pub fn connect(&mut self, url: &str) -> ConnectionHandle {
        if let Some(prev) = self.current.take() {
            self.retire(prev);
        }

        let id = ConnectionId(self.next_id);
        self.next_id += 1;

        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let span = tracing::info_span!("conn", id = id.0, url = %url);
        tokio::spawn(
            run_connection(id, url.to_string(), cmd_rx, self.events_tx.clone(), self.close_timeout)
                .instrument(span),
        );

        self.records.insert(
            id,
            ConnectionRecord {
                state: ConnectionState::Connecting,
                cmd_tx: Some(cmd_tx),
            },
        );
        self.current = Some(id);

        ConnectionHandle {
            id,
            url: url.to_string(),
        }
    }

    /// Queue `text` for transmission, verbatim.
    pub fn send(&mut self, handle: &ConnectionHandle, text: String) -> Result<()> {
        let record = self
            .records
            .get(&handle.id)
            .filter(|r| r.state == ConnectionState::Connected)
            .ok_or(ProbeError::NotConnected)?;

        let tx = record.cmd_tx.as_ref().ok_or(ProbeError::NotConnected)?;
        tx.send(Command::Send(text))
            .map_err(|_| ProbeError::Transport("socket task exited".into()))
    }

    /// Request a graceful close. Idempotent.
    pub fn disconnect(&mut self, handle: &ConnectionHandle) {
        self.retire(handle.id);
    }

    pub fn state(&self, handle: &ConnectionHandle) -> ConnectionState {
        self.records
            .get(&handle.id)
            .map(|r| r.state)
            .unwrap_or(ConnectionState::Disconnected)
    }

    pub fn connected_count(&self) -> usize {
        self.records
            .values()
            .filter(|r| r.state == ConnectionState::Connected)
            .count()
    }

    /// Wait for the next transport event and apply its transition.
    ///
    /// Pending forever when no connection is producing events; callers bound
    /// the wait with a timeout.
    pub async fn recv(&mut self) -> Option<ConnectionEvent> {
        let (connection, event) = self.events_rx.recv().await?;
        let state = self.apply(connection, &event);
        Some(ConnectionEvent {
            connection,
            event,
            state,
        })
    }

    fn apply(&mut self, id: ConnectionId, event: &TransportEvent) -> ConnectionState {
        let Some(record) = self.records.get_mut(&id) else {
            return ConnectionState::Disconnected;
        };

        let next = match (record.state, event) {
            (ConnectionState::Connecting, TransportEvent::Opened) => ConnectionState::Connected,
            (ConnectionState::Connecting | ConnectionState::Connected, TransportEvent::Closed) => {
                ConnectionState::Disconnected
            }
            (ConnectionState::Connecting | ConnectionState::Connected, TransportEvent::Failed(_)) => {
                ConnectionState::Errored
            }
            (state, _) => state,
        };

        if next != record.state {
            tracing::debug!(conn = %id, from = record.state.as_str(), to = next.as_str(), "state");
            record.state = next;
        }
        // The socket task is done once it reports a terminal event.
        if matches!(event, TransportEvent::Closed | TransportEvent::Failed(_)) {
            record.cmd_tx = None;
        }
        next
    }

    fn retire(&mut self, id: ConnectionId) {
        let Some(record) = self.records.get_mut(&id) else {
            return;
        };
        if record.state.is_terminal() {
            return;
        }
        record.state = ConnectionState::Disconnected;
        if let Some(tx) = &record.cmd_tx {
            // Task already gone: its terminal event is queued.
            let _ = tx.send(Command::Close);
        }
    }
}
