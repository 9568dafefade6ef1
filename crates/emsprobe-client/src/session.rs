//! Inspection session: one connection manager plus its event log.
//!
//! All mutation happens through `&mut Session` on the caller's task, which
//! serializes log appends, log reads and lifecycle calls. Every transport
//! event is appended to the log inside [`Session::next_event`] *before* the
//! event is returned, so a consumer always finds the entry already recorded.

use tokio::time::{timeout_at, Duration, Instant};

use emsprobe_core::error::{ProbeError, Result};
use emsprobe_core::log::{ConnectionId, EventLog, LogEntry, LogKind, NewEntry, SequenceId};
use emsprobe_core::protocol::Envelope;

use crate::transport::{ConnectionHandle, ConnectionManager, ConnectionState, TransportEvent};

/// Detail text of lifecycle entries.
const OPEN_DETAIL: &str = "OPEN";
const CLOSED_DETAIL: &str = "CLOSED";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Connected,
    Disconnected,
    Error(String),
    Received(String),
}

/// Result of sending user-authored text: always sent verbatim, with the parse
/// failure reported back when the text is not an envelope.
#[derive(Debug)]
pub struct Authored {
    pub entry: SequenceId,
    pub parse_error: Option<ProbeError>,
}

/// A transport event together with the log entry it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEvent {
    pub connection: ConnectionId,
    pub entry: SequenceId,
    pub kind: EventKind,
    pub state: ConnectionState,
}

impl SessionEvent {
    pub fn is_terminal_for(&self, handle: &ConnectionHandle) -> bool {
        self.connection == handle.id()
            && matches!(self.kind, EventKind::Disconnected | EventKind::Error(_))
    }
}

pub struct Session {
    manager: ConnectionManager,
    log: EventLog,
}

impl Session {
    pub fn new(close_timeout: Duration) -> Self {
        Self {
            manager: ConnectionManager::new(close_timeout),
            log: EventLog::new(),
        }
    }

    /// Open a new connection, closing the previous one.
    pub fn connect(&mut self, url: &str) -> ConnectionHandle {
        let handle = self.manager.connect(url);
        tracing::info!(conn = %handle.id(), url, "connect requested");
        handle
    }

    /// Transmit `text` verbatim and record a `sent` entry.
    ///
    /// Fails with `NotConnected` unless the handle is `Connected`; that case
    /// records an `error` entry and never a `sent` one.
    pub fn send(&mut self, handle: &ConnectionHandle, text: impl Into<String>) -> Result<SequenceId> {
        let text = text.into();
        match self.manager.send(handle, text.clone()) {
            Ok(()) => Ok(self
                .log
                .record(NewEntry::frame(LogKind::Sent, Some(handle.id()), text))),
            Err(e) => {
                tracing::warn!(conn = %handle.id(), error = %e, "send refused");
                self.log
                    .record(NewEntry::lifecycle(LogKind::Error, Some(handle.id()), e.to_string()));
                Err(e)
            }
        }
    }

    /// Like [`Session::send`], but rejects text that is not an envelope
    /// before anything is transmitted or logged.
    pub fn send_checked(&mut self, handle: &ConnectionHandle, text: &str) -> Result<SequenceId> {
        Envelope::parse(text)?;
        self.send(handle, text)
    }

    /// Send text typed by a user. Unlike [`Session::send_checked`] the text
    /// goes out even when it does not parse.
    pub fn send_authored(&mut self, handle: &ConnectionHandle, text: &str) -> Result<Authored> {
        let parse_error = Envelope::parse(text).err();
        if let Some(e) = &parse_error {
            tracing::warn!(conn = %handle.id(), error = %e, "sending text that is not an envelope");
        }
        let entry = self.send(handle, text)?;
        Ok(Authored { entry, parse_error })
    }

    /// Re-encode and send an envelope (compact form).
    pub fn send_envelope(&mut self, handle: &ConnectionHandle, env: &Envelope) -> Result<SequenceId> {
        let text = env.serialize(false)?;
        self.send(handle, text)
    }

    pub fn disconnect(&mut self, handle: &ConnectionHandle) {
        tracing::info!(conn = %handle.id(), "disconnect requested");
        self.manager.disconnect(handle);
    }

    /// Disconnect and wait up to `bound` for the terminal event, so it is in
    /// the log on return. Returns false when no confirmation arrived.
    pub async fn close(&mut self, handle: &ConnectionHandle, bound: Duration) -> bool {
        let live = !self.state(handle).is_terminal();
        self.disconnect(handle);
        if !live {
            return true;
        }

        let deadline = Instant::now() + bound;
        while let Ok(ev) = self.next_event_until(deadline, "close").await {
            if ev.is_terminal_for(handle) {
                return true;
            }
        }
        tracing::debug!(conn = %handle.id(), "no close confirmation");
        false
    }

    pub fn state(&self, handle: &ConnectionHandle) -> ConnectionState {
        self.manager.state(handle)
    }

    pub fn connected_count(&self) -> usize {
        self.manager.connected_count()
    }

    /// Next transport event, already applied to the state machine and logged.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        let ev = self.manager.recv().await?;

        let (kind, entry) = match ev.event {
            TransportEvent::Opened => (
                EventKind::Connected,
                NewEntry::lifecycle(LogKind::Connected, Some(ev.connection), OPEN_DETAIL),
            ),
            TransportEvent::Closed => (
                EventKind::Disconnected,
                NewEntry::lifecycle(LogKind::Disconnected, Some(ev.connection), CLOSED_DETAIL),
            ),
            TransportEvent::Failed(e) => (
                EventKind::Error(e.clone()),
                NewEntry::lifecycle(LogKind::Error, Some(ev.connection), e),
            ),
            TransportEvent::Frame(text) => (
                EventKind::Received(text.clone()),
                NewEntry::frame(LogKind::Received, Some(ev.connection), text),
            ),
        };

        let entry = self.log.record(entry);
        Some(SessionEvent {
            connection: ev.connection,
            entry,
            kind,
            state: ev.state,
        })
    }

    /// Next event, or `Timeout` once `deadline` passes.
    pub async fn next_event_until(&mut self, deadline: Instant, what: &'static str) -> Result<SessionEvent> {
        timeout_at(deadline, self.next_event())
            .await
            .map_err(|_| ProbeError::Timeout(what))?
            .ok_or_else(|| ProbeError::Internal("event channel closed".into()))
    }

    /// Collect every event that arrives before `deadline`.
    pub async fn drain_until(&mut self, deadline: Instant) -> Vec<SessionEvent> {
        let mut out = Vec::new();
        while let Ok(ev) = self.next_event_until(deadline, "drain").await {
            out.push(ev);
        }
        out
    }

    /// Record a condition that has no transport event of its own (timeouts).
    pub fn note_error(&mut self, connection: Option<ConnectionId>, detail: impl Into<String>) -> SequenceId {
        self.log
            .record(NewEntry::lifecycle(LogKind::Error, connection, detail))
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn log_entry(&self, id: SequenceId) -> Result<&LogEntry> {
        self.log.get(id)
    }

    pub fn log_size(&self) -> usize {
        self.log.size()
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }
}
