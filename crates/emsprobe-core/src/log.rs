//! Append-only event log of connection lifecycle and sent/received frames.
//!
//! Rules:
//! - Ids are assigned at append time, strictly increasing from [`ORIGIN`].
//! - The log is cleared only as a whole. Clearing starts a new epoch, so ids
//!   handed out before the clear resolve to `NotFound` even after the
//!   per-epoch counter has restarted.
//! - Entries keep the raw text exactly as sent or received; the pretty
//!   rendering is computed on inspection.

use std::fmt;

use crate::error::{ProbeError, Result};
use crate::protocol::envelope::{prettify, Envelope, INVALID_LABEL};

/// First sequence number of every epoch.
pub const ORIGIN: u64 = 0;

/// Logical creation stamp of one connection instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Stable id of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SequenceId {
    epoch: u64,
    seq: u64,
}

impl SequenceId {
    /// Position within the current epoch (what a counter badge shows).
    pub fn seq(self) -> u64 {
        self.seq
    }
}

impl fmt::Display for SequenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.seq)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    Connected,
    Disconnected,
    Error,
    Sent,
    Received,
}

impl LogKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LogKind::Connected => "connected",
            LogKind::Disconnected => "disconnected",
            LogKind::Error => "error",
            LogKind::Sent => "sent",
            LogKind::Received => "received",
        }
    }

    fn lifecycle_label(self) -> Option<&'static str> {
        match self {
            LogKind::Connected => Some("Connected"),
            LogKind::Disconnected => Some("Disconnected"),
            LogKind::Error => Some("Error"),
            LogKind::Sent | LogKind::Received => None,
        }
    }
}

/// An entry before it has been assigned an id.
#[derive(Debug, Clone)]
pub struct NewEntry {
    kind: LogKind,
    connection: Option<ConnectionId>,
    label: String,
    msg_id: String,
    raw: String,
}

impl NewEntry {
    /// Connected / disconnected / error entry carrying a free-form detail.
    pub fn lifecycle(kind: LogKind, connection: Option<ConnectionId>, detail: impl Into<String>) -> Self {
        Self {
            kind,
            connection,
            label: kind.lifecycle_label().unwrap_or(kind.as_str()).to_string(),
            msg_id: String::new(),
            raw: detail.into(),
        }
    }

    /// Sent / received frame. The label degrades to [`INVALID_LABEL`] when the
    /// text is not an envelope; the entry itself is always kept.
    pub fn frame(kind: LogKind, connection: Option<ConnectionId>, raw: String) -> Self {
        let (label, msg_id) = match Envelope::parse(&raw) {
            Ok(env) => (env.label().to_string(), env.msg_id().to_string()),
            Err(_) => (INVALID_LABEL.to_string(), String::new()),
        };
        Self {
            kind,
            connection,
            label,
            msg_id,
            raw,
        }
    }
}

/// One recorded event.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub id: SequenceId,
    pub kind: LogKind,
    pub connection: Option<ConnectionId>,
    pub label: String,
    pub msg_id: String,
    pub raw: String,
}

impl LogEntry {
    /// Four-space JSON rendering of the raw text, or the text itself.
    pub fn pretty(&self) -> String {
        prettify(&self.raw)
    }
}

#[derive(Debug, Default)]
pub struct EventLog {
    epoch: u64,
    entries: Vec<LogEntry>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry and return its id.
    pub fn record(&mut self, entry: NewEntry) -> SequenceId {
        let id = SequenceId {
            epoch: self.epoch,
            seq: ORIGIN + self.entries.len() as u64,
        };
        tracing::trace!(id = %id, kind = entry.kind.as_str(), label = %entry.label, "log append");
        self.entries.push(LogEntry {
            id,
            kind: entry.kind,
            connection: entry.connection,
            label: entry.label,
            msg_id: entry.msg_id,
            raw: entry.raw,
        });
        id
    }

    pub fn get(&self, id: SequenceId) -> Result<&LogEntry> {
        if id.epoch != self.epoch {
            return Err(ProbeError::NotFound(id));
        }
        id.seq
            .checked_sub(ORIGIN)
            .and_then(|i| usize::try_from(i).ok())
            .and_then(|i| self.entries.get(i))
            .ok_or(ProbeError::NotFound(id))
    }

    /// Drop every entry. Ids restart at [`ORIGIN`] in a new epoch.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.epoch = self.epoch.wrapping_add(1);
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.last()
    }
}
