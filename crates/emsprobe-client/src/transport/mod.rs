//! Transport layer (WebSocket client).
//!
//! `ConnectionManager` owns the lifecycle state machine; each connection's
//! socket is driven by an I/O task in `ws` that reports back over one shared
//! event channel, so per-connection ordering is preserved.

pub mod codec;
pub mod connection;
mod ws;

pub use connection::{ConnectionEvent, ConnectionHandle, ConnectionManager, ConnectionState, TransportEvent};
