//! emsprobe client library entry.
//!
//! This crate wires the WebSocket transport, the inspection session (connection
//! manager plus event log) and the conformance runner into a cohesive client.
//! It is consumed by the binary (`main.rs`) and by integration tests.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod app_state;
pub mod config;
pub mod conformance;
pub mod session;
pub mod transport;

pub use session::{Authored, EventKind, Session, SessionEvent};
