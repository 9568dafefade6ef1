//! emsprobe core: transport-agnostic protocol primitives, error types and the
//! inspectable event log.
//!
//! This crate defines the message envelope, structural comparison, the
//! built-in request catalog and the event log shared by the client, the
//! conformance runner and any presentation layer. It carries no socket or
//! runtime dependencies so it can be reused in multiple front ends.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Malformed wire text
//! surfaces as `ProbeError::Parse` instead of crashing the inspector.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod log;
pub mod protocol;

/// Shared result type.
pub use error::{ErrorCode, ProbeError, Result};
