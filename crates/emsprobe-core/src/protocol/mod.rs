//! Protocol modules (envelope, comparison, request catalog).
//!
//! The control protocol's message catalog is opaque here: envelopes are JSON
//! objects exposing `msg`, `msg_id` and arbitrary payload fields. All parsers
//! are panic-free; malformed input is reported as `ProbeError::Parse`.

pub mod catalog;
pub mod compare;
pub mod envelope;

pub use envelope::{describe_text, prettify, Envelope, EMPTY_MSG_LABEL, INVALID_LABEL};
