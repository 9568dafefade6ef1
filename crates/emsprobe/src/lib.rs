//! emsprobe: inspection and conformance client for a JSON-over-WebSocket
//! media-device control protocol.
//!
//! Depend on this crate alone to get the protocol model, the event log, the
//! session and the conformance runner:
//!
//! ```no_run
//! use emsprobe::prelude::*;
//!
//! # async fn demo() -> emsprobe::core::Result<()> {
//! let cfg = config::load_from_str("version: 1\nendpoint: ws://192.168.1.20:7337\n")?;
//! let runner = ConformanceRunner::from_config(&cfg);
//! let mut session = Session::new(cfg.timeouts.close());
//! let report = runner.run_all(&mut session, &BuiltinFixtures.fixtures()?).await;
//! println!("{} passed, {} failed", report.passed(), report.failed());
//! # Ok(())
//! # }
//! ```

pub mod core {
    pub use emsprobe_core::*;
}

pub mod client {
    pub use emsprobe_client::*;
}

/// The types most callers need.
pub mod prelude {
    pub use emsprobe_client::config;
    pub use emsprobe_client::conformance::{
        BuiltinFixtures, ConformanceRunner, Fixture, FixtureSource, RunReport, RunResult,
    };
    pub use emsprobe_client::transport::{ConnectionHandle, ConnectionState};
    pub use emsprobe_client::{EventKind, Session, SessionEvent};
    pub use emsprobe_core::log::{EventLog, LogEntry, LogKind, SequenceId};
    pub use emsprobe_core::protocol::{catalog, compare::compare_responses, Envelope};
    pub use emsprobe_core::{ErrorCode, ProbeError};
}
