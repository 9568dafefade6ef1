//! Fixture replay.
//!
//! Per fixture, strictly sequential:
//! 1. open a fresh connection to the endpoint
//! 2. once `Connected`, send the request text verbatim
//! 3. take the next frame received on that connection as the response
//!    (order-based correlation, `msg_id` is not checked)
//! 4. compare with the expected text, structurally when both parse
//! 5. close the connection and move on
//!
//! Timeouts, refused connections and early closes settle the fixture as a
//! failure; they never abort the remaining fixtures.

use std::fmt;

use futures_util::stream::{self, Stream, StreamExt};
use tokio::time::{Duration, Instant};

use emsprobe_core::error::{ErrorCode, ProbeError, Result};
use emsprobe_core::protocol::compare::compare_responses;

use crate::config::{ProbeConfig, TimeoutSection};
use crate::session::{EventKind, Session};
use crate::transport::ConnectionHandle;

use super::fixture::Fixture;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerTimeouts {
    pub connect: Duration,
    pub response: Duration,
    pub close: Duration,
}

impl From<&TimeoutSection> for RunnerTimeouts {
    fn from(t: &TimeoutSection) -> Self {
        Self {
            connect: t.connect(),
            response: t.response(),
            close: t.close(),
        }
    }
}

impl Default for RunnerTimeouts {
    fn default() -> Self {
        Self::from(&TimeoutSection::default())
    }
}

/// What came back for a fixture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actual {
    Response(String),
    /// Stage that timed out ("connection open" / "response").
    TimedOut(&'static str),
    Failed { code: ErrorCode, detail: String },
}

impl From<ProbeError> for Actual {
    fn from(e: ProbeError) -> Self {
        match e {
            ProbeError::Timeout(stage) => Actual::TimedOut(stage),
            other => Actual::Failed {
                code: other.code(),
                detail: other.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    pub index: usize,
    pub label: String,
    pub actual: Actual,
    pub pass: bool,
}

impl fmt::Display for RunResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.pass { "PASS" } else { "FAIL" };
        write!(f, "{verdict} #{} {}", self.index, self.label)?;
        match &self.actual {
            Actual::Response(_) if self.pass => Ok(()),
            Actual::Response(_) => write!(f, " (response differs)"),
            Actual::TimedOut(stage) => write!(f, " (timeout: {stage})"),
            Actual::Failed { code, detail } => write!(f, " ({}: {detail})", code.as_str()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub results: Vec<RunResult>,
}

impl RunReport {
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.pass).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.passed()
    }

    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.pass)
    }
}

pub struct ConformanceRunner {
    endpoint: String,
    timeouts: RunnerTimeouts,
}

impl ConformanceRunner {
    pub fn new(endpoint: impl Into<String>, timeouts: RunnerTimeouts) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeouts,
        }
    }

    pub fn from_config(cfg: &ProbeConfig) -> Self {
        Self::new(cfg.endpoint.clone(), RunnerTimeouts::from(&cfg.timeouts))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Lazily replay `fixtures`. Each poll of the stream drives one fixture to
    /// completion; calling `run` again starts over with fresh connections.
    pub fn run<'a>(
        &'a self,
        session: &'a mut Session,
        fixtures: &'a [Fixture],
    ) -> impl Stream<Item = RunResult> + 'a {
        stream::unfold((session, 0usize), move |(session, index)| async move {
            let fixture = fixtures.get(index)?;
            let result = self.run_one(session, index, fixture).await;
            Some((result, (session, index + 1)))
        })
    }

    pub async fn run_all(&self, session: &mut Session, fixtures: &[Fixture]) -> RunReport {
        let results = self.run(session, fixtures).collect::<Vec<_>>().await;
        RunReport { results }
    }

    /// Check that the endpoint accepts a connection at all.
    pub async fn probe(&self, session: &mut Session) -> Result<()> {
        let handle = session.connect(&self.endpoint);
        let res = self.await_open(session, &handle).await;
        if let Err(ProbeError::Timeout(stage)) = &res {
            session.note_error(Some(handle.id()), format!("timed out waiting for {stage}"));
        }
        self.close(session, &handle).await;
        res
    }

    async fn run_one(&self, session: &mut Session, index: usize, fixture: &Fixture) -> RunResult {
        let label = fixture.label();
        let handle = session.connect(&self.endpoint);

        let actual = match self.exchange(session, &handle, fixture).await {
            Ok(text) => Actual::Response(text),
            Err(e) => {
                if let ProbeError::Timeout(stage) = &e {
                    session.note_error(Some(handle.id()), format!("timed out waiting for {stage}"));
                }
                Actual::from(e)
            }
        };
        self.close(session, &handle).await;

        let pass = match &actual {
            Actual::Response(text) => compare_responses(&fixture.expected, text).pass,
            _ => false,
        };
        tracing::info!(index, label = %label, pass, "fixture done");

        RunResult {
            index,
            label,
            actual,
            pass,
        }
    }

    async fn exchange(
        &self,
        session: &mut Session,
        handle: &ConnectionHandle,
        fixture: &Fixture,
    ) -> Result<String> {
        self.await_open(session, handle).await?;
        session.send(handle, fixture.request.as_str())?;
        self.await_response(session, handle).await
    }

    async fn await_open(&self, session: &mut Session, handle: &ConnectionHandle) -> Result<()> {
        let deadline = Instant::now() + self.timeouts.connect;
        loop {
            let ev = session.next_event_until(deadline, "connection open").await?;
            if ev.connection != handle.id() {
                continue;
            }
            match ev.kind {
                EventKind::Connected => return Ok(()),
                EventKind::Disconnected => {
                    return Err(ProbeError::Transport("closed before open".into()))
                }
                EventKind::Error(e) => return Err(ProbeError::Transport(e)),
                EventKind::Received(_) => {}
            }
        }
    }

    async fn await_response(&self, session: &mut Session, handle: &ConnectionHandle) -> Result<String> {
        let deadline = Instant::now() + self.timeouts.response;
        loop {
            let ev = session.next_event_until(deadline, "response").await?;
            if ev.connection != handle.id() {
                continue;
            }
            match ev.kind {
                EventKind::Received(text) => return Ok(text),
                EventKind::Disconnected => {
                    return Err(ProbeError::Transport("closed before response".into()))
                }
                EventKind::Error(e) => return Err(ProbeError::Transport(e)),
                EventKind::Connected => {}
            }
        }
    }

    /// Close and wait (bounded) for the terminal event so it lands in the log
    /// before the next fixture starts.
    async fn close(&self, session: &mut Session, handle: &ConnectionHandle) {
        // The socket task itself waits up to `close` for the peer.
        session.close(handle, self.timeouts.close * 2).await;
    }
}
