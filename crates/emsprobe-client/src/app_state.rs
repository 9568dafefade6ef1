//! Application wiring for the `emsprobe` binary.
//!
//! Resolves the effective endpoint, fixture source and timeouts from the
//! config and command-line overrides, and builds sessions and runners from
//! them.

use std::sync::Arc;

use emsprobe_core::error::Result;

use crate::config::{schema::validate_endpoint, ProbeConfig};
use crate::conformance::{
    BuiltinFixtures, ConformanceRunner, Fixture, FixtureFile, FixtureSource, RunnerTimeouts,
};
use crate::session::Session;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: ProbeConfig,
    endpoint: String,
    fixtures_file: Option<String>,
}

impl AppState {
    /// Build application state. An explicit endpoint overrides the config.
    pub fn new(
        cfg: ProbeConfig,
        endpoint: Option<String>,
        fixtures_file: Option<String>,
    ) -> Result<Self> {
        let endpoint = endpoint.unwrap_or_else(|| cfg.endpoint.clone());
        validate_endpoint(&endpoint)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                endpoint,
                fixtures_file,
            }),
        })
    }

    pub fn cfg(&self) -> &ProbeConfig {
        &self.inner.cfg
    }

    pub fn endpoint(&self) -> &str {
        &self.inner.endpoint
    }

    /// Fixture file, else the config's list, else the built-in pair.
    pub fn fixtures(&self) -> Result<Vec<Fixture>> {
        if let Some(path) = &self.inner.fixtures_file {
            return FixtureFile::new(path.clone()).fixtures();
        }
        if !self.inner.cfg.fixtures.is_empty() {
            return self.inner.cfg.fixtures.fixtures();
        }
        BuiltinFixtures.fixtures()
    }

    pub fn session(&self) -> Session {
        Session::new(self.inner.cfg.timeouts.close())
    }

    pub fn runner(&self) -> ConformanceRunner {
        ConformanceRunner::new(
            self.inner.endpoint.clone(),
            RunnerTimeouts::from(&self.inner.cfg.timeouts),
        )
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn endpoint_override_wins() {
        let app = AppState::new(ProbeConfig::default(), Some("ws://10.0.0.2:7337".into()), None)
            .unwrap();
        assert_eq!(app.endpoint(), "ws://10.0.0.2:7337");
        assert_eq!(app.runner().endpoint(), "ws://10.0.0.2:7337");
    }

    #[test]
    fn bad_override_is_rejected() {
        let err = AppState::new(ProbeConfig::default(), Some("http://x".into()), None)
            .err()
            .unwrap();
        assert_eq!(err.code().as_str(), "BAD_CONFIG");
    }

    #[test]
    fn fixtures_fall_back_to_builtin() {
        let app = AppState::new(ProbeConfig::default(), None, None).unwrap();
        assert_eq!(app.fixtures().unwrap().len(), 2);

        let mut cfg = ProbeConfig::default();
        cfg.fixtures = vec![Fixture::new("{}", "{}")];
        let app = AppState::new(cfg, None, None).unwrap();
        assert_eq!(app.fixtures().unwrap(), vec![Fixture::new("{}", "{}")]);
    }
}
