use std::time::Duration;

use serde::Deserialize;
use url::Url;

use emsprobe_core::error::{ProbeError, Result};

use crate::conformance::Fixture;

/// The protocol server's default WebSocket port is 7337.
pub const DEFAULT_ENDPOINT: &str = "ws://127.0.0.1:7337";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProbeConfig {
    pub version: u32,

    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default)]
    pub timeouts: TimeoutSection,

    /// Empty means "use the built-in fixtures".
    #[serde(default)]
    pub fixtures: Vec<Fixture>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            version: 1,
            endpoint: default_endpoint(),
            timeouts: TimeoutSection::default(),
            fixtures: Vec::new(),
        }
    }
}

impl ProbeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(ProbeError::Config(format!(
                "unsupported config version {}",
                self.version
            )));
        }
        validate_endpoint(&self.endpoint)?;
        self.timeouts.validate()?;
        Ok(())
    }
}

/// Accept only `ws://` / `wss://` URLs with a host.
pub fn validate_endpoint(endpoint: &str) -> Result<()> {
    let url = Url::parse(endpoint)
        .map_err(|e| ProbeError::Config(format!("invalid endpoint {endpoint}: {e}")))?;
    if !matches!(url.scheme(), "ws" | "wss") {
        return Err(ProbeError::Config(format!(
            "endpoint must use ws:// or wss://, got {}://",
            url.scheme()
        )));
    }
    if url.host_str().is_none() {
        return Err(ProbeError::Config(format!("endpoint {endpoint} has no host")));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimeoutSection {
    #[serde(default = "default_connect_ms")]
    pub connect_ms: u64,

    #[serde(default = "default_response_ms")]
    pub response_ms: u64,

    #[serde(default = "default_close_ms")]
    pub close_ms: u64,
}

impl Default for TimeoutSection {
    fn default() -> Self {
        Self {
            connect_ms: default_connect_ms(),
            response_ms: default_response_ms(),
            close_ms: default_close_ms(),
        }
    }
}

impl TimeoutSection {
    pub fn validate(&self) -> Result<()> {
        if !(100..=120_000).contains(&self.connect_ms) {
            return Err(ProbeError::Config(
                "timeouts.connect_ms must be between 100 and 120000".into(),
            ));
        }
        if !(100..=120_000).contains(&self.response_ms) {
            return Err(ProbeError::Config(
                "timeouts.response_ms must be between 100 and 120000".into(),
            ));
        }
        if !(10..=60_000).contains(&self.close_ms) {
            return Err(ProbeError::Config(
                "timeouts.close_ms must be between 10 and 60000".into(),
            ));
        }
        Ok(())
    }

    pub fn connect(&self) -> Duration {
        Duration::from_millis(self.connect_ms)
    }

    pub fn response(&self) -> Duration {
        Duration::from_millis(self.response_ms)
    }

    pub fn close(&self) -> Duration {
        Duration::from_millis(self.close_ms)
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.into()
}
fn default_connect_ms() -> u64 {
    5000
}
fn default_response_ms() -> u64 {
    5000
}
fn default_close_ms() -> u64 {
    1000
}
