//! Probe config loader (strict parsing).

pub mod schema;

use std::fs;

use emsprobe_core::error::{ProbeError, Result};

pub use schema::{ProbeConfig, TimeoutSection, DEFAULT_ENDPOINT};

pub fn load_from_file(path: &str) -> Result<ProbeConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| ProbeError::Config(format!("read config {path} failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ProbeConfig> {
    let cfg: ProbeConfig = serde_yaml::from_str(s)
        .map_err(|e| ProbeError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
