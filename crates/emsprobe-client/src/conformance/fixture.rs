//! Fixtures and where they come from.

use std::fs;

use serde::{Deserialize, Serialize};

use emsprobe_core::error::{ProbeError, Result};
use emsprobe_core::protocol::describe_text;

/// A fixed request and the response it must produce. Both are raw text and are
/// never pre-validated: a malformed request is still sent verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Fixture {
    pub request: String,
    pub expected: String,
}

impl Fixture {
    pub fn new(request: impl Into<String>, expected: impl Into<String>) -> Self {
        Self {
            request: request.into(),
            expected: expected.into(),
        }
    }

    pub fn label(&self) -> String {
        describe_text(&self.request)
    }
}

pub trait FixtureSource {
    fn fixtures(&self) -> Result<Vec<Fixture>>;
}

impl FixtureSource for Vec<Fixture> {
    fn fixtures(&self) -> Result<Vec<Fixture>> {
        Ok(self.clone())
    }
}

const MENU_RESPONSE: &str = r#"{"data":{"menus":[{"enabled":true,"icon":"http://ip/imgs/library.png","name":"Library","url_scheme":"library://"},{"enabled":false,"icon":"http://ip/imgs/cdda.png","name":"Audio CD","url_scheme":"cdda://"},{"enabled":true,"icon":"http://ip/imgs/playlists.png","name":"Playlists","url_scheme":"playlist://"},{"enabled":true,"icon":"http://ip/imgs/settings.png","name":"Settings","url_scheme":"settings://"}]},"msg":"EMS_BROWSE","msg_id":"42","uuid":"110e8400-e29b-11d4-a716-446655440000"}"#;

/// The browse-menu fixtures the device is expected to answer out of the box.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinFixtures;

impl FixtureSource for BuiltinFixtures {
    fn fixtures(&self) -> Result<Vec<Fixture>> {
        Ok(builtin())
    }
}

pub fn builtin() -> Vec<Fixture> {
    vec![
        Fixture::new(
            r#"{ "msg": "EMS_BROWSE", "msg_id": "42", "uuid": "110e8400-e29b-11d4-a716-446655440000", "url": "menu://"}"#,
            MENU_RESPONSE,
        ),
        Fixture::new(
            r#"{ "msg": "EMS_BROWSE", "msg_id": "42", "uuid": "110e8400-e29b-11d4-a716-446655440000", "url": "library://music/artists"}"#,
            MENU_RESPONSE,
        ),
    ]
}

/// YAML file holding a `fixtures:` list.
#[derive(Debug, Clone)]
pub struct FixtureFile {
    pub path: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FixtureDoc {
    fixtures: Vec<Fixture>,
}

impl FixtureFile {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl FixtureSource for FixtureFile {
    fn fixtures(&self) -> Result<Vec<Fixture>> {
        load_from_file(&self.path)
    }
}

pub fn load_from_file(path: &str) -> Result<Vec<Fixture>> {
    let s = fs::read_to_string(path)
        .map_err(|e| ProbeError::Config(format!("read fixtures {path} failed: {e}")))?;
    parse_fixtures(&s)
}

pub fn parse_fixtures(s: &str) -> Result<Vec<Fixture>> {
    let doc: FixtureDoc = serde_yaml::from_str(s)
        .map_err(|e| ProbeError::Config(format!("invalid fixture yaml: {e}")))?;
    if doc.fixtures.is_empty() {
        return Err(ProbeError::Config("fixtures must not be empty".into()));
    }
    Ok(doc.fixtures)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn builtin_pair_targets_browse_menu() {
        let fx = BuiltinFixtures.fixtures().unwrap();
        assert_eq!(fx.len(), 2);
        assert_eq!(fx[0].label(), "EMS_BROWSE | menu://");
        assert_eq!(fx[1].label(), "EMS_BROWSE | library://music/artists");
        assert_eq!(fx[0].expected, fx[1].expected);
    }

    #[test]
    fn fixture_yaml_is_strict() {
        let ok = r#"
fixtures:
  - request: '{"msg":"EMS_PLAYER","action":"stop"}'
    expected: '{"msg":"EMS_PLAYER"}'
"#;
        let fx = parse_fixtures(ok).unwrap();
        assert_eq!(fx[0].label(), "EMS_PLAYER | stop");

        let typo = r#"
fixtures:
  - request: '{}'
    expect: '{}'
"#;
        assert_eq!(parse_fixtures(typo).unwrap_err().code().as_str(), "BAD_CONFIG");
        assert!(parse_fixtures("fixtures: []").is_err());
    }
}
