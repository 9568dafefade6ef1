#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::time::Duration;

use emsprobe_client::config::{self, DEFAULT_ENDPOINT};

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
endpoint: "ws://192.168.1.20:7337"
timeouts:
  respons_ms: 3000 # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "BAD_CONFIG");
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.endpoint, DEFAULT_ENDPOINT);
    assert_eq!(cfg.timeouts.connect(), Duration::from_millis(5000));
    assert_eq!(cfg.timeouts.response(), Duration::from_millis(5000));
    assert_eq!(cfg.timeouts.close(), Duration::from_millis(1000));
    assert!(cfg.fixtures.is_empty());
}

#[test]
fn fixtures_are_read_from_config() {
    let ok = r#"
version: 1
endpoint: "wss://player.local:7337/ws"
fixtures:
  - request: '{"msg":"EMS_BROWSE","msg_id":"1","url":"menu://"}'
    expected: '{"msg":"MENU_RESPONSE","msg_id":"1"}'
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.endpoint, "wss://player.local:7337/ws");
    assert_eq!(cfg.fixtures.len(), 1);
    assert_eq!(cfg.fixtures[0].label(), "EMS_BROWSE | menu://");
}

#[test]
fn unsupported_version_fails() {
    let err = config::load_from_str("version: 2\n").expect_err("must fail");
    assert_eq!(err.code().as_str(), "BAD_CONFIG");
}

#[test]
fn out_of_range_timeout_fails() {
    let bad = r#"
version: 1
timeouts:
  connect_ms: 5
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "BAD_CONFIG");
}

#[test]
fn non_websocket_endpoint_fails() {
    for endpoint in ["http://127.0.0.1:7337", "not a url", "ws://"] {
        let yaml = format!("version: 1\nendpoint: \"{endpoint}\"\n");
        let err = config::load_from_str(&yaml).expect_err(endpoint);
        assert_eq!(err.code().as_str(), "BAD_CONFIG", "{endpoint}");
    }
}
