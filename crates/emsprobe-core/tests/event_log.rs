#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use emsprobe_core::log::{ConnectionId, EventLog, LogKind, NewEntry, ORIGIN};
use emsprobe_core::protocol::{EMPTY_MSG_LABEL, INVALID_LABEL};

fn sent(text: &str) -> NewEntry {
    NewEntry::frame(LogKind::Sent, Some(ConnectionId(1)), text.to_string())
}

#[test]
fn ids_are_gapless_and_increasing() {
    let mut log = EventLog::new();
    let ids: Vec<_> = (0..5).map(|i| log.record(sent(&format!("{{\"msg\":\"M{i}\"}}")))).collect();

    assert_eq!(log.size(), 5);
    for (i, id) in ids.iter().enumerate() {
        assert_eq!(id.seq(), ORIGIN + i as u64);
        assert_eq!(log.get(*id).unwrap().label, format!("M{i}"));
    }
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn clear_resets_size_and_invalidates_ids() {
    let mut log = EventLog::new();
    let old = log.record(sent(r#"{"msg":"EMS_BROWSE"}"#));
    log.record(NewEntry::lifecycle(LogKind::Connected, Some(ConnectionId(1)), "OPEN"));

    log.clear();
    assert_eq!(log.size(), 0);
    assert!(log.is_empty());

    let err = log.get(old).unwrap_err();
    assert_eq!(err.code().as_str(), "NOT_FOUND");

    // the counter restarts, but the stale id still does not resolve
    let fresh = log.record(sent(r#"{"msg":"EMS_PLAYER"}"#));
    assert_eq!(fresh.seq(), ORIGIN);
    assert_eq!(fresh.seq(), old.seq());
    assert!(log.get(old).is_err());
    assert_eq!(log.get(fresh).unwrap().label, "EMS_PLAYER");
}

#[test]
fn labels_degrade_but_entries_are_kept() {
    let mut log = EventLog::new();
    let empty = log.record(sent(r#"{"msg":""}"#));
    let invalid = log.record(sent("{ not json"));
    let missing = log.record(NewEntry::frame(LogKind::Received, None, r#"{"msg_id":"9"}"#.into()));

    assert_eq!(log.get(empty).unwrap().label, EMPTY_MSG_LABEL);
    assert_eq!(log.get(invalid).unwrap().label, INVALID_LABEL);
    assert_eq!(log.get(invalid).unwrap().raw, "{ not json");

    let entry = log.get(missing).unwrap();
    assert_eq!(entry.label, EMPTY_MSG_LABEL);
    assert_eq!(entry.msg_id, "9");
    assert_eq!(entry.kind, LogKind::Received);
}

#[test]
fn raw_text_is_not_reserialized() {
    let mut log = EventLog::new();
    let text = "{ \"msg\" : \"EMS_BROWSE\",   \"url\": \"menu://\" }";
    let id = log.record(sent(text));

    let entry = log.get(id).unwrap();
    assert_eq!(entry.raw, text);
    assert_eq!(
        entry.pretty(),
        "{\n    \"msg\": \"EMS_BROWSE\",\n    \"url\": \"menu://\"\n}"
    );
}

#[test]
fn lifecycle_entries_have_fixed_labels() {
    let mut log = EventLog::new();
    let c = log.record(NewEntry::lifecycle(LogKind::Connected, Some(ConnectionId(3)), "OPEN"));
    let d = log.record(NewEntry::lifecycle(LogKind::Disconnected, Some(ConnectionId(3)), "CLOSED"));
    let e = log.record(NewEntry::lifecycle(LogKind::Error, None, "connection not open"));

    assert_eq!(log.get(c).unwrap().label, "Connected");
    assert_eq!(log.get(d).unwrap().label, "Disconnected");
    assert_eq!(log.get(d).unwrap().pretty(), "CLOSED");
    assert_eq!(log.get(e).unwrap().label, "Error");
    assert_eq!(log.get(e).unwrap().connection, None);
    assert_eq!(log.last().unwrap().id, e);
}

#[test]
fn unknown_id_is_not_found() {
    let mut log = EventLog::new();
    let id = log.record(sent("{}"));
    log.clear();
    log.clear();
    assert!(matches!(
        log.get(id),
        Err(emsprobe_core::ProbeError::NotFound(_))
    ));
}
