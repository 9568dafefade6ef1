//! Built-in request catalog.
//!
//! Example requests covering the browse, player, playlist, auth and CD rip
//! commands. The text is kept exactly as authored so it can be sent verbatim.

use super::envelope::{describe_text, prettify};

macro_rules! request {
    ($msg:literal, $($rest:literal),*) => {
        concat!(r#"{ "msg": ""#, $msg, r#"", "msg_id": "42", "#,
            r#""uuid": "110e8400-e29b-11d4-a716-446655440000""#, $(", ", $rest),*, "}")
    };
}

const REQUESTS: &[&str] = &[
    request!("EMS_BROWSE", r#""url": "menu://""#),
    request!("EMS_BROWSE", r#""url": "cdda://""#),
    request!("EMS_BROWSE", r#""url": "library://music""#),
    request!("EMS_BROWSE", r#""url": "library://music/artists""#),
    request!("EMS_BROWSE", r#""url": "library://music/artists/1""#),
    request!("EMS_BROWSE", r#""url": "library://music/artists/1/1""#),
    request!("EMS_BROWSE", r#""url": "library://music/albums""#),
    request!("EMS_BROWSE", r#""url": "library://music/albums/1""#),
    request!("EMS_BROWSE", r#""url": "library://music/tracks""#),
    request!("EMS_BROWSE", r#""url": "library://music/tracks/1""#),
    request!("EMS_BROWSE", r#""url": "library://music/genres""#),
    request!("EMS_BROWSE", r#""url": "library://music/genres/1""#),
    request!("EMS_BROWSE", r#""url": "playlist://current""#),
    request!("EMS_BROWSE", r#""url": "playlist://""#),
    request!("EMS_BROWSE", r#""url": "playlist://1""#),
    request!("EMS_PLAYER", r#""action": "next""#),
    request!("EMS_PLAYER", r#""action": "prev""#),
    request!("EMS_PLAYER", r#""action": "play""#),
    request!("EMS_PLAYER", r#""action": "play""#, r#""filename": "library://music/tracks/1""#),
    request!("EMS_PLAYER", r#""action": "play""#, r#""filename": "library://music/albums/1""#),
    request!("EMS_PLAYER", r#""action": "play""#, r#""pos": "1""#),
    request!("EMS_PLAYER", r#""action": "pause""#),
    request!("EMS_PLAYER", r#""action": "toggle""#),
    request!("EMS_PLAYER", r#""action": "stop""#),
    request!("EMS_PLAYER", r#""action": "shuffle_on""#),
    request!("EMS_PLAYER", r#""action": "shuffle_off""#),
    request!("EMS_PLAYER", r#""action": "repeat_on""#),
    request!("EMS_PLAYER", r#""action": "repeat_off""#),
    request!("EMS_PLAYLIST", r#""action": "create""#, r#""subdir": "playlists_dirname""#, r#""name": "my_new_playlist""#),
    request!("EMS_PLAYLIST", r#""action": "add""#, r#""url": "playlist://current""#, r#""filename": "cdda://""#),
    request!("EMS_PLAYLIST", r#""action": "add""#, r#""url": "playlist://current""#, r#""filename": "file:///media/usb/music/beatles""#),
    request!("EMS_PLAYLIST", r#""action": "add""#, r#""url": "playlist://current""#, r#""filename": "library://music/tracks/1""#),
    request!("EMS_PLAYLIST", r#""action": "add""#, r#""url": "playlist://current""#, r#""filename": "library://music/albums/1""#),
    request!("EMS_PLAYLIST", r#""action": "del""#, r#""url": "playlist://current""#, r#""filename": "file:///media/usb/music/beatles""#),
    request!("EMS_PLAYLIST", r#""action": "clear""#, r#""url": "playlist://current""#),
    request!("EMS_PLAYLIST", r#""action": "add""#, r#""url": "playlist://2""#, r#""filename": "library://music/tracks/1""#),
    request!("EMS_PLAYLIST", r#""action": "del""#, r#""url": "playlist://5""#, r#""filename": "library://music/tracks/55""#),
    request!("EMS_PLAYLIST", r#""action": "del""#, r#""url": "playlist://0""#, r#""filename": "library://music/albums/10""#),
    request!("EMS_PLAYLIST", r#""action": "del""#, r#""url": "playlist://0""#),
    request!("EMS_PLAYLIST", r#""action": "load""#, r#""url": "playlist://0""#),
    request!("EMS_PLAYLIST", r#""action": "save""#, r#""subdir": "playlists_dirname""#, r#""name": "saved_current_playlist""#),
    r#"{ "msg": "EMS_AUTH", "msg_id": "42", "status": "accepted", "uuid": "110e8400-e29b-11d4-a716-446655440000", "hostname": "192.168.0.1", "username": "remoteClientName"}"#,
    r#"{ "msg": "EMS_CD_RIP", "msg_id": "42", "audio_format": "FLAC"}"#,
];

/// One catalog request with its display label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub index: usize,
    pub label: String,
    pub request: &'static str,
}

impl CatalogEntry {
    /// Four-space rendering used to pre-fill an editor.
    pub fn pretty(&self) -> String {
        prettify(self.request)
    }
}

pub fn builtin() -> Vec<CatalogEntry> {
    REQUESTS
        .iter()
        .copied()
        .enumerate()
        .map(|(index, request)| CatalogEntry {
            index,
            label: describe_text(request),
            request,
        })
        .collect()
}

/// Request text by catalog index.
pub fn request(index: usize) -> Option<&'static str> {
    REQUESTS.get(index).copied()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::protocol::envelope::{Envelope, INVALID_LABEL};

    #[test]
    fn every_request_is_a_valid_envelope() {
        for entry in builtin() {
            let env = Envelope::parse(entry.request).unwrap();
            assert_eq!(env.msg_id(), "42", "entry={}", entry.index);
            assert_ne!(entry.label, INVALID_LABEL);
        }
    }

    #[test]
    fn labels_follow_describe() {
        let entries = builtin();
        assert_eq!(entries[0].label, "EMS_BROWSE | menu://");
        assert_eq!(entries[15].label, "EMS_PLAYER | next");
        assert_eq!(
            entries[29].label,
            "EMS_PLAYLIST | playlist://current | add"
        );
        assert_eq!(entries.last().unwrap().label, "EMS_CD_RIP");
    }

    #[test]
    fn request_text_is_kept_verbatim() {
        assert_eq!(
            request(0).unwrap(),
            r#"{ "msg": "EMS_BROWSE", "msg_id": "42", "uuid": "110e8400-e29b-11d4-a716-446655440000", "url": "menu://"}"#
        );
        assert!(request(999).is_none());
    }

    #[test]
    fn auth_request_keeps_its_key_order() {
        let auth = builtin()
            .into_iter()
            .find(|e| e.label == "EMS_AUTH")
            .unwrap();
        assert_eq!(
            auth.request,
            r#"{ "msg": "EMS_AUTH", "msg_id": "42", "status": "accepted", "uuid": "110e8400-e29b-11d4-a716-446655440000", "hostname": "192.168.0.1", "username": "remoteClientName"}"#
        );
    }
}
