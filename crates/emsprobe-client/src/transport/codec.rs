//! Frame codec for the transport layer.
//!
//! - Text frames => wire text, kept verbatim
//! - Binary frames => wire text when they hold UTF-8, otherwise skipped
//! - Ping/Close are surfaced for lifecycle management

use tokio_tungstenite::tungstenite::Message;

#[derive(Debug)]
pub enum Inbound {
    Text(String),
    Ping(Vec<u8>),
    Close,
    Skip(&'static str),
}

pub fn decode(msg: Message) -> Inbound {
    match msg {
        Message::Text(s) => Inbound::Text(s.to_string()),
        Message::Binary(b) => match String::from_utf8(b.to_vec()) {
            Ok(s) => Inbound::Text(s),
            Err(_) => Inbound::Skip("non-utf8 binary frame"),
        },
        Message::Ping(p) => Inbound::Ping(p.to_vec()),
        Message::Pong(_) => Inbound::Skip("pong"),
        Message::Close(_) => Inbound::Close,
        Message::Frame(_) => Inbound::Skip("raw frame"),
    }
}

/// Outgoing text is sent as-is; the codec never re-serializes it.
pub fn encode_text(text: String) -> Message {
    Message::Text(text.into())
}

pub fn pong(payload: Vec<u8>) -> Message {
    Message::Pong(payload.into())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::panic)]

    use super::*;

    #[test]
    fn text_is_kept_verbatim() {
        let raw = "{ \"msg\" :  \"EMS_BROWSE\" }".to_string();
        match decode(encode_text(raw.clone())) {
            Inbound::Text(s) => assert_eq!(s, raw),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn utf8_binary_becomes_text() {
        let msg = Message::Binary(b"{\"msg\":\"EMS_PLAYER\"}".to_vec().into());
        assert!(matches!(decode(msg), Inbound::Text(s) if s.contains("EMS_PLAYER")));

        let msg = Message::Binary(vec![0xff, 0xfe].into());
        assert!(matches!(decode(msg), Inbound::Skip(_)));
    }
}
