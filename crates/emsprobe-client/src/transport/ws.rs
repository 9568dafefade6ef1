//! Per-connection socket task.
//!
//! Responsibilities:
//! - Open the WebSocket (abortable by a close command while still connecting)
//! - Forward inbound text frames, answer pings
//! - Write outbound text verbatim
//! - Graceful close: send Close, then drain in-flight frames for `close_timeout`
//!
//! Every task reports exactly one terminal event (`Closed` or `Failed`).

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{timeout, Duration};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use emsprobe_core::log::ConnectionId;

use super::codec::{decode, encode_text, pong, Inbound};
use super::connection::TransportEvent;

#[derive(Debug)]
pub(crate) enum Command {
    Send(String),
    Close,
}

pub(crate) type EventSender = mpsc::UnboundedSender<(ConnectionId, TransportEvent)>;

pub(crate) async fn run_connection(
    id: ConnectionId,
    url: String,
    mut cmd_rx: mpsc::UnboundedReceiver<Command>,
    events: EventSender,
    close_timeout: Duration,
) {
    let emit = |event: TransportEvent| {
        // Receiver gone means the manager was dropped; nothing left to notify.
        let _ = events.send((id, event));
    };

    // ---- open (a close request while connecting aborts the attempt)
    let stream = tokio::select! {
        res = connect_async(url.as_str()) => match res {
            Ok((stream, _response)) => stream,
            Err(e) => {
                warn!(error = %e, "connect failed");
                emit(TransportEvent::Failed(e.to_string()));
                return;
            }
        },
        _ = cmd_rx.recv() => {
            debug!("closed before open");
            emit(TransportEvent::Closed);
            return;
        }
    };

    info!("connected");
    emit(TransportEvent::Opened);

    let (mut sink, mut reader) = stream.split();

    loop {
        tokio::select! {
            // inbound reader
            incoming = reader.next() => {
                match incoming {
                    Some(Ok(msg)) => match decode(msg) {
                        Inbound::Text(text) => emit(TransportEvent::Frame(text)),
                        Inbound::Ping(payload) => {
                            if let Err(e) = sink.send(pong(payload)).await {
                                emit(TransportEvent::Failed(e.to_string()));
                                return;
                            }
                        }
                        Inbound::Close => {
                            debug!("closed by peer");
                            emit(TransportEvent::Closed);
                            return;
                        }
                        Inbound::Skip(what) => debug!(what, "frame skipped"),
                    },
                    Some(Err(e)) => {
                        warn!(error = %e, "read failed");
                        emit(TransportEvent::Failed(e.to_string()));
                        return;
                    }
                    None => {
                        emit(TransportEvent::Closed);
                        return;
                    }
                }
            }

            // outbound writer
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(Command::Send(text)) => {
                        if let Err(e) = sink.send(encode_text(text)).await {
                            warn!(error = %e, "write failed");
                            emit(TransportEvent::Failed(e.to_string()));
                            return;
                        }
                    }
                    Some(Command::Close) | None => break,
                }
            }
        }
    }

    // ---- graceful close
    let _ = sink.send(Message::Close(None)).await;
    let drained = timeout(close_timeout, async {
        while let Some(Ok(msg)) = reader.next().await {
            match decode(msg) {
                Inbound::Text(text) => emit(TransportEvent::Frame(text)),
                Inbound::Close => break,
                _ => {}
            }
        }
    })
    .await;
    if drained.is_err() {
        debug!(timeout_ms = close_timeout.as_millis() as u64, "close handshake timed out");
    }
    emit(TransportEvent::Closed);
}
