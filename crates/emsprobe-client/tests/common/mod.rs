//! In-process WebSocket servers for integration tests.
//!
//! Each server binds `127.0.0.1:0`, serves one behavior on `/` and returns the
//! `ws://` URL to reach it.

#![allow(dead_code)]
#![allow(clippy::unwrap_used)]

use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    response::Response,
    routing::get,
    Router,
};
use tokio::net::TcpListener;

use emsprobe_client::Session;
use tokio::time::Duration;

#[derive(Clone)]
pub enum Behavior {
    /// Reply to every text frame with the same text.
    Echo,
    /// Reply to every text frame with a fixed text.
    Reply(String),
    /// Read and ignore everything.
    Silent,
    /// Close right after the upgrade.
    CloseImmediately,
    /// Close as soon as the first text frame arrives, without replying.
    CloseAfterRequest,
}

pub async fn spawn_server(behavior: Behavior) -> String {
    let app = Router::new().route(
        "/",
        get(move |ws: WebSocketUpgrade| upgrade(ws, behavior.clone())),
    );
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("ws://{addr}/")
}

/// A URL on which nothing is listening.
pub async fn refused_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("ws://{addr}/")
}

/// A URL that accepts TCP but never answers the WebSocket upgrade.
pub async fn stalled_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });
    format!("ws://{addr}/")
}

pub fn session() -> Session {
    Session::new(Duration::from_millis(200))
}

async fn upgrade(ws: WebSocketUpgrade, behavior: Behavior) -> Response {
    ws.on_upgrade(move |socket| serve(socket, behavior))
}

async fn serve(mut socket: WebSocket, behavior: Behavior) {
    if let Behavior::CloseImmediately = behavior {
        let _ = socket.send(Message::Close(None)).await;
        return;
    }

    while let Some(Ok(msg)) = socket.recv().await {
        let Message::Text(text) = msg else {
            continue;
        };
        let reply = match &behavior {
            Behavior::Echo => text,
            Behavior::Reply(fixed) => fixed.clone(),
            Behavior::CloseAfterRequest => {
                let _ = socket.send(Message::Close(None)).await;
                return;
            }
            Behavior::Silent | Behavior::CloseImmediately => continue,
        };
        if socket.send(Message::Text(reply)).await.is_err() {
            return;
        }
    }
}
