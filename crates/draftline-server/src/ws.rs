//! WebSocket adapter between one client socket and one lobby.
//!
//! On upgrade the adapter picks a random [`ConnectionId`], creates a bounded
//! outbox and joins the lobby. A writer task turns envelopes into JSON text
//! frames; it ends when the lobby drops the outbox (leave, slow consumer,
//! shutdown). The reader decodes text frames into commands and forwards
//! them. Frames that fail to decode never reach the lobby; the client gets
//! an `Error` envelope from the adapter instead.
//!
//! Whatever ends the session, the lobby sees exactly one `Leave`.

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade, rejection::WebSocketUpgradeRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::{
    http::AppState,
    lobby::{ConnectionId, LobbyHandle},
    lobby_code,
    protocol::{ProtocolError, ServerMessage, decode_command},
};

/// Queue for envelopes produced by the adapter itself (decode errors).
const LOCAL_CAPACITY: usize = 8;

/// Query string of `GET /ws`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WsParams {
    /// Lobby to join
    pub code: Option<String>,
}

/// `GET /ws?code=..`. The code and lobby are checked before upgrading.
pub async fn ws_handler(
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    Query(params): Query<WsParams>,
    State(app): State<AppState>,
) -> Response {
    let Some(code) = params.code.filter(|code| !code.is_empty()) else {
        return (StatusCode::BAD_REQUEST, "missing code").into_response();
    };

    let lobby = match app.registry.get(&code).await {
        Ok(Some(lobby)) => lobby,
        Ok(None) => return (StatusCode::NOT_FOUND, "lobby not found").into_response(),
        Err(err) => {
            tracing::warn!(lobby = %code, error = %err, "registry unavailable");
            return (StatusCode::SERVICE_UNAVAILABLE, err.to_string()).into_response();
        },
    };

    let upgrade = match upgrade {
        Ok(upgrade) => upgrade,
        Err(rejection) => return rejection.into_response(),
    };

    let outbox_capacity = app.registry.config().lobby.outbox_capacity;
    upgrade.on_upgrade(move |socket| serve_socket(socket, lobby, outbox_capacity))
}

async fn serve_socket(socket: WebSocket, lobby: LobbyHandle, outbox_capacity: usize) {
    let connection = match lobby_code::connection_id() {
        Ok(connection) => connection,
        Err(err) => {
            tracing::error!(lobby = %lobby.code(), error = %err, "cannot allocate connection id");
            return;
        },
    };

    let (outbox, from_lobby) = mpsc::channel(outbox_capacity.max(1));
    if let Err(err) = lobby.join(connection, outbox).await {
        tracing::debug!(lobby = %lobby.code(), %connection, error = %err, "join failed");
        return;
    }
    tracing::info!(lobby = %lobby.code(), %connection, "connection opened");

    let (sink, mut stream) = socket.split();
    let (local_tx, local_rx) = mpsc::channel(LOCAL_CAPACITY);
    let mut writer = tokio::spawn(write_frames(sink, from_lobby, local_rx, connection));
    let mut writer_done = false;

    loop {
        let frame = tokio::select! {
            _ = &mut writer => {
                writer_done = true;
                break;
            },
            frame = stream.next() => frame,
        };

        match frame {
            Some(Ok(Message::Text(text))) => match decode_command(text.as_str()) {
                Ok(command) => {
                    if lobby.submit(connection, command).await.is_err() {
                        break;
                    }
                },
                Err(err) => reject_locally(&local_tx, connection, &err),
            },
            Some(Ok(Message::Binary(_))) => {
                reject_locally(&local_tx, connection, &ProtocolError::Binary);
            },
            Some(Ok(Message::Close(_))) | None => break,
            // Ping/pong are answered by the socket layer.
            Some(Ok(Message::Ping(_) | Message::Pong(_))) => {},
            Some(Err(err)) => {
                tracing::debug!(%connection, error = %err, "socket read failed");
                break;
            },
        }
    }

    if let Err(err) = lobby.leave(connection).await {
        tracing::trace!(%connection, error = %err, "leave after lobby stopped");
    }
    drop(local_tx);
    if !writer_done && let Err(err) = writer.await {
        tracing::debug!(%connection, error = %err, "writer task failed");
    }

    tracing::info!(lobby = %lobby.code(), %connection, "connection closed");
}

fn reject_locally(
    local: &mpsc::Sender<ServerMessage>,
    connection: ConnectionId,
    err: &ProtocolError,
) {
    tracing::debug!(%connection, error = %err, "rejected inbound frame");
    if local.try_send(ServerMessage::error(err)).is_err() {
        tracing::debug!(%connection, "local error queue full, dropping notice");
    }
}

async fn write_frames(
    mut sink: futures::stream::SplitSink<WebSocket, Message>,
    mut from_lobby: mpsc::Receiver<ServerMessage>,
    mut local: mpsc::Receiver<ServerMessage>,
    connection: ConnectionId,
) {
    loop {
        let message = tokio::select! {
            message = from_lobby.recv() => match message {
                Some(message) => message,
                // Lobby dropped the outbox.
                None => break,
            },
            Some(message) = local.recv() => message,
        };

        let text = match serde_json::to_string(&message) {
            Ok(text) => text,
            Err(err) => {
                tracing::error!(%connection, error = %err, "failed to encode envelope");
                continue;
            },
        };

        if sink.send(Message::Text(text.into())).await.is_err() {
            tracing::debug!(%connection, "socket write failed");
            break;
        }
    }

    if let Err(err) = sink.close().await {
        tracing::trace!(%connection, error = %err, "socket close failed");
    }
}
