use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use hopinn_core::ride_events::{ClientEvent, ServerEvent};

use crate::rides::PresenceStore;
use crate::state::AppState;
use crate::ws::manager::WsManager;
use crate::ws::{messages, presence};

/// HTTP handler that upgrades the connection to WebSocket.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Manage a single WebSocket connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Registers the connection with `WsManager`.
///   2. Spawns a sender task that forwards messages from the manager channel.
///   3. Dispatches inbound `join` / `update-location-captain` frames.
///   4. Clears presence on disconnect.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    let store = state.presence_store();
    let ws_manager = state.ws_manager;
    tracing::info!(conn_id = %conn_id, "WebSocket connected");

    let mut rx = ws_manager.add(conn_id.clone()).await;

    let (mut sink, mut stream) = socket.split();

    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(Message::Text(text)) => {
                handle_text(&store, &ws_manager, &conn_id, text.as_str()).await;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    presence::disconnect(&store, &ws_manager, &conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, "WebSocket disconnected");
}

/// Run one inbound frame, answering failures with an `error` event on the
/// same connection.
async fn handle_text<P: PresenceStore>(store: &P, ws_manager: &WsManager, conn_id: &str, text: &str) {
    let outcome = match messages::decode(text) {
        Ok(ClientEvent::Join(req)) => presence::join(store, ws_manager, conn_id, &req)
            .await
            .map(|_| ()),
        Ok(ClientEvent::UpdateLocationCaptain(update)) => {
            presence::update_location(store, ws_manager, conn_id, &update)
                .await
                .map(|_| ())
        }
        Err(message) => {
            tracing::debug!(conn_id, %message, "Rejected inbound frame");
            reply_error(ws_manager, conn_id, message).await;
            return;
        }
    };

    if let Err(err) = outcome {
        tracing::debug!(conn_id, error = %err, "Inbound event failed");
        reply_error(ws_manager, conn_id, presence::client_message(&err)).await;
    }
}

async fn reply_error(ws_manager: &WsManager, conn_id: &str, message: String) {
    let frame = match messages::encode(&ServerEvent::error(message)) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::error!(conn_id, error = %e, "Failed to encode error event");
            return;
        }
    };
    if let Err(e) = ws_manager.send(conn_id, frame).await {
        tracing::debug!(conn_id, error = %e, "Could not deliver error event");
    }
}
