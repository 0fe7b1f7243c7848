use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::ws::Message;
use hopinn_core::ride_events::ParticipantKind;
use hopinn_core::types::{DbId, Timestamp};
use tokio::sync::{mpsc, RwLock};

/// Channel sender half for pushing messages to a WebSocket connection.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// The account a connection announced itself as with `join`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Participant {
    pub kind: ParticipantKind,
    pub id: DbId,
}

impl Participant {
    pub fn rider(id: DbId) -> Self {
        Self {
            kind: ParticipantKind::Rider,
            id,
        }
    }

    pub fn captain(id: DbId) -> Self {
        Self {
            kind: ParticipantKind::Captain,
            id,
        }
    }
}

/// Metadata for a single WebSocket connection.
pub struct WsConnection {
    /// Set once the client has sent `join`.
    pub participant: Option<Participant>,
    /// Channel sender for outbound messages to this connection.
    pub sender: WsSender,
    /// When this connection was established.
    pub connected_at: Timestamp,
}

/// A send was attempted on a handle whose socket task has already exited.
#[derive(Debug, thiserror::Error)]
#[error("connection {0} is closed")]
pub struct ConnectionClosed(pub String);

/// Registry of live WebSocket connections, keyed by connection id.
///
/// The connection id doubles as the handle persisted on the account row,
/// so a handle read back from the database resolves here only while that
/// exact socket is still open.
pub struct WsManager {
    connections: RwLock<HashMap<String, WsConnection>>,
}

impl WsManager {
    /// Create a new, empty connection manager.
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new connection.
    ///
    /// Returns the receiver half of the message channel so the caller can
    /// forward messages to the WebSocket sink.
    pub async fn add(&self, conn_id: String) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = WsConnection {
            participant: None,
            sender: tx,
            connected_at: chrono::Utc::now(),
        };
        self.connections.write().await.insert(conn_id, conn);
        rx
    }

    /// Record which account owns `conn_id`. Returns `false` if the
    /// connection is already gone.
    pub async fn bind(&self, conn_id: &str, participant: Participant) -> bool {
        match self.connections.write().await.get_mut(conn_id) {
            Some(conn) => {
                conn.participant = Some(participant);
                true
            }
            None => false,
        }
    }

    pub async fn participant(&self, conn_id: &str) -> Option<Participant> {
        self.connections
            .read()
            .await
            .get(conn_id)
            .and_then(|conn| conn.participant)
    }

    /// Remove a connection, returning the account it was bound to.
    pub async fn remove(&self, conn_id: &str) -> Option<Participant> {
        self.connections
            .write()
            .await
            .remove(conn_id)
            .and_then(|conn| conn.participant)
    }

    /// Queue `message` on one connection.
    ///
    /// `Ok(false)` means no such connection is registered, which callers
    /// treat as a silent no-op. An error means the connection is registered
    /// but its socket task has stopped reading.
    pub async fn send(&self, conn_id: &str, message: Message) -> Result<bool, ConnectionClosed> {
        let conns = self.connections.read().await;
        match conns.get(conn_id) {
            Some(conn) => conn
                .sender
                .send(message)
                .map(|()| true)
                .map_err(|_| ConnectionClosed(conn_id.to_string())),
            None => Ok(false),
        }
    }

    /// Return the current number of active connections.
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Send a Close frame to every connection, then clear the map.
    ///
    /// Used during graceful shutdown to notify all clients before the
    /// server stops accepting new connections.
    pub async fn shutdown_all(&self) {
        let mut conns = self.connections.write().await;
        let count = conns.len();
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Close(None));
        }
        conns.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }

    /// Send a Ping frame to every connected client.
    pub async fn ping_all(&self) {
        let conns = self.connections.read().await;
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Ping(Bytes::new()));
        }
    }
}

impl Default for WsManager {
    fn default() -> Self {
        Self::new()
    }
}
