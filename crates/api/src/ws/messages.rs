//! JSON framing for the real-time channel.

use axum::extract::ws::Message;
use hopinn_core::ride_events::{ClientEvent, ServerEvent};

pub fn encode(event: &ServerEvent) -> Result<Message, serde_json::Error> {
    Ok(Message::Text(serde_json::to_string(event)?.into()))
}

/// Parse an inbound text frame. Errors carry a message safe to echo back.
pub fn decode(text: &str) -> Result<ClientEvent, String> {
    serde_json::from_str(text).map_err(|e| format!("Invalid message: {e}"))
}
