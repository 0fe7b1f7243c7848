//! Real-time channel: connection registry, presence handshake, heartbeat,
//! and the HTTP upgrade handler.

mod handler;
mod heartbeat;
pub mod manager;
pub mod messages;
pub mod presence;

pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
