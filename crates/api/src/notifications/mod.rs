//! Best-effort delivery of [`ServerEvent`]s to a connection handle.
//!
//! Ride operations talk to the [`Notifier`] trait; [`WsNotifier`] delivers
//! through the in-process [`WsManager`].

use std::sync::Arc;

use hopinn_core::ride_events::ServerEvent;

use crate::ws::manager::ConnectionClosed;
use crate::ws::messages;
use crate::ws::WsManager;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Closed(#[from] ConnectionClosed),
}

/// Push channel used by the ride lifecycle.
///
/// `Ok(false)` means the handle is not live and nothing was sent; that is
/// not an error. Implementations never queue or retry.
pub trait Notifier: Send + Sync {
    fn send(
        &self,
        handle: &str,
        event: &ServerEvent,
    ) -> impl std::future::Future<Output = Result<bool, NotifyError>> + Send;
}

#[derive(Clone)]
pub struct WsNotifier {
    ws_manager: Arc<WsManager>,
}

impl WsNotifier {
    pub fn new(ws_manager: Arc<WsManager>) -> Self {
        Self { ws_manager }
    }
}

impl Notifier for WsNotifier {
    async fn send(&self, handle: &str, event: &ServerEvent) -> Result<bool, NotifyError> {
        let message = messages::encode(event)?;
        Ok(self.ws_manager.send(handle, message).await?)
    }
}
