//! Account presence on the real-time channel: which connection belongs to
//! which rider or captain, and captain positions.

use hopinn_core::error::CoreError;
use hopinn_core::geo::Coordinates;
use hopinn_core::ride_events::{JoinRequest, LocationUpdate, ParticipantKind};

use crate::error::{AppError, AppResult};
use crate::rides::PresenceStore;
use crate::ws::manager::{Participant, WsManager};

fn entity(kind: ParticipantKind) -> &'static str {
    match kind {
        ParticipantKind::Rider => "User",
        ParticipantKind::Captain => "Captain",
    }
}

/// Bind `conn_id` to the account named in `req` and store the handle on
/// the account row. Captains become active.
///
/// The account id is taken as given; the channel carries no credentials.
pub async fn join<P: PresenceStore>(
    store: &P,
    manager: &WsManager,
    conn_id: &str,
    req: &JoinRequest,
) -> AppResult<Participant> {
    let participant = Participant {
        kind: req.user_type,
        id: req.user_id,
    };

    if let Some(previous) = manager.participant(conn_id).await {
        if previous != participant {
            store.detach(previous, conn_id).await?;
        }
    }

    if !store.attach(participant, conn_id).await? {
        return Err(CoreError::NotFound {
            entity: entity(participant.kind),
            id: participant.id,
        }
        .into());
    }
    manager.bind(conn_id, participant).await;

    tracing::info!(conn_id, kind = ?participant.kind, id = participant.id, "Participant joined");
    Ok(participant)
}

/// Record a captain's position. Only the captain bound to `conn_id` may
/// report for itself.
pub async fn update_location<P: PresenceStore>(
    store: &P,
    manager: &WsManager,
    conn_id: &str,
    update: &LocationUpdate,
) -> AppResult<Coordinates> {
    let expected = Participant::captain(update.user_id);
    if manager.participant(conn_id).await != Some(expected) {
        return Err(CoreError::Forbidden("Join as this captain before sending location updates".into()).into());
    }

    let at = update.location.unwrap_or_default().to_coordinates()?;
    if !store.update_captain_position(update.user_id, at).await? {
        return Err(CoreError::NotFound {
            entity: "Captain",
            id: update.user_id,
        }
        .into());
    }

    tracing::debug!(conn_id, captain_id = update.user_id, lat = at.latitude, lng = at.longitude, "Captain moved");
    Ok(at)
}

/// Forget `conn_id` and clear the account's handle if it still points at
/// this connection. Captains become inactive.
pub async fn disconnect<P: PresenceStore>(store: &P, manager: &WsManager, conn_id: &str) {
    let Some(participant) = manager.remove(conn_id).await else {
        return;
    };
    match store.detach(participant, conn_id).await {
        Ok(true) => tracing::info!(conn_id, kind = ?participant.kind, id = participant.id, "Participant left"),
        Ok(false) => tracing::debug!(conn_id, id = participant.id, "Handle already replaced"),
        Err(e) => tracing::warn!(conn_id, id = participant.id, error = %e, "Failed to clear connection handle"),
    }
}

/// Text sent back to the client for a failed inbound message.
pub fn client_message(err: &AppError) -> String {
    match err {
        AppError::Core(CoreError::Validation(msg))
        | AppError::Core(CoreError::Conflict(msg))
        | AppError::Core(CoreError::Forbidden(msg))
        | AppError::Core(CoreError::Unauthorized(msg)) => msg.clone(),
        AppError::Core(CoreError::NotFound { entity, id }) => format!("{entity} with id {id} not found"),
        AppError::BadRequest(msg) => msg.clone(),
        _ => "Internal error".to_string(),
    }
}
