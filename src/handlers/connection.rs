//! Connection handlers.

use crate::error::HandlerResult;
use crate::protocol::User;
use crate::state::AppState;

/// Upsert the connecting user's record and, when a room is named, attach
/// the connection to that room's broadcast group and presence.
pub async fn connect_server(
    state: &AppState,
    origin: &str,
    user: User,
    room_id: Option<&str>,
) -> HandlerResult {
    let record = match state.users.find(&user.id).await? {
        Some(mut existing) => {
            existing.conn = Some(origin.to_string());
            existing
        }
        None => User {
            conn: Some(origin.to_string()),
            ..user
        },
    };
    state.users.save(&record).await?;

    if let Some(room_id) = room_id {
        if state.rooms.exists(room_id).await? {
            state.notifier.join_group(origin, room_id);
            state
                .notifier
                .track(origin, &record.id, room_id, Some(&record.name));
        }
    }

    tracing::info!(user_id = %record.id, "User connected");
    Ok(())
}

/// Socket closed: drop presence and tell the prior room.
pub fn disconnect(state: &AppState, origin: &str) {
    if let Some(entry) = state.notifier.untrack(origin) {
        tracing::info!(
            user_id = %entry.user_id,
            room_id = %entry.room_id,
            "User went offline"
        );
    }
    tracing::info!(conn = %origin, "Connection closed");
}
