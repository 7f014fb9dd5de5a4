//! Room lifecycle handlers.

use crate::error::{AppError, HandlerResult};
use crate::protocol::{Participant, Room, RoomView, ServerMessage};
use crate::state::AppState;

/// Create a room with the caller as its sole admin participant.
pub async fn create_room(
    state: &AppState,
    origin: &str,
    room_id: &str,
    room_name: Option<String>,
    admin_id: &str,
    admin_name: &str,
) -> HandlerResult {
    let lock = state.room_lock(room_id);
    let _guard = lock.lock().await;

    if state.rooms.exists(room_id).await? {
        return Err(AppError::RoomAlreadyExists);
    }

    let admin = Participant {
        id: admin_id.to_string(),
        name: admin_name.to_string(),
        is_admin: true,
        conn: Some(origin.to_string()),
    };
    let room = Room {
        id: room_id.to_string(),
        name: room_name,
        admin_id: admin_id.to_string(),
        participants: vec![admin],
        assignment: None,
        drawn: false,
    };
    state.rooms.save(&room).await?;

    state.notifier.join_group(origin, room_id);
    state
        .notifier
        .track(origin, admin_id, room_id, Some(admin_name));

    state.notifier.send_to(
        origin,
        ServerMessage::RoomCreated {
            room_id: room_id.to_string(),
        },
    );
    state.notifier.send_to(
        origin,
        ServerMessage::Joined {
            room_id: room_id.to_string(),
            participants: room.participants,
        },
    );

    tracing::info!(room_id = %room_id, admin_id = %admin_id, "Room created");
    Ok(())
}

/// Join the calling connection's client into an existing room.
pub async fn join_room(
    state: &AppState,
    origin: &str,
    room_id: &str,
    client_id: &str,
    name: &str,
) -> HandlerResult {
    let lock = state.room_lock(room_id);
    let _guard = lock.lock().await;

    let mut room = state
        .rooms
        .find(room_id)
        .await?
        .ok_or(AppError::RoomNotFound)?;

    if room.participant(client_id).is_some() {
        return Err(AppError::ClientIdAlreadyInRoom);
    }
    if room.drawn {
        return Err(AppError::RoomAlreadyDrawn);
    }

    let participant = Participant {
        id: client_id.to_string(),
        name: name.to_string(),
        is_admin: false,
        conn: Some(origin.to_string()),
    };
    room.participants.push(participant.clone());
    state.rooms.save(&room).await?;

    state.notifier.join_group(origin, room_id);
    state
        .notifier
        .track(origin, client_id, room_id, Some(name));

    state.notifier.send_to(
        origin,
        ServerMessage::Joined {
            room_id: room_id.to_string(),
            participants: room.participants,
        },
    );
    state
        .notifier
        .broadcast_to_room(room_id, ServerMessage::ParticipantAdded { participant });

    tracing::info!(room_id = %room_id, client_id = %client_id, "Participant joined");
    Ok(())
}

/// Admin pre-registers a participant who has no connection yet.
pub async fn add_participant(
    state: &AppState,
    room_id: &str,
    admin_id: &str,
    participant_id: &str,
    name: &str,
) -> HandlerResult {
    let lock = state.room_lock(room_id);
    let _guard = lock.lock().await;

    let mut room = state
        .rooms
        .find(room_id)
        .await?
        .ok_or(AppError::RoomNotFound)?;

    if room.admin_id != admin_id {
        return Err(AppError::OnlyAdminCanAdd);
    }
    if room.participant(participant_id).is_some() {
        return Err(AppError::ParticipantAlreadyExists);
    }
    if room.drawn {
        return Err(AppError::RoomAlreadyDrawn);
    }

    let participant = Participant {
        id: participant_id.to_string(),
        name: name.to_string(),
        is_admin: false,
        conn: None,
    };
    room.participants.push(participant.clone());
    state.rooms.save(&room).await?;

    state
        .notifier
        .broadcast_to_room(room_id, ServerMessage::ParticipantAdded { participant });

    tracing::info!(
        room_id = %room_id,
        admin_id = %admin_id,
        participant_id = %participant_id,
        "Participant added by admin"
    );
    Ok(())
}

/// Remove a participant from a room.
pub async fn leave_room(state: &AppState, room_id: &str, client_id: &str) -> HandlerResult {
    let lock = state.room_lock(room_id);
    let _guard = lock.lock().await;

    let mut room = state
        .rooms
        .find(room_id)
        .await?
        .ok_or(AppError::RoomNotFound)?;

    let leaving = room
        .participant(client_id)
        .cloned()
        .ok_or(AppError::ParticipantNotFound)?;

    // The admin id must keep naming a current participant.
    if leaving.id == room.admin_id {
        return Err(AppError::NotAuthorized);
    }

    room.participants.retain(|p| p.id != client_id);
    state.rooms.save(&room).await?;

    if let Some(conn) = &leaving.conn {
        state.notifier.leave_group(conn, room_id);
    }
    state.notifier.broadcast_to_room(
        room_id,
        ServerMessage::Left {
            room_id: room_id.to_string(),
            client_id: client_id.to_string(),
        },
    );
    if let Some(conn) = &leaving.conn {
        state.notifier.untrack(conn);
    }

    tracing::info!(room_id = %room_id, client_id = %client_id, "Participant left");
    Ok(())
}

/// Relay a message from a current participant to the whole room.
pub async fn broadcast(
    state: &AppState,
    room_id: &str,
    admin_id: &str,
    message: &str,
) -> HandlerResult {
    let room = state
        .rooms
        .find(room_id)
        .await?
        .ok_or(AppError::RoomNotFound)?;

    let sender = room
        .participant(admin_id)
        .cloned()
        .ok_or(AppError::AdminNotInRoom)?;

    state.notifier.broadcast_to_room(
        room_id,
        ServerMessage::Broadcast {
            from: sender,
            message: message.to_string(),
        },
    );

    tracing::info!(room_id = %room_id, from = %admin_id, "Broadcast relayed");
    Ok(())
}

/// Reply with the room's metadata; drawn rooms additionally yield the
/// caller's private result, and the full table when the caller is admin.
pub async fn get_room_by_id(
    state: &AppState,
    origin: &str,
    room_id: &str,
    client_id: &str,
) -> HandlerResult {
    let room = state
        .rooms
        .find(room_id)
        .await?
        .ok_or(AppError::RoomNotFound)?;

    if room.participant(client_id).is_none() {
        return Err(AppError::NotAuthorized);
    }

    state.notifier.send_to(
        origin,
        ServerMessage::RoomFound {
            room: RoomView::from(&room),
        },
    );

    if let Some(assignment) = &room.assignment {
        if let Some(pair) = assignment.iter().find(|pair| pair.from == client_id) {
            state
                .notifier
                .send_to(origin, super::draw::own_match_message(state, &room, pair));
        }
        if room.admin_id == client_id {
            state.notifier.send_to(
                origin,
                ServerMessage::DrawResultAdmin {
                    mapping: super::draw::build_admin_table(state, &room),
                },
            );
        }
    }

    tracing::info!(room_id = %room_id, client_id = %client_id, "Room queried");
    Ok(())
}
