//! Draw execution and deferred result delivery.

use crate::config::AdminView;
use crate::draw;
use crate::error::{AppError, HandlerResult};
use crate::protocol::{AssignmentPair, MappingEntry, Room, ServerMessage};
use crate::state::AppState;

/// Run the draw over the room's participants, persist the assignment, and
/// deliver each participant's match to their live connection. Delivery is
/// fire-and-forget: absent connections simply miss the push.
pub async fn start_draw(state: &AppState, room_id: &str, admin_id: &str) -> HandlerResult {
    let lock = state.room_lock(room_id);
    let _guard = lock.lock().await;

    let mut room = state
        .rooms
        .find(room_id)
        .await?
        .ok_or(AppError::RoomNotFound)?;

    if room.admin_id != admin_id {
        return Err(AppError::OnlyAdminCanStartDraw);
    }
    if room.drawn {
        return Err(AppError::RoomAlreadyDrawn);
    }
    if room.participants.len() < 2 {
        return Err(AppError::NeedAtLeastTwoParticipants);
    }

    let mapping = draw::generate_mapping(&room.participants)?;

    // Persist before any delivery so a crash mid-push never loses the result.
    room.assignment = Some(mapping.clone());
    room.drawn = true;
    state.rooms.save(&room).await?;

    for pair in &mapping {
        let conn = room.participant(&pair.from).and_then(|p| p.conn.clone());
        if let Some(conn) = conn {
            state
                .notifier
                .send_to(&conn, own_match_message(state, &room, pair));
        }
    }

    let admin_conn = room.participant(admin_id).and_then(|p| p.conn.clone());
    if let Some(conn) = admin_conn {
        state.notifier.send_to(
            &conn,
            ServerMessage::DrawResultAdmin {
                mapping: build_admin_table(state, &room),
            },
        );
    }

    tracing::info!(room_id = %room_id, admin_id = %admin_id, "Draw executed");
    Ok(())
}

/// Resolve a delivery token into the pair of participant names it stands for.
pub async fn get_result_by_token(
    state: &AppState,
    origin: &str,
    room_id: &str,
    token: &str,
) -> HandlerResult {
    let room = state
        .rooms
        .find(room_id)
        .await?
        .ok_or(AppError::RoomNotFound)?;

    if room.assignment.is_none() {
        return Err(AppError::NoDrawResult);
    }

    let (from, to) = state.tokens.verify(token)?;

    let to_user = room.participant(&to).ok_or(AppError::UserNotFound)?;
    let from_user = room.participant(&from).ok_or(AppError::UserNotFound)?;

    state.notifier.send_to(
        origin,
        ServerMessage::Result {
            to_name: to_user.name.clone(),
            from_name: from_user.name.clone(),
        },
    );

    tracing::info!(room_id = %room_id, "Token redeemed");
    Ok(())
}

/// The `your_match` push for one assignment edge, shaped by the admin-view
/// policy: the matched participant directly, or a redeemable token.
pub(crate) fn own_match_message(state: &AppState, room: &Room, pair: &AssignmentPair) -> ServerMessage {
    match state.config.draw.admin_view {
        AdminView::Full => ServerMessage::YourMatch {
            matched: room.participant(&pair.to).cloned(),
            token: None,
        },
        AdminView::Tokens => ServerMessage::YourMatch {
            matched: None,
            token: Some(state.tokens.issue(&pair.from, &pair.to)),
        },
    }
}

/// The admin's complete table. In `tokens` mode each receiver is replaced
/// by an opaque token, so the admin can distribute results without
/// learning them.
pub(crate) fn build_admin_table(state: &AppState, room: &Room) -> Vec<MappingEntry> {
    let Some(assignment) = &room.assignment else {
        return Vec::new();
    };

    assignment
        .iter()
        .filter_map(|pair| {
            let from = room.participant(&pair.from)?.clone();
            let entry = match state.config.draw.admin_view {
                AdminView::Full => MappingEntry {
                    from,
                    to: room.participant(&pair.to).cloned(),
                    token: None,
                },
                AdminView::Tokens => MappingEntry {
                    from,
                    to: None,
                    token: Some(state.tokens.issue(&pair.from, &pair.to)),
                },
            };
            Some(entry)
        })
        .collect()
}
