//! Inbound envelope validation, dispatch, and error translation.

use crate::error::{AppError, HandlerResult};
use crate::handlers;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::AppState;

const KNOWN_TYPES: &[&str] = &[
    "ping",
    "connect_server",
    "create_room",
    "join_room",
    "add_participant",
    "leave_room",
    "broadcast",
    "start_draw",
    "get_room_by_id",
    "get_result_by_token",
];

/// Validate and dispatch one inbound envelope.
///
/// Every failure is translated into exactly one `error` reply to the
/// originating connection, tagged with the symbolic code; internal detail
/// stays in the server log.
pub async fn handle_envelope(state: &AppState, origin: &str, raw: &str) {
    let result = match decode(raw) {
        Ok(message) => dispatch(state, origin, message).await,
        Err(err) => Err(err),
    };

    if let Err(err) = result {
        reply_error(state, origin, &err);
    }
}

/// `invalid_message` for anything that is not a command-shaped mapping,
/// `unknown_message_type` for a mapping whose tag is not in the protocol.
fn decode(raw: &str) -> Result<ClientMessage, AppError> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|_| AppError::InvalidMessage)?;
    let tag = value
        .get("type")
        .and_then(|tag| tag.as_str())
        .ok_or(AppError::InvalidMessage)?;

    if !KNOWN_TYPES.contains(&tag) {
        return Err(AppError::UnknownMessageType);
    }

    serde_json::from_value(value).map_err(|_| AppError::InvalidMessage)
}

async fn dispatch(state: &AppState, origin: &str, message: ClientMessage) -> HandlerResult {
    match message {
        ClientMessage::Ping => {
            state.notifier.send_to(origin, ServerMessage::Pong);
            Ok(())
        }
        ClientMessage::ConnectServer { user, room_id } => {
            handlers::connect_server(state, origin, user, room_id.as_deref()).await
        }
        ClientMessage::CreateRoom {
            room_id,
            room_name,
            admin_id,
            admin_name,
        } => {
            handlers::create_room(state, origin, &room_id, room_name, &admin_id, &admin_name)
                .await
        }
        ClientMessage::JoinRoom {
            room_id,
            client_id,
            name,
        } => handlers::join_room(state, origin, &room_id, &client_id, &name).await,
        ClientMessage::AddParticipant {
            room_id,
            admin_id,
            participant_id,
            name,
        } => handlers::add_participant(state, &room_id, &admin_id, &participant_id, &name).await,
        ClientMessage::LeaveRoom { room_id, client_id } => {
            handlers::leave_room(state, &room_id, &client_id).await
        }
        ClientMessage::Broadcast {
            room_id,
            admin_id,
            message,
        } => handlers::broadcast(state, &room_id, &admin_id, &message).await,
        ClientMessage::StartDraw { room_id, admin_id } => {
            handlers::start_draw(state, &room_id, &admin_id).await
        }
        ClientMessage::GetRoomById { room_id, client_id } => {
            handlers::get_room_by_id(state, origin, &room_id, &client_id).await
        }
        ClientMessage::GetResultByToken { room_id, token } => {
            handlers::get_result_by_token(state, origin, &room_id, &token).await
        }
    }
}

fn reply_error(state: &AppState, origin: &str, err: &AppError) {
    if err.is_internal() {
        tracing::error!(error = %err, "Unexpected error handling message");
    } else {
        tracing::warn!(code = err.code(), "Command rejected");
    }
    state.notifier.send_to(
        origin,
        ServerMessage::Error {
            message: err.code().to_string(),
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_is_invalid_message() {
        assert!(matches!(decode("not json"), Err(AppError::InvalidMessage)));
        assert!(matches!(decode("42"), Err(AppError::InvalidMessage)));
        assert!(matches!(decode("{}"), Err(AppError::InvalidMessage)));
    }

    #[test]
    fn unknown_tag_is_distinguished_from_garbage() {
        assert!(matches!(
            decode(r#"{"type":"open_sesame"}"#),
            Err(AppError::UnknownMessageType)
        ));
    }

    #[test]
    fn known_tag_with_missing_fields_is_invalid_message() {
        assert!(matches!(
            decode(r#"{"type":"join_room","roomId":"r1"}"#),
            Err(AppError::InvalidMessage)
        ));
    }

    #[test]
    fn well_formed_command_decodes() {
        let message = decode(r#"{"type":"ping"}"#).unwrap();
        assert!(matches!(message, ClientMessage::Ping));
    }
}
