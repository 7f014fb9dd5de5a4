//! Error taxonomy surfaced to clients as symbolic codes.

use crate::store::StoreError;
use thiserror::Error;

/// Errors raised while handling a client command.
///
/// Every variant except the internal ones maps onto a symbolic wire code
/// that is sent back verbatim in an `error` envelope. Internal failures are
/// logged server-side and collapsed to `internal_server_error` on the wire.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("message is not a well-formed command envelope")]
    InvalidMessage,

    #[error("unrecognized message type")]
    UnknownMessageType,

    #[error("room not found")]
    RoomNotFound,

    #[error("room id already taken")]
    RoomAlreadyExists,

    #[error("room has already been drawn")]
    RoomAlreadyDrawn,

    #[error("client id already present in room")]
    ClientIdAlreadyInRoom,

    #[error("participant already exists")]
    ParticipantAlreadyExists,

    #[error("participant not found")]
    ParticipantNotFound,

    #[error("only the room admin can add participants")]
    OnlyAdminCanAdd,

    #[error("only the room admin can start the draw")]
    OnlyAdminCanStartDraw,

    #[error("sender is not a participant of the room")]
    AdminNotInRoom,

    #[error("a draw needs at least two participants")]
    NeedAtLeastTwoParticipants,

    #[error("could not generate a valid mapping")]
    CouldNotGenerateMapping,

    #[error("not authorized")]
    NotAuthorized,

    #[error("invalid or expired token")]
    InvalidToken,

    #[error("room has no draw result")]
    NoDrawResult,

    #[error("user not found")]
    UserNotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AppError {
    /// Symbolic code sent to the originating connection.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidMessage => "invalid_message",
            Self::UnknownMessageType => "unknown_message_type",
            Self::RoomNotFound => "room_not_found",
            Self::RoomAlreadyExists => "room_already_exists",
            Self::RoomAlreadyDrawn => "room_already_drawn",
            Self::ClientIdAlreadyInRoom => "client_id_already_in_room",
            Self::ParticipantAlreadyExists => "participant_already_exists",
            Self::ParticipantNotFound => "participant_not_found",
            Self::OnlyAdminCanAdd => "only_admin_can_add",
            Self::OnlyAdminCanStartDraw => "only_admin_can_start_draw",
            Self::AdminNotInRoom => "admin_not_in_room",
            Self::NeedAtLeastTwoParticipants => "need_at_least_two_participants",
            Self::CouldNotGenerateMapping => "could_not_generate_mapping",
            Self::NotAuthorized => "not_authorized",
            Self::InvalidToken => "invalid_token",
            Self::NoDrawResult => "no_draw_result",
            Self::UserNotFound => "user_not_found",
            Self::Store(_) => "internal_server_error",
        }
    }

    /// Whether the full error detail must stay server-side.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Store(_))
    }
}

/// Result type for command handlers.
pub type HandlerResult = Result<(), AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_wire_taxonomy() {
        assert_eq!(AppError::RoomNotFound.code(), "room_not_found");
        assert_eq!(AppError::OnlyAdminCanStartDraw.code(), "only_admin_can_start_draw");
        assert_eq!(
            AppError::NeedAtLeastTwoParticipants.code(),
            "need_at_least_two_participants"
        );
    }

    #[test]
    fn store_errors_are_shielded() {
        let err = AppError::Store(StoreError::Corrupt {
            key: "room:r1".into(),
            detail: "truncated".into(),
        });
        assert!(err.is_internal());
        assert_eq!(err.code(), "internal_server_error");
    }
}
