//! Client-server message protocol and room records.

use serde::{Deserialize, Serialize};

/// Opaque handle of a live connection.
pub type ConnId = String;

/// Member of one room. Room-scoped: the same id may exist in other rooms
/// as an unrelated participant record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_admin: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conn: Option<ConnId>,
}

/// Global identity, distinct from room membership.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conn: Option<ConnId>,
}

/// One edge of a draw assignment, keyed by participant id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssignmentPair {
    pub from: String,
    pub to: String,
}

/// Persisted room record. `participants` keeps join order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub admin_id: String,
    pub participants: Vec<Participant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignment: Option<Vec<AssignmentPair>>,
    #[serde(default)]
    pub drawn: bool,
}

impl Room {
    pub fn participant(&self, id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }
}

/// Room payload sent to clients: never carries the assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomView {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub admin_id: String,
    pub participants: Vec<Participant>,
    pub drawn: bool,
}

impl From<&Room> for RoomView {
    fn from(room: &Room) -> Self {
        Self {
            id: room.id.clone(),
            name: room.name.clone(),
            admin_id: room.admin_id.clone(),
            participants: room.participants.clone(),
            drawn: room.drawn,
        }
    }
}

/// Currently-connected member of a room, as reported by presence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OnlineUser {
    pub id: String,
    pub name: String,
}

/// Entry of the admin's draw-result table. Carries either the matched
/// participant or an opaque delivery token, per the admin-view policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingEntry {
    pub from: Participant,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Participant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Client → server commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    Ping,

    ConnectServer {
        user: User,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        room_id: Option<String>,
    },

    // Room Management
    CreateRoom {
        room_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        room_name: Option<String>,
        admin_id: String,
        admin_name: String,
    },
    JoinRoom {
        room_id: String,
        client_id: String,
        name: String,
    },
    AddParticipant {
        room_id: String,
        admin_id: String,
        participant_id: String,
        name: String,
    },
    LeaveRoom {
        room_id: String,
        client_id: String,
    },
    Broadcast {
        room_id: String,
        admin_id: String,
        message: String,
    },

    // Draw
    StartDraw {
        room_id: String,
        admin_id: String,
    },
    GetRoomById {
        room_id: String,
        client_id: String,
    },
    GetResultByToken {
        room_id: String,
        token: String,
    },
}

/// Server → client events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    Pong,
    Error {
        message: String,
    },

    // Room Events
    RoomCreated {
        room_id: String,
    },
    Joined {
        room_id: String,
        participants: Vec<Participant>,
    },
    ParticipantAdded {
        participant: Participant,
    },
    Left {
        room_id: String,
        client_id: String,
    },
    Broadcast {
        from: Participant,
        message: String,
    },
    RoomFound {
        room: RoomView,
    },

    // Draw Results
    YourMatch {
        #[serde(default, rename = "match", skip_serializing_if = "Option::is_none")]
        matched: Option<Participant>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        token: Option<String>,
    },
    DrawResultAdmin {
        mapping: Vec<MappingEntry>,
    },
    Result {
        to_name: String,
        from_name: String,
    },

    // Presence
    UsersStatus {
        users: Vec<OnlineUser>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_room_wire_shape() {
        let msg: ClientMessage = serde_json::from_value(json!({
            "type": "create_room",
            "roomId": "r1",
            "adminId": "a",
            "adminName": "Alice",
        }))
        .unwrap();
        match msg {
            ClientMessage::CreateRoom { room_id, room_name, admin_id, admin_name } => {
                assert_eq!(room_id, "r1");
                assert_eq!(room_name, None);
                assert_eq!(admin_id, "a");
                assert_eq!(admin_name, "Alice");
            }
            other => panic!("decoded wrong variant: {other:?}"),
        }
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let result: Result<ClientMessage, _> = serde_json::from_value(json!({
            "type": "open_sesame",
        }));
        assert!(result.is_err());
    }

    #[test]
    fn participant_optionals_default() {
        let p: Participant = serde_json::from_value(json!({
            "id": "b",
            "name": "Bob",
        }))
        .unwrap();
        assert!(!p.is_admin);
        assert!(p.conn.is_none());

        let encoded = serde_json::to_value(&p).unwrap();
        assert_eq!(encoded, json!({ "id": "b", "name": "Bob" }));
    }

    #[test]
    fn your_match_uses_match_field_on_the_wire() {
        let msg = ServerMessage::YourMatch {
            matched: Some(Participant {
                id: "c".into(),
                name: "Carol".into(),
                is_admin: false,
                conn: None,
            }),
            token: None,
        };
        let encoded = serde_json::to_value(&msg).unwrap();
        assert_eq!(encoded["type"], "your_match");
        assert_eq!(encoded["match"]["id"], "c");
        assert!(encoded.get("token").is_none());
    }

    #[test]
    fn room_view_hides_assignment() {
        let room = Room {
            id: "r1".into(),
            name: None,
            admin_id: "a".into(),
            participants: vec![],
            assignment: Some(vec![AssignmentPair { from: "a".into(), to: "b".into() }]),
            drawn: true,
        };
        let encoded = serde_json::to_value(RoomView::from(&room)).unwrap();
        assert!(encoded.get("assignment").is_none());
        assert_eq!(encoded["drawn"], true);
    }
}
