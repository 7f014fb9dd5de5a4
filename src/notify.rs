//! Transport collaborator: outbound envelopes, broadcast groups, presence.

use crate::protocol::{ConnId, OnlineUser, ServerMessage};
use dashmap::DashMap;
use std::collections::HashSet;
use tokio::sync::mpsc::UnboundedSender;

/// What presence knows about a tracked connection.
#[derive(Debug, Clone)]
pub struct PresenceEntry {
    pub user_id: String,
    pub room_id: String,
    pub name: Option<String>,
}

/// Contract the handlers drive the transport through. The core never holds
/// a raw socket; connections are addressed by opaque ids.
pub trait Notifier: Send + Sync {
    /// Direct reply to one connection. Fire-and-forget: a closed or unknown
    /// connection simply misses the push.
    fn send_to(&self, conn: &str, message: ServerMessage);

    /// Fan-out to every connection currently grouped under the room.
    fn broadcast_to_room(&self, room_id: &str, message: ServerMessage);

    fn join_group(&self, conn: &str, room_id: &str);

    fn leave_group(&self, conn: &str, room_id: &str);

    /// Record the connection as online in a room and broadcast the updated
    /// `users_status` to that room.
    fn track(&self, conn: &str, user_id: &str, room_id: &str, name: Option<&str>);

    /// Drop the connection from presence, broadcast `users_status` to its
    /// prior room, and return what was tracked.
    fn untrack(&self, conn: &str) -> Option<PresenceEntry>;

    /// Currently-connected members of a room. Process-local; answers "who
    /// is online", not "who is a member".
    fn online_users(&self, room_id: &str) -> Vec<OnlineUser>;
}

/// Production notifier: one unbounded channel per connection, group
/// membership and presence in process-local maps. Usable in tests without
/// any transport by registering plain mpsc channels.
#[derive(Default)]
pub struct ChannelNotifier {
    conns: DashMap<ConnId, UnboundedSender<ServerMessage>>,
    groups: DashMap<String, HashSet<ConnId>>,
    presence: DashMap<ConnId, PresenceEntry>,
}

impl ChannelNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a connection's outbound channel. Transport-adapter concern,
    /// not part of the handler-facing contract.
    pub fn register(&self, conn: &str, sender: UnboundedSender<ServerMessage>) {
        self.conns.insert(conn.to_string(), sender);
    }

    /// Detach a closed connection from the channel map and all groups.
    pub fn unregister(&self, conn: &str) {
        self.conns.remove(conn);
        for mut group in self.groups.iter_mut() {
            group.value_mut().remove(conn);
        }
    }

    fn broadcast_users_status(&self, room_id: &str) {
        let users = self.online_users(room_id);
        self.broadcast_to_room(room_id, ServerMessage::UsersStatus { users });
    }
}

impl Notifier for ChannelNotifier {
    fn send_to(&self, conn: &str, message: ServerMessage) {
        if let Some(sender) = self.conns.get(conn) {
            let _ = sender.send(message);
        }
    }

    fn broadcast_to_room(&self, room_id: &str, message: ServerMessage) {
        if let Some(group) = self.groups.get(room_id) {
            for conn in group.iter() {
                if let Some(sender) = self.conns.get(conn) {
                    let _ = sender.send(message.clone());
                }
            }
        }
    }

    fn join_group(&self, conn: &str, room_id: &str) {
        self.groups
            .entry(room_id.to_string())
            .or_default()
            .insert(conn.to_string());
    }

    fn leave_group(&self, conn: &str, room_id: &str) {
        if let Some(mut group) = self.groups.get_mut(room_id) {
            group.remove(conn);
        }
    }

    fn track(&self, conn: &str, user_id: &str, room_id: &str, name: Option<&str>) {
        self.presence.insert(
            conn.to_string(),
            PresenceEntry {
                user_id: user_id.to_string(),
                room_id: room_id.to_string(),
                name: name.map(str::to_string),
            },
        );
        self.broadcast_users_status(room_id);
    }

    fn untrack(&self, conn: &str) -> Option<PresenceEntry> {
        let (_, entry) = self.presence.remove(conn)?;
        self.broadcast_users_status(&entry.room_id);
        Some(entry)
    }

    fn online_users(&self, room_id: &str) -> Vec<OnlineUser> {
        self.presence
            .iter()
            .filter(|entry| entry.room_id == room_id)
            .map(|entry| OnlineUser {
                id: entry.user_id.clone(),
                name: entry.name.clone().unwrap_or_default(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn connect(notifier: &ChannelNotifier, conn: &str) -> mpsc::UnboundedReceiver<ServerMessage> {
        let (tx, rx) = mpsc::unbounded_channel();
        notifier.register(conn, tx);
        rx
    }

    #[tokio::test]
    async fn broadcast_reaches_only_group_members() {
        let notifier = ChannelNotifier::new();
        let mut rx_a = connect(&notifier, "conn-a");
        let mut rx_b = connect(&notifier, "conn-b");

        notifier.join_group("conn-a", "r1");
        notifier.broadcast_to_room("r1", ServerMessage::Pong);

        assert!(matches!(rx_a.try_recv(), Ok(ServerMessage::Pong)));
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn track_broadcasts_presence_to_room() {
        let notifier = ChannelNotifier::new();
        let mut rx = connect(&notifier, "conn-a");
        notifier.join_group("conn-a", "r1");

        notifier.track("conn-a", "a", "r1", Some("Alice"));

        match rx.try_recv() {
            Ok(ServerMessage::UsersStatus { users }) => {
                assert_eq!(
                    users,
                    vec![OnlineUser { id: "a".into(), name: "Alice".into() }]
                );
            }
            other => panic!("expected users_status, got {other:?}"),
        }

        let prior = notifier.untrack("conn-a").unwrap();
        assert_eq!(prior.room_id, "r1");
        assert!(notifier.online_users("r1").is_empty());
    }

    #[tokio::test]
    async fn send_to_unknown_connection_is_a_noop() {
        let notifier = ChannelNotifier::new();
        notifier.send_to("ghost", ServerMessage::Pong);
    }
}
