//! Repository façades: JSON-serialized records behind typed keys.

use super::{Store, StoreError};
use crate::protocol::{Room, User};
use std::sync::Arc;

fn decode<T: serde::de::DeserializeOwned>(key: &str, raw: &str) -> Result<T, StoreError> {
    serde_json::from_str(raw).map_err(|err| StoreError::Corrupt {
        key: key.to_string(),
        detail: err.to_string(),
    })
}

fn encode<T: serde::Serialize>(key: &str, record: &T) -> Result<String, StoreError> {
    serde_json::to_string(record).map_err(|err| StoreError::Corrupt {
        key: key.to_string(),
        detail: err.to_string(),
    })
}

/// Rooms under `room:<roomId>`.
#[derive(Clone)]
pub struct RoomStore {
    store: Arc<dyn Store>,
}

impl RoomStore {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    fn key(room_id: &str) -> String {
        format!("room:{room_id}")
    }

    pub async fn exists(&self, room_id: &str) -> Result<bool, StoreError> {
        self.store.exists(&Self::key(room_id)).await
    }

    pub async fn find(&self, room_id: &str) -> Result<Option<Room>, StoreError> {
        let key = Self::key(room_id);
        match self.store.get(&key).await? {
            Some(raw) => decode(&key, &raw).map(Some),
            None => Ok(None),
        }
    }

    pub async fn save(&self, room: &Room) -> Result<(), StoreError> {
        let key = Self::key(&room.id);
        let raw = encode(&key, room)?;
        self.store.set(&key, &raw).await
    }
}

/// Users under `user:<userId>`.
#[derive(Clone)]
pub struct UserStore {
    store: Arc<dyn Store>,
}

impl UserStore {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    fn key(user_id: &str) -> String {
        format!("user:{user_id}")
    }

    pub async fn find(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        let key = Self::key(user_id);
        match self.store.get(&key).await? {
            Some(raw) => decode(&key, &raw).map(Some),
            None => Ok(None),
        }
    }

    pub async fn save(&self, user: &User) -> Result<(), StoreError> {
        let key = Self::key(&user.id);
        let raw = encode(&key, user)?;
        self.store.set(&key, &raw).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Participant;
    use crate::store::MemoryStore;

    fn sample_room() -> Room {
        Room {
            id: "r1".into(),
            name: Some("holiday".into()),
            admin_id: "a".into(),
            participants: vec![Participant {
                id: "a".into(),
                name: "Alice".into(),
                is_admin: true,
                conn: None,
            }],
            assignment: None,
            drawn: false,
        }
    }

    #[tokio::test]
    async fn room_records_live_under_room_prefix() {
        let backend = Arc::new(MemoryStore::new());
        let rooms = RoomStore::new(backend.clone());

        rooms.save(&sample_room()).await.unwrap();
        assert!(backend.get("room:r1").await.unwrap().is_some());
        assert!(rooms.exists("r1").await.unwrap());

        let found = rooms.find("r1").await.unwrap().unwrap();
        assert_eq!(found.admin_id, "a");
        assert_eq!(found.participants.len(), 1);
        assert!(rooms.find("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn corrupt_room_record_is_reported() {
        let backend = Arc::new(MemoryStore::new());
        backend.set("room:r1", "{not json").await.unwrap();

        let rooms = RoomStore::new(backend);
        let err = rooms.find("r1").await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn user_records_round_trip() {
        let backend = Arc::new(MemoryStore::new());
        let users = UserStore::new(backend);

        let user = User {
            id: "u1".into(),
            name: "Uma".into(),
            conn: Some("conn-1".into()),
        };
        users.save(&user).await.unwrap();

        let found = users.find("u1").await.unwrap().unwrap();
        assert_eq!(found.name, "Uma");
        assert_eq!(found.conn.as_deref(), Some("conn-1"));
    }
}
