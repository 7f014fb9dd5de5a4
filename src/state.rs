//! Application state shared across connection tasks.

use crate::config::Config;
use crate::notify::Notifier;
use crate::store::{RoomStore, Store, UserStore};
use crate::token::TokenService;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Global application state.
pub struct AppState {
    pub config: Arc<Config>,
    pub rooms: RoomStore,
    pub users: UserStore,
    pub notifier: Arc<dyn Notifier>,
    pub tokens: TokenService,
    /// Write locks keyed by room id. The store gives no per-key atomicity,
    /// so every room read-modify-write runs under its room's lock.
    room_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn Store>, notifier: Arc<dyn Notifier>) -> Self {
        let tokens = TokenService::new(&config.token.secret, config.token.ttl);
        Self {
            config: Arc::new(config),
            rooms: RoomStore::new(store.clone()),
            users: UserStore::new(store),
            notifier,
            tokens,
            room_locks: DashMap::new(),
        }
    }

    /// Lock guarding mutations of one room record.
    pub fn room_lock(&self, room_id: &str) -> Arc<Mutex<()>> {
        self.room_locks
            .entry(room_id.to_string())
            .or_default()
            .clone()
    }
}
