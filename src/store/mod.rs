//! Persistent key-value store collaborator and the record façades over it.

use async_trait::async_trait;
use thiserror::Error;

pub mod http;
pub mod memory;
pub mod repo;

pub use http::HttpStore;
pub use memory::MemoryStore;
pub use repo::{RoomStore, UserStore};

/// Failures at the storage boundary. Never shown to clients verbatim.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("store backend returned status {status}")]
    Backend { status: u16 },

    #[error("corrupt record at {key}: {detail}")]
    Corrupt { key: String, detail: String },
}

/// Key-value store contract. The single source of truth for room and user
/// records; one logical writer per key at a time (the handler layer
/// serializes room mutations).
#[async_trait]
pub trait Store: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    async fn exists(&self, key: &str) -> Result<bool, StoreError>;
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}
