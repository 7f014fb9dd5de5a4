//! In-process store backend.

use super::{Store, StoreError};
use async_trait::async_trait;
use dashmap::DashMap;

/// DashMap-backed store. The default backend when no store endpoint is
/// configured, and the backend the test suites run against.
#[derive(Default)]
pub struct MemoryStore {
    data: DashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.data.get(key).map(|entry| entry.value().clone()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.data.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.data.contains_key(key))
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.data.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_exists_delete() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").await.unwrap(), None);
        assert!(!store.exists("k").await.unwrap());

        store.set("k", "v").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));
        assert!(store.exists("k").await.unwrap());

        store.set("k", "v2").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v2".to_string()));

        store.delete("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }
}
