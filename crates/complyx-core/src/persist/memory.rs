//! In-memory `StateStore` implementation.
//!
//! Backs ephemeral runs (no durability across restarts) and the store
//! tests in this crate. Same observable behavior as the SQLite adapter:
//! upsert on set, no-op delete for missing keys, sorted key listing.

use dashmap::DashMap;

use complyx_types::error::StoreError;

use super::state_store::StateStore;

/// Process-local `StateStore` backed by a concurrent map.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    entries: DashMap<String, serde_json::Value>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStateStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    async fn set(&self, key: &str, value: &serde_json::Value) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.clone());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }

    async fn list_keys(&self) -> Result<Vec<String>, StoreError> {
        let mut keys: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_roundtrip() {
        let store = MemoryStateStore::new();
        let value = serde_json::json!({"sessions": [], "active_session_id": null});
        store.set("complyx-session-storage", &value).await.unwrap();

        let got = store.get("complyx-session-storage").await.unwrap();
        assert_eq!(got, Some(value));
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let store = MemoryStateStore::new();
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_upserts() {
        let store = MemoryStateStore::new();
        store.set("k", &serde_json::json!(1)).await.unwrap();
        store.set("k", &serde_json::json!(2)).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(serde_json::json!(2)));
    }

    #[tokio::test]
    async fn test_delete_missing_is_noop() {
        let store = MemoryStateStore::new();
        store.delete("nope").await.unwrap();
    }

    #[tokio::test]
    async fn test_list_keys_sorted() {
        let store = MemoryStateStore::new();
        store.set("beta", &serde_json::json!("b")).await.unwrap();
        store.set("alpha", &serde_json::json!("a")).await.unwrap();
        let keys = store.list_keys().await.unwrap();
        assert_eq!(keys, vec!["alpha", "beta"]);
    }
}
