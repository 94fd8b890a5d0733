//! SQLite state store implementation.
//!
//! Implements `StateStore` from `complyx-core` using sqlx with split
//! read/write pools. Each store's snapshot is one row in `app_state`,
//! stored as JSON text and deserialized on read.

use chrono::Utc;
use sqlx::Row;

use complyx_core::persist::StateStore;
use complyx_types::error::StoreError;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `StateStore`.
#[derive(Clone)]
pub struct SqliteStateStore {
    pool: DatabasePool,
}

impl SqliteStateStore {
    /// Create a new state store backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

impl StateStore for SqliteStateStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        let row = sqlx::query("SELECT value FROM app_state WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| StoreError::Persistence(e.to_string()))?;

        match row {
            Some(row) => {
                let value_str: String = row
                    .try_get("value")
                    .map_err(|e| StoreError::Persistence(e.to_string()))?;
                let value: serde_json::Value = serde_json::from_str(&value_str)
                    .map_err(|e| StoreError::Serialization(format!("invalid JSON value: {e}")))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &serde_json::Value) -> Result<(), StoreError> {
        let now = Utc::now().to_rfc3339();
        let value_str = serde_json::to_string(value)
            .map_err(|e| StoreError::Serialization(format!("failed to serialize value: {e}")))?;

        sqlx::query(
            r#"INSERT INTO app_state (key, value, created_at, updated_at)
               VALUES (?, ?, ?, ?)
               ON CONFLICT (key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at"#,
        )
        .bind(key)
        .bind(&value_str)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| StoreError::Persistence(e.to_string()))?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM app_state WHERE key = ?")
            .bind(key)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| StoreError::Persistence(e.to_string()))?;

        Ok(())
    }

    async fn list_keys(&self) -> Result<Vec<String>, StoreError> {
        let rows = sqlx::query("SELECT key FROM app_state ORDER BY key")
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| StoreError::Persistence(e.to_string()))?;

        let mut keys = Vec::with_capacity(rows.len());
        for row in &rows {
            let key: String = row
                .try_get("key")
                .map_err(|e| StoreError::Persistence(e.to_string()))?;
            keys.push(key);
        }

        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_store() -> SqliteStateStore {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        std::mem::forget(dir);
        SqliteStateStore::new(DatabasePool::new(&url).await.unwrap())
    }

    #[tokio::test]
    async fn test_set_get_roundtrip() {
        let store = test_store().await;

        let value = serde_json::json!({"sessions": [], "active_session_id": null});
        store.set("complyx-session-storage", &value).await.unwrap();

        let got = store.get("complyx-session-storage").await.unwrap();
        assert_eq!(got, Some(value));
    }

    #[tokio::test]
    async fn test_get_nonexistent_returns_none() {
        let store = test_store().await;
        let got = store.get("missing").await.unwrap();
        assert!(got.is_none());
    }

    #[tokio::test]
    async fn test_set_upserts() {
        let store = test_store().await;

        store.set("counter", &serde_json::json!(1)).await.unwrap();
        store.set("counter", &serde_json::json!(2)).await.unwrap();

        let got = store.get("counter").await.unwrap();
        assert_eq!(got, Some(serde_json::json!(2)));
    }

    #[tokio::test]
    async fn test_delete() {
        let store = test_store().await;

        store.set("temp", &serde_json::json!("value")).await.unwrap();
        store.delete("temp").await.unwrap();

        let got = store.get("temp").await.unwrap();
        assert!(got.is_none());
    }

    #[tokio::test]
    async fn test_delete_nonexistent_is_noop() {
        let store = test_store().await;
        store.delete("nope").await.unwrap();
    }

    #[tokio::test]
    async fn test_list_keys_sorted() {
        let store = test_store().await;

        store
            .set("complyx-session-storage", &serde_json::json!({}))
            .await
            .unwrap();
        store
            .set("complyx-chat-storage", &serde_json::json!({}))
            .await
            .unwrap();
        store
            .set("complyx-assessment-storage", &serde_json::json!({}))
            .await
            .unwrap();

        let keys = store.list_keys().await.unwrap();
        assert_eq!(
            keys,
            vec![
                "complyx-assessment-storage",
                "complyx-chat-storage",
                "complyx-session-storage"
            ]
        );
    }

    #[tokio::test]
    async fn test_nested_json_survives() {
        let store = test_store().await;

        let value = serde_json::json!({
            "session_messages": {
                "018f7b4e-2f7a-7000-8000-000000000000": [
                    {"content": "hello", "is_user": true}
                ]
            },
            "current_session_id": "018f7b4e-2f7a-7000-8000-000000000000"
        });
        store.set("complyx-chat-storage", &value).await.unwrap();

        let got = store.get("complyx-chat-storage").await.unwrap();
        assert_eq!(got, Some(value));
    }
}
