//! Durable key-value store trait.
//!
//! Defines the interface for the string-keyed durable store the state
//! containers write through. Implementations live in complyx-infra
//! (SQLite) and in this crate (in-memory).

use complyx_types::error::StoreError;

/// Trait for string-keyed durable storage of JSON state records.
///
/// Each store persists exactly one record under its named key; the value is
/// an arbitrary JSON document. Uses RPITIT (native async fn in traits,
/// Rust 2024 edition).
pub trait StateStore: Send + Sync {
    /// Get a value by key. Returns None if the key does not exist.
    fn get(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<serde_json::Value>, StoreError>> + Send;

    /// Set a value for a key (upsert).
    fn set(
        &self,
        key: &str,
        value: &serde_json::Value,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Delete a key. No-op if key does not exist.
    fn delete(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// List all stored keys.
    fn list_keys(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<String>, StoreError>> + Send;
}
