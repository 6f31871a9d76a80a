use async_trait::async_trait;
use bookshelf_core::types::Timestamp;
use chrono::Duration;

use crate::error::CacheError;

/// Cache primitives used by the token store.
///
/// Keys that have expired behave exactly like keys that were never written.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Store `value` under `key`, expiring after `ttl`. `ttl` must be positive.
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Remove `key`. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    async fn set_add(&self, key: &str, member: &str) -> Result<(), CacheError>;

    async fn set_remove(&self, key: &str, member: &str) -> Result<(), CacheError>;

    async fn set_members(&self, key: &str) -> Result<Vec<String>, CacheError>;

    /// Make `key` expire at the absolute time `at`. No-op for absent keys.
    async fn expire_at(&self, key: &str, at: Timestamp) -> Result<(), CacheError>;

    /// Liveness probe used by the health endpoint.
    async fn ping(&self) -> Result<(), CacheError>;
}
