//! In-process [`CacheStore`] with Redis-like semantics.
//!
//! Expiry is lazy: an expired entry is dropped the next time its key is
//! touched. Empty sets disappear, as they do in Redis.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use bookshelf_core::types::Timestamp;
use chrono::{Duration, Utc};
use tokio::sync::Mutex;

use crate::error::CacheError;
use crate::store::CacheStore;

#[derive(Debug, Clone)]
enum Value {
    Plain(String),
    Set(HashSet<String>),
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: Option<Timestamp>,
}

impl Entry {
    fn is_expired(&self, now: Timestamp) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live (unexpired) keys, sorted.
    pub async fn keys(&self) -> Vec<String> {
        let mut entries = self.entries.lock().await;
        purge_expired(&mut entries);
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Expiry currently attached to `key`, if the key is live and has one.
    pub async fn expiry_of(&self, key: &str) -> Option<Timestamp> {
        let mut entries = self.entries.lock().await;
        live_entry(&mut entries, key).and_then(|e| e.expires_at)
    }
}

fn purge_expired(entries: &mut HashMap<String, Entry>) {
    let now = Utc::now();
    entries.retain(|_, e| !e.is_expired(now));
}

fn live_entry<'a>(entries: &'a mut HashMap<String, Entry>, key: &str) -> Option<&'a mut Entry> {
    if entries.get(key).is_some_and(|e| e.is_expired(Utc::now())) {
        entries.remove(key);
    }
    entries.get_mut(key)
}

fn wrong_type(key: &str) -> CacheError {
    CacheError::WrongType {
        key: key.to_string(),
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        if ttl <= Duration::zero() {
            return Err(CacheError::InvalidTtl {
                key: key.to_string(),
            });
        }
        let mut entries = self.entries.lock().await;
        entries.insert(
            key.to_string(),
            Entry {
                value: Value::Plain(value.to_string()),
                expires_at: Some(Utc::now() + ttl),
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut entries = self.entries.lock().await;
        match live_entry(&mut entries, key) {
            None => Ok(None),
            Some(Entry {
                value: Value::Plain(v),
                ..
            }) => Ok(Some(v.clone())),
            Some(_) => Err(wrong_type(key)),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.lock().await.remove(key);
        Ok(())
    }

    async fn set_add(&self, key: &str, member: &str) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().await;
        match live_entry(&mut entries, key) {
            Some(Entry {
                value: Value::Set(members),
                ..
            }) => {
                members.insert(member.to_string());
                Ok(())
            }
            Some(_) => Err(wrong_type(key)),
            None => {
                entries.insert(
                    key.to_string(),
                    Entry {
                        value: Value::Set(HashSet::from([member.to_string()])),
                        expires_at: None,
                    },
                );
                Ok(())
            }
        }
    }

    async fn set_remove(&self, key: &str, member: &str) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().await;
        let now_empty = match live_entry(&mut entries, key) {
            None => return Ok(()),
            Some(Entry {
                value: Value::Set(members),
                ..
            }) => {
                members.remove(member);
                members.is_empty()
            }
            Some(_) => return Err(wrong_type(key)),
        };
        if now_empty {
            entries.remove(key);
        }
        Ok(())
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>, CacheError> {
        let mut entries = self.entries.lock().await;
        match live_entry(&mut entries, key) {
            None => Ok(Vec::new()),
            Some(Entry {
                value: Value::Set(members),
                ..
            }) => Ok(members.iter().cloned().collect()),
            Some(_) => Err(wrong_type(key)),
        }
    }

    async fn expire_at(&self, key: &str, at: Timestamp) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().await;
        if at <= Utc::now() {
            entries.remove(key);
            return Ok(());
        }
        if let Some(entry) = live_entry(&mut entries, key) {
            entry.expires_at = Some(at);
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), CacheError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[tokio::test]
    async fn set_get_delete() {
        let cache = MemoryCache::new();
        cache
            .set_with_ttl("k", "v", Duration::minutes(1))
            .await
            .unwrap();
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("v"));

        cache.delete("k").await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), None);
        cache.delete("k").await.unwrap();
    }

    #[tokio::test]
    async fn rejects_non_positive_ttl() {
        let cache = MemoryCache::new();
        let result = cache.set_with_ttl("k", "v", Duration::zero()).await;
        assert_matches!(result, Err(CacheError::InvalidTtl { key }) if key == "k");
        let result = cache.set_with_ttl("k", "v", Duration::seconds(-5)).await;
        assert_matches!(result, Err(CacheError::InvalidTtl { .. }));
    }

    #[tokio::test]
    async fn entries_expire() {
        let cache = MemoryCache::new();
        cache
            .set_with_ttl("short", "v", Duration::milliseconds(20))
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(40)).await;
        assert_eq!(cache.get("short").await.unwrap(), None);
        assert!(cache.keys().await.is_empty());
    }

    #[tokio::test]
    async fn sets_track_members_and_vanish_when_empty() {
        let cache = MemoryCache::new();
        cache.set_add("s", "a").await.unwrap();
        cache.set_add("s", "b").await.unwrap();
        cache.set_add("s", "a").await.unwrap();

        let mut members = cache.set_members("s").await.unwrap();
        members.sort();
        assert_eq!(members, vec!["a", "b"]);

        cache.set_remove("s", "a").await.unwrap();
        cache.set_remove("s", "b").await.unwrap();
        assert!(cache.keys().await.is_empty());
        assert!(cache.set_members("s").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn expire_at_sets_absolute_expiry() {
        let cache = MemoryCache::new();
        cache.set_add("s", "a").await.unwrap();
        assert_eq!(cache.expiry_of("s").await, None);

        let at = Utc::now() + Duration::days(7);
        cache.expire_at("s", at).await.unwrap();
        assert_eq!(cache.expiry_of("s").await, Some(at));

        cache.expire_at("s", Utc::now() - Duration::seconds(1)).await.unwrap();
        assert!(cache.set_members("s").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn type_mismatch_is_reported() {
        let cache = MemoryCache::new();
        cache.set_add("s", "a").await.unwrap();
        assert_matches!(cache.get("s").await, Err(CacheError::WrongType { .. }));
    }
}
