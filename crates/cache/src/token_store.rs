//! Revocable refresh-token records.
//!
//! Each record is written as three cache entries:
//!
//! ```text
//! token:{id}                      JSON TokenRecord, TTL = time left until expires_at
//! token_lookup:{raw token}        id, same TTL
//! user_tokens:{user_id}:{type}    set of ids, EXPIREAT pushed to the newest expires_at
//! ```
//!
//! The writes are sequential with no rollback. A lookup entry whose record is
//! gone resolves to [`TokenStoreError::NotFound`] and disappears on its own
//! once its TTL lapses.

use std::sync::Arc;

use bookshelf_core::tokens::TokenType;
use bookshelf_core::types::{DbId, Timestamp};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CacheError;
use crate::store::CacheStore;

#[derive(Debug, thiserror::Error)]
pub enum TokenStoreError {
    /// No live record for the given id or token value.
    #[error("token not found")]
    NotFound,

    #[error(transparent)]
    Cache(#[from] CacheError),

    /// A stored entry could not be decoded.
    #[error("Corrupt token entry at '{key}': {reason}")]
    Corrupt { key: String, reason: String },
}

/// A persisted refresh token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub id: Uuid,
    pub user_id: DbId,
    pub token_type: TokenType,
    /// The raw token string as handed to the client.
    pub token: String,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TokenRecord {
    /// A record without an id yet; [`TokenStore::create`] assigns one.
    pub fn new(
        user_id: DbId,
        token_type: TokenType,
        token: impl Into<String>,
        expires_at: Timestamp,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::nil(),
            user_id,
            token_type,
            token: token.into(),
            expires_at,
            created_at: now,
            updated_at: now,
        }
    }
}

fn record_key(id: Uuid) -> String {
    format!("token:{id}")
}

fn lookup_key(token: &str) -> String {
    format!("token_lookup:{token}")
}

fn user_set_key(user_id: DbId, token_type: TokenType) -> String {
    format!("user_tokens:{user_id}:{token_type}")
}

/// Token persistence over any [`CacheStore`]. Cheap to clone.
#[derive(Clone)]
pub struct TokenStore {
    cache: Arc<dyn CacheStore>,
}

impl TokenStore {
    pub fn new(cache: Arc<dyn CacheStore>) -> Self {
        Self { cache }
    }

    /// Persist `record`, assigning a fresh id when it has none.
    ///
    /// Fails with [`CacheError::InvalidTtl`] if `expires_at` is not in the future.
    pub async fn create(&self, mut record: TokenRecord) -> Result<TokenRecord, TokenStoreError> {
        if record.id.is_nil() {
            record.id = Uuid::new_v4();
        }
        let ttl = record.expires_at - Utc::now();
        let payload = serde_json::to_string(&record).map_err(|e| TokenStoreError::Corrupt {
            key: record_key(record.id),
            reason: e.to_string(),
        })?;
        let id = record.id.to_string();
        let set_key = user_set_key(record.user_id, record.token_type);

        self.cache
            .set_with_ttl(&record_key(record.id), &payload, ttl)
            .await?;
        self.cache
            .set_with_ttl(&lookup_key(&record.token), &id, ttl)
            .await?;
        self.cache.set_add(&set_key, &id).await?;
        self.cache.expire_at(&set_key, record.expires_at).await?;

        tracing::debug!(
            token_id = %record.id,
            user_id = %record.user_id,
            token_type = %record.token_type,
            "Token record created"
        );
        Ok(record)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<TokenRecord, TokenStoreError> {
        self.get_record(id).await?.ok_or(TokenStoreError::NotFound)
    }

    /// Resolve a raw token through the lookup index, then load its record.
    ///
    /// `NotFound` if either hop misses.
    pub async fn find_by_value(&self, token: &str) -> Result<TokenRecord, TokenStoreError> {
        let key = lookup_key(token);
        let raw_id = self
            .cache
            .get(&key)
            .await?
            .ok_or(TokenStoreError::NotFound)?;
        let id = Uuid::parse_str(&raw_id).map_err(|e| TokenStoreError::Corrupt {
            key,
            reason: e.to_string(),
        })?;
        self.find_by_id(id).await
    }

    /// Remove a record and its index entries.
    ///
    /// Deleting a record that no longer exists succeeds.
    pub async fn delete_by_id(&self, id: Uuid) -> Result<(), TokenStoreError> {
        let Some(record) = self.get_record(id).await? else {
            tracing::debug!(token_id = %id, "Token record already gone");
            return Ok(());
        };

        self.cache.delete(&lookup_key(&record.token)).await?;
        self.cache
            .set_remove(
                &user_set_key(record.user_id, record.token_type),
                &id.to_string(),
            )
            .await?;
        self.cache.delete(&record_key(id)).await?;

        tracing::debug!(token_id = %id, user_id = %record.user_id, "Token record deleted");
        Ok(())
    }

    /// Revoke every token of `token_type` held by `user_id`.
    ///
    /// Best effort: members whose record is already gone are skipped and
    /// failures on individual members are logged and swallowed. Only a failure
    /// to enumerate or to remove the set itself is reported.
    pub async fn delete_all_for_user(
        &self,
        user_id: DbId,
        token_type: TokenType,
    ) -> Result<(), TokenStoreError> {
        let set_key = user_set_key(user_id, token_type);
        let members = self.cache.set_members(&set_key).await?;

        let mut revoked = 0usize;
        for member in &members {
            match self.revoke_member(member).await {
                Ok(true) => revoked += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(user_id = %user_id, member = %member, error = %e, "Failed to revoke token");
                }
            }
        }

        self.cache.delete(&set_key).await?;
        tracing::info!(user_id = %user_id, token_type = %token_type, revoked, "Revoked user tokens");
        Ok(())
    }

    /// Delete one set member's record and lookup entry. `Ok(false)` if the
    /// record had already expired.
    async fn revoke_member(&self, member: &str) -> Result<bool, TokenStoreError> {
        let id = Uuid::parse_str(member).map_err(|e| TokenStoreError::Corrupt {
            key: member.to_string(),
            reason: e.to_string(),
        })?;
        let Some(record) = self.get_record(id).await? else {
            return Ok(false);
        };
        self.cache.delete(&lookup_key(&record.token)).await?;
        self.cache.delete(&record_key(id)).await?;
        Ok(true)
    }

    async fn get_record(&self, id: Uuid) -> Result<Option<TokenRecord>, TokenStoreError> {
        let key = record_key(id);
        let Some(payload) = self.cache.get(&key).await? else {
            return Ok(None);
        };
        serde_json::from_str(&payload)
            .map(Some)
            .map_err(|e| TokenStoreError::Corrupt {
                key,
                reason: e.to_string(),
            })
    }
}
