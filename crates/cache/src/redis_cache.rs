//! Redis-backed [`CacheStore`].

use async_trait::async_trait;
use bookshelf_core::types::Timestamp;
use chrono::Duration;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use crate::error::CacheError;
use crate::store::CacheStore;

/// Default connection URL when `REDIS_URL` is not set.
const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

/// Connection settings for the Redis cache.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// `redis://[:password@]host:port[/db]` connection URL.
    pub url: String,
}

impl RedisConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var     | Default                   |
    /// |-------------|---------------------------|
    /// | `REDIS_URL` | `redis://127.0.0.1:6379`  |
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("REDIS_URL").unwrap_or_else(|_| DEFAULT_REDIS_URL.to_string()),
        }
    }
}

/// Cache backed by a multiplexed, auto-reconnecting Redis connection.
///
/// Cloning is cheap; every clone shares the same underlying connection.
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    /// Open a client for `config.url` and establish the managed connection.
    pub async fn connect(config: &RedisConfig) -> Result<Self, CacheError> {
        let client = redis::Client::open(config.url.as_str())?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let millis = ttl.num_milliseconds();
        if millis <= 0 {
            return Err(CacheError::InvalidTtl {
                key: key.to_string(),
            });
        }
        let mut conn = self.conn.clone();
        let _: () = conn.pset_ex(key, value, millis as u64).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(key).await?;
        Ok(())
    }

    async fn set_add(&self, key: &str, member: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let _: () = conn.sadd(key, member).await?;
        Ok(())
    }

    async fn set_remove(&self, key: &str, member: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let _: () = conn.srem(key, member).await?;
        Ok(())
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>, CacheError> {
        let mut conn = self.conn.clone();
        let members: Vec<String> = conn.smembers(key).await?;
        Ok(members)
    }

    async fn expire_at(&self, key: &str, at: Timestamp) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let _: () = conn.pexpire_at(key, at.timestamp_millis()).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let _pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}
