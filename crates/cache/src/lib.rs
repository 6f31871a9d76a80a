//! Key-value cache collaborator and the refresh-token store built on it.
//!
//! - [`store::CacheStore`] -- the handful of cache primitives the services need.
//! - [`redis_cache::RedisCache`] -- production backend over a Redis connection manager.
//! - [`memory::MemoryCache`] -- in-process backend with lazy expiry, for tests.
//! - [`token_store::TokenStore`] -- revocable refresh-token records indexed by id,
//!   by raw token value, and by (user, token type).

pub mod error;
pub mod memory;
pub mod redis_cache;
pub mod store;
pub mod token_store;

pub use error::CacheError;
pub use memory::MemoryCache;
pub use redis_cache::{RedisCache, RedisConfig};
pub use store::CacheStore;
pub use token_store::{TokenRecord, TokenStore, TokenStoreError};
