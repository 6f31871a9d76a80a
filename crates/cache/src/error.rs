/// Error type for cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Connection or command failure reported by Redis.
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// A write was asked to expire immediately or in the past.
    #[error("TTL for key '{key}' must be positive")]
    InvalidTtl { key: String },

    /// A set command hit a plain value or vice versa.
    #[error("Key '{key}' holds the wrong kind of value")]
    WrongType { key: String },
}
