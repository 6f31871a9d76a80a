use std::sync::Arc;

use bookshelf_cache::{CacheStore, TokenStore};
use bookshelf_mail::Mailer;
use bookshelf_storage::ObjectStore;

use crate::auth::jwt::TokenCodec;
use crate::auth::service::AuthService;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: every collaborator is behind an `Arc` or is itself a
/// cheap handle.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: bookshelf_db::DbPool,
    /// Server configuration, read-only after startup.
    pub config: Arc<ServerConfig>,
    /// Login, refresh, logout and registration flows.
    pub auth: AuthService,
    /// Refresh-token records, for revocations outside the auth flows.
    pub tokens: TokenStore,
    /// Raw cache handle (health checks).
    pub cache: Arc<dyn CacheStore>,
    pub storage: Arc<dyn ObjectStore>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    /// Wire the auth service and token store over the given collaborators.
    pub fn new(
        pool: bookshelf_db::DbPool,
        config: Arc<ServerConfig>,
        cache: Arc<dyn CacheStore>,
        storage: Arc<dyn ObjectStore>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let tokens = TokenStore::new(cache.clone());
        let auth = AuthService::new(
            Arc::new(pool.clone()),
            tokens.clone(),
            TokenCodec::new(&config.jwt),
        );

        Self {
            pool,
            config,
            auth,
            tokens,
            cache,
            storage,
            mailer,
        }
    }
}
