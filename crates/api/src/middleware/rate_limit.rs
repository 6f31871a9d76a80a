//! Per-client rate limiting.
//!
//! Clients are keyed by IP with [`SmartIpKeyExtractor`]: `X-Forwarded-For`,
//! `X-Real-IP` and `Forwarded` are consulted before the peer address, so the
//! server must be started with connect info. Exhausted budgets answer 429.
//!
//! Defaults:
//!
//! - General API routes: 100 requests per minute per IP.
//! - Auth routes: 10 requests per minute per IP, on top of the general budget.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::SmartIpKeyExtractor;
use tower_governor::GovernorLayer;

const DEFAULT_PER_MINUTE: u32 = 100;
const DEFAULT_AUTH_PER_MINUTE: u32 = 10;

/// Request budgets per client IP.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// When false no limiter is installed.
    pub enabled: bool,
    /// Budget shared by every `/api/v1` route.
    pub per_minute: u32,
    /// Additional budget for the `/auth` routes.
    pub auth_per_minute: u32,
}

impl RateLimitConfig {
    /// | Env Var                      | Default |
    /// |------------------------------|---------|
    /// | `RATE_LIMIT_ENABLED`         | `true`  |
    /// | `RATE_LIMIT_PER_MINUTE`      | `100`   |
    /// | `AUTH_RATE_LIMIT_PER_MINUTE` | `10`    |
    ///
    /// # Panics
    ///
    /// Panics if a budget is not a positive integer.
    pub fn from_env() -> Self {
        let enabled = std::env::var("RATE_LIMIT_ENABLED")
            .map(|v| !matches!(v.trim(), "false" | "0" | "off"))
            .unwrap_or(true);

        let per_minute: u32 = std::env::var("RATE_LIMIT_PER_MINUTE")
            .unwrap_or_else(|_| DEFAULT_PER_MINUTE.to_string())
            .parse()
            .expect("RATE_LIMIT_PER_MINUTE must be a valid u32");

        let auth_per_minute: u32 = std::env::var("AUTH_RATE_LIMIT_PER_MINUTE")
            .unwrap_or_else(|_| DEFAULT_AUTH_PER_MINUTE.to_string())
            .parse()
            .expect("AUTH_RATE_LIMIT_PER_MINUTE must be a valid u32");

        assert!(
            per_minute > 0 && auth_per_minute > 0,
            "rate limit budgets must be positive"
        );

        Self {
            enabled,
            per_minute,
            auth_per_minute,
        }
    }

    /// Limit `router` to the general budget.
    pub fn limit_api<S>(&self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        self.apply(router, self.per_minute)
    }

    /// Limit `router` to the auth budget.
    pub fn limit_auth<S>(&self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        self.apply(router, self.auth_per_minute)
    }

    fn apply<S>(&self, router: Router<S>, per_minute: u32) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        if !self.enabled {
            return router;
        }

        // A full bucket of `per_minute` requests, refilled one at a time
        // over the minute.
        let config = GovernorConfigBuilder::default()
            .period(Duration::from_secs(60) / per_minute)
            .burst_size(per_minute)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .expect("rate limit budget must be positive");

        router.layer(GovernorLayer::new(Arc::new(config)))
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            per_minute: DEFAULT_PER_MINUTE,
            auth_per_minute: DEFAULT_AUTH_PER_MINUTE,
        }
    }
}
