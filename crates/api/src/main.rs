use std::net::SocketAddr;
use std::sync::Arc;

use bookshelf_api::config::ServerConfig;
use bookshelf_api::router::build_app_router;
use bookshelf_api::state::AppState;
use bookshelf_cache::{CacheStore, RedisCache};
use bookshelf_mail::{LogMailer, Mailer, SmtpMailer};
use bookshelf_storage::{ObjectStore, S3Storage};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bookshelf_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = bookshelf_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    bookshelf_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    bookshelf_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database ready");

    // --- Cache ---
    let cache: Arc<dyn CacheStore> = Arc::new(
        RedisCache::connect(&config.redis)
            .await
            .expect("Failed to connect to Redis"),
    );
    tracing::info!("Redis connection established");

    // --- Object store ---
    let storage: Arc<dyn ObjectStore> = Arc::new(S3Storage::new(&config.s3).await);
    tracing::info!(bucket = %config.s3.bucket, public_bucket = %config.s3.public_bucket, "Object store configured");

    // --- Mail ---
    let mailer: Arc<dyn Mailer> = match &config.email {
        Some(email) => {
            tracing::info!(host = %email.smtp_host, "SMTP mailer configured");
            Arc::new(SmtpMailer::new(email).expect("Invalid SMTP configuration"))
        }
        None => {
            tracing::warn!("SMTP_HOST not set; outgoing email will only be logged");
            Arc::new(LogMailer)
        }
    };

    // --- App ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    let state = AppState::new(pool, Arc::new(config), cache, storage, mailer);
    let app = build_app_router(state);

    // --- Start server ---
    tracing::info!(%addr, "Starting server");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    // Connect info lets the rate limiter fall back to the peer address.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
