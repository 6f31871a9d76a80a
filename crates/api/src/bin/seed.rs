//! Seed a development database with demo accounts and books.
//!
//! Rows that already exist (matched by email, or by title and author) are
//! left untouched, so the binary can be re-run safely.

use anyhow::Context;
use bookshelf_api::auth::password::hash_password;
use bookshelf_core::roles::Role;
use bookshelf_db::models::book::CreateBook;
use bookshelf_db::models::user::CreateUser;
use bookshelf_db::repositories::{BookRepo, UserRepo};
use bookshelf_db::DbPool;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Password given to every seeded account unless `SEED_PASSWORD` is set.
const DEFAULT_SEED_PASSWORD: &str = "password123";

const USERS: &[(&str, &str, &str, Role)] = &[
    ("admin@example.com", "Admin", "User", Role::Admin),
    ("moderator@example.com", "Moderator", "User", Role::Moderator),
    ("user@example.com", "John", "Doe", Role::User),
];

const BOOKS: &[(&str, &str)] = &[
    ("The Great Gatsby", "F. Scott Fitzgerald"),
    ("To Kill a Mockingbird", "Harper Lee"),
    ("1984", "George Orwell"),
    ("Pride and Prejudice", "Jane Austen"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bookshelf_seed=info,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = bookshelf_db::create_pool(&database_url)
        .await
        .context("Failed to connect to database")?;
    bookshelf_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let password =
        std::env::var("SEED_PASSWORD").unwrap_or_else(|_| DEFAULT_SEED_PASSWORD.to_string());
    let users = seed_users(&pool, &password).await?;
    let books = seed_books(&pool).await?;

    tracing::info!(users, books, "Seeding complete");
    Ok(())
}

async fn seed_users(pool: &DbPool, password: &str) -> anyhow::Result<usize> {
    let password_hash =
        hash_password(password).map_err(|e| anyhow::anyhow!("Password hashing failed: {e}"))?;

    let mut created = 0;
    for &(email, first_name, last_name, role) in USERS {
        if UserRepo::find_by_email(pool, email).await?.is_some() {
            tracing::debug!(email, "User already present");
            continue;
        }
        UserRepo::create(
            pool,
            &CreateUser {
                email: email.to_string(),
                password_hash: password_hash.clone(),
                first_name: first_name.to_string(),
                last_name: Some(last_name.to_string()),
                role,
                profile_image: None,
            },
        )
        .await
        .with_context(|| format!("Failed to create user {email}"))?;
        created += 1;
    }
    Ok(created)
}

async fn seed_books(pool: &DbPool) -> anyhow::Result<usize> {
    let mut created = 0;
    for &(title, author) in BOOKS {
        if BookRepo::find_by_title_and_author(pool, title, author)
            .await?
            .is_some()
        {
            continue;
        }
        BookRepo::create(
            pool,
            &CreateBook {
                title: title.to_string(),
                author: author.to_string(),
            },
        )
        .await
        .with_context(|| format!("Failed to create book '{title}'"))?;
        created += 1;
    }
    Ok(created)
}
