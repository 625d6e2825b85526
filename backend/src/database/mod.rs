//! Module for database connection setup and common utilities.
//!
//! This module is responsible for initializing the database connection pool,
//! creating the schema on startup, and seeding the bootstrap administrator.

use crate::config::Config;
use crate::database::models::Role;
use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

pub mod models;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        login TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        is_active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS user_roles (
        user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        role TEXT NOT NULL,
        PRIMARY KEY (user_id, role)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS sessions (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        issued_at TEXT NOT NULL,
        expires_at TEXT NOT NULL,
        remember INTEGER NOT NULL DEFAULT 0,
        revoked INTEGER NOT NULL DEFAULT 0
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_sessions_user_active ON sessions(user_id, revoked)",
];

pub struct Database {
    pub pool: SqlitePool,
}

impl Database {
    /// Initializes the database connection pool.
    pub async fn new(config: &Config) -> Result<Self> {
        let options =
            SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
            .connect_with(options)
            .await?;

        Ok(Database { pool })
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates the schema. Statements are idempotent, so this is safe to run
    /// on every startup.
    pub async fn migrate(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Closes the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database connection pool closed");
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Database {
            pool: self.pool.clone(),
        }
    }
}

/// Seeds the first administrator when the users table is empty.
///
/// Registration is an ADMIN-only endpoint, so without this seed a fresh
/// deployment would have no way to create its first account. Does nothing
/// when users already exist or when the bootstrap credentials are unset.
pub async fn ensure_bootstrap_admin(pool: &SqlitePool, config: &Config) -> Result<()> {
    let (Some(login), Some(password)) = (&config.admin_login, &config.admin_password) else {
        return Ok(());
    };

    let user_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    if user_count > 0 {
        return Ok(());
    }

    let repo = crate::repositories::user_repository::UserRepository::new(pool);
    let password_hash = crate::utils::password::hash_password(password)
        .map_err(|error| anyhow::anyhow!("Bootstrap password hashing failed: {}", error))?;
    let user = repo
        .create_user(login, &password_hash, &[Role::Admin, Role::User])
        .await?;

    info!("Seeded bootstrap administrator '{}'", user.login);
    Ok(())
}
