//! Central module for application-wide configuration settings.
//!
//! This module handles loading and managing configuration parameters such as
//! the database URL, server port, token lifetimes, and refresh-cookie options.

use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
    pub server_port: u16,
    pub jwt_secret: String,
    /// Lifetime of access tokens, in seconds.
    pub access_token_ttl_seconds: u64,
    /// Lifetime of refresh tokens for ordinary logins, in seconds.
    pub refresh_token_ttl_seconds: u64,
    /// Lifetime of refresh tokens for "remember me" logins, in seconds.
    pub refresh_token_ttl_long_seconds: u64,
    /// Domain attribute for the refresh cookie, omitted when unset.
    pub cookie_domain: Option<String>,
    /// Whether the refresh cookie carries the `Secure` attribute.
    pub cookie_secure: bool,
    /// Credentials for the bootstrap administrator, seeded on first start.
    pub admin_login: Option<String>,
    pub admin_password: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL not set")?;

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()
            .context("DB_MAX_CONNECTIONS must be a valid number")?;

        let acquire_timeout_seconds = env::var("DB_ACQUIRE_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "3".to_string())
            .parse::<u64>()
            .context("DB_ACQUIRE_TIMEOUT_SECONDS must be a valid number")?;

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .context("SERVER_PORT must be a valid number")?;

        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET not set")?;

        let access_token_ttl_seconds = env::var("JWT_ACCESS_TOKEN_TTL_SECONDS")
            .unwrap_or_else(|_| "900".to_string())
            .parse::<u64>()
            .context("JWT_ACCESS_TOKEN_TTL_SECONDS must be a valid number")?;

        let refresh_token_ttl_seconds = env::var("JWT_REFRESH_TOKEN_TTL_SECONDS")
            .unwrap_or_else(|_| "86400".to_string())
            .parse::<u64>()
            .context("JWT_REFRESH_TOKEN_TTL_SECONDS must be a valid number")?;

        let refresh_token_ttl_long_seconds = env::var("JWT_REFRESH_TOKEN_TTL_LONG_SECONDS")
            .unwrap_or_else(|_| "2592000".to_string())
            .parse::<u64>()
            .context("JWT_REFRESH_TOKEN_TTL_LONG_SECONDS must be a valid number")?;

        let cookie_domain = env::var("COOKIE_DOMAIN").ok().filter(|d| !d.is_empty());

        let cookie_secure = env::var("COOKIE_SECURE")
            .unwrap_or_else(|_| "false".to_string())
            .parse::<bool>()
            .context("COOKIE_SECURE must be true or false")?;

        let admin_login = env::var("ADMIN_LOGIN").ok().filter(|l| !l.is_empty());
        let admin_password = env::var("ADMIN_PASSWORD").ok().filter(|p| !p.is_empty());

        Ok(Config {
            database_url,
            max_connections,
            acquire_timeout_seconds,
            server_port,
            jwt_secret,
            access_token_ttl_seconds,
            refresh_token_ttl_seconds,
            refresh_token_ttl_long_seconds,
            cookie_domain,
            cookie_secure,
            admin_login,
            admin_password,
        })
    }

    /// Selects the refresh-token lifetime for a login, honouring "remember me".
    pub fn refresh_ttl_seconds(&self, remember: bool) -> u64 {
        if remember {
            self.refresh_token_ttl_long_seconds
        } else {
            self.refresh_token_ttl_seconds
        }
    }
}
