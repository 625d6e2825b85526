//! Main entry point for the TaskHive backend.
//!
//! This file initializes the Axum web server, sets up database connections,
//! and registers all API routes and middleware.
//! It orchestrates the application's startup and defines its overall structure.

use std::sync::Arc;

use backend::build_app;
use backend::config::Config;
use backend::database::{Database, ensure_bootstrap_admin};
use backend::utils::jwt::TokenCodec;
use tracing::info;
use tracing_subscriber::fmt::init;

#[tokio::main]
async fn main() {
    init();

    let config = Config::from_env().unwrap();
    let db = Database::new(&config).await.unwrap();
    db.migrate().await.unwrap();
    ensure_bootstrap_admin(db.pool(), &config).await.unwrap();

    let codec = Arc::new(TokenCodec::new(&config.jwt_secret));
    let pool = db.pool().clone();
    let server_port = config.server_port;

    let app = build_app(pool, codec, Arc::new(config));

    let bind_address = format!("0.0.0.0:{}", server_port);
    let listener = tokio::net::TcpListener::bind(&bind_address).await.unwrap();

    info!("Starting TaskHive server on port {}", server_port);
    axum::serve(listener, app).await.unwrap();
}
