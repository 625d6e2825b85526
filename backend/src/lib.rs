//! TaskHive backend library.
//!
//! Exposes the application modules and the router assembly so the binary
//! and the integration tests run the exact same app.

pub mod api;
pub mod auth;
pub mod config;
pub mod database;
pub mod errors;
pub mod repositories;
pub mod services;
pub mod utils;

use std::sync::Arc;

use axum::{Extension, Router, response::Json, routing::get};
use sqlx::SqlitePool;
use tower::ServiceBuilder;

use crate::api::common::ApiResponse;
use crate::config::Config;
use crate::utils::jwt::TokenCodec;

/// Assembles the full application router with its shared state attached.
///
/// The pool, token codec, and config are injected as extensions at the
/// router level so that route middleware and handlers see the same
/// instances.
pub fn build_app(pool: SqlitePool, codec: Arc<TokenCodec>, config: Arc<Config>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .nest("/auth", auth::routes::auth_router())
        .nest("/users", api::user::routes::user_router())
        .layer(
            ServiceBuilder::new()
                .layer(Extension(pool))
                .layer(Extension(codec))
                .layer(Extension(config)),
        )
}

async fn root_handler() -> Json<ApiResponse<serde_json::Value>> {
    Json(ApiResponse::success(
        serde_json::json!({
            "service": "TaskHive Backend",
            "version": "0.1.0"
        }),
        "Welcome to TaskHive API",
    ))
}
