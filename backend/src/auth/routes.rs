//! Defines the HTTP routes specifically for authentication.
//!
//! Role requirements are declared here, statically, as middleware layers on
//! each route; no handler re-derives who may call it.

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::handlers::*;
use crate::auth::middleware::*;

/// Creates the authentication router with all auth-related routes
pub fn auth_router() -> Router {
    Router::new()
        .route(
            "/register",
            post(register)
                .layer(middleware::from_fn(admin_auth))
                .layer(middleware::from_fn(jwt_auth)),
        )
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout/me", post(logout))
        .route(
            "/logout/{id}",
            post(forced_logout)
                .layer(middleware::from_fn(admin_auth))
                .layer(middleware::from_fn(jwt_auth)),
        )
        .route("/me", get(me).layer(middleware::from_fn(jwt_auth)))
}
