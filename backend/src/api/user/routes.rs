//! Defines the HTTP routes for user account management.
//!
//! These routes cover the mutable account fields the auth core owns:
//! login, password, blocked state, and role assignments.

use super::handlers::{change_password, change_roles, rename_user, toggle_blocked};
use crate::auth::middleware::{admin_auth, jwt_auth};
use axum::{Router, middleware, routing::patch};

pub fn user_router() -> Router {
    Router::new()
        .route(
            "/{id}/login",
            patch(rename_user).layer(middleware::from_fn(jwt_auth)),
        )
        .route(
            "/{id}/password",
            patch(change_password).layer(middleware::from_fn(jwt_auth)),
        )
        .route(
            "/{id}/blocked",
            patch(toggle_blocked)
                .layer(middleware::from_fn(admin_auth))
                .layer(middleware::from_fn(jwt_auth)),
        )
        .route(
            "/{id}/roles",
            patch(change_roles)
                .layer(middleware::from_fn(admin_auth))
                .layer(middleware::from_fn(jwt_auth)),
        )
}
