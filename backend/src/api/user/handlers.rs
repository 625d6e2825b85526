//! Handler functions for user directory API endpoints.
//!
//! These endpoints mutate the account fields the auth core owns: login,
//! password, blocked state, and role assignments. Rename and password
//! change are allowed for the user themselves or an administrator; the
//! blocked flag and roles are administrator-only (enforced by the router).

use axum::{
    extract::{Extension, Json, OriginalUri, Path},
    http::StatusCode,
};
use sqlx::SqlitePool;

use crate::api::common::{ApiResponse, service_error_to_http};
use crate::auth::guard;
use crate::database::models::{
    ChangePasswordRequest, ChangeRolesRequest, RenameUserRequest, UserProfile,
};
use crate::services::user_service::UserService;
use crate::utils::jwt::Claims;

/// Changes a user's login. Self or admin.
#[axum::debug_handler]
pub async fn rename_user(
    Extension(claims): Extension<Claims>,
    Extension(pool): Extension<SqlitePool>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<String>,
    Json(payload): Json<RenameUserRequest>,
) -> Result<Json<ApiResponse<UserProfile>>, (StatusCode, String)> {
    guard::check_self_or_admin(&claims, &id)
        .map_err(|error| service_error_to_http(error, uri.path()))?;

    let user_service = UserService::new(&pool);
    match user_service.rename(&id, payload).await {
        Ok(profile) => Ok(Json(ApiResponse::success(profile, "Login updated"))),
        Err(error) => Err(service_error_to_http(error, uri.path())),
    }
}

/// Changes a user's password. Self or admin; the current password is
/// always verified.
#[axum::debug_handler]
pub async fn change_password(
    Extension(claims): Extension<Claims>,
    Extension(pool): Extension<SqlitePool>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<String>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<()>>, (StatusCode, String)> {
    guard::check_self_or_admin(&claims, &id)
        .map_err(|error| service_error_to_http(error, uri.path()))?;

    let user_service = UserService::new(&pool);
    match user_service.change_password(&id, payload).await {
        Ok(()) => Ok(Json(ApiResponse::message("Password updated"))),
        Err(error) => Err(service_error_to_http(error, uri.path())),
    }
}

/// Toggles the blocked flag on a user account. Admin only.
#[axum::debug_handler]
pub async fn toggle_blocked(
    Extension(pool): Extension<SqlitePool>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<UserProfile>>, (StatusCode, String)> {
    let user_service = UserService::new(&pool);
    match user_service.toggle_blocked(&id).await {
        Ok(profile) => {
            let message = if profile.is_active {
                "User unblocked"
            } else {
                "User blocked"
            };
            Ok(Json(ApiResponse::success(profile, message)))
        }
        Err(error) => Err(service_error_to_http(error, uri.path())),
    }
}

/// Adds and removes roles on a user account. Admin only.
#[axum::debug_handler]
pub async fn change_roles(
    Extension(pool): Extension<SqlitePool>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<String>,
    Json(payload): Json<ChangeRolesRequest>,
) -> Result<Json<ApiResponse<UserProfile>>, (StatusCode, String)> {
    let user_service = UserService::new(&pool);
    match user_service.change_roles(&id, payload).await {
        Ok(profile) => Ok(Json(ApiResponse::success(profile, "Roles updated"))),
        Err(error) => Err(service_error_to_http(error, uri.path())),
    }
}
