//! Data structures for authentication-related entities.
//!
//! This module defines the request and response payloads of the auth
//! endpoints. The refresh token never appears in these bodies; it travels
//! in its HTTP-only cookie only.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::database::models::Role;
use crate::utils::jwt::Claims;

/// Login request payload
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 3, max = 64, message = "Login must be between 3-64 characters"))]
    pub login: String,

    #[validate(length(
        min = 6,
        max = 128,
        message = "Password must be between 6-128 characters"
    ))]
    pub password: String,

    /// Selects the long refresh-token lifetime when set.
    #[serde(default)]
    pub remember: bool,
}

/// Registration request payload (administrators only)
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 64, message = "Login must be between 3-64 characters"))]
    pub login: String,

    #[validate(length(
        min = 6,
        max = 128,
        message = "Password must be between 6-128 characters"
    ))]
    pub password: String,

    /// Roles to grant; defaults to `[USER]` when omitted.
    pub roles: Option<Vec<Role>>,
}

/// Login and refresh response: the access token with its lifetime, plus the
/// authenticated user. The matching refresh token is set as a cookie.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub expires_in: u64, // Access token expiration in seconds
    pub user: UserInfo,
}

/// User information as carried by token claims
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: String,
    pub login: String,
    pub roles: Vec<Role>,
}

impl From<&Claims> for UserInfo {
    fn from(claims: &Claims) -> Self {
        UserInfo {
            id: claims.sub.clone(),
            login: claims.login.clone(),
            roles: claims.roles.clone(),
        }
    }
}

/// Response for an administrator's forced logout of another user
#[derive(Debug, Serialize)]
pub struct ForcedLogoutResponse {
    pub user_id: String,
    pub revoked_sessions: u64,
}
