//! Rust structs that represent database table mappings.
//!
//! These models define the structure of data as it is stored in and retrieved
//! from the database. Note that these may differ from API-specific models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// An authenticated subject of the system.
///
/// `password_hash` holds an argon2 PHC string and is never serialized into
/// API responses. Roles live in the `user_roles` join table and are loaded
/// separately.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: String,
    pub login: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A refresh-token session bound to one user.
///
/// `revoked` only ever transitions from `false` to `true`. The row id is an
/// opaque UUID embedded in the refresh token's claims; the signed token
/// string itself is never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Which refresh-lifetime family this session uses; preserved on rotation.
    pub remember: bool,
    pub revoked: bool,
}

/// Closed set of roles a user can hold. Stored as TEXT in SQLite.
///
/// There is no hierarchy: an administrator who should also pass USER-gated
/// checks holds both roles.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    User,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "ADMIN"),
            Role::User => write!(f, "USER"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Role::Admin),
            "USER" => Ok(Role::User),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUser {
    #[validate(length(min = 3, max = 64, message = "Login must be between 3-64 characters"))]
    pub login: String,

    #[validate(length(
        min = 6,
        max = 128,
        message = "Password must be between 6-128 characters"
    ))]
    pub password: String,

    /// Roles granted at creation; must not be empty.
    pub roles: Vec<Role>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RenameUserRequest {
    #[validate(length(min = 3, max = 64, message = "Login must be between 3-64 characters"))]
    pub login: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,

    #[validate(length(
        min = 6,
        max = 128,
        message = "New password must be between 6-128 characters"
    ))]
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChangeRolesRequest {
    #[serde(default)]
    pub add_roles: Vec<Role>,
    #[serde(default)]
    pub remove_roles: Vec<Role>,
}

// View models for API responses (with joined data)

/// A user as exposed by the directory endpoints, roles included and the
/// password hash left out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub login: String,
    pub roles: Vec<Role>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn from_parts(user: User, roles: Vec<Role>) -> Self {
        Self {
            id: user.id,
            login: user.login,
            roles,
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_role_text_roundtrip() {
        for role in [Role::Admin, Role::User] {
            let parsed = Role::from_str(&role.to_string()).unwrap();
            assert_eq!(parsed, role);
        }
        assert!(Role::from_str("MANAGER").is_err());
    }

    #[test]
    fn test_role_json_uses_screaming_case() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"ADMIN\"");
        assert_eq!(
            serde_json::from_str::<Role>("\"USER\"").unwrap(),
            Role::User
        );
    }

    #[test]
    fn test_user_serialization_hides_password_hash() {
        let user = User {
            id: "u1".to_string(),
            login: "alice".to_string(),
            password_hash: "$argon2id$v=19$secret".to_string(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("argon2id"));
    }
}
