//! Database repository for user management operations.
//!
//! Provides persistence for users and their role assignments.

use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;
use std::str::FromStr;
use uuid::Uuid;

use crate::database::models::{Role, User};

/// Repository for user database operations.
///
/// Handles all persistence for the User entity together with the
/// `user_roles` join table.
pub struct UserRepository<'a> {
    /// Shared SQLite connection pool
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Creates a new UserRepository instance.
    ///
    /// # Arguments
    /// * `pool` - Reference to SQLite connection pool
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates a new user together with its role assignments.
    ///
    /// # Arguments
    /// * `login` - Unique login name
    /// * `password_hash` - argon2 PHC string, hashed by the caller
    /// * `roles` - Roles to grant; the service guarantees at least one
    ///
    /// # Returns
    /// The newly created User with all fields populated
    pub async fn create_user(
        &self,
        login: &str,
        password_hash: &str,
        roles: &[Role],
    ) -> Result<User> {
        let now = Utc::now();
        let user = User {
            id: Uuid::now_v7().to_string(),
            login: login.to_string(),
            password_hash: password_hash.to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO users (id, login, password_hash, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.login)
        .bind(&user.password_hash)
        .bind(user.is_active)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&mut *tx)
        .await?;

        for role in roles {
            sqlx::query("INSERT OR IGNORE INTO user_roles (user_id, role) VALUES (?, ?)")
                .bind(&user.id)
                .bind(role.to_string())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(user)
    }

    /// Retrieves a user by their unique identifier.
    ///
    /// # Arguments
    /// * `id` - User ID (UUID format)
    ///
    /// # Returns
    /// `Some(User)` if found, `None` otherwise
    pub async fn get_user_by_id(&self, id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, login, password_hash, is_active, created_at, updated_at
            FROM users WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Retrieves a user by their login.
    ///
    /// # Arguments
    /// * `login` - Login to search for
    ///
    /// # Returns
    /// `Some(User)` if found, `None` otherwise
    pub async fn get_user_by_login(&self, login: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, login, password_hash, is_active, created_at, updated_at
            FROM users WHERE login = ?
            "#,
        )
        .bind(login)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Checks if a login already exists in the system.
    pub async fn login_exists(&self, login: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE login = ?")
            .bind(login)
            .fetch_one(self.pool)
            .await?;

        Ok(count > 0)
    }

    /// Checks if a login exists excluding a specific user.
    ///
    /// # Arguments
    /// * `login` - Login to check
    /// * `exclude_user_id` - User ID to exclude from the check
    ///
    /// # Returns
    /// `true` if another user with this login exists
    pub async fn login_exists_excluding(
        &self,
        login: &str,
        exclude_user_id: &str,
    ) -> Result<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE login = ? AND id != ?")
                .bind(login)
                .bind(exclude_user_id)
                .fetch_one(self.pool)
                .await?;

        Ok(count > 0)
    }

    /// Loads the roles assigned to a user, in stable order.
    pub async fn get_roles(&self, user_id: &str) -> Result<Vec<Role>> {
        let rows: Vec<String> =
            sqlx::query_scalar("SELECT role FROM user_roles WHERE user_id = ? ORDER BY role")
                .bind(user_id)
                .fetch_all(self.pool)
                .await?;

        rows.into_iter()
            .map(|value| Role::from_str(&value).map_err(anyhow::Error::msg))
            .collect()
    }

    /// Adds and removes role assignments in one transaction.
    ///
    /// The caller is responsible for ensuring the resulting set stays
    /// non-empty.
    pub async fn update_roles(
        &self,
        user_id: &str,
        add: &[Role],
        remove: &[Role],
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for role in add {
            sqlx::query("INSERT OR IGNORE INTO user_roles (user_id, role) VALUES (?, ?)")
                .bind(user_id)
                .bind(role.to_string())
                .execute(&mut *tx)
                .await?;
        }
        for role in remove {
            sqlx::query("DELETE FROM user_roles WHERE user_id = ? AND role = ?")
                .bind(user_id)
                .bind(role.to_string())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Updates a user's login.
    pub async fn update_login(&self, user_id: &str, login: &str) -> Result<()> {
        sqlx::query("UPDATE users SET login = ?, updated_at = ? WHERE id = ?")
            .bind(login)
            .bind(Utc::now())
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Replaces a user's password hash.
    pub async fn update_password_hash(&self, user_id: &str, password_hash: &str) -> Result<()> {
        sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
            .bind(password_hash)
            .bind(Utc::now())
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Sets the active flag, blocking or unblocking the account.
    pub async fn set_active(&self, user_id: &str, is_active: bool) -> Result<()> {
        sqlx::query("UPDATE users SET is_active = ?, updated_at = ? WHERE id = ?")
            .bind(is_active)
            .bind(Utc::now())
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(())
    }
}
