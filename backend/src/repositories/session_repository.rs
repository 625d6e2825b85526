//! Database repository for refresh-token sessions.
//!
//! Sessions enforce the single-active-session policy: login replaces all of
//! a user's active rows, refresh rotates exactly one. Revocation is one-way
//! and idempotent.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use crate::database::models::Session;

/// Repository for session database operations.
pub struct SessionRepository<'a> {
    /// Shared SQLite connection pool
    pool: &'a SqlitePool,
}

impl<'a> SessionRepository<'a> {
    /// Creates a new SessionRepository instance.
    ///
    /// # Arguments
    /// * `pool` - Reference to SQLite connection pool
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates a session row inside an open transaction.
    async fn insert(
        tx: &mut Transaction<'_, Sqlite>,
        user_id: &str,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
        remember: bool,
    ) -> Result<Session> {
        let session = Session {
            id: Uuid::now_v7().to_string(),
            user_id: user_id.to_string(),
            issued_at,
            expires_at,
            remember,
            revoked: false,
        };

        sqlx::query(
            r#"
            INSERT INTO sessions (id, user_id, issued_at, expires_at, remember, revoked)
            VALUES (?, ?, ?, ?, ?, 0)
            "#,
        )
        .bind(&session.id)
        .bind(&session.user_id)
        .bind(session.issued_at)
        .bind(session.expires_at)
        .bind(session.remember)
        .execute(&mut **tx)
        .await?;

        Ok(session)
    }

    /// Retrieves a session by id, but only while it has not been revoked.
    ///
    /// # Returns
    /// `Some(Session)` for an active session, `None` when the row is absent
    /// or already revoked
    pub async fn find_active(&self, session_id: &str) -> Result<Option<Session>> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            SELECT id, user_id, issued_at, expires_at, remember, revoked
            FROM sessions WHERE id = ? AND revoked = 0
            "#,
        )
        .bind(session_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(session)
    }

    /// Revokes a single session. Idempotent: revoking an absent or already
    /// revoked session is a no-op.
    pub async fn revoke(&self, session_id: &str) -> Result<()> {
        sqlx::query("UPDATE sessions SET revoked = 1 WHERE id = ?")
            .bind(session_id)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Revokes every active session a user holds.
    ///
    /// # Returns
    /// The number of sessions that were actually revoked
    pub async fn revoke_all_for_user(&self, user_id: &str) -> Result<u64> {
        let result = sqlx::query("UPDATE sessions SET revoked = 1 WHERE user_id = ? AND revoked = 0")
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Atomically revokes all of a user's active sessions and creates the
    /// replacement. This is the login path: whatever happens concurrently,
    /// at most one session per user survives.
    pub async fn replace_for_user(
        &self,
        user_id: &str,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
        remember: bool,
    ) -> Result<Session> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE sessions SET revoked = 1 WHERE user_id = ? AND revoked = 0")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let session = Self::insert(&mut tx, user_id, issued_at, expires_at, remember).await?;

        tx.commit().await?;
        Ok(session)
    }

    /// Rotates a session: revokes the old row and creates its successor in
    /// one transaction.
    ///
    /// The revocation is conditional on the old row still being active, so
    /// of two concurrent rotations of the same session exactly one gets the
    /// successor and the other observes `None`.
    ///
    /// # Returns
    /// `Some(Session)` with the successor, or `None` when the old session
    /// was already revoked
    pub async fn rotate(
        &self,
        old_session_id: &str,
        user_id: &str,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
        remember: bool,
    ) -> Result<Option<Session>> {
        let mut tx = self.pool.begin().await?;

        let revoked = sqlx::query("UPDATE sessions SET revoked = 1 WHERE id = ? AND revoked = 0")
            .bind(old_session_id)
            .execute(&mut *tx)
            .await?;

        if revoked.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let session = Self::insert(&mut tx, user_id, issued_at, expires_at, remember).await?;

        tx.commit().await?;
        Ok(Some(session))
    }

    /// Counts a user's active sessions.
    pub async fn count_active_for_user(&self, user_id: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sessions WHERE user_id = ? AND revoked = 0",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }
}
