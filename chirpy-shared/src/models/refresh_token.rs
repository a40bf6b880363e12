/// Refresh token model and database operations
///
/// Refresh tokens are opaque, server-side handles that let a client mint new
/// access tokens without re-entering a password. Unlike access tokens they
/// can be revoked, which is why they live in the database.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE refresh_tokens (
///     token TEXT PRIMARY KEY,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     expires_at TIMESTAMPTZ NOT NULL,
///     revoked_at TIMESTAMPTZ
/// );
/// CREATE INDEX idx_refresh_tokens_user_id ON refresh_tokens(user_id);
/// ```
///
/// # Lifecycle
///
/// ```text
/// create ──> Active ──(now >= expires_at)──> Expired
///              │
///              └──(revoke)──> Revoked (terminal, revoked_at never cleared)
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Observable state of a refresh token at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenState {
    /// Usable to mint access tokens
    Active,

    /// Past its expiry, never revoked
    Expired,

    /// Explicitly revoked
    Revoked,
}

/// Persisted refresh token record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct RefreshToken {
    /// Opaque token value (64 hex chars, primary key)
    pub token: String,

    /// Owner of the session
    pub user_id: Uuid,

    /// When the token was issued
    pub created_at: DateTime<Utc>,

    /// When the row last changed (issue or revoke)
    pub updated_at: DateTime<Utc>,

    /// Absolute end of the session
    pub expires_at: DateTime<Utc>,

    /// When the token was revoked, if ever
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshToken {
    /// Returns true if the token has been revoked
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// Returns true if the token can mint a new access token at `now`
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && now < self.expires_at
    }

    /// Classifies the token at `now`
    ///
    /// Revocation wins over expiry.
    pub fn state(&self, now: DateTime<Utc>) -> TokenState {
        if self.is_revoked() {
            TokenState::Revoked
        } else if now >= self.expires_at {
            TokenState::Expired
        } else {
            TokenState::Active
        }
    }

    /// Inserts a new token row
    pub async fn insert(pool: &PgPool, token: &RefreshToken) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (token, user_id, created_at, updated_at, expires_at, revoked_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&token.token)
        .bind(token.user_id)
        .bind(token.created_at)
        .bind(token.updated_at)
        .bind(token.expires_at)
        .bind(token.revoked_at)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Finds a token by exact value
    pub async fn find(pool: &PgPool, token: &str) -> Result<Option<Self>, sqlx::Error> {
        let record = sqlx::query_as::<_, RefreshToken>(
            r#"
            SELECT token, user_id, created_at, updated_at, expires_at, revoked_at
            FROM refresh_tokens
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    /// Sets `revoked_at` unless it is already set
    ///
    /// A single-row UPDATE so concurrent revokes cannot race each other; the
    /// first timestamp written sticks. Returns `None` if the token does not exist.
    pub async fn mark_revoked(
        pool: &PgPool,
        token: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let record = sqlx::query_as::<_, RefreshToken>(
            r#"
            UPDATE refresh_tokens
            SET revoked_at = COALESCE(revoked_at, $2),
                updated_at = CASE WHEN revoked_at IS NULL THEN $2 ELSE updated_at END
            WHERE token = $1
            RETURNING token, user_id, created_at, updated_at, expires_at, revoked_at
            "#,
        )
        .bind(token)
        .bind(at)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    /// Deletes tokens that expired before `before`
    pub async fn delete_expired_before(
        pool: &PgPool,
        before: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at < $1")
            .bind(before)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}
