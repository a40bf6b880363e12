//! Postgres implementation of the store traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{ChirpStore, RefreshTokenRepository, StoreError, StoreResult, UserStore};
use crate::models::{
    chirp::{Chirp, ChirpQuery, CreateChirp},
    refresh_token::RefreshToken,
    user::{CreateUser, User},
};

/// All stores backed by one connection pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Maps unique-constraint violations to `StoreError::Conflict`
fn map_unique(err: sqlx::Error, what: &str) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            StoreError::Conflict(format!("{} already exists", what))
        }
        other => StoreError::Database(other),
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create(&self, data: CreateUser) -> StoreResult<User> {
        User::create(&self.pool, data)
            .await
            .map_err(|e| map_unique(e, "Email"))
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn update_credentials(
        &self,
        id: Uuid,
        email: &str,
        password_hash: &str,
    ) -> StoreResult<Option<User>> {
        User::update_credentials(&self.pool, id, email, password_hash)
            .await
            .map_err(|e| map_unique(e, "Email"))
    }

    async fn upgrade_to_red(&self, id: Uuid) -> StoreResult<bool> {
        Ok(User::upgrade_to_red(&self.pool, id).await?)
    }

    async fn reset(&self) -> StoreResult<u64> {
        Ok(User::delete_all(&self.pool).await?)
    }

    async fn ping(&self) -> StoreResult<()> {
        crate::db::pool::health_check(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl ChirpStore for PgStore {
    async fn create(&self, data: CreateChirp) -> StoreResult<Chirp> {
        Ok(Chirp::create(&self.pool, data).await?)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Chirp>> {
        Ok(Chirp::find_by_id(&self.pool, id).await?)
    }

    async fn list(&self, query: ChirpQuery) -> StoreResult<Vec<Chirp>> {
        Ok(Chirp::list(&self.pool, query).await?)
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        Ok(Chirp::delete(&self.pool, id).await?)
    }
}

#[async_trait]
impl RefreshTokenRepository for PgStore {
    async fn insert(&self, token: &RefreshToken) -> StoreResult<()> {
        RefreshToken::insert(&self.pool, token)
            .await
            .map_err(|e| map_unique(e, "Refresh token"))
    }

    async fn find(&self, token: &str) -> StoreResult<Option<RefreshToken>> {
        Ok(RefreshToken::find(&self.pool, token).await?)
    }

    async fn mark_revoked(&self, token: &str, at: DateTime<Utc>) -> StoreResult<Option<RefreshToken>> {
        Ok(RefreshToken::mark_revoked(&self.pool, token, at).await?)
    }

    async fn purge_expired(&self, before: DateTime<Utc>) -> StoreResult<u64> {
        Ok(RefreshToken::delete_expired_before(&self.pool, before).await?)
    }
}
