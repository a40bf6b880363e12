/// Persistence seams for the auth core
///
/// The session manager and the HTTP handlers never talk to a database
/// directly. They go through these traits, which have two implementations:
///
/// - [`postgres::PgStore`]: sqlx/Postgres, the production backend
/// - [`memory::MemoryStore`]: in-process maps, used for development without a
///   database and throughout the test suites
///
/// Both implementations guarantee single-row atomicity for the refresh-token
/// operations: concurrent `mark_revoked` calls on one token all succeed and
/// leave the first `revoked_at` in place.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use chirpy_shared::store::{memory::MemoryStore, UserStore};
/// use chirpy_shared::models::user::CreateUser;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = Arc::new(MemoryStore::new());
/// let users: Arc<dyn UserStore> = store.clone();
///
/// let user = users.create(CreateUser {
///     email: "alice@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
/// }).await?;
/// assert!(users.find_by_email("alice@example.com").await?.is_some());
/// # let _ = user;
/// # Ok(())
/// # }
/// ```

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{
    chirp::{Chirp, ChirpQuery, CreateChirp},
    refresh_token::RefreshToken,
    user::{CreateUser, User},
};

/// Error type for persistence operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint was violated (e.g. duplicate email)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistence result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// Credential persistence collaborator
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Creates a user; fails with `Conflict` if the email is taken
    async fn create(&self, data: CreateUser) -> StoreResult<User>;

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Replaces email and password hash; `None` if the user does not exist
    async fn update_credentials(
        &self,
        id: Uuid,
        email: &str,
        password_hash: &str,
    ) -> StoreResult<Option<User>>;

    /// Sets the Chirpy Red flag; `false` if the user does not exist
    async fn upgrade_to_red(&self, id: Uuid) -> StoreResult<bool>;

    /// Deletes all users together with their chirps and refresh tokens
    async fn reset(&self) -> StoreResult<u64>;

    /// Connectivity check for health endpoints
    async fn ping(&self) -> StoreResult<()>;
}

/// Chirp persistence
#[async_trait]
pub trait ChirpStore: Send + Sync {
    async fn create(&self, data: CreateChirp) -> StoreResult<Chirp>;

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Chirp>>;

    async fn list(&self, query: ChirpQuery) -> StoreResult<Vec<Chirp>>;

    /// Returns `true` if a chirp was removed
    async fn delete(&self, id: Uuid) -> StoreResult<bool>;
}

/// Refresh-token persistence collaborator
///
/// Keyed by `token`; implementations should index `user_id` as well.
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// Persists a new record; fails with `Conflict` on a duplicate token
    async fn insert(&self, token: &RefreshToken) -> StoreResult<()>;

    async fn find(&self, token: &str) -> StoreResult<Option<RefreshToken>>;

    /// Sets `revoked_at = at` unless already revoked, returning the stored row
    async fn mark_revoked(&self, token: &str, at: DateTime<Utc>) -> StoreResult<Option<RefreshToken>>;

    /// Deletes records whose `expires_at` is before `before`
    async fn purge_expired(&self, before: DateTime<Utc>) -> StoreResult<u64>;
}
