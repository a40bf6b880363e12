/// Refresh token lifecycle
///
/// Refresh tokens are opaque 256-bit random handles stored server-side. They
/// are issued at login, looked up on every refresh, and can be revoked
/// before their natural expiry. Revocation is permanent.
///
/// # Lifecycle
///
/// - **Create**: 32 bytes from the OS RNG, hex-encoded (64 chars), persisted
///   with `expires_at = now + 60 days`
/// - **Lookup**: exact match on the token value
/// - **Revoke**: sets `revoked_at` once; repeating it is a successful no-op
/// - **Purge**: rows that expired longer ago than the retention window are
///   deleted by a background task
///
/// Tokens are not rotated on use. The same token keeps minting access tokens
/// until it expires or is revoked.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use chirpy_shared::auth::refresh::{is_usable, refresh_token_ttl, RefreshTokenStore};
/// use chirpy_shared::store::memory::MemoryStore;
/// use chrono::Utc;
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = RefreshTokenStore::new(Arc::new(MemoryStore::new()));
///
/// let issued = store.create(Uuid::new_v4(), refresh_token_ttl()).await?;
/// assert_eq!(issued.token.len(), 64);
///
/// store.revoke(&issued.token).await?;
/// let record = store.lookup(&issued.token).await?;
/// assert!(!is_usable(&record, Utc::now()));
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, RngCore};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::refresh_token::RefreshToken;
use crate::store::{RefreshTokenRepository, StoreError};

/// Refresh token lifetime in days
pub const REFRESH_TOKEN_TTL_DAYS: i64 = 60;

/// Random bytes per token (256 bits)
const TOKEN_BYTES: usize = 32;

/// Error type for refresh token operations
#[derive(Debug, thiserror::Error)]
pub enum RefreshTokenError {
    /// No record with that token value
    #[error("Refresh token not found")]
    NotFound,

    /// Storage failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Default lifetime for newly issued refresh tokens
pub fn refresh_token_ttl() -> Duration {
    Duration::days(REFRESH_TOKEN_TTL_DAYS)
}

/// Generates a new opaque token value
///
/// 32 bytes from the operating system RNG, lowercase hex encoded.
pub fn generate_refresh_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Short, non-secret prefix of a token for log lines
pub fn token_prefix(token: &str) -> &str {
    token.get(..8).unwrap_or("")
}

/// Returns true if `record` can mint an access token at `now`
pub fn is_usable(record: &RefreshToken, now: DateTime<Utc>) -> bool {
    record.is_usable(now)
}

/// Durable record of refresh tokens
///
/// Cheap to clone; all clones share the same repository.
#[derive(Clone)]
pub struct RefreshTokenStore {
    repo: Arc<dyn RefreshTokenRepository>,
}

impl RefreshTokenStore {
    pub fn new(repo: Arc<dyn RefreshTokenRepository>) -> Self {
        Self { repo }
    }

    /// Issues and persists a new token for `user_id`
    pub async fn create(&self, user_id: Uuid, ttl: Duration) -> Result<RefreshToken, RefreshTokenError> {
        let now = Utc::now();
        let record = RefreshToken {
            token: generate_refresh_token(),
            user_id,
            created_at: now,
            updated_at: now,
            expires_at: now + ttl,
            revoked_at: None,
        };

        self.repo.insert(&record).await?;

        debug!(
            user_id = %user_id,
            token_prefix = token_prefix(&record.token),
            expires_at = %record.expires_at,
            "Issued refresh token"
        );

        Ok(record)
    }

    /// Exact-match lookup by token value
    pub async fn lookup(&self, token: &str) -> Result<RefreshToken, RefreshTokenError> {
        self.repo
            .find(token)
            .await?
            .ok_or(RefreshTokenError::NotFound)
    }

    /// Revokes a token, keeping the original `revoked_at` if already revoked
    pub async fn revoke(&self, token: &str) -> Result<RefreshToken, RefreshTokenError> {
        let record = self
            .repo
            .mark_revoked(token, Utc::now())
            .await?
            .ok_or(RefreshTokenError::NotFound)?;

        info!(
            user_id = %record.user_id,
            token_prefix = token_prefix(token),
            "Refresh token revoked"
        );

        Ok(record)
    }

    /// Deletes tokens that expired more than `retention` ago
    ///
    /// A retention reaching past the earliest representable time purges nothing.
    pub async fn purge_expired(&self, retention: Duration) -> Result<u64, RefreshTokenError> {
        let Some(cutoff) = Utc::now().checked_sub_signed(retention) else {
            warn!(retention_days = retention.num_days(), "Purge retention out of range, skipping");
            return Ok(0);
        };
        let purged = self.repo.purge_expired(cutoff).await?;

        if purged > 0 {
            info!(purged, cutoff = %cutoff, "Purged expired refresh tokens");
        }

        Ok(purged)
    }
}

/// Spawns a background task that purges long-expired tokens every `every`
///
/// Failures are logged and retried on the next tick. Abort the returned
/// handle to stop the task.
pub fn spawn_purge_task(
    store: RefreshTokenStore,
    every: std::time::Duration,
    retention: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);

        loop {
            ticker.tick().await;

            if let Err(e) = store.purge_expired(retention).await {
                warn!(error = %e, "Refresh token purge failed");
            }
        }
    })
}
