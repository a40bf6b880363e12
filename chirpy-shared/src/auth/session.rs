/// Session orchestration
///
/// Ties password verification, access token issuance and the refresh token
/// store together into the three session operations clients see:
///
/// ```text
/// Unauthenticated ──login──> Authenticated ──refresh──> Refreshed (repeatable)
///                                   │                        │
///                                   └─────────revoke─────────┴──> Revoked (terminal)
/// ```
///
/// - **Login**: email + password in, 1-hour access token + 60-day refresh
///   token out. Unknown email and wrong password produce the same error and
///   take comparable time.
/// - **Refresh**: a usable refresh token mints a new access token. The
///   refresh token is not rotated.
/// - **Revoke**: permanently disables a refresh token. Access tokens already
///   issued from it stay valid until they expire.
///
/// Argon2 work runs on the blocking thread pool so it never stalls the
/// async executor.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use chirpy_shared::auth::session::SessionManager;
/// use chirpy_shared::store::memory::MemoryStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = Arc::new(MemoryStore::new());
/// let sessions = SessionManager::new(store.clone(), store, "your-secret-key-at-least-32-bytes-long");
///
/// sessions.register("alice@example.com", "secret123").await?;
/// let session = sessions.login("alice@example.com", "secret123", None).await?;
///
/// let grant = sessions.refresh(&session.refresh_token.token).await?;
/// assert_eq!(grant.user_id, session.user.id);
///
/// sessions.revoke(&session.refresh_token.token).await?;
/// assert!(sessions.refresh(&session.refresh_token.token).await.is_err());
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::jwt::{self, clamp_access_ttl, AccessClaims, JwtError, VerifiedAccessToken, ACCESS_TOKEN_TTL_SECS};
use super::password::{hash_password, verify_password, PasswordError};
use super::refresh::{refresh_token_ttl, token_prefix, RefreshTokenError, RefreshTokenStore};
use crate::models::refresh_token::RefreshToken;
use crate::models::user::{CreateUser, User, UserProfile};
use crate::store::{RefreshTokenRepository, StoreError, UserStore};

/// Plaintext hashed once to give unknown-email logins a real digest to check
const TIMING_DUMMY_PASSWORD: &str = "chirpy-timing-equalizer";

/// Error type for session operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Unknown email or wrong password; deliberately indistinguishable
    #[error("Incorrect email or password")]
    InvalidCredentials,

    /// Refresh token missing, revoked, or expired
    #[error("Unauthorized")]
    Unauthorized,

    /// The authenticated user no longer exists
    #[error("User not found")]
    UnknownUser,

    /// Password hashing failed or a stored digest is corrupt
    #[error(transparent)]
    Hashing(#[from] PasswordError),

    /// Access token could not be signed
    #[error(transparent)]
    Token(#[from] JwtError),

    /// Storage failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<RefreshTokenError> for SessionError {
    fn from(err: RefreshTokenError) -> Self {
        match err {
            RefreshTokenError::NotFound => SessionError::Unauthorized,
            RefreshTokenError::Store(e) => SessionError::Store(e),
        }
    }
}

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct Session {
    pub user: UserProfile,
    pub access_token: String,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_token: RefreshToken,
}

/// Result of a successful refresh
#[derive(Debug, Clone)]
pub struct AccessGrant {
    pub user_id: Uuid,
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

/// Orchestrates login, refresh and revoke
pub struct SessionManager {
    users: Arc<dyn UserStore>,
    refresh_tokens: RefreshTokenStore,
    jwt_secret: String,
    refresh_ttl: Duration,
    timing_dummy_hash: OnceCell<String>,
}

impl SessionManager {
    pub fn new(
        users: Arc<dyn UserStore>,
        refresh_repo: Arc<dyn RefreshTokenRepository>,
        jwt_secret: impl Into<String>,
    ) -> Self {
        Self {
            users,
            refresh_tokens: RefreshTokenStore::new(refresh_repo),
            jwt_secret: jwt_secret.into(),
            refresh_ttl: refresh_token_ttl(),
            timing_dummy_hash: OnceCell::new(),
        }
    }

    /// Overrides the refresh token lifetime (default 60 days)
    pub fn with_refresh_ttl(mut self, ttl: Duration) -> Self {
        self.refresh_ttl = ttl;
        self
    }

    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    pub fn refresh_tokens(&self) -> &RefreshTokenStore {
        &self.refresh_tokens
    }

    /// Creates a user with a freshly hashed password
    ///
    /// # Errors
    ///
    /// `Store(Conflict)` if the email is already registered
    pub async fn register(&self, email: &str, password: &str) -> Result<User, SessionError> {
        let password_hash = hash_blocking(password.to_string()).await?;

        let user = self
            .users
            .create(CreateUser {
                email: email.to_string(),
                password_hash,
            })
            .await?;

        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Replaces a user's email and password
    ///
    /// `UnknownUser` if the user no longer exists.
    pub async fn change_credentials(
        &self,
        user_id: Uuid,
        email: &str,
        password: &str,
    ) -> Result<User, SessionError> {
        let password_hash = hash_blocking(password.to_string()).await?;

        let user = self
            .users
            .update_credentials(user_id, email, &password_hash)
            .await?
            .ok_or(SessionError::UnknownUser)?;

        info!(user_id = %user.id, "User credentials updated");
        Ok(user)
    }

    /// Verifies a password and opens a session
    ///
    /// `requested_ttl` is advisory; it can shorten the access token lifetime
    /// but never extend it past one hour.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        requested_ttl: Option<Duration>,
    ) -> Result<Session, SessionError> {
        let user = match self.users.find_by_email(email).await? {
            Some(user) => user,
            None => {
                // Burn the same Argon2 cost as a real check
                let dummy = self
                    .timing_dummy_hash
                    .get_or_try_init(|| hash_blocking(TIMING_DUMMY_PASSWORD.to_string()))
                    .await?;
                let _ = verify_blocking(password.to_string(), dummy.clone()).await;

                debug!("Login rejected");
                return Err(SessionError::InvalidCredentials);
            }
        };

        if !verify_blocking(password.to_string(), user.password_hash.clone()).await? {
            debug!("Login rejected");
            return Err(SessionError::InvalidCredentials);
        }

        let ttl = clamp_access_ttl(requested_ttl);
        let claims = AccessClaims::new(user.id, ttl);
        let access_token = jwt::create_token(&claims, &self.jwt_secret)?;
        let refresh_token = self.refresh_tokens.create(user.id, self.refresh_ttl).await?;

        info!(user_id = %user.id, access_ttl_secs = ttl.num_seconds(), "User logged in");

        Ok(Session {
            user: user.profile(),
            access_token,
            access_expires_at: claims.expires_at()?,
            refresh_token,
        })
    }

    /// Resolves a refresh token to its record if it is currently usable
    ///
    /// Not found, revoked and expired all produce `Unauthorized`.
    pub async fn resolve_refresh_token(&self, token: &str) -> Result<RefreshToken, SessionError> {
        let record = self.refresh_tokens.lookup(token).await?;

        if !record.is_usable(Utc::now()) {
            debug!(
                token_prefix = token_prefix(token),
                state = ?record.state(Utc::now()),
                "Refresh token not usable"
            );
            return Err(SessionError::Unauthorized);
        }

        Ok(record)
    }

    /// Mints a new 1-hour access token from a usable refresh token
    pub async fn refresh(&self, token: &str) -> Result<AccessGrant, SessionError> {
        let record = self.resolve_refresh_token(token).await?;

        let claims = AccessClaims::new(record.user_id, Duration::seconds(ACCESS_TOKEN_TTL_SECS));
        let access_token = jwt::create_token(&claims, &self.jwt_secret)?;

        debug!(user_id = %record.user_id, "Access token refreshed");

        Ok(AccessGrant {
            user_id: record.user_id,
            access_token,
            expires_at: claims.expires_at()?,
        })
    }

    /// Revokes a refresh token; revoking twice is fine
    ///
    /// `Unauthorized` if the token does not exist.
    pub async fn revoke(&self, token: &str) -> Result<(), SessionError> {
        self.refresh_tokens.revoke(token).await?;
        Ok(())
    }

    /// Validates an access token with this manager's secret
    pub fn verify_access_token(&self, token: &str) -> Result<VerifiedAccessToken, JwtError> {
        jwt::verify_access_token(token, &self.jwt_secret)
    }
}

async fn hash_blocking(password: String) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| {
            warn!(error = %e, "Password hashing task failed");
            PasswordError::HashError("Hashing task did not complete".to_string())
        })?
}

async fn verify_blocking(password: String, hash: String) -> Result<bool, PasswordError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| {
            warn!(error = %e, "Password verification task failed");
            PasswordError::HashError("Verification task did not complete".to_string())
        })?
}
