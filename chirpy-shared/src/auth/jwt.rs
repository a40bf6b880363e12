/// Access token issuance and validation
///
/// Access tokens are stateless, HMAC-signed JWTs carrying the caller's user
/// ID. Validating one never touches storage, so every authenticated request
/// can be checked with a single signature verification.
///
/// # Security
///
/// - **Algorithm**: HS256 for issuance; HS384/HS512 are also accepted on
///   validation. Anything outside the HMAC family (including `none` and the
///   RSA/EC algorithms) is rejected before the signature is looked at.
/// - **Lifetime**: 1 hour. Client-supplied lifetimes are clamped to that cap.
/// - **Issuer**: always `"chirpy"`
/// - **Revocation**: none; a valid token is honoured until it expires.
///   Rotating the signing secret invalidates every outstanding token.
///
/// # Example
///
/// ```
/// use chirpy_shared::auth::jwt::{issue_access_token, validate_access_token, ACCESS_TOKEN_TTL_SECS};
/// use chrono::Duration;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let user_id = Uuid::new_v4();
/// let secret = "your-secret-key-at-least-32-bytes-long";
///
/// let token = issue_access_token(user_id, secret, Duration::seconds(ACCESS_TOKEN_TTL_SECS))?;
/// assert_eq!(validate_access_token(&token, secret)?, user_id);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, decode_header, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header,
    Validation,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fixed issuer claim for every token this service mints
pub const ISSUER: &str = "chirpy";

/// Access token lifetime cap, in seconds (1 hour)
pub const ACCESS_TOKEN_TTL_SECS: i64 = 3600;

/// Signature algorithms accepted on validation
const ACCEPTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Error type for access token operations
///
/// None of the messages include the token or the signing secret.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to sign a token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Signature mismatch, unreadable token, or an algorithm outside HMAC
    #[error("Invalid token signature")]
    InvalidSignature,

    /// `exp` is not in the future
    #[error("Token has expired")]
    Expired,

    /// Signature is fine but the claims are not usable
    #[error("Malformed token claims: {0}")]
    MalformedClaims(String),
}

/// Claims carried by an access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Issuer, always [`ISSUER`]
    pub iss: String,

    /// Subject, the user ID as a hyphenated UUID
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl AccessClaims {
    /// Builds claims for `user_id` expiring `ttl` from now
    ///
    /// `ttl` is taken as given; negative values produce already-expired claims.
    pub fn new(user_id: Uuid, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            iss: ISSUER.to_string(),
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }

    /// `iat` as a timestamp
    pub fn issued_at(&self) -> Result<DateTime<Utc>, JwtError> {
        DateTime::from_timestamp(self.iat, 0)
            .ok_or_else(|| JwtError::MalformedClaims("iat out of range".to_string()))
    }

    /// `exp` as a timestamp
    pub fn expires_at(&self) -> Result<DateTime<Utc>, JwtError> {
        DateTime::from_timestamp(self.exp, 0)
            .ok_or_else(|| JwtError::MalformedClaims("exp out of range".to_string()))
    }
}

/// Identity proven by a verified access token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifiedAccessToken {
    pub user_id: Uuid,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Resolves the lifetime to issue for a login request
///
/// A client may ask for a shorter lifetime. Anything missing, non-positive,
/// or above the 1-hour cap yields the cap.
pub fn clamp_access_ttl(requested: Option<Duration>) -> Duration {
    let cap = Duration::seconds(ACCESS_TOKEN_TTL_SECS);

    match requested {
        Some(ttl) if ttl > Duration::zero() && ttl < cap => ttl,
        _ => cap,
    }
}

/// Signs claims with HS256
///
/// # Errors
///
/// Returns `JwtError::CreateError` if encoding fails
pub fn create_token(claims: &AccessClaims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Issues an access token for `user_id` valid for `ttl`
///
/// The caller is responsible for the TTL policy; see [`clamp_access_ttl`].
pub fn issue_access_token(user_id: Uuid, secret: &str, ttl: Duration) -> Result<String, JwtError> {
    create_token(&AccessClaims::new(user_id, ttl), secret)
}

/// Verifies the signature, issuer and expiry of a token and returns its claims
///
/// # Errors
///
/// - `InvalidSignature`: bad signature, wrong secret, non-HMAC algorithm, or a
///   token that cannot be parsed at all
/// - `Expired`: `exp <= now`
/// - `MalformedClaims`: required claim missing, wrong issuer, or bad JSON
pub fn decode_access_claims(token: &str, secret: &str) -> Result<AccessClaims, JwtError> {
    // Unknown algorithms such as "none" fail to parse here
    let header = decode_header(token).map_err(|_| JwtError::InvalidSignature)?;
    if !ACCEPTED_ALGORITHMS.contains(&header.alg) {
        return Err(JwtError::InvalidSignature);
    }

    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
    validation.set_issuer(&[ISSUER]);
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);
    validation.validate_exp = true;
    validation.leeway = 0;

    let token_data = decode::<AccessClaims>(token, &key, &validation).map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => JwtError::Expired,
        ErrorKind::InvalidSignature
        | ErrorKind::InvalidAlgorithm
        | ErrorKind::InvalidAlgorithmName
        | ErrorKind::InvalidKeyFormat
        | ErrorKind::InvalidToken
        | ErrorKind::Base64(_) => JwtError::InvalidSignature,
        _ => JwtError::MalformedClaims(format!("Token validation failed: {}", e)),
    })?;

    let claims = token_data.claims;

    // The library accepts exp == now; we don't
    if claims.exp <= Utc::now().timestamp() {
        return Err(JwtError::Expired);
    }

    Ok(claims)
}

/// Validates a token and returns the proven identity with its validity window
pub fn verify_access_token(token: &str, secret: &str) -> Result<VerifiedAccessToken, JwtError> {
    let claims = decode_access_claims(token, secret)?;

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| JwtError::MalformedClaims("Subject is not a valid user ID".to_string()))?;

    Ok(VerifiedAccessToken {
        user_id,
        issued_at: claims.issued_at()?,
        expires_at: claims.expires_at()?,
    })
}

/// Validates a token and returns only the subject's user ID
pub fn validate_access_token(token: &str, secret: &str) -> Result<Uuid, JwtError> {
    verify_access_token(token, secret).map(|verified| verified.user_id)
}
