/// Session endpoints
///
/// # Endpoints
///
/// - `POST /api/login` - Exchange email + password for tokens
/// - `POST /api/refresh` - Exchange a refresh token for a new access token
/// - `POST /api/revoke` - Permanently disable a refresh token
///
/// Refresh and revoke read the refresh token from
/// `Authorization: Bearer <refresh token>`.

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chirpy_shared::{
    auth::bearer::{authorization_header, extract_bearer},
    models::user::UserProfile,
};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    /// Password
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    /// Requested access token lifetime; clamped to one hour
    pub expires_in_seconds: Option<i64>,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: UserProfile,

    /// Access token (1h)
    pub token: String,

    /// Refresh token (60d)
    pub refresh_token: String,
}

/// Refresh response
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    /// New access token (1h)
    pub token: String,
}

/// Login endpoint
///
/// # Endpoint
///
/// ```text
/// POST /api/login
/// Content-Type: application/json
///
/// {
///   "email": "alice@example.com",
///   "password": "secret123",
///   "expires_in_seconds": 600
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "id": "uuid",
///   "created_at": "...",
///   "updated_at": "...",
///   "email": "alice@example.com",
///   "is_chirpy_red": false,
///   "token": "eyJ...",
///   "refresh_token": "56aa8262..."
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Body is not valid JSON
/// - `401 Unauthorized`: Unknown email or wrong password (same response)
/// - `422 Unprocessable Entity`: Missing fields
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(req) = payload?;
    req.validate()?;

    let requested_ttl = req.expires_in_seconds.map(Duration::seconds);
    let session = state
        .sessions
        .login(&req.email, &req.password, requested_ttl)
        .await?;

    Ok(Json(LoginResponse {
        user: session.user,
        token: session.access_token,
        refresh_token: session.refresh_token.token,
    }))
}

/// Token refresh endpoint
///
/// The refresh token is not rotated; the same one keeps working until it
/// expires or is revoked.
///
/// # Errors
///
/// - `401 Unauthorized`: Missing header, or token unknown, revoked, or expired
pub async fn refresh(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Json<RefreshResponse>> {
    let token = extract_bearer(authorization_header(&headers))?;

    let grant = state.sessions.refresh(token).await?;

    Ok(Json(RefreshResponse {
        token: grant.access_token,
    }))
}

/// Token revocation endpoint
///
/// Revoking an already-revoked token succeeds.
///
/// # Errors
///
/// - `401 Unauthorized`: Missing header or unknown token
pub async fn revoke(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<StatusCode> {
    let token = extract_bearer(authorization_header(&headers))?;

    state.sessions.revoke(token).await?;

    Ok(StatusCode::NO_CONTENT)
}
