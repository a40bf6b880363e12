/// User endpoints
///
/// - `POST /api/users` - Register (public)
/// - `PUT /api/users` - Change the caller's email and password (access token)

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use chirpy_shared::{auth::identity::AuthContext, models::user::UserProfile};
use serde::Deserialize;
use validator::Validate;

/// Credentials body shared by registration and update
#[derive(Debug, Deserialize, Validate)]
pub struct CredentialsRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Registers a new user
///
/// # Errors
///
/// - `409 Conflict`: Email already registered
/// - `422 Unprocessable Entity`: Invalid email or empty password
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<UserProfile>)> {
    let Json(req) = payload?;
    req.validate()?;

    let user = state.sessions.register(&req.email, &req.password).await?;

    Ok((StatusCode::CREATED, Json(user.profile())))
}

/// Replaces the caller's email and password
///
/// Existing refresh tokens stay valid.
pub async fn update_credentials(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> ApiResult<Json<UserProfile>> {
    let Json(req) = payload?;
    req.validate()?;

    let user = state
        .sessions
        .change_credentials(auth.user_id, &req.email, &req.password)
        .await?;

    Ok(Json(user.profile()))
}
