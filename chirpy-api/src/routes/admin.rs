/// Admin endpoints
///
/// - `GET /admin/metrics` - HTML page with the file server hit count
/// - `POST /admin/reset` - Zero the counter and delete every user (dev only)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, response::Html, Json};
use serde::{Deserialize, Serialize};

/// Reset response
#[derive(Debug, Serialize, Deserialize)]
pub struct ResetResponse {
    /// Users removed (chirps and refresh tokens cascade)
    pub users_deleted: u64,
}

pub async fn metrics(State(state): State<AppState>) -> Html<String> {
    Html(format!(
        "<html>\n  <body>\n    <h1>Welcome, Chirpy Admin</h1>\n    <p>Chirpy has been visited {} times!</p>\n  </body>\n</html>\n",
        state.hits.get()
    ))
}

/// Resets hits and wipes all users
///
/// # Errors
///
/// - `403 Forbidden`: Not running with `PLATFORM=dev`
pub async fn reset(State(state): State<AppState>) -> ApiResult<Json<ResetResponse>> {
    if !state.config.is_dev() {
        return Err(ApiError::Forbidden(
            "Reset is only allowed in dev environment".to_string(),
        ));
    }

    state.hits.reset();
    let users_deleted = state.users.reset().await?;

    tracing::warn!(users_deleted, "Database reset");

    Ok(Json(ResetResponse { users_deleted }))
}
