/// Payment provider webhooks
///
/// Polka calls this endpoint when a user pays for Chirpy Red. The request
/// carries `Authorization: ApiKey <key>`, compared in constant time against
/// `POLKA_KEY`. Events other than `user.upgraded` are acknowledged and ignored.
///
/// # Endpoint
///
/// ```text
/// POST /api/polka/webhooks
/// Authorization: ApiKey f271c81ff7084ee5b99a5091b42d486e
///
/// {
///   "event": "user.upgraded",
///   "data": { "user_id": "3311741c-680c-4546-99f3-fc9efac2036c" }
/// }
/// ```

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chirpy_shared::auth::bearer::{authorization_header, constant_time_compare, extract_api_key};
use serde::Deserialize;
use uuid::Uuid;

/// Event name that grants Chirpy Red
pub const USER_UPGRADED: &str = "user.upgraded";

#[derive(Debug, Deserialize)]
pub struct PolkaWebhook {
    pub event: String,
    pub data: PolkaWebhookData,
}

#[derive(Debug, Deserialize)]
pub struct PolkaWebhookData {
    pub user_id: Uuid,
}

/// Handles a Polka webhook
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or wrong API key, or no key configured
/// - `404 Not Found`: `user.upgraded` for an unknown user
pub async fn polka(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<PolkaWebhook>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let expected = state
        .config
        .polka
        .api_key
        .as_deref()
        .ok_or_else(|| ApiError::Unauthorized("Webhooks are not configured".to_string()))?;

    let presented = extract_api_key(authorization_header(&headers))?;
    if !constant_time_compare(presented, expected) {
        tracing::warn!("Rejected webhook with invalid API key");
        return Err(ApiError::Unauthorized("Invalid API key".to_string()));
    }

    let Json(webhook) = payload?;

    if webhook.event != USER_UPGRADED {
        tracing::debug!(event = %webhook.event, "Ignoring webhook event");
        return Ok(StatusCode::NO_CONTENT);
    }

    if !state.users.upgrade_to_red(webhook.data.user_id).await? {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    tracing::info!(user_id = %webhook.data.user_id, "User upgraded to Chirpy Red");

    Ok(StatusCode::NO_CONTENT)
}
