/// Chirp endpoints
///
/// Reads are public. Creating requires an access token; the author is
/// always the caller. Deleting additionally requires being the author.
///
/// # Endpoints
///
/// - `POST /api/chirps` - Publish a chirp
/// - `GET /api/chirps?author_id=<uuid>&sort=asc|desc` - List chirps
/// - `GET /api/chirps/:chirp_id` - Fetch one chirp
/// - `DELETE /api/chirps/:chirp_id` - Delete your own chirp

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Extension, Json,
};
use chirpy_shared::{
    auth::{authorization::require_ownership, identity::AuthContext},
    models::chirp::{Chirp, ChirpQuery, CreateChirp, SortOrder},
};
use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Create chirp request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateChirpRequest {
    #[validate(custom(function = "not_blank"))]
    pub body: String,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Chirp body must not be empty".into());
        return Err(err);
    }
    Ok(())
}

/// List filters
#[derive(Debug, Default, Deserialize)]
pub struct ListChirpsParams {
    pub author_id: Option<Uuid>,
    pub sort: Option<SortOrder>,
}

/// Publishes a chirp as the caller
pub async fn create_chirp(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<CreateChirpRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Chirp>)> {
    let Json(req) = payload?;
    req.validate()?;

    let chirp = state
        .chirps
        .create(CreateChirp {
            body: req.body,
            user_id: auth.user_id,
        })
        .await?;

    tracing::debug!(chirp_id = %chirp.id, user_id = %auth.user_id, "Chirp created");

    Ok((StatusCode::CREATED, Json(chirp)))
}

/// Lists chirps, oldest first unless `sort=desc`
pub async fn list_chirps(
    State(state): State<AppState>,
    params: Result<Query<ListChirpsParams>, QueryRejection>,
) -> ApiResult<Json<Vec<Chirp>>> {
    let Query(params) = params?;

    let chirps = state
        .chirps
        .list(ChirpQuery {
            author_id: params.author_id,
            sort: params.sort.unwrap_or_default(),
        })
        .await?;

    Ok(Json(chirps))
}

/// Fetches a single chirp
pub async fn get_chirp(
    State(state): State<AppState>,
    Path(chirp_id): Path<Uuid>,
) -> ApiResult<Json<Chirp>> {
    let chirp = state
        .chirps
        .find_by_id(chirp_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Chirp not found".to_string()))?;

    Ok(Json(chirp))
}

/// Deletes a chirp owned by the caller
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not the author
/// - `404 Not Found`: No such chirp
pub async fn delete_chirp(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(chirp_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let chirp = state
        .chirps
        .find_by_id(chirp_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Chirp not found".to_string()))?;

    require_ownership(&auth, chirp.user_id)?;

    if !state.chirps.delete(chirp.id).await? {
        return Err(ApiError::NotFound("Chirp not found".to_string()));
    }

    tracing::info!(chirp_id = %chirp.id, user_id = %auth.user_id, "Chirp deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_body_rejected() {
        let req = CreateChirpRequest { body: "   ".to_string() };
        assert!(req.validate().is_err());

        let req = CreateChirpRequest { body: "hello".to_string() };
        assert!(req.validate().is_ok());
    }
}
