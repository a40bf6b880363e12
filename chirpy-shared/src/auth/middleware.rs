/// Authentication middleware for Axum
///
/// Resolves the caller from `Authorization: Bearer <access token>` and adds
/// an [`AuthContext`] to the request extensions. Validation is purely
/// computational; no storage is touched on this path.
///
/// Rejections are JSON bodies shaped like the API's other errors:
///
/// ```json
/// { "error": "unauthorized", "message": "Token has expired" }
/// ```
///
/// # Example
///
/// ```no_run
/// use axum::{Router, routing::get, middleware, Extension};
/// use chirpy_shared::auth::identity::AuthContext;
/// use chirpy_shared::auth::middleware::create_jwt_middleware;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("Hello, user {}!", auth.user_id)
/// }
///
/// let app: Router = Router::new()
///     .route("/protected", get(handler))
///     .layer(middleware::from_fn(create_jwt_middleware("secret")));
/// ```

use std::{future::Future, pin::Pin};

use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use super::bearer::{authorization_header, extract_bearer, BearerError};
use super::identity::AuthContext;
use super::jwt::{verify_access_token, JwtError};

/// Error type for authentication middleware
#[derive(Debug, thiserror::Error)]
pub enum AuthRejection {
    #[error(transparent)]
    Missing(#[from] BearerError),

    #[error(transparent)]
    Token(#[from] JwtError),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let message = match &self {
            AuthRejection::Missing(e) => e.to_string(),
            AuthRejection::Token(JwtError::CreateError(_)) => {
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "internal_error", "message": "Internal server error" })),
                )
                    .into_response();
            }
            AuthRejection::Token(e) => e.to_string(),
        };

        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "unauthorized", "message": message })),
        )
            .into_response()
    }
}

/// Resolves the caller from request headers
///
/// Handlers that authenticate without the middleware layer call this directly.
pub fn resolve_identity(headers: &HeaderMap, secret: &str) -> Result<AuthContext, AuthRejection> {
    let token = extract_bearer(authorization_header(headers))?;
    let proof = verify_access_token(token, secret)?;

    Ok(AuthContext::from_proof(&proof))
}

/// JWT authentication middleware
///
/// # Errors
///
/// Returns 401 Unauthorized if the header is missing or malformed, or the
/// token fails validation (bad signature, expired, malformed claims).
pub async fn jwt_auth_middleware(
    secret: String,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthRejection> {
    let auth_context = resolve_identity(req.headers(), &secret).map_err(|e| {
        tracing::debug!(reason = %e, path = %req.uri().path(), "Rejected request");
        e
    })?;

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}

type MiddlewareFuture = Pin<Box<dyn Future<Output = Result<Response, AuthRejection>> + Send>>;

/// Creates a JWT authentication middleware closure capturing the secret
///
/// # Example
///
/// ```no_run
/// use axum::{Router, routing::get, middleware};
/// use chirpy_shared::auth::middleware::create_jwt_middleware;
///
/// let app: Router = Router::new()
///     .route("/protected", get(|| async { "OK" }))
///     .layer(middleware::from_fn(create_jwt_middleware("secret")));
/// ```
pub fn create_jwt_middleware(secret: impl Into<String>) -> impl Fn(Request, Next) -> MiddlewareFuture + Clone {
    let secret = secret.into();
    move |req, next| {
        let secret = secret.clone();
        Box::pin(jwt_auth_middleware(secret, req, next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::identity::ProofKind;
    use crate::auth::jwt::issue_access_token;
    use axum::http::{header, HeaderValue};
    use chrono::Duration;
    use uuid::Uuid;

    const SECRET: &str = "middleware-test-secret-32-bytes-long!!";

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_resolve_identity_valid_token() {
        let user_id = Uuid::new_v4();
        let token = issue_access_token(user_id, SECRET, Duration::hours(1)).unwrap();

        let ctx = resolve_identity(&headers_with(&format!("Bearer {}", token)), SECRET).unwrap();
        assert_eq!(ctx.user_id, user_id);
        assert_eq!(ctx.kind, ProofKind::AccessToken);
    }

    #[test]
    fn test_resolve_identity_missing_header() {
        let result = resolve_identity(&HeaderMap::new(), SECRET);
        assert!(matches!(result, Err(AuthRejection::Missing(BearerError::MissingCredential))));
    }

    #[test]
    fn test_resolve_identity_expired_token() {
        let token = issue_access_token(Uuid::new_v4(), SECRET, Duration::seconds(-1)).unwrap();

        let result = resolve_identity(&headers_with(&format!("Bearer {}", token)), SECRET);
        assert!(matches!(result, Err(AuthRejection::Token(JwtError::Expired))));
    }

    #[test]
    fn test_rejections_are_unauthorized() {
        let missing = AuthRejection::Missing(BearerError::MissingCredential).into_response();
        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

        let bad_sig = AuthRejection::Token(JwtError::InvalidSignature).into_response();
        assert_eq!(bad_sig.status(), StatusCode::UNAUTHORIZED);

        let malformed = AuthRejection::Token(JwtError::MalformedClaims("sub".into())).into_response();
        assert_eq!(malformed.status(), StatusCode::UNAUTHORIZED);
    }
}
