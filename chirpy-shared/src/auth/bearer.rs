/// Authorization header parsing
///
/// Pulls the credential out of `Authorization: Bearer <token>` (user tokens)
/// or `Authorization: ApiKey <key>` (payment-provider webhooks). The scheme
/// must match exactly; surrounding whitespace around the credential is
/// trimmed and the remainder is returned verbatim.
///
/// # Example
///
/// ```
/// use chirpy_shared::auth::bearer::{extract_bearer, BearerError};
///
/// assert_eq!(extract_bearer(Some("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
/// assert_eq!(extract_bearer(None), Err(BearerError::MissingCredential));
/// assert_eq!(extract_bearer(Some("Basic dXNlcjpwdw==")), Err(BearerError::MissingCredential));
/// ```

use axum::http::{header, HeaderMap};
use sha2::{Digest, Sha256};

const BEARER_SCHEME: &str = "Bearer ";
const API_KEY_SCHEME: &str = "ApiKey ";

/// Error type for credential extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BearerError {
    /// Header absent, empty, or not of the expected `<scheme> <credential>` form
    #[error("Missing or malformed authorization credential")]
    MissingCredential,
}

/// Reads the `Authorization` header as a string, if present and valid ASCII
pub fn authorization_header(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
}

/// Extracts the token from `Bearer <token>`
pub fn extract_bearer(header_value: Option<&str>) -> Result<&str, BearerError> {
    extract_with_scheme(header_value, BEARER_SCHEME)
}

/// Extracts the key from `ApiKey <key>`
pub fn extract_api_key(header_value: Option<&str>) -> Result<&str, BearerError> {
    extract_with_scheme(header_value, API_KEY_SCHEME)
}

fn extract_with_scheme<'a>(header_value: Option<&'a str>, scheme: &str) -> Result<&'a str, BearerError> {
    let credential = header_value
        .ok_or(BearerError::MissingCredential)?
        .strip_prefix(scheme)
        .ok_or(BearerError::MissingCredential)?
        .trim();

    if credential.is_empty() || credential.contains(char::is_whitespace) {
        return Err(BearerError::MissingCredential);
    }

    Ok(credential)
}

/// Compares two secrets without leaking where they differ
///
/// Both sides are hashed first so the byte comparison always runs over 32
/// bytes, regardless of input lengths.
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    let a = Sha256::digest(a.as_bytes());
    let b = Sha256::digest(b.as_bytes());

    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
