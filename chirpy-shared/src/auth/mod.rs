/// Authentication and authorization for Chirpy
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: stateless access tokens (HMAC-signed JWTs, 1-hour lifetime)
/// - [`refresh`]: opaque, revocable refresh tokens (60-day lifetime)
/// - [`bearer`]: `Authorization` header parsing
/// - [`identity`]: the `IdentityProof` capability and `AuthContext`
/// - [`session`]: login, refresh and revoke orchestration
/// - [`authorization`]: resource ownership checks
/// - [`middleware`]: Axum layer resolving the caller from a bearer token
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id with 64 MB memory, 3 iterations
/// - **Access Tokens**: HS256 signing; non-HMAC algorithms rejected
/// - **Refresh Tokens**: 256 bits from the OS RNG, revocable, never rotated
/// - **Enumeration Resistance**: unknown email and wrong password are one error
///
/// # Example
///
/// ```
/// use chirpy_shared::auth::password::{hash_password, verify_password};
/// use chirpy_shared::auth::jwt::{issue_access_token, validate_access_token};
/// use chrono::Duration;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let user_id = Uuid::new_v4();
/// let token = issue_access_token(user_id, "secret-key", Duration::hours(1))?;
/// assert_eq!(validate_access_token(&token, "secret-key")?, user_id);
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod bearer;
pub mod identity;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod refresh;
pub mod session;
