/// Password hashing module using Argon2id
///
/// One-way, salted hashing of user passwords with a fixed work factor.
///
/// # Security
///
/// - **Algorithm**: Argon2id (hybrid of Argon2i and Argon2d)
/// - **Memory**: 64 MB (65536 KB)
/// - **Iterations**: 3 passes
/// - **Parallelism**: 4 lanes
/// - **Output**: 32-byte hash in PHC string format
///
/// With these parameters one hash takes tens of milliseconds on commodity
/// hardware. Inputs of any length (including empty) are accepted; Argon2
/// has no practical input ceiling, so nothing is silently truncated.
///
/// Both functions are CPU-bound and blocking. Async callers should run them
/// on `tokio::task::spawn_blocking` (see [`crate::auth::session`]).
///
/// # Example
///
/// ```
/// use chirpy_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("secret123")?;
///
/// assert!(verify_password("secret123", &hash)?);
/// assert!(!verify_password("secret124", &hash)?);
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder, Version,
};

/// Memory cost in KiB
const M_COST: u32 = 65536;

/// Number of passes
const T_COST: u32 = 3;

/// Degree of parallelism
const P_COST: u32 = 4;

/// Error type for password hashing operations
///
/// Messages never include the plaintext password.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// The hashing primitive failed
    #[error("Failed to hash password: {0}")]
    HashError(String),

    /// The stored digest could not be parsed
    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),
}

/// Hashes a password using Argon2id with a fresh 16-byte random salt
///
/// # Returns
///
/// PHC string, e.g. `$argon2id$v=19$m=65536,t=3,p=4$<salt>$<hash>`
///
/// # Errors
///
/// Returns `PasswordError::HashError` if the primitive fails
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let params = ParamsBuilder::new()
        .m_cost(M_COST)
        .t_cost(T_COST)
        .p_cost(P_COST)
        .output_len(32)
        .build()
        .map_err(|e| PasswordError::HashError(format!("Invalid parameters: {}", e)))?;

    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params);

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(format!("Hash generation failed: {}", e)))?;

    Ok(password_hash.to_string())
}

/// Verifies a password against a stored hash
///
/// Comparison is constant-time inside the primitive. A mismatch is just
/// `Ok(false)`; callers learn nothing about why it failed.
///
/// # Errors
///
/// Returns `PasswordError::InvalidHash` if the stored digest is not a valid
/// PHC string. That is a data problem on our side, not a wrong password.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| PasswordError::InvalidHash(format!("Failed to parse hash: {}", e)))?;

    // Parameters are embedded in the hash
    let argon2 = Argon2::default();

    match argon2.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::InvalidHash(format!("Verification failed: {}", e))),
    }
}
