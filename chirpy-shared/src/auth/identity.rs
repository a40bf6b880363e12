/// Resolved caller identity
///
/// Chirpy has two kinds of credential. An access token is a signed,
/// stateless claim; a refresh token is a stored, revocable handle. Both
/// prove "this request acts for user X", and handlers should not care which
/// one did. [`IdentityProof`] is that common capability and [`AuthContext`]
/// is what handlers receive.
///
/// # Example
///
/// ```
/// use chirpy_shared::auth::identity::{AuthContext, IdentityProof, ProofKind};
/// use chirpy_shared::auth::jwt::{issue_access_token, verify_access_token};
/// use chrono::Duration;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "your-secret-key-at-least-32-bytes-long";
/// let user_id = Uuid::new_v4();
///
/// let token = issue_access_token(user_id, secret, Duration::hours(1))?;
/// let proof = verify_access_token(&token, secret)?;
///
/// let ctx = AuthContext::from_proof(&proof);
/// assert_eq!(ctx.user_id, user_id);
/// assert_eq!(ctx.kind, ProofKind::AccessToken);
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::VerifiedAccessToken;
use crate::models::refresh_token::RefreshToken;

/// Which credential produced an identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProofKind {
    /// Stateless signed claim
    AccessToken,

    /// Stored revocable handle
    RefreshToken,
}

/// Anything that proves a request acts on behalf of a user
pub trait IdentityProof {
    /// The proven user ID
    fn subject(&self) -> Uuid;

    fn kind(&self) -> ProofKind;
}

impl IdentityProof for VerifiedAccessToken {
    fn subject(&self) -> Uuid {
        self.user_id
    }

    fn kind(&self) -> ProofKind {
        ProofKind::AccessToken
    }
}

impl IdentityProof for RefreshToken {
    fn subject(&self) -> Uuid {
        self.user_id
    }

    fn kind(&self) -> ProofKind {
        ProofKind::RefreshToken
    }
}

/// Authenticated caller, inserted into request extensions
///
/// Handlers extract it with `Extension<AuthContext>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub kind: ProofKind,
}

impl AuthContext {
    pub fn from_proof<P: IdentityProof + ?Sized>(proof: &P) -> Self {
        Self {
            user_id: proof.subject(),
            kind: proof.kind(),
        }
    }
}
