/// Resource ownership checks
///
/// Reads are public. Mutating or deleting a resource is allowed only for the
/// user who created it; there are no roles and no admin override.
///
/// # Example
///
/// ```
/// use chirpy_shared::auth::authorization::{authorize_owner, AuthzError};
/// use uuid::Uuid;
///
/// let alice = Uuid::new_v4();
/// let bob = Uuid::new_v4();
///
/// assert!(authorize_owner(alice, alice).is_ok());
/// assert!(matches!(authorize_owner(alice, bob), Err(AuthzError::Forbidden)));
/// ```

use uuid::Uuid;

use super::identity::AuthContext;

/// Error type for authorization checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    /// Caller does not own the resource
    #[error("Not authorized to modify this resource")]
    Forbidden,
}

/// Allows iff `caller_id == owner_id`
pub fn authorize_owner(caller_id: Uuid, owner_id: Uuid) -> Result<(), AuthzError> {
    if caller_id == owner_id {
        Ok(())
    } else {
        Err(AuthzError::Forbidden)
    }
}

/// Ownership check against the authenticated request context
pub fn require_ownership(auth: &AuthContext, owner_id: Uuid) -> Result<(), AuthzError> {
    authorize_owner(auth.user_id, owner_id).map_err(|e| {
        tracing::debug!(caller = %auth.user_id, owner = %owner_id, "Ownership check failed");
        e
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::identity::ProofKind;

    #[test]
    fn test_owner_allowed() {
        let id = Uuid::new_v4();
        assert_eq!(authorize_owner(id, id), Ok(()));
    }

    #[test]
    fn test_other_user_forbidden() {
        assert_eq!(
            authorize_owner(Uuid::new_v4(), Uuid::new_v4()),
            Err(AuthzError::Forbidden)
        );
    }

    #[test]
    fn test_require_ownership_uses_context_user() {
        let owner = Uuid::new_v4();
        let ctx = AuthContext {
            user_id: owner,
            kind: ProofKind::AccessToken,
        };

        assert!(require_ownership(&ctx, owner).is_ok());
        assert_eq!(require_ownership(&ctx, Uuid::new_v4()), Err(AuthzError::Forbidden));
    }
}
