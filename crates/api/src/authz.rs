//! API-side authorization guard.
//!
//! Role permissions are checked at the handler boundary, before any state is
//! touched. Ownership and membership rules live in the services.

use learnhub_auth::{AuthzError, Permission, authorize};

use crate::context::PrincipalContext;

/// Check that the caller's role grants `permission`.
pub fn require(principal: &PrincipalContext, permission: &Permission) -> Result<(), AuthzError> {
    authorize(&principal.principal(), permission).inspect_err(|e| {
        tracing::debug!(user_id = %principal.user_id(), error = %e, "permission denied");
    })
}
