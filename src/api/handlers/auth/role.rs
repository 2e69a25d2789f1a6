//! Role gate for privileged operations.
//!
//! Pure checks over an already-resolved identity. Every privileged handler
//! calls one of these before touching storage, keeping authorization at a
//! single choke point instead of scattered checks.

use super::error::AuthError;
use super::identity::{Identity, Role};

/// Require the caller to hold exactly `required`.
///
/// # Errors
/// Returns `Forbidden` if the caller's role differs.
pub fn require_role(identity: &Identity, required: Role) -> Result<(), AuthError> {
    if identity.role == required {
        Ok(())
    } else {
        Err(AuthError::Forbidden)
    }
}

/// Require the caller's role to be one of `allowed`.
///
/// # Errors
/// Returns `Forbidden` if the caller's role is not in the set.
pub fn require_any_role(identity: &Identity, allowed: &[Role]) -> Result<(), AuthError> {
    if allowed.contains(&identity.role) {
        Ok(())
    } else {
        Err(AuthError::Forbidden)
    }
}
