//! Authenticated caller extraction for privileged endpoints.
//!
//! Reads the bearer token, verifies it offline against the process signing
//! key, and resolves the token's subject to a stored identity. Handlers pass
//! the result straight to the role gate; the caller is never derived from
//! ambient process state.

use axum::http::{HeaderMap, StatusCode, header::AUTHORIZATION};
use chrono::Utc;
use tracing::error;

use super::identity::{Identity, IdentityResolver};
use super::token::TokenSigner;

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Resolve the bearer token into an identity, or return 401.
///
/// # Errors
/// Returns `UNAUTHORIZED` for a missing/invalid token or an unknown subject,
/// and `INTERNAL_SERVER_ERROR` if the identity lookup itself fails.
pub async fn require_identity<I>(
    headers: &HeaderMap,
    signer: &TokenSigner,
    identities: &I,
) -> Result<Identity, StatusCode>
where
    I: IdentityResolver,
{
    let Some(token) = bearer_token(headers) else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    let claims = signer
        .verify(token, Utc::now().timestamp())
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    match identities.find_by_email(&claims.sub).await {
        Ok(Some(identity)) => Ok(identity),
        Ok(None) => Err(StatusCode::UNAUTHORIZED),
        Err(err) => {
            error!("Failed to resolve caller identity: {err}");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
