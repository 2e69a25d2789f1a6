//! The OTP challenge protocol: send and verify.
//!
//! Per-email state machine with two entry points. `send_challenge` is not
//! idempotent in effect (each call replaces the prior pending challenge for
//! that email) but is safe to call repeatedly. `verify_challenge` consumes
//! the challenge on its first success; a second success is impossible and
//! indistinguishable from never having requested one.

use chrono::{Duration, Utc};
use tracing::error;

use super::error::AuthError;
use super::identity::{IdentityResolver, Role};
use super::secret;
use super::state::AuthState;
use super::store::VerificationStore;

/// Credential returned after a successful verification.
#[derive(Clone, Debug)]
pub struct IssuedCredential {
    pub token: String,
    pub role: Role,
}

/// Start a login challenge for `email`.
///
/// Resolves the identity (credentials are only issued to pre-provisioned
/// identities; there is no self-registration), generates and hashes a fresh
/// code, stores it with its expiry, and hands the plaintext to the delivery
/// channel. The plaintext is never returned to the caller.
///
/// # Errors
/// Returns `UnknownSubject` if no identity exists for the email, or
/// `Internal` on a storage fault.
pub async fn send_challenge<S, I>(
    state: &AuthState,
    store: &S,
    identities: &I,
    email: &str,
) -> Result<(), AuthError>
where
    S: VerificationStore,
    I: IdentityResolver,
{
    let identity = identities
        .find_by_email(email)
        .await?
        .ok_or(AuthError::UnknownSubject)?;

    let otp = secret::generate_otp();
    let otp_hash = state.hasher().hash(&otp)?;
    let expires_at = Utc::now() + Duration::seconds(state.config().otp_ttl_seconds());

    // Replaces any pending challenge for this email.
    store.put(email, &otp_hash, expires_at).await?;

    // Delivery failures stay opaque to the caller; a re-send is a fresh call.
    if let Err(err) = state.otp_sender().send(&identity.email, &otp) {
        error!("Failed to deliver OTP to {}: {err}", identity.email);
    }

    Ok(())
}

/// Verify a submitted code and issue a credential on success.
///
/// The stored record is deleted on the first successful match (one-time
/// use). A mismatch leaves the record in place for retry until expiry,
/// except that the attempt cap discards the challenge once reached.
///
/// # Errors
/// - `NoPendingChallenge` if nothing is outstanding (never requested and
///   already consumed are reported identically).
/// - `ChallengeExpired` if the record's expiry has elapsed.
/// - `InvalidChallenge` on a hash mismatch.
/// - `UnknownSubject` if the identity vanished between send and verify.
/// - `Internal` on storage or signing faults.
pub async fn verify_challenge<S, I>(
    state: &AuthState,
    store: &S,
    identities: &I,
    email: &str,
    submitted_otp: &str,
) -> Result<IssuedCredential, AuthError>
where
    S: VerificationStore,
    I: IdentityResolver,
{
    let challenge = store
        .get(email)
        .await?
        .ok_or(AuthError::NoPendingChallenge)?;

    let now = Utc::now();
    if challenge.is_expired(now) {
        // The record stays until a later check removes it or a hygiene
        // sweep reclaims it.
        return Err(AuthError::ChallengeExpired);
    }

    if !state.hasher().verify(submitted_otp, &challenge.otp_hash) {
        let attempts = store.record_failure(email).await?;
        if attempts >= state.config().max_verify_attempts() {
            store.delete(email).await?;
        }
        return Err(AuthError::InvalidChallenge);
    }

    // One-time use: consume before issuing anything.
    store.delete(email).await?;

    let identity = identities
        .find_by_email(email)
        .await?
        .ok_or(AuthError::UnknownSubject)?;

    let token = state
        .signer()
        .issue(&identity, now.timestamp())
        .map_err(|err| AuthError::Internal(err.into()))?;

    Ok(IssuedCredential {
        token,
        role: identity.role,
    })
}
