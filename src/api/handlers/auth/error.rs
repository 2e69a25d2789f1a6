//! Caller-facing failure taxonomy for the login core and role gate.
//!
//! Each variant is a distinct protocol outcome, propagated as a value so
//! callers handle every kind explicitly. None are retryable without new
//! input. Infrastructure faults (storage, signing) are not part of the
//! taxonomy; they ride in `Internal` and surface as a 500.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AuthError {
    /// No identity is provisioned for the subject email.
    #[error("unknown subject")]
    UnknownSubject,
    /// No challenge is outstanding. Covers "never requested" and "already
    /// consumed" identically so callers cannot probe challenge state.
    #[error("no pending challenge")]
    NoPendingChallenge,
    #[error("challenge expired")]
    ChallengeExpired,
    #[error("invalid challenge")]
    InvalidChallenge,
    #[error("forbidden")]
    Forbidden,
    #[error("already exists")]
    AlreadyExists,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::UnknownSubject => StatusCode::NOT_FOUND,
            Self::NoPendingChallenge | Self::ChallengeExpired | Self::InvalidChallenge => {
                StatusCode::UNAUTHORIZED
            }
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::AlreadyExists => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to return to the caller.
    #[must_use]
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::UnknownSubject => "Unknown subject",
            Self::NoPendingChallenge => "No pending challenge",
            Self::ChallengeExpired => "OTP expired",
            Self::InvalidChallenge => "Invalid OTP",
            Self::Forbidden => "Forbidden",
            Self::AlreadyExists => "Already exists",
            Self::Internal(_) => "Internal error",
        }
    }
}

/// Map an auth failure to its HTTP response, logging internal faults.
pub(crate) fn error_response(err: &AuthError) -> Response {
    if let AuthError::Internal(inner) = err {
        error!("auth internal error: {inner}");
    }
    (err.status(), err.public_message().to_string()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn status_codes_per_kind() {
        assert_eq!(AuthError::UnknownSubject.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AuthError::NoPendingChallenge.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::ChallengeExpired.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::InvalidChallenge.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AuthError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(AuthError::AlreadyExists.status(), StatusCode::CONFLICT);
        assert_eq!(
            AuthError::Internal(anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_message_does_not_leak() {
        let err = AuthError::Internal(anyhow!("connection refused to 10.0.0.7"));
        assert_eq!(err.public_message(), "Internal error");
    }

    #[test]
    fn expired_and_invalid_are_distinguishable() {
        // Both require a fresh challenge, so the distinction gives an
        // attacker nothing; keeping it helps legitimate clients.
        assert_ne!(
            AuthError::ChallengeExpired.public_message(),
            AuthError::InvalidChallenge.public_message()
        );
    }
}
