//! Auth state and configuration.
//!
//! The hasher, signer, limiter, and sender are constructed once at process
//! start and handed to the router as one shared state value; nothing in the
//! login core reaches for ambient singletons.

use std::sync::Arc;

use super::delivery::OtpSender;
use super::rate_limit::RateLimiter;
use super::secret::SecretHasher;
use super::token::TokenSigner;

const DEFAULT_OTP_TTL_SECONDS: i64 = 10 * 60;
const DEFAULT_MAX_VERIFY_ATTEMPTS: i32 = 5;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    otp_ttl_seconds: i64,
    max_verify_attempts: i32,
}

impl AuthConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            otp_ttl_seconds: DEFAULT_OTP_TTL_SECONDS,
            max_verify_attempts: DEFAULT_MAX_VERIFY_ATTEMPTS,
        }
    }

    #[must_use]
    pub fn with_otp_ttl_seconds(mut self, seconds: i64) -> Self {
        self.otp_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_max_verify_attempts(mut self, attempts: i32) -> Self {
        self.max_verify_attempts = attempts;
        self
    }

    #[must_use]
    pub fn otp_ttl_seconds(&self) -> i64 {
        self.otp_ttl_seconds
    }

    #[must_use]
    pub fn max_verify_attempts(&self) -> i32 {
        self.max_verify_attempts
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new()
    }
}

pub struct AuthState {
    config: AuthConfig,
    hasher: SecretHasher,
    signer: TokenSigner,
    rate_limiter: Arc<dyn RateLimiter>,
    otp_sender: Arc<dyn OtpSender>,
}

impl AuthState {
    pub fn new(
        config: AuthConfig,
        hasher: SecretHasher,
        signer: TokenSigner,
        rate_limiter: Arc<dyn RateLimiter>,
        otp_sender: Arc<dyn OtpSender>,
    ) -> Self {
        Self {
            config,
            hasher,
            signer,
            rate_limiter,
            otp_sender,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn hasher(&self) -> &SecretHasher {
        &self.hasher
    }

    #[must_use]
    pub fn signer(&self) -> &TokenSigner {
        &self.signer
    }

    pub(crate) fn rate_limiter(&self) -> &dyn RateLimiter {
        self.rate_limiter.as_ref()
    }

    pub(crate) fn otp_sender(&self) -> &dyn OtpSender {
        self.otp_sender.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::super::delivery::LogOtpSender;
    use super::super::rate_limit::{NoopRateLimiter, RateLimitAction, RateLimitDecision};
    use super::super::secret::SecretHasher;
    use super::super::token;
    use super::{AuthConfig, AuthState};
    use std::sync::Arc;

    #[test]
    fn auth_config_defaults_and_overrides() {
        let config = AuthConfig::new();

        assert_eq!(config.otp_ttl_seconds(), super::DEFAULT_OTP_TTL_SECONDS);
        assert_eq!(
            config.max_verify_attempts(),
            super::DEFAULT_MAX_VERIFY_ATTEMPTS
        );

        let config = config.with_otp_ttl_seconds(120).with_max_verify_attempts(3);

        assert_eq!(config.otp_ttl_seconds(), 120);
        assert_eq!(config.max_verify_attempts(), 3);
    }

    #[test]
    fn auth_state_exposes_collaborators() {
        let state = AuthState::new(
            AuthConfig::new(),
            SecretHasher::new(),
            token::test_signer(),
            Arc::new(NoopRateLimiter),
            Arc::new(LogOtpSender),
        );

        assert_eq!(state.config().otp_ttl_seconds(), 600);
        assert_eq!(
            state
                .rate_limiter()
                .check_email("alice@x.edu", RateLimitAction::SendOtp),
            RateLimitDecision::Allowed
        );
        assert!(state.otp_sender().send("alice@x.edu", "000000").is_ok());
    }
}
