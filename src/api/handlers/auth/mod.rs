//! OTP login core and role-based authorization.
//!
//! This module holds the service's one real protocol: a two-step
//! challenge/response login (`send-otp`, `verify-otp`) backed by a
//! single-use, time-bounded, Argon2id-hashed secret, plus the role gate
//! that privileged record operations call before mutating anything.
//!
//! ## Attempt cap
//!
//! A pending challenge tolerates a bounded number of failed verifications
//! (default 5) before it is discarded. Below the cap, failures do not
//! consume the secret, so a mistyped code can be retried until the
//! 10-minute expiry.
//!
//! ## State
//!
//! All protocol state lives in the `email_verifications` table, one row per
//! subject email. Replacement on re-send and deletion on success are single
//! atomic statements, so concurrent calls for the same email cannot observe
//! a torn record.

pub mod challenge;
pub mod delivery;
pub mod error;
pub mod identity;
pub mod otp;
pub mod principal;
pub mod rate_limit;
pub mod role;
pub mod secret;
pub mod state;
pub mod store;
pub mod token;
pub mod types;
pub mod utils;

pub use delivery::{LogOtpSender, OtpSender};
pub use error::AuthError;
pub use identity::{Identity, IdentityResolver, PgIdentityResolver, Role};
pub use rate_limit::NoopRateLimiter;
pub use role::{require_any_role, require_role};
pub use secret::SecretHasher;
pub use state::{AuthConfig, AuthState};
pub use token::TokenSigner;
