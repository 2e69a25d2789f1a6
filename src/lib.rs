//! # AIMS (Academic Records & Identity Backend)
//!
//! `aims` is the backend for an academic institution: student records,
//! pre-provisioned user accounts, and an email-OTP login flow that issues
//! signed bearer tokens.
//!
//! ## Authentication (email OTP)
//!
//! Login is a two-step challenge/response: `send-otp` stores an Argon2id hash
//! of a freshly generated 6-digit code with a 10-minute expiry, and
//! `verify-otp` checks the submitted code against that hash. A challenge is
//! single-use: the record is deleted on the first successful verification,
//! and a repeat verification is indistinguishable from never having requested
//! one. Failed attempts leave the challenge in place until either the expiry
//! elapses or the attempt cap is reached.
//!
//! The plaintext code only ever travels out-of-band (the delivery channel is
//! pluggable; the default sender logs it for local development). The database
//! never sees the raw code.
//!
//! ## Authorization
//!
//! Every privileged operation (creating students, creating users) resolves
//! the caller from a validated `Authorization: Bearer` token and passes it
//! through a single role gate before touching storage. Roles are a closed
//! set: `ADMIN`, `ADVISOR`, `STUDENT`.

pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
