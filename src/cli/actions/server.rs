use crate::api::{
    self,
    handlers::auth::{
        AuthConfig, AuthState, LogOtpSender, NoopRateLimiter, SecretHasher, TokenSigner,
    },
};
use anyhow::{Context, Result};
use secrecy::{ExposeSecret, SecretString};
use std::{fs, sync::Arc};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub token_key_path: String,
    pub token_kid: String,
    pub token_issuer: String,
    pub token_audience: String,
    pub token_ttl_seconds: i64,
    pub otp_ttl_seconds: i64,
    pub otp_max_attempts: i32,
    pub frontend_base_url: String,
}

/// Execute the server action.
///
/// # Errors
/// Returns an error if the signing key cannot be loaded or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    // A missing or unparsable signing key is fatal at startup, never a
    // per-request error.
    let key_pem = SecretString::from(
        fs::read_to_string(&args.token_key_path)
            .with_context(|| format!("Failed to read signing key: {}", args.token_key_path))?,
    );

    let signer = TokenSigner::from_pem(
        key_pem.expose_secret().as_bytes(),
        args.token_kid,
        args.token_issuer,
        args.token_audience,
        args.token_ttl_seconds,
    )
    .context("Failed to load token signing key")?;

    let config = AuthConfig::new()
        .with_otp_ttl_seconds(args.otp_ttl_seconds)
        .with_max_verify_attempts(args.otp_max_attempts);

    let state = AuthState::new(
        config,
        SecretHasher::new(),
        signer,
        Arc::new(NoopRateLimiter),
        Arc::new(LogOtpSender),
    );

    api::new(args.port, args.dsn, &args.frontend_base_url, state).await
}
