//! Token-signing and OTP arguments for the server command.

use anyhow::{Context, Result};
use clap::{Arg, Command};

pub const ARG_TOKEN_KEY_PATH: &str = "token-key-path";
pub const ARG_TOKEN_KID: &str = "token-kid";
pub const ARG_TOKEN_ISSUER: &str = "token-issuer";
pub const ARG_TOKEN_AUDIENCE: &str = "token-audience";
pub const ARG_TOKEN_TTL_SECONDS: &str = "token-ttl-seconds";
pub const ARG_OTP_TTL_SECONDS: &str = "otp-ttl-seconds";
pub const ARG_OTP_MAX_ATTEMPTS: &str = "otp-max-attempts";
pub const ARG_FRONTEND_BASE_URL: &str = "frontend-base-url";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_TOKEN_KEY_PATH)
                .long(ARG_TOKEN_KEY_PATH)
                .help("Path to the RSA private key (PEM) used to sign login tokens")
                .env("AIMS_TOKEN_KEY_PATH")
                .required(true),
        )
        .arg(
            Arg::new(ARG_TOKEN_KID)
                .long(ARG_TOKEN_KID)
                .help("Key id embedded in the token header")
                .env("AIMS_TOKEN_KID")
                .default_value("aims-1"),
        )
        .arg(
            Arg::new(ARG_TOKEN_ISSUER)
                .long(ARG_TOKEN_ISSUER)
                .help("Issuer claim for login tokens")
                .env("AIMS_TOKEN_ISSUER")
                .default_value("https://aims.example.edu"),
        )
        .arg(
            Arg::new(ARG_TOKEN_AUDIENCE)
                .long(ARG_TOKEN_AUDIENCE)
                .help("Audience claim for login tokens")
                .env("AIMS_TOKEN_AUDIENCE")
                .default_value("aims"),
        )
        .arg(
            Arg::new(ARG_TOKEN_TTL_SECONDS)
                .long(ARG_TOKEN_TTL_SECONDS)
                .help("Login token TTL in seconds")
                .env("AIMS_TOKEN_TTL_SECONDS")
                .default_value("43200")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new(ARG_OTP_TTL_SECONDS)
                .long(ARG_OTP_TTL_SECONDS)
                .help("OTP challenge TTL in seconds")
                .env("AIMS_OTP_TTL_SECONDS")
                .default_value("600")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new(ARG_OTP_MAX_ATTEMPTS)
                .long(ARG_OTP_MAX_ATTEMPTS)
                .help("Failed verification attempts before an OTP challenge is discarded")
                .env("AIMS_OTP_MAX_ATTEMPTS")
                .default_value("5")
                .value_parser(clap::value_parser!(i32)),
        )
        .arg(
            Arg::new(ARG_FRONTEND_BASE_URL)
                .long(ARG_FRONTEND_BASE_URL)
                .help("Frontend base URL allowed by CORS")
                .env("AIMS_FRONTEND_BASE_URL")
                .default_value("http://localhost:5173"),
        )
}

#[derive(Debug)]
pub struct Options {
    pub token_key_path: String,
    pub token_kid: String,
    pub token_issuer: String,
    pub token_audience: String,
    pub token_ttl_seconds: i64,
    pub otp_ttl_seconds: i64,
    pub otp_max_attempts: i32,
    pub frontend_base_url: String,
}

impl Options {
    /// Extract auth options from parsed matches.
    ///
    /// # Errors
    /// Returns an error if a required argument is missing.
    pub fn parse(matches: &clap::ArgMatches) -> Result<Self> {
        Ok(Self {
            token_key_path: matches
                .get_one::<String>(ARG_TOKEN_KEY_PATH)
                .cloned()
                .context("missing required argument: --token-key-path")?,
            token_kid: matches
                .get_one::<String>(ARG_TOKEN_KID)
                .cloned()
                .unwrap_or_else(|| "aims-1".to_string()),
            token_issuer: matches
                .get_one::<String>(ARG_TOKEN_ISSUER)
                .cloned()
                .unwrap_or_else(|| "https://aims.example.edu".to_string()),
            token_audience: matches
                .get_one::<String>(ARG_TOKEN_AUDIENCE)
                .cloned()
                .unwrap_or_else(|| "aims".to_string()),
            token_ttl_seconds: matches
                .get_one::<i64>(ARG_TOKEN_TTL_SECONDS)
                .copied()
                .unwrap_or(43_200),
            otp_ttl_seconds: matches
                .get_one::<i64>(ARG_OTP_TTL_SECONDS)
                .copied()
                .unwrap_or(600),
            otp_max_attempts: matches
                .get_one::<i32>(ARG_OTP_MAX_ATTEMPTS)
                .copied()
                .unwrap_or(5),
            frontend_base_url: matches
                .get_one::<String>(ARG_FRONTEND_BASE_URL)
                .cloned()
                .unwrap_or_else(|| "http://localhost:5173".to_string()),
        })
    }
}
