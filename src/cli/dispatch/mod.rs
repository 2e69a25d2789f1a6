//! Command-line argument dispatch and server initialization.
//!
//! This module parses validated CLI arguments and maps them to the appropriate
//! action, such as starting the API server with its full configuration state.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::auth;
use anyhow::{Context, Result};

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>("dsn")
        .cloned()
        .context("missing required argument: --dsn")?;

    let auth_opts = auth::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn,
        token_key_path: auth_opts.token_key_path,
        token_kid: auth_opts.token_kid,
        token_issuer: auth_opts.token_issuer,
        token_audience: auth_opts.token_audience,
        token_ttl_seconds: auth_opts.token_ttl_seconds,
        otp_ttl_seconds: auth_opts.otp_ttl_seconds,
        otp_max_attempts: auth_opts.otp_max_attempts,
        frontend_base_url: auth_opts.frontend_base_url,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_action_from_matches() -> Result<()> {
        let matches = crate::cli::commands::new().get_matches_from(vec![
            "aims",
            "--port",
            "9090",
            "--dsn",
            "postgres://user@localhost:5432/aims",
            "--token-key-path",
            "/tmp/aims-key.pem",
        ]);
        let action = handler(&matches)?;
        let Action::Server(args) = action;
        assert_eq!(args.port, 9090);
        assert_eq!(args.dsn, "postgres://user@localhost:5432/aims");
        assert_eq!(args.token_key_path, "/tmp/aims-key.pem");
        Ok(())
    }

    #[test]
    fn token_key_path_required() {
        temp_env::with_vars([("AIMS_TOKEN_KEY_PATH", None::<&str>)], || {
            let command = crate::cli::commands::new();
            let result = command.try_get_matches_from(vec![
                "aims",
                "--dsn",
                "postgres://user@localhost:5432/aims",
            ]);
            assert_eq!(
                result.map(|_| ()).map_err(|e| e.kind()),
                Err(clap::error::ErrorKind::MissingRequiredArgument)
            );
        });
    }
}
