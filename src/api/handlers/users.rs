//! User account endpoints.
//!
//! Accounts are pre-provisioned here by an admin; login only ever works
//! against identities created through this path.

use anyhow::{Context, Result};
use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use sqlx::{PgPool, Row};
use std::sync::Arc;
use tracing::{Instrument, error};
use uuid::Uuid;

use super::auth::error::{AuthError, error_response};
use super::auth::identity::{PgIdentityResolver, Role};
use super::auth::principal::require_identity;
use super::auth::role::require_role;
use super::auth::state::AuthState;
use super::auth::types::{CreateUserRequest, UserResponse};
use super::auth::utils::{is_unique_violation, normalize_email, valid_email};

/// Outcome when provisioning a new user account.
#[derive(Debug)]
enum CreateUserOutcome {
    Created(UserResponse),
    Conflict,
}

#[utoipa::path(
    post,
    path = "/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Missing or invalid payload", body = String),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Caller is not an admin", body = String),
        (status = 409, description = "A user with this email already exists", body = String)
    ),
    tag = "records"
)]
pub async fn create_user(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<CreateUserRequest>>,
) -> impl IntoResponse {
    let request: CreateUserRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        return (StatusCode::BAD_REQUEST, "Invalid email".to_string()).into_response();
    }

    let identities = PgIdentityResolver::new(&pool);
    let caller = match require_identity(&headers, auth_state.signer(), &identities).await {
        Ok(caller) => caller,
        Err(status) => return status.into_response(),
    };

    // Only admins provision accounts; the gate runs before the insert.
    if let Err(err) = require_role(&caller, Role::Admin) {
        return error_response(&err);
    }

    match insert_user(&pool, &email, request.role).await {
        Ok(CreateUserOutcome::Created(user)) => (StatusCode::CREATED, Json(user)).into_response(),
        Ok(CreateUserOutcome::Conflict) => error_response(&AuthError::AlreadyExists),
        Err(err) => {
            error!("Failed to create user: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create user".to_string(),
            )
                .into_response()
        }
    }
}

async fn insert_user(pool: &PgPool, email: &str, role: Role) -> Result<CreateUserOutcome> {
    let query = r"
        INSERT INTO users (email, role)
        VALUES ($1, $2)
        RETURNING id, email, role, active
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(email)
        .bind(role.as_str())
        .fetch_one(pool)
        .instrument(span)
        .await;

    let row = match row {
        Ok(row) => row,
        Err(err) if is_unique_violation(&err) => return Ok(CreateUserOutcome::Conflict),
        Err(err) => return Err(err).context("failed to insert user"),
    };

    let id: Uuid = row.get("id");
    Ok(CreateUserOutcome::Created(UserResponse {
        id: id.to_string(),
        email: row.get("email"),
        role,
        active: row.get("active"),
    }))
}

#[cfg(test)]
mod tests {
    use super::super::auth::delivery::LogOtpSender;
    use super::super::auth::identity::Role;
    use super::super::auth::rate_limit::NoopRateLimiter;
    use super::super::auth::secret::SecretHasher;
    use super::super::auth::state::{AuthConfig, AuthState};
    use super::super::auth::token;
    use super::{CreateUserRequest, create_user};
    use anyhow::Result;
    use axum::Json;
    use axum::extract::Extension;
    use axum::http::{HeaderMap, StatusCode};
    use axum::response::IntoResponse;
    use sqlx::postgres::PgPoolOptions;
    use std::sync::Arc;

    fn auth_state() -> Arc<AuthState> {
        Arc::new(AuthState::new(
            AuthConfig::new(),
            SecretHasher::new(),
            token::test_signer(),
            Arc::new(NoopRateLimiter),
            Arc::new(LogOtpSender),
        ))
    }

    fn lazy_pool() -> Result<sqlx::PgPool> {
        Ok(PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?)
    }

    #[tokio::test]
    async fn create_user_missing_payload() -> Result<()> {
        let response = create_user(
            HeaderMap::new(),
            Extension(lazy_pool()?),
            Extension(auth_state()),
            None,
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn create_user_invalid_email() -> Result<()> {
        let response = create_user(
            HeaderMap::new(),
            Extension(lazy_pool()?),
            Extension(auth_state()),
            Some(Json(CreateUserRequest {
                email: "nope".to_string(),
                role: Role::Student,
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn create_user_requires_bearer_token() -> Result<()> {
        let response = create_user(
            HeaderMap::new(),
            Extension(lazy_pool()?),
            Extension(auth_state()),
            Some(Json(CreateUserRequest {
                email: "bob@x.edu".to_string(),
                role: Role::Student,
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        Ok(())
    }
}
