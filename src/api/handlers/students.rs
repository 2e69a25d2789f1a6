//! Student record endpoints.
//!
//! Creation and listing are privileged: the caller is resolved from the
//! bearer token and must clear the role gate before any query runs.

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

use super::auth::error::error_response;
use super::auth::identity::{PgIdentityResolver, Role};
use super::auth::principal::require_identity;
use super::auth::role::require_any_role;
use super::auth::state::AuthState;
use super::auth::types::{CreateStudentRequest, StudentResponse};

#[utoipa::path(
    post,
    path = "/v1/students",
    request_body = CreateStudentRequest,
    responses(
        (status = 201, description = "Student created", body = StudentResponse),
        (status = 400, description = "Missing or invalid payload", body = String),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Caller lacks the required role", body = String)
    ),
    tag = "records"
)]
pub async fn create_student(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<CreateStudentRequest>>,
) -> impl IntoResponse {
    let request: CreateStudentRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    let name = request.name.trim();
    if name.is_empty() {
        return (StatusCode::BAD_REQUEST, "Missing name".to_string()).into_response();
    }

    let identities = PgIdentityResolver::new(&pool);
    let caller = match require_identity(&headers, auth_state.signer(), &identities).await {
        Ok(caller) => caller,
        Err(status) => return status.into_response(),
    };

    // Gate before any write.
    if let Err(err) = require_any_role(&caller, &[Role::Admin, Role::Advisor]) {
        return error_response(&err);
    }

    match insert_student(&pool, name).await {
        Ok(student) => (StatusCode::CREATED, Json(student)).into_response(),
        Err(err) => {
            error!("Failed to create student: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create student".to_string(),
            )
                .into_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/v1/students",
    responses(
        (status = 200, description = "All students", body = [StudentResponse]),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Caller lacks the required role", body = String)
    ),
    tag = "records"
)]
pub async fn list_students(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
) -> impl IntoResponse {
    let identities = PgIdentityResolver::new(&pool);
    let caller = match require_identity(&headers, auth_state.signer(), &identities).await {
        Ok(caller) => caller,
        Err(status) => return status.into_response(),
    };

    if let Err(err) = require_any_role(&caller, &[Role::Admin, Role::Advisor]) {
        return error_response(&err);
    }

    match select_students(&pool).await {
        Ok(students) => (StatusCode::OK, Json(students)).into_response(),
        Err(err) => {
            error!("Failed to list students: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to list students".to_string(),
            )
                .into_response()
        }
    }
}

async fn insert_student(pool: &PgPool, name: &str) -> Result<StudentResponse> {
    let query = "INSERT INTO students (name) VALUES ($1) RETURNING id, name";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(name)
        .fetch_one(pool)
        .instrument(span)
        .await
        .context("failed to insert student")?;

    let id: Uuid = row.get("id");
    Ok(StudentResponse {
        id: id.to_string(),
        name: row.get("name"),
    })
}

async fn select_students(pool: &PgPool) -> Result<Vec<StudentResponse>> {
    let query = "SELECT id, name FROM students ORDER BY created_at";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let rows = sqlx::query(query)
        .fetch_all(pool)
        .instrument(span)
        .await
        .context("failed to list students")?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let id: Uuid = row.get("id");
            StudentResponse {
                id: id.to_string(),
                name: row.get("name"),
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::super::auth::delivery::LogOtpSender;
    use super::super::auth::rate_limit::NoopRateLimiter;
    use super::super::auth::secret::SecretHasher;
    use super::super::auth::state::{AuthConfig, AuthState};
    use super::super::auth::token;
    use super::{CreateStudentRequest, create_student, list_students};
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
    async fn create_student_missing_payload() -> Result<()> {
        let response = create_student(
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
    async fn create_student_blank_name() -> Result<()> {
        let response = create_student(
            HeaderMap::new(),
            Extension(lazy_pool()?),
            Extension(auth_state()),
            Some(Json(CreateStudentRequest {
                name: "  ".to_string(),
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn create_student_requires_bearer_token() -> Result<()> {
        let response = create_student(
            HeaderMap::new(),
            Extension(lazy_pool()?),
            Extension(auth_state()),
            Some(Json(CreateStudentRequest {
                name: "Ada Lovelace".to_string(),
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        Ok(())
    }

    #[tokio::test]
    async fn list_students_requires_bearer_token() -> Result<()> {
        let response = list_students(
            HeaderMap::new(),
            Extension(lazy_pool()?),
            Extension(auth_state()),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        Ok(())
    }
}
