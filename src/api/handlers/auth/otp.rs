//! OTP login endpoints.

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use sqlx::PgPool;
use std::sync::Arc;

use super::challenge;
use super::error::error_response;
use super::identity::PgIdentityResolver;
use super::rate_limit::{RateLimitAction, RateLimitDecision};
use super::state::AuthState;
use super::store::PgVerificationStore;
use super::types::{LoginResponse, SendOtpRequest, VerifyOtpRequest};
use super::utils::{extract_client_ip, normalize_email, valid_email};

/// Step 1: store a hashed one-time code and queue it for delivery.
#[utoipa::path(
    post,
    path = "/v1/auth/login/send-otp",
    request_body = SendOtpRequest,
    responses(
        (status = 204, description = "OTP stored and queued for delivery"),
        (status = 400, description = "Missing or invalid payload", body = String),
        (status = 404, description = "Unknown subject", body = String),
        (status = 429, description = "Rate limited", body = String)
    ),
    tag = "auth"
)]
pub async fn send_otp(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<SendOtpRequest>>,
) -> impl IntoResponse {
    let request: SendOtpRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        return (StatusCode::BAD_REQUEST, "Invalid email".to_string()).into_response();
    }

    // Rate limits are enforced before any identity or hashing work.
    let client_ip = extract_client_ip(&headers);
    if auth_state
        .rate_limiter()
        .check_ip(client_ip.as_deref(), RateLimitAction::SendOtp)
        == RateLimitDecision::Limited
    {
        return (StatusCode::TOO_MANY_REQUESTS, "Rate limited".to_string()).into_response();
    }
    if auth_state
        .rate_limiter()
        .check_email(&email, RateLimitAction::SendOtp)
        == RateLimitDecision::Limited
    {
        return (StatusCode::TOO_MANY_REQUESTS, "Rate limited".to_string()).into_response();
    }

    let store = PgVerificationStore::new(&pool);
    let identities = PgIdentityResolver::new(&pool);
    match challenge::send_challenge(&auth_state, &store, &identities, &email).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(&err),
    }
}

/// Step 2: check the submitted code and issue a signed login token.
#[utoipa::path(
    post,
    path = "/v1/auth/login/verify-otp",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "Login token issued", body = LoginResponse),
        (status = 400, description = "Missing or invalid payload", body = String),
        (status = 401, description = "No challenge, expired, or wrong OTP", body = String),
        (status = 404, description = "Unknown subject", body = String),
        (status = 429, description = "Rate limited", body = String)
    ),
    tag = "auth"
)]
pub async fn verify_otp(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<VerifyOtpRequest>>,
) -> impl IntoResponse {
    let request: VerifyOtpRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        return (StatusCode::BAD_REQUEST, "Invalid email".to_string()).into_response();
    }

    let otp = request.otp.trim();
    if otp.is_empty() {
        return (StatusCode::BAD_REQUEST, "Missing OTP".to_string()).into_response();
    }

    let client_ip = extract_client_ip(&headers);
    if auth_state
        .rate_limiter()
        .check_ip(client_ip.as_deref(), RateLimitAction::VerifyOtp)
        == RateLimitDecision::Limited
    {
        return (StatusCode::TOO_MANY_REQUESTS, "Rate limited".to_string()).into_response();
    }
    if auth_state
        .rate_limiter()
        .check_email(&email, RateLimitAction::VerifyOtp)
        == RateLimitDecision::Limited
    {
        return (StatusCode::TOO_MANY_REQUESTS, "Rate limited".to_string()).into_response();
    }

    let store = PgVerificationStore::new(&pool);
    let identities = PgIdentityResolver::new(&pool);
    match challenge::verify_challenge(&auth_state, &store, &identities, &email, otp).await {
        Ok(credential) => (
            StatusCode::OK,
            Json(LoginResponse {
                token: credential.token,
                role: credential.role,
            }),
        )
            .into_response(),
        Err(err) => error_response(&err),
    }
}
