//! Authentication API handlers
//!
//! Provides HTTP endpoints for registration and login.
//!
//! Author: hephaex@gmail.com

use crate::audit::AuditContext;
use crate::auth::{LoginRequest, RegisterRequest};
use crate::error::{ApiResponse, AppError, LoginEnvelope, UserEnvelope, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use std::sync::Arc;

/// Register a new user account
///
/// New users always receive the `user` role. The email is stored lowercased.
///
/// # Responses
///
/// * `201 Created` - User registered, returned without password
/// * `400 Bad Request` - Invalid input, or email/username already in use
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = UserEnvelope),
        (status = 400, description = "Invalid input or duplicate account", body = crate::error::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::error::ErrorResponse),
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = AuditContext::from_headers(&headers);
    let user = state.auth.register(request, &ctx).await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok("User registered successfully", user),
    ))
}

/// Login with email and password
///
/// # Responses
///
/// * `200 OK` - Returns a bearer token and the user
/// * `401 Unauthorized` - Invalid credentials or deactivated account
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginEnvelope),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 401, description = "Invalid credentials or deactivated account", body = crate::error::ErrorResponse),
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = AuditContext::from_headers(&headers);
    let response = state.auth.login(request, &ctx).await?;

    Ok(ApiResponse::ok("Login successful", response))
}
