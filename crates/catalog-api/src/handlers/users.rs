//! User API handlers
//!
//! Author: hephaex@gmail.com

use super::parse_id;
use crate::auth::AuthenticatedUser;
use crate::error::{ApiResponse, AppError, UserEnvelope, UserListEnvelope, ValidatedJson};
use crate::services::{Pagination, UpdateUserRequest};
use crate::state::AppState;
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    response::IntoResponse,
    Extension,
};
use std::sync::Arc;

/// Get the caller's own profile
#[utoipa::path(
    get,
    path = "/api/v1/users/profile",
    tag = "users",
    responses(
        (status = 200, description = "Profile retrieved", body = UserEnvelope),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 404, description = "User no longer exists", body = crate::error::ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, AppError> {
    let profile = state.users.get_user(user.user_id).await?;
    Ok(ApiResponse::ok("Profile retrieved successfully", profile))
}

/// Update the caller's own profile
#[utoipa::path(
    put,
    path = "/api/v1/users/profile",
    tag = "users",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserEnvelope),
        (status = 400, description = "Invalid input or username taken", body = crate::error::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let profile = state.users.update_profile(user.user_id, request).await?;
    Ok(ApiResponse::ok("Profile updated successfully", profile))
}

/// List users
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "users",
    params(Pagination),
    responses(
        (status = 200, description = "Users retrieved", body = UserListEnvelope),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    query: Result<Query<Pagination>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(page) = query?;
    let users = state.users.list_users(page).await?;
    Ok(ApiResponse::ok("Users retrieved successfully", users))
}

/// Get a user by id
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "users",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User retrieved", body = UserEnvelope),
        (status = 400, description = "Invalid user ID", body = crate::error::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, "user")?;
    let user = state.users.get_user(id).await?;
    Ok(ApiResponse::ok("User retrieved successfully", user))
}

/// Delete a user (soft delete)
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    tag = "users",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted; envelope without data"),
        (status = 400, description = "Invalid user ID", body = crate::error::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, "user")?;
    state.users.delete_user(id).await?;
    tracing::info!(user_id = %id, deleted_by = %caller.user_id, "User deleted via API");
    Ok(ApiResponse::message("User deleted successfully"))
}
