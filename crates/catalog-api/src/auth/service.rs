//! Authentication service layer
//!
//! Registration and login on top of the credential store. Password hashing
//! runs on the blocking pool; tokens are issued with the shared `JwtConfig`.

use super::jwt::{generate_access_token, JwtConfig};
use super::password::{hash_password, validate_password_length, verify_password};
use crate::audit::{audit_log, AuditContext, AuditEvent};
use crate::error::{trimmed, AppError};
use catalog_core::{CatalogError, NewUser, User, UserRepository, UserRole};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// User registration request
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(email(message = "must be a valid email address"))]
    #[serde(deserialize_with = "trimmed")]
    pub email: String,
    #[validate(length(min = 3, max = 50, message = "must be between 3 and 50 characters"))]
    #[serde(deserialize_with = "trimmed")]
    pub username: String,
    #[validate(length(min = 6, message = "must be at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "is required"))]
    #[serde(deserialize_with = "trimmed")]
    pub first_name: String,
    #[validate(length(min = 1, message = "is required"))]
    #[serde(deserialize_with = "trimmed")]
    pub last_name: String,
}

/// User login request
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "must be a valid email address"))]
    #[serde(deserialize_with = "trimmed")]
    pub email: String,
    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
}

/// Public view of a user; never carries the password hash
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role.to_string(),
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

/// Successful login payload
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

/// Emails are compared case-insensitively by storing them lowercased
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Conflict message for a unique field
pub(crate) fn conflict_message(field: &str) -> String {
    match field {
        "email" => "email already registered".to_string(),
        "username" => "username already taken".to_string(),
        other => format!("{other} already exists"),
    }
}

const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    jwt: JwtConfig,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, jwt: JwtConfig) -> Self {
        Self { users, jwt }
    }

    /// Register a new user with the `user` role
    ///
    /// The email/username lookups only short-circuit the common case; two
    /// concurrent registrations can both pass them, and the loser is still
    /// turned away by the store's unique constraint.
    pub async fn register(
        &self,
        request: RegisterRequest,
        ctx: &AuditContext,
    ) -> Result<UserResponse, AppError> {
        let email = normalize_email(&request.email);
        let username = request.username;

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(self.registration_failed(&email, "email", ctx));
        }
        if self.users.find_by_username(&username).await?.is_some() {
            return Err(self.registration_failed(&email, "username", ctx));
        }

        validate_password_length(&request.password).map_err(AppError::Validation)?;
        let password = request.password;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password)).await??;

        let created = self
            .users
            .create(NewUser {
                email: email.clone(),
                username,
                password_hash,
                first_name: request.first_name,
                last_name: request.last_name,
                role: UserRole::User,
            })
            .await;

        let user = match created {
            Ok(user) => user,
            Err(CatalogError::DuplicateKey { field }) => {
                return Err(self.registration_failed(&email, &field, ctx));
            }
            Err(e) => return Err(e.into()),
        };

        audit_log(&AuditEvent::RegistrationSuccess {
            user_id: user.id,
            email: user.email.clone(),
            role: user.role.to_string(),
            ip_address: ctx.ip_address.clone(),
            user_agent: ctx.user_agent.clone(),
        });
        tracing::info!(user_id = %user.id, "User registered");

        Ok(user.into())
    }

    fn registration_failed(&self, email: &str, field: &str, ctx: &AuditContext) -> AppError {
        let reason = conflict_message(field);
        audit_log(&AuditEvent::RegistrationFailure {
            email: email.to_string(),
            reason: reason.clone(),
            ip_address: ctx.ip_address.clone(),
            user_agent: ctx.user_agent.clone(),
        });
        AppError::Conflict(reason)
    }

    /// Login with email and password
    ///
    /// Unknown email and wrong password produce the same error. The
    /// deactivated check runs only after the password has verified.
    pub async fn login(
        &self,
        request: LoginRequest,
        ctx: &AuditContext,
    ) -> Result<LoginResponse, AppError> {
        let email = normalize_email(&request.email);

        let Some(user) = self.users.find_by_email(&email).await? else {
            return Err(self.login_failed(&email, INVALID_CREDENTIALS, ctx));
        };

        let password = request.password;
        let stored_hash = user.password_hash.clone();
        let valid =
            tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash)).await??;

        if !valid {
            return Err(self.login_failed(&email, INVALID_CREDENTIALS, ctx));
        }

        if !user.is_active {
            return Err(self.login_failed(&email, "user account is deactivated", ctx));
        }

        let token = generate_access_token(&self.jwt, user.id, &user.email, user.role.as_str())?;

        audit_log(&AuditEvent::LoginSuccess {
            user_id: user.id,
            email: user.email.clone(),
            ip_address: ctx.ip_address.clone(),
            user_agent: ctx.user_agent.clone(),
        });

        Ok(LoginResponse {
            token,
            user: user.into(),
        })
    }

    fn login_failed(&self, email: &str, reason: &str, ctx: &AuditContext) -> AppError {
        audit_log(&AuditEvent::LoginFailure {
            email: email.to_string(),
            reason: reason.to_string(),
            ip_address: ctx.ip_address.clone(),
            user_agent: ctx.user_agent.clone(),
        });
        AppError::Unauthorized(reason.to_string())
    }
}
