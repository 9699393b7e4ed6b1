//! Authentication middleware for protecting routes
//!
//! Extracts and validates the bearer token from the Authorization header.
//! On success, adds the caller's identity to request extensions; otherwise
//! the request is rejected with 401 before any handler runs.

use super::jwt::{validate_access_token, Claims, JwtConfig, JwtError};
use crate::audit::{audit_log, AuditContext, AuditEvent};
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Authenticated user information extracted from the token
///
/// Handlers read it with `Extension<AuthenticatedUser>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    /// User's unique identifier
    pub user_id: Uuid,
    /// User's email address
    pub email: String,
    /// User's role (carried, never checked)
    pub role: String,
}

impl TryFrom<Claims> for AuthenticatedUser {
    type Error = JwtError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| JwtError::Malformed)?;
        Ok(Self {
            user_id,
            email: claims.email,
            role: claims.role,
        })
    }
}

/// Authentication middleware errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authorization header required")]
    MissingHeader,

    #[error("Invalid authorization header format")]
    MalformedHeader,

    #[error("Invalid token: {0}")]
    InvalidToken(#[from] JwtError),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match self {
            AuthError::InvalidToken(_) => "Invalid or expired token".to_string(),
            other => other.to_string(),
        };
        AppError::Unauthorized(message).into_response()
    }
}

/// Resolve an Authorization header value to the caller's identity
///
/// The header must be exactly `Bearer <token>`: two space-separated parts,
/// the first literally `Bearer`.
pub fn authenticate(
    config: &JwtConfig,
    header: Option<&HeaderValue>,
) -> Result<AuthenticatedUser, AuthError> {
    let value = header
        .ok_or(AuthError::MissingHeader)?
        .to_str()
        .map_err(|_| AuthError::MalformedHeader)?;

    let token = match value.split(' ').collect::<Vec<_>>().as_slice() {
        ["Bearer", token] => *token,
        _ => return Err(AuthError::MalformedHeader),
    };

    let claims = validate_access_token(config, token)?;
    Ok(AuthenticatedUser::try_from(claims)?)
}

/// Authentication middleware that requires a valid bearer token
///
/// # Usage
///
/// ```ignore
/// use axum::{Router, routing::get, middleware};
/// use catalog_api::auth::middleware::auth_middleware;
///
/// let app = Router::new()
///     .route("/protected", get(protected_handler))
///     .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));
/// ```
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = match authenticate(&state.jwt, request.headers().get(header::AUTHORIZATION)) {
        Ok(user) => user,
        Err(e) => {
            if let AuthError::InvalidToken(reason) = &e {
                let ctx = AuditContext::from_headers(request.headers());
                audit_log(&AuditEvent::InvalidToken {
                    ip_address: ctx.ip_address,
                    user_agent: ctx.user_agent,
                    reason: reason.to_string(),
                });
            }
            tracing::debug!(error = %e, path = %request.uri().path(), "Rejected request");
            return Err(e);
        }
    };

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}
