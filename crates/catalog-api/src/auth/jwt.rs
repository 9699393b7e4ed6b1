//! JWT token generation and validation
//!
//! Implements bearer tokens signed with HMAC-SHA256.
//! Access tokens carry the caller's identity claims and expire after a
//! configurable lifetime. There is no revocation: a token stays valid
//! until `exp`.

use catalog_core::AuthConfig;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use uuid::Uuid;

/// JWT Claims structure containing user information
///
/// These claims are embedded in the access token and extracted during validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user ID
    pub sub: String,
    /// User's email address
    pub email: String,
    /// User's role (user, admin)
    pub role: String,
    /// Issued at timestamp (Unix epoch seconds)
    pub iat: u64,
    /// Expiration timestamp (Unix epoch seconds)
    pub exp: u64,
}

/// JWT token generation and validation errors
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Failed to encode JWT: {0}")]
    EncodingError(#[from] jsonwebtoken::errors::Error),

    #[error("Malformed token")]
    Malformed,

    #[error("Token has expired")]
    Expired,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("System time error: {0}")]
    SystemTimeError(#[from] std::time::SystemTimeError),
}

/// JWT Configuration
///
/// Built once at startup and shared through application state.
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret key for HMAC signing
    pub secret: String,
    /// Access token lifetime in seconds
    pub expiration_secs: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self::from(&AuthConfig::default())
    }
}

impl From<&AuthConfig> for JwtConfig {
    fn from(auth: &AuthConfig) -> Self {
        Self {
            secret: auth.jwt_secret.clone(),
            expiration_secs: auth.jwt_expiration_secs,
        }
    }
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("expiration_secs", &self.expiration_secs)
            .finish()
    }
}

fn now_secs() -> Result<u64, JwtError> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs())
}

/// Generate a JWT access token for an authenticated user
///
/// # Arguments
///
/// * `config` - JWT configuration containing secret and lifetime
/// * `user_id` - Unique user identifier (UUID)
/// * `email` - User's email address
/// * `role` - User's role
///
/// # Example
///
/// ```no_run
/// use catalog_api::auth::jwt::{generate_access_token, JwtConfig};
/// use uuid::Uuid;
///
/// let config = JwtConfig::default();
/// let token = generate_access_token(&config, Uuid::new_v4(), "jane@example.com", "user")
///     .expect("Failed to generate token");
/// ```
pub fn generate_access_token(
    config: &JwtConfig,
    user_id: Uuid,
    email: &str,
    role: &str,
) -> Result<String, JwtError> {
    let now = now_secs()?;

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        role: role.to_string(),
        iat: now,
        exp: now.saturating_add(config.expiration_secs),
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )?;

    Ok(token)
}

/// Validate a JWT access token and extract claims
///
/// The signature is checked before anything else, so a token with a
/// tampered signature always reports `InvalidSignature`. Expiry is then
/// checked against the wall clock with no leeway; a token whose `exp`
/// equals the current second is already expired.
pub fn validate_access_token(config: &JwtConfig, token: &str) -> Result<Claims, JwtError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.leeway = 0;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::InvalidSignature => JwtError::InvalidSignature,
        _ => JwtError::Malformed,
    })?;

    if now_secs()? >= token_data.claims.exp {
        return Err(JwtError::Expired);
    }

    Ok(token_data.claims)
}
