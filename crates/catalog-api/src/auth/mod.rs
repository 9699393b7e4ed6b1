//! Authentication and authorization module
//!
//! This module provides JWT-based authentication with the following components:
//! - Password hashing with Argon2id
//! - Token generation and validation
//! - Middleware that turns a bearer token into an `AuthenticatedUser`
//! - Ownership guard for product mutations
//! - Registration and login service

pub mod jwt;
pub mod middleware;
pub mod ownership;
pub mod password;
pub mod service;

pub use jwt::{generate_access_token, validate_access_token, Claims, JwtConfig, JwtError};
pub use middleware::{auth_middleware, authenticate, AuthError, AuthenticatedUser};
pub use ownership::{ensure_owner, AuthorizationError};
pub use password::{hash_password, validate_password_length, verify_password, PasswordError};
pub use service::{
    normalize_email, AuthService, LoginRequest, LoginResponse, RegisterRequest, UserResponse,
};
