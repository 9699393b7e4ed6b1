//! Catalog Core - Domain models, storage traits, and shared types
//!
//! This crate defines the core abstractions used by the catalog service:
//! - User identities and products
//! - Common error types
//! - Repository traits for the credential and product stores
//! - PostgreSQL and in-memory store implementations
//! - Configuration management

pub mod config;
pub mod memory;
pub mod store;

pub use config::{AppConfig, AuthConfig, ConfigError, DatabaseConfig, StorageBackend};
pub use memory::{MemoryProductStore, MemoryUserStore};
pub use store::{PgProductStore, PgUserStore};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for storage operations
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Duplicate value for unique field: {field}")]
    DuplicateKey { field: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CatalogError {
    pub fn duplicate(field: impl Into<String>) -> Self {
        Self::DuplicateKey {
            field: field.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;

// ============================================================================
// Identities
// ============================================================================

/// Role carried by every identity.
///
/// Only `User` is ever issued at registration. `Admin` exists so the claim
/// round-trips, but no authorization decision branches on it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = CatalogError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(CatalogError::ValidationError(format!(
                "unknown role: {other}"
            ))),
        }
    }
}

/// Stored user identity
///
/// `password_hash` is an opaque PHC string and is never serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data needed to create a user; the store assigns id and timestamps.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
}

impl NewUser {
    pub(crate) fn into_user(self) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            email: self.email,
            username: self.username,
            password_hash: self.password_hash,
            first_name: self.first_name,
            last_name: self.last_name,
            role: self.role,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

// ============================================================================
// Products
// ============================================================================

/// Product owned by exactly one user
///
/// `user_id` is assigned at creation and never changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock: i32,
    pub category: String,
    pub sku: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Whether `user_id` is the recorded owner of this product
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock: i32,
    pub category: String,
    pub sku: String,
    pub user_id: Uuid,
}

impl NewProduct {
    pub(crate) fn into_product(self) -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4(),
            name: self.name,
            description: self.description,
            price: self.price,
            stock: self.stock,
            category: self.category,
            sku: self.sku,
            user_id: self.user_id,
            created_at: now,
            updated_at: now,
        }
    }
}

// ============================================================================
// Repository Traits
// ============================================================================

/// Credential store
///
/// Lookups are exact-match; callers normalize before storing and querying.
/// Uniqueness of email and username is enforced here, not by callers.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new user, failing with `DuplicateKey` on email/username clash
    async fn create(&self, user: NewUser) -> Result<User>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    /// List users ordered by creation time
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<User>>;

    /// Write back mutable profile fields; `NotFound` if the user is gone
    async fn update(&self, user: &User) -> Result<User>;

    /// Soft delete; `NotFound` if the user is gone
    async fn delete(&self, id: Uuid) -> Result<()>;
}

/// Product store
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Persist a new product, failing with `DuplicateKey` on SKU clash
    async fn create(&self, product: NewProduct) -> Result<Product>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>>;

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Product>>;

    async fn list_by_category(
        &self,
        category: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Product>>;

    async fn list_by_owner(&self, user_id: Uuid, limit: i64, offset: i64)
        -> Result<Vec<Product>>;

    /// Write back mutable fields; the owner is never rewritten
    async fn update(&self, product: &Product) -> Result<Product>;

    /// Soft delete; `NotFound` if the product is gone
    async fn delete(&self, id: Uuid) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_role_parse() {
        assert_eq!("user".parse::<UserRole>().unwrap(), UserRole::User);
        assert_eq!("ADMIN".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert!("superuser".parse::<UserRole>().is_err());
        assert_eq!(UserRole::default(), UserRole::User);
    }

    #[test]
    fn test_user_serialization_hides_password_hash() {
        let user = NewUser {
            email: "a@x.com".to_string(),
            username: "a".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            first_name: "A".to_string(),
            last_name: "X".to_string(),
            role: UserRole::User,
        }
        .into_user();

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("argon2id"));
        assert!(json.contains("\"role\":\"user\""));
        assert!(user.is_active);
    }

    #[test]
    fn test_product_ownership() {
        let owner = Uuid::new_v4();
        let product = NewProduct {
            name: "Widget".to_string(),
            description: String::new(),
            price: 9.99,
            stock: 3,
            category: "tools".to_string(),
            sku: "W-1".to_string(),
            user_id: owner,
        }
        .into_product();

        assert!(product.is_owned_by(owner));
        assert!(!product.is_owned_by(Uuid::new_v4()));
    }
}
