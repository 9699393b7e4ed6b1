//! Product catalog service
//!
//! Reads are public. Creation records the caller as owner; update and delete
//! load the product first, so a missing product is a 404 before ownership is
//! ever checked.
//!
//! Author: hephaex@gmail.com

use super::Pagination;
use crate::audit::{audit_log, AuditContext, AuditEvent};
use crate::auth::{ensure_owner, AuthenticatedUser};
use crate::error::{trimmed, trimmed_opt, AppError};
use crate::auth::UserResponse;
use catalog_core::{CatalogError, NewProduct, Product, ProductRepository, UserRepository};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// New product
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, message = "is required"))]
    #[serde(deserialize_with = "trimmed")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[validate(range(exclusive_min = 0.0, message = "must be greater than 0"))]
    pub price: f64,
    #[serde(default)]
    #[validate(range(min = 0, message = "must not be negative"))]
    pub stock: i32,
    #[validate(length(min = 1, message = "is required"))]
    #[serde(deserialize_with = "trimmed")]
    pub category: String,
    #[validate(length(min = 1, message = "is required"))]
    #[serde(deserialize_with = "trimmed")]
    pub sku: String,
}

/// Product update; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    #[serde(default, deserialize_with = "trimmed_opt")]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(exclusive_min = 0.0, message = "must be greater than 0"))]
    pub price: Option<f64>,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub stock: Option<i32>,
    #[validate(length(min = 1, message = "must not be empty"))]
    #[serde(default, deserialize_with = "trimmed_opt")]
    pub category: Option<String>,
}

/// `GET /products` query parameters
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductListQuery {
    /// Page size, 1 to 100 (default 10)
    pub limit: Option<i64>,
    /// Number of items to skip (default 0)
    pub offset: Option<i64>,
    /// Exact category filter
    pub category: Option<String>,
}

impl ProductListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.limit, self.offset)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock: i32,
    pub category: String,
    pub sku: String,
    /// Owner
    pub user_id: Uuid,
    /// Owner's public profile, on single reads and catalog listings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            price: p.price,
            stock: p.stock,
            category: p.category,
            sku: p.sku,
            user_id: p.user_id,
            user: None,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

fn not_found() -> AppError {
    AppError::NotFound("Product not found".to_string())
}

#[derive(Clone)]
pub struct ProductService {
    products: Arc<dyn ProductRepository>,
    users: Arc<dyn UserRepository>,
}

impl ProductService {
    pub fn new(products: Arc<dyn ProductRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { products, users }
    }

    /// Response with the owner's profile attached; a deleted owner is left out
    async fn with_owner(&self, product: Product) -> Result<ProductResponse, AppError> {
        let owner = self.users.find_by_id(product.user_id).await?;
        let mut response = ProductResponse::from(product);
        response.user = owner.map(UserResponse::from);
        Ok(response)
    }

    pub async fn create(
        &self,
        owner: &AuthenticatedUser,
        request: CreateProductRequest,
    ) -> Result<ProductResponse, AppError> {
        let created = self
            .products
            .create(NewProduct {
                name: request.name,
                description: request.description,
                price: request.price,
                stock: request.stock,
                category: request.category,
                sku: request.sku,
                user_id: owner.user_id,
            })
            .await;

        match created {
            Ok(product) => {
                tracing::info!(product_id = %product.id, owner = %owner.user_id, "Product created");
                Ok(product.into())
            }
            Err(CatalogError::DuplicateKey { .. }) => {
                Err(AppError::Conflict("sku already exists".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn load(&self, id: Uuid) -> Result<Product, AppError> {
        self.products.find_by_id(id).await?.ok_or_else(not_found)
    }

    pub async fn get(&self, id: Uuid) -> Result<ProductResponse, AppError> {
        let product = self.load(id).await?;
        self.with_owner(product).await
    }

    pub async fn list(
        &self,
        page: Pagination,
        category: Option<&str>,
    ) -> Result<Vec<ProductResponse>, AppError> {
        let products = match category.filter(|c| !c.is_empty()) {
            Some(category) => {
                self.products
                    .list_by_category(category, page.limit(), page.offset())
                    .await?
            }
            None => self.products.list(page.limit(), page.offset()).await?,
        };

        let mut responses = Vec::with_capacity(products.len());
        for product in products {
            responses.push(self.with_owner(product).await?);
        }
        Ok(responses)
    }

    pub async fn list_for_owner(
        &self,
        owner: Uuid,
        page: Pagination,
    ) -> Result<Vec<ProductResponse>, AppError> {
        let products = self
            .products
            .list_by_owner(owner, page.limit(), page.offset())
            .await?;
        Ok(products.into_iter().map(ProductResponse::from).collect())
    }

    /// Load, check ownership, then apply the supplied fields
    pub async fn update(
        &self,
        id: Uuid,
        caller: &AuthenticatedUser,
        request: UpdateProductRequest,
        ctx: &AuditContext,
    ) -> Result<ProductResponse, AppError> {
        let mut product = self.load(id).await?;
        self.guard(&product, caller, ctx)?;

        if let Some(name) = request.name {
            product.name = name;
        }
        if let Some(description) = request.description {
            product.description = description;
        }
        if let Some(price) = request.price {
            product.price = price;
        }
        if let Some(stock) = request.stock {
            product.stock = stock;
        }
        if let Some(category) = request.category {
            product.category = category;
        }

        match self.products.update(&product).await {
            Ok(updated) => self.with_owner(updated).await,
            Err(CatalogError::NotFound(_)) => Err(not_found()),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn delete(
        &self,
        id: Uuid,
        caller: &AuthenticatedUser,
        ctx: &AuditContext,
    ) -> Result<(), AppError> {
        let product = self.load(id).await?;
        self.guard(&product, caller, ctx)?;

        match self.products.delete(id).await {
            Ok(()) => {
                tracing::info!(product_id = %id, "Product deleted");
                Ok(())
            }
            Err(CatalogError::NotFound(_)) => Err(not_found()),
            Err(e) => Err(e.into()),
        }
    }

    fn guard(
        &self,
        product: &Product,
        caller: &AuthenticatedUser,
        ctx: &AuditContext,
    ) -> Result<(), AppError> {
        ensure_owner(product, caller).map_err(|e| {
            audit_log(&AuditEvent::AccessDenied {
                user_id: caller.user_id,
                email: caller.email.clone(),
                resource: format!("product:{}", product.id),
                ip_address: ctx.ip_address.clone(),
                user_agent: ctx.user_agent.clone(),
            });
            AppError::from(e)
        })
    }
}
