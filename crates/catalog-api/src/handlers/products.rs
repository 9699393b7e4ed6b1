//! Product API handlers
//!
//! Author: hephaex@gmail.com

use super::parse_id;
use crate::audit::AuditContext;
use crate::auth::AuthenticatedUser;
use crate::error::{
    ApiResponse, AppError, ProductEnvelope, ProductListEnvelope, ValidatedJson,
};
use crate::services::{
    CreateProductRequest, Pagination, ProductListQuery, UpdateProductRequest,
};
use crate::state::AppState;
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Extension,
};
use std::sync::Arc;

/// List products, optionally filtered by category
#[utoipa::path(
    get,
    path = "/api/v1/products",
    tag = "products",
    params(ProductListQuery),
    responses(
        (status = 200, description = "Products retrieved", body = ProductListEnvelope),
        (status = 400, description = "Invalid query", body = crate::error::ErrorResponse),
    )
)]
pub async fn list_products(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ProductListQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(query) = query?;
    let products = state
        .products
        .list(query.pagination(), query.category.as_deref())
        .await?;
    Ok(ApiResponse::ok("Products retrieved successfully", products))
}

/// Get a product by id
#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    tag = "products",
    params(("id" = String, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product retrieved", body = ProductEnvelope),
        (status = 400, description = "Invalid product ID", body = crate::error::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, "product")?;
    let product = state.products.get(id).await?;
    Ok(ApiResponse::ok("Product retrieved successfully", product))
}

/// Create a product owned by the caller
#[utoipa::path(
    post,
    path = "/api/v1/products",
    tag = "products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductEnvelope),
        (status = 400, description = "Invalid input or duplicate SKU", body = crate::error::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<CreateProductRequest>,
) -> Result<impl IntoResponse, AppError> {
    let product = state.products.create(&user, request).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::ok("Product created successfully", product),
    ))
}

/// List the caller's own products
#[utoipa::path(
    get,
    path = "/api/v1/products/my",
    tag = "products",
    params(Pagination),
    responses(
        (status = 200, description = "Products retrieved", body = ProductListEnvelope),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn my_products(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    query: Result<Query<Pagination>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(page) = query?;
    let products = state.products.list_for_owner(user.user_id, page).await?;
    Ok(ApiResponse::ok("Products retrieved successfully", products))
}

/// Update a product; only its owner may do so
#[utoipa::path(
    put,
    path = "/api/v1/products/{id}",
    tag = "products",
    params(("id" = String, Path, description = "Product ID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductEnvelope),
        (status = 400, description = "Invalid input or product ID", body = crate::error::ErrorResponse),
        (status = 401, description = "Unauthorized or not the owner", body = crate::error::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::error::ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_product(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    headers: HeaderMap,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateProductRequest>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, "product")?;
    let ctx = AuditContext::from_headers(&headers);
    let product = state.products.update(id, &user, request, &ctx).await?;
    Ok(ApiResponse::ok("Product updated successfully", product))
}

/// Delete a product (soft delete); only its owner may do so
#[utoipa::path(
    delete,
    path = "/api/v1/products/{id}",
    tag = "products",
    params(("id" = String, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product deleted; envelope without data"),
        (status = 400, description = "Invalid product ID", body = crate::error::ErrorResponse),
        (status = 401, description = "Unauthorized or not the owner", body = crate::error::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::error::ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, "product")?;
    let ctx = AuditContext::from_headers(&headers);
    state.products.delete(id, &user, &ctx).await?;
    Ok(ApiResponse::message("Product deleted successfully"))
}
