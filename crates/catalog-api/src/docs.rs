//! OpenAPI document
//!
//! Author: hephaex@gmail.com

use crate::auth::{LoginRequest, LoginResponse, RegisterRequest, UserResponse};
use crate::error::{
    ErrorResponse, LoginEnvelope, ProductEnvelope, ProductListEnvelope, UserEnvelope,
    UserListEnvelope,
};
use crate::handlers::{self, health::HealthResponse};
use crate::services::{
    CreateProductRequest, ProductResponse, UpdateProductRequest, UpdateUserRequest,
};
use axum::Json;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Catalog API",
        description = "User accounts and product catalog"
    ),
    paths(
        handlers::health::health_check,
        handlers::auth::register_handler,
        handlers::auth::login_handler,
        handlers::users::get_profile,
        handlers::users::update_profile,
        handlers::users::list_users,
        handlers::users::get_user,
        handlers::users::delete_user,
        handlers::products::list_products,
        handlers::products::get_product,
        handlers::products::create_product,
        handlers::products::my_products,
        handlers::products::update_product,
        handlers::products::delete_product,
    ),
    components(schemas(
        HealthResponse,
        ErrorResponse,
        UserEnvelope,
        UserListEnvelope,
        LoginEnvelope,
        ProductEnvelope,
        ProductListEnvelope,
        RegisterRequest,
        LoginRequest,
        LoginResponse,
        UserResponse,
        UpdateUserRequest,
        CreateProductRequest,
        UpdateProductRequest,
        ProductResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Service health"),
        (name = "auth", description = "Registration and login"),
        (name = "users", description = "User accounts"),
        (name = "products", description = "Product catalog"),
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected paths
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Serve the generated document as JSON
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_routes_and_security() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();

        assert!(doc["paths"]["/api/v1/auth/register"]["post"].is_object());
        assert!(doc["paths"]["/api/v1/products/{id}"]["delete"].is_object());
        assert!(doc["components"]["securitySchemes"]["bearer_auth"].is_object());
        assert!(doc["components"]["schemas"]["ProductResponse"].is_object());
    }

    #[test]
    fn test_success_bodies_are_enveloped() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();

        let envelope = &doc["components"]["schemas"]["ProductEnvelope"];
        assert!(envelope["properties"]["success"].is_object());
        assert!(envelope["properties"]["data"].is_object());

        let ok = &doc["paths"]["/api/v1/products/{id}"]["get"]["responses"]["200"];
        let schema_ref = ok["content"]["application/json"]["schema"]["$ref"]
            .as_str()
            .unwrap();
        assert!(schema_ref.ends_with("/ProductEnvelope"));
    }
}
