//! API route definitions
//!
//! Author: hephaex@gmail.com

use crate::auth::middleware::auth_middleware;
use crate::handlers::{auth, products, users};
use crate::state::AppState;
use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

/// Create API v1 routes
///
/// Public and protected routers share `/products` and `/products/:id`;
/// merging combines their method routers, so only the protected methods
/// pass through the auth gateway.
pub fn api_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/products", get(products::list_products))
        .route("/products/:id", get(products::get_product));

    // Protected routes (authentication required)
    let protected_routes = Router::new()
        // User endpoints
        .route(
            "/users/profile",
            get(users::get_profile).put(users::update_profile),
        )
        .route("/users", get(users::list_users))
        .route("/users/:id", get(users::get_user).delete(users::delete_user))
        // Product endpoints
        .route("/products", post(products::create_product))
        .route("/products/my", get(products::my_products))
        .route(
            "/products/:id",
            put(products::update_product).delete(products::delete_product),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    // Combine routes
    Router::new().merge(public_routes).merge(protected_routes)
}
