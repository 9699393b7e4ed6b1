//! API Integration Tests
//!
//! Drive the full router over the in-memory stores.
//!
//! Author: hephaex@gmail.com

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use catalog_api::{create_router, state::AppState};
use catalog_core::config::AppConfig;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn test_app() -> Router {
    create_router(Arc::new(AppState::in_memory(AppConfig::default())))
}

/// Helper to create a test request
fn create_json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }

    match body {
        Some(json_body) => builder
            .body(Body::from(serde_json::to_string(&json_body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

fn registration(name: &str) -> Value {
    json!({
        "email": format!("{name}@example.com"),
        "username": name,
        "password": "secret123",
        "first_name": "Test",
        "last_name": "User"
    })
}

/// Register and log in, returning (user id, token)
async fn signup(app: &Router, name: &str) -> (String, String) {
    let (status, body) = send(
        app,
        create_json_request("POST", "/api/v1/auth/register", None, Some(registration(name))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        app,
        create_json_request(
            "POST",
            "/api/v1/auth/login",
            None,
            Some(json!({"email": format!("{name}@example.com"), "password": "secret123"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    (id, body["data"]["token"].as_str().unwrap().to_string())
}

fn product(sku: &str, category: &str) -> Value {
    json!({
        "name": "Lamp",
        "description": "Desk lamp",
        "price": 25.5,
        "stock": 10,
        "category": category,
        "sku": sku
    })
}

async fn create_product(app: &Router, token: &str, sku: &str, category: &str) -> String {
    let (status, body) = send(
        app,
        create_json_request("POST", "/api/v1/products", Some(token), Some(product(sku, category))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["id"].as_str().unwrap().to_string()
}

// =============================================================================
// Health Check Tests
// =============================================================================

#[tokio::test]
async fn test_health_check() {
    let app = test_app();
    let (status, json) = send(&app, create_json_request("GET", "/health", None, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_openapi_document() {
    let app = test_app();
    let (status, json) = send(
        &app,
        create_json_request("GET", "/api-docs/openapi.json", None, None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["paths"]["/api/v1/products"].is_object());
}

// =============================================================================
// Authentication Tests
// =============================================================================

#[tokio::test]
async fn test_register_login_profile_flow() {
    let app = test_app();

    let (status, body) = send(
        &app,
        create_json_request(
            "POST",
            "/api/v1/auth/register",
            None,
            Some(registration("alice")),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "User registered successfully");
    assert_eq!(body["data"]["role"], "user");
    assert_eq!(body["data"]["is_active"], true);
    assert!(body["data"].get("password").is_none());
    assert!(body["data"].get("password_hash").is_none());

    let (status, body) = send(
        &app,
        create_json_request(
            "POST",
            "/api/v1/auth/login",
            None,
            Some(json!({"email": "alice@example.com", "password": "wrong-password"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "invalid credentials");

    let (status, body) = send(
        &app,
        create_json_request(
            "POST",
            "/api/v1/auth/login",
            None,
            Some(json!({"email": "alice@example.com", "password": "secret123"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");
    let token = body["data"]["token"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["user"]["email"], "alice@example.com");

    let (status, body) = send(
        &app,
        create_json_request("GET", "/api/v1/users/profile", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "alice");
    assert!(body["data"].get("password").is_none());
}

#[tokio::test]
async fn test_login_unknown_email_matches_wrong_password() {
    let app = test_app();
    signup(&app, "bob").await;

    let (status, body) = send(
        &app,
        create_json_request(
            "POST",
            "/api/v1/auth/login",
            None,
            Some(json!({"email": "nobody@example.com", "password": "secret123"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "invalid credentials");
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = test_app();
    signup(&app, "carol").await;

    let mut again = registration("carol");
    again["username"] = json!("carol2");
    let (status, body) = send(
        &app,
        create_json_request("POST", "/api/v1/auth/register", None, Some(again)),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "CONFLICT");
    assert_eq!(body["message"], "email already registered");
}

#[tokio::test]
async fn test_register_rejects_invalid_input() {
    let app = test_app();

    let mut short = registration("dave");
    short["password"] = json!("12345");
    let (status, body) = send(
        &app,
        create_json_request("POST", "/api/v1/auth/register", None, Some(short)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BAD_REQUEST");

    let mut bad_email = registration("dave");
    bad_email["email"] = json!("not-an-email");
    let (status, _) = send(
        &app,
        create_json_request("POST", "/api/v1/auth/register", None, Some(bad_email)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        create_json_request(
            "POST",
            "/api/v1/auth/register",
            None,
            Some(json!({"email": "dave@example.com"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_trims_before_validating() {
    let app = test_app();

    let mut short = registration("ruth");
    short["username"] = json!("  ab  ");
    let (status, body) = send(
        &app,
        create_json_request("POST", "/api/v1/auth/register", None, Some(short)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("username"));

    let mut blank = registration("ruth");
    blank["first_name"] = json!("   ");
    let (status, body) = send(
        &app,
        create_json_request("POST", "/api/v1/auth/register", None, Some(blank)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("first_name"));

    let mut padded = registration("ruth");
    padded["username"] = json!("  ruth  ");
    padded["email"] = json!("  Ruth@Example.com ");
    let (status, body) = send(
        &app,
        create_json_request("POST", "/api/v1/auth/register", None, Some(padded)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["username"], "ruth");
    assert_eq!(body["data"]["email"], "ruth@example.com");
}

// =============================================================================
// Auth Gateway Tests
// =============================================================================

#[tokio::test]
async fn test_protected_route_requires_bearer_token() {
    let app = test_app();

    let (status, body) = send(
        &app,
        create_json_request("GET", "/api/v1/users/profile", None, None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Authorization header required");

    let request = Request::builder()
        .uri("/api/v1/users/profile")
        .header("Authorization", "Token abc")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid authorization header format");

    let (status, body) = send(
        &app,
        create_json_request("GET", "/api/v1/users/profile", Some("not.a.jwt"), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid or expired token");
}

#[tokio::test]
async fn test_create_product_requires_auth() {
    let app = test_app();
    let (status, _) = send(
        &app,
        create_json_request("POST", "/api/v1/products", None, Some(product("L-1", "home"))),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// User Tests
// =============================================================================

#[tokio::test]
async fn test_update_profile_and_username_conflict() {
    let app = test_app();
    let (_, token) = signup(&app, "erin").await;
    signup(&app, "frank").await;

    let (status, body) = send(
        &app,
        create_json_request(
            "PUT",
            "/api/v1/users/profile",
            Some(&token),
            Some(json!({"first_name": "Erin"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["first_name"], "Erin");
    assert_eq!(body["data"]["username"], "erin");

    let (status, body) = send(
        &app,
        create_json_request(
            "PUT",
            "/api/v1/users/profile",
            Some(&token),
            Some(json!({"username": "frank"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "CONFLICT");
}

#[tokio::test]
async fn test_update_profile_rejects_blank_fields() {
    let app = test_app();
    let (_, token) = signup(&app, "sara").await;

    for update in [json!({"username": "  ab  "}), json!({"last_name": "   "})] {
        let (status, body) = send(
            &app,
            create_json_request("PUT", "/api/v1/users/profile", Some(&token), Some(update)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "BAD_REQUEST");
    }

    let (_, body) = send(
        &app,
        create_json_request("GET", "/api/v1/users/profile", Some(&token), None),
    )
    .await;
    assert_eq!(body["data"]["username"], "sara");
    assert_eq!(body["data"]["last_name"], "User");
}

#[tokio::test]
async fn test_user_lookup_and_delete() {
    let app = test_app();
    let (_, token) = signup(&app, "gina").await;
    let (other_id, _) = signup(&app, "hank").await;

    let (status, body) = send(
        &app,
        create_json_request("GET", "/api/v1/users?limit=1", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let uri = format!("/api/v1/users/{other_id}");
    let (status, body) = send(&app, create_json_request("GET", &uri, Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "hank");

    let (status, body) = send(&app, create_json_request("DELETE", &uri, Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User deleted successfully");
    assert!(body.get("data").is_none());

    let (status, body) = send(&app, create_json_request("GET", &uri, Some(&token), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_invalid_user_id() {
    let app = test_app();
    let (_, token) = signup(&app, "ivan").await;

    let (status, body) = send(
        &app,
        create_json_request("GET", "/api/v1/users/not-a-uuid", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid user ID");
}

#[tokio::test]
async fn test_invalid_pagination_query() {
    let app = test_app();
    let (_, token) = signup(&app, "jane").await;

    let (status, body) = send(
        &app,
        create_json_request("GET", "/api/v1/users?limit=abc", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BAD_REQUEST");
}

// =============================================================================
// Product Tests
// =============================================================================

#[tokio::test]
async fn test_product_crud_by_owner() {
    let app = test_app();
    let (owner_id, token) = signup(&app, "kate").await;
    let id = create_product(&app, &token, "L-1", "home").await;
    let uri = format!("/api/v1/products/{id}");

    // Reads are public
    let (status, body) = send(&app, create_json_request("GET", &uri, None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user_id"], owner_id.as_str());
    assert_eq!(body["data"]["sku"], "L-1");
    assert_eq!(body["data"]["user"]["username"], "kate");
    assert!(body["data"]["user"].get("password_hash").is_none());

    let (status, body) = send(
        &app,
        create_json_request("PUT", &uri, Some(&token), Some(json!({"stock": 3}))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Product updated successfully");
    assert_eq!(body["data"]["stock"], 3);
    assert_eq!(body["data"]["name"], "Lamp");

    let (status, _) = send(&app, create_json_request("DELETE", &uri, Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, create_json_request("GET", &uri, None, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Product not found");
}

#[tokio::test]
async fn test_non_owner_cannot_modify_product() {
    let app = test_app();
    let (_, owner) = signup(&app, "liam").await;
    let (_, intruder) = signup(&app, "mona").await;
    let id = create_product(&app, &owner, "L-2", "home").await;
    let uri = format!("/api/v1/products/{id}");

    let (status, body) = send(
        &app,
        create_json_request("PUT", &uri, Some(&intruder), Some(json!({"price": 1.0}))),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "NOT_OWNER");

    let (status, body) = send(&app, create_json_request("DELETE", &uri, Some(&intruder), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "NOT_OWNER");

    let (status, body) = send(&app, create_json_request("GET", &uri, None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["price"], 25.5);
}

#[tokio::test]
async fn test_missing_product_is_not_found() {
    let app = test_app();
    let (_, token) = signup(&app, "nina").await;
    let uri = format!("/api/v1/products/{}", uuid::Uuid::new_v4());

    let (status, _) = send(&app, create_json_request("GET", &uri, None, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        create_json_request("PUT", &uri, Some(&token), Some(json!({"stock": 1}))),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        create_json_request("GET", "/api/v1/products/xyz", None, None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid product ID");
}

#[tokio::test]
async fn test_product_validation_and_duplicate_sku() {
    let app = test_app();
    let (_, token) = signup(&app, "otto").await;

    let mut free = product("L-3", "home");
    free["price"] = json!(0);
    let (status, _) = send(
        &app,
        create_json_request("POST", "/api/v1/products", Some(&token), Some(free)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    create_product(&app, &token, "L-3", "home").await;
    let (status, body) = send(
        &app,
        create_json_request(
            "POST",
            "/api/v1/products",
            Some(&token),
            Some(product("L-3", "home")),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "CONFLICT");
}

#[tokio::test]
async fn test_product_fields_are_trimmed_before_validation() {
    let app = test_app();
    let (_, token) = signup(&app, "tina").await;

    for field in ["name", "category", "sku"] {
        let mut blank = product("T-1", "home");
        blank[field] = json!("   ");
        let (status, body) = send(
            &app,
            create_json_request("POST", "/api/v1/products", Some(&token), Some(blank)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "blank {field}");
        assert!(body["message"].as_str().unwrap().contains(field));
    }

    let mut padded = product("  T-1  ", " home ");
    padded["name"] = json!("  Lamp  ");
    let (status, body) = send(
        &app,
        create_json_request("POST", "/api/v1/products", Some(&token), Some(padded)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["sku"], "T-1");
    assert_eq!(body["data"]["category"], "home");
    assert_eq!(body["data"]["name"], "Lamp");
    let uri = format!("/api/v1/products/{}", body["data"]["id"].as_str().unwrap());

    let (status, _) = send(
        &app,
        create_json_request("PUT", &uri, Some(&token), Some(json!({"name": "   "}))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // The trimmed SKU is what holds the unique slot
    let (status, body) = send(
        &app,
        create_json_request("POST", "/api/v1/products", Some(&token), Some(product("T-1", "home"))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "CONFLICT");
}

#[tokio::test]
async fn test_product_listing_and_filters() {
    let app = test_app();
    let (_, alice) = signup(&app, "pat").await;
    let (_, bob) = signup(&app, "quinn").await;
    create_product(&app, &alice, "P-1", "home").await;
    create_product(&app, &alice, "P-2", "garden").await;
    create_product(&app, &bob, "Q-1", "home").await;

    let (status, body) = send(&app, create_json_request("GET", "/api/v1/products", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);

    let (_, body) = send(
        &app,
        create_json_request("GET", "/api/v1/products?category=home", None, None),
    )
    .await;
    let home = body["data"].as_array().unwrap();
    assert_eq!(home.len(), 2);
    assert!(home.iter().all(|p| p["category"] == "home"));

    let (_, body) = send(
        &app,
        create_json_request("GET", "/api/v1/products?limit=2&offset=2", None, None),
    )
    .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, body) = send(
        &app,
        create_json_request("GET", "/api/v1/products/my", Some(&bob), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let mine = body["data"].as_array().unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["sku"], "Q-1");

    let (status, _) = send(&app, create_json_request("GET", "/api/v1/products/my", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
