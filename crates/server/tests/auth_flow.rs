use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::Service;

use server::routes::{self, AppState};
use service::auth::repository::mock::MockUserRepository;
use service::auth::AuthService;
use service::message::repository::mock::MockMessageRepository;
use service::message::MessageService;
use service::token::store::mock::MockRevocationStore;
use service::token::{TokenConfig, TokenService};

fn cors() -> tower_http::cors::CorsLayer {
    tower_http::cors::CorsLayer::very_permissive()
}

fn build_app() -> Router {
    let users = Arc::new(MockUserRepository::default());
    let tokens = Arc::new(TokenService::new(
        Arc::new(MockRevocationStore::default()),
        TokenConfig { secret: "test-secret".into(), ttl_secs: 3600 },
    ));
    let auth = Arc::new(AuthService::new(Arc::clone(&users), Arc::clone(&tokens)));
    let messages = Arc::new(MessageService::new(
        Arc::new(MockMessageRepository::default()),
        users,
        tokens,
    ));
    routes::build_router(cors(), AppState { auth, messages })
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<&Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn call(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().call(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn register_body(name: &str, email: &str) -> Value {
    json!({
        "name": name,
        "email": email,
        "password": "password123",
        "password_confirmation": "password123",
        "address": "123 Main Street, Springfield",
        "gender": true,
        "marital_status": "single",
    })
}

#[tokio::test]
async fn register_with_valid_data() {
    let app = build_app();
    let (status, body) = call(
        &app,
        request("POST", "/register", None, Some(&register_body("John Doe", "john.doe@example.com"))),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User registered successfully");
    assert_eq!(body["user"]["email"], "john.doe@example.com");
    assert_eq!(body["user"]["marital_status"], "single");
    assert!(body["user"]["id"].is_string());
    assert!(body["token"].is_string());
    // The stored hash must never appear in a response
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn register_with_invalid_data() {
    let app = build_app();
    let (status, body) = call(
        &app,
        request(
            "POST",
            "/register",
            None,
            Some(&json!({
                "name": "",
                "email": "invalid-email",
                "password": "pass",
                "password_confirmation": "pass",
                "address": "",
                "gender": "not-boolean",
                "marital_status": "complicated",
            })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    for field in ["name", "email", "password", "address", "gender", "marital_status"] {
        assert!(body[field].is_array(), "missing errors for {}: {}", field, body);
    }
}

#[tokio::test]
async fn register_with_duplicate_email() {
    let app = build_app();
    let (status, _) = call(
        &app,
        request("POST", "/register", None, Some(&register_body("John Doe", "dup@example.com"))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = call(
        &app,
        request("POST", "/register", None, Some(&register_body("Jane Doe", "dup@example.com"))),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["email"][0], "The email has already been taken.");

    // The first registration is unaffected
    let (status, _) = call(
        &app,
        request(
            "POST",
            "/login",
            None,
            Some(&json!({"email": "dup@example.com", "password": "password123"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn login_with_valid_credentials() {
    let app = build_app();
    call(
        &app,
        request("POST", "/register", None, Some(&register_body("Jane Doe", "jane.doe@example.com"))),
    )
    .await;

    let (status, body) = call(
        &app,
        request(
            "POST",
            "/login",
            None,
            Some(&json!({"email": "jane.doe@example.com", "password": "password123"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["user"]["email"], "jane.doe@example.com");
    assert!(body["token"].is_string());
}

#[tokio::test]
async fn login_with_invalid_credentials() {
    let app = build_app();
    call(
        &app,
        request("POST", "/register", None, Some(&register_body("Jane Doe", "jane.doe@example.com"))),
    )
    .await;

    let (status, body) = call(
        &app,
        request(
            "POST",
            "/login",
            None,
            Some(&json!({"email": "jane.doe@example.com", "password": "wrongpassword"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
async fn login_validates_input_shape() {
    let app = build_app();
    let (status, body) = call(
        &app,
        request("POST", "/login", None, Some(&json!({"email": "not-an-email"}))),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["email"].is_array());
    assert!(body["password"].is_array());
}

#[tokio::test]
async fn get_profile_authenticated() {
    let app = build_app();
    let (_, registered) = call(
        &app,
        request("POST", "/register", None, Some(&register_body("Jane Doe", "jane@example.com"))),
    )
    .await;
    let token = registered["token"].as_str().unwrap();

    let (status, body) = call(&app, request("GET", "/users/me", Some(token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], registered["user"]["id"]);
    assert_eq!(body["user"]["name"], "Jane Doe");
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn get_profile_unauthenticated() {
    let app = build_app();
    let (status, body) = call(&app, request("GET", "/users/me", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token not provided");
}

#[tokio::test]
async fn get_profile_with_garbage_token() {
    let app = build_app();
    let (status, body) = call(&app, request("GET", "/users/me", Some("not-a-jwt"), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token is invalid");
}

#[tokio::test]
async fn logout_revokes_the_token() {
    let app = build_app();
    let (_, registered) = call(
        &app,
        request("POST", "/register", None, Some(&register_body("Jane Doe", "jane@example.com"))),
    )
    .await;
    let token = registered["token"].as_str().unwrap();

    let (status, body) = call(&app, request("POST", "/logout", Some(token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User logged out successfully");

    // The token is dead for protected routes from now on
    let (status, body) = call(&app, request("GET", "/users/me", Some(token), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "The token has been blacklisted");

    // A second logout with the same token is rejected the same way
    let (status, body) = call(&app, request("POST", "/logout", Some(token), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "The token has been blacklisted");
}

#[tokio::test]
async fn logout_unauthenticated() {
    let app = build_app();
    let (status, body) = call(&app, request("POST", "/logout", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token not provided");
}

#[tokio::test]
async fn update_profile_partial_fields() {
    let app = build_app();
    let (_, registered) = call(
        &app,
        request("POST", "/register", None, Some(&register_body("Jane Doe", "jane@example.com"))),
    )
    .await;
    let token = registered["token"].as_str().unwrap();

    let (status, body) = call(
        &app,
        request(
            "PUT",
            "/users/me",
            Some(token),
            Some(&json!({"name": "Jane Smith", "marital_status": "married"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Profile updated successfully");
    assert_eq!(body["user"]["name"], "Jane Smith");
    assert_eq!(body["user"]["marital_status"], "married");
    // Untouched fields survive
    assert_eq!(body["user"]["email"], "jane@example.com");

    let (_, profile) = call(&app, request("GET", "/users/me", Some(token), None)).await;
    assert_eq!(profile["user"]["name"], "Jane Smith");
}

#[tokio::test]
async fn update_profile_rejects_taken_email() {
    let app = build_app();
    call(
        &app,
        request("POST", "/register", None, Some(&register_body("Other", "other@example.com"))),
    )
    .await;
    let (_, registered) = call(
        &app,
        request("POST", "/register", None, Some(&register_body("Jane Doe", "jane@example.com"))),
    )
    .await;
    let token = registered["token"].as_str().unwrap();

    let (status, body) = call(
        &app,
        request("PUT", "/users/me", Some(token), Some(&json!({"email": "other@example.com"}))),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["email"][0], "The email has already been taken.");
}

#[tokio::test]
async fn update_profile_changes_password() {
    let app = build_app();
    let (_, registered) = call(
        &app,
        request("POST", "/register", None, Some(&register_body("Jane Doe", "jane@example.com"))),
    )
    .await;
    let token = registered["token"].as_str().unwrap();

    let (status, _) = call(
        &app,
        request(
            "PUT",
            "/users/me",
            Some(token),
            Some(&json!({"password": "newsecret", "password_confirmation": "newsecret"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(
        &app,
        request(
            "POST",
            "/login",
            None,
            Some(&json!({"email": "jane@example.com", "password": "password123"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call(
        &app,
        request(
            "POST",
            "/login",
            None,
            Some(&json!({"email": "jane@example.com", "password": "newsecret"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn health_endpoint() {
    let app = build_app();
    let (status, body) = call(&app, request("GET", "/health", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
