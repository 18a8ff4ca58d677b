#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use storefront_api::{app, state::AppState};

/// Fresh router over an empty in-memory store. Each test builds its own so
/// there is no cross-test state.
pub fn test_app() -> Router {
    app(AppState::memory())
}

pub async fn request(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

pub async fn get(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    request(app, Method::GET, uri, token, None).await
}

pub async fn post(app: &Router, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
    request(app, Method::POST, uri, token, Some(body)).await
}

pub async fn put(app: &Router, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
    request(app, Method::PUT, uri, token, Some(body)).await
}

pub async fn delete(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    request(app, Method::DELETE, uri, token, None).await
}

/// Register a customer and return their bearer token.
pub async fn register(app: &Router, name: &str, email: &str, password: &str) -> String {
    let (status, body) = post(
        app,
        "/api/auth/register",
        None,
        json!({ "name": name, "email": email, "password": password }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
    body["data"]["token"].as_str().expect("token").to_string()
}

/// Bootstrap the first admin through the setup endpoint and return a token.
pub async fn bootstrap_admin(app: &Router) -> String {
    let (status, body) = post(
        app,
        "/api/auth/setup-first-admin",
        None,
        json!({
            "name": "Admin",
            "email": "admin@example.com",
            "password": "admin-pass",
            "secretKey": "admin123",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "admin setup failed: {}", body);
    body["data"]["token"].as_str().expect("token").to_string()
}

pub async fn create_category(app: &Router, admin_token: &str, name: &str) -> Value {
    let (status, body) = post(
        app,
        "/api/categories",
        Some(admin_token),
        json!({ "name": name }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "category create failed: {}", body);
    body["data"].clone()
}

pub async fn create_product(
    app: &Router,
    admin_token: &str,
    name: &str,
    stock: i64,
    price: i64,
) -> Value {
    let (status, body) = post(
        app,
        "/api/products",
        Some(admin_token),
        json!({
            "name": name,
            "description": "test product",
            "price": price,
            "images": ["/img/test.jpg"],
            "stock": stock,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "product create failed: {}", body);
    body["data"].clone()
}

pub fn shipping_address() -> Value {
    json!({
        "fullName": "Binh Tran",
        "address": "12 Le Loi",
        "city": "Da Nang",
        "phone": "0901234567",
    })
}
