//! Storefront REST API: product/category catalog, checkout with atomic stock
//! reservation, order lifecycle, and JWT-authenticated users and admins.

use axum::http::HeaderValue;
use axum::routing::{delete, get, post, put};
use axum::Router;
use serde_json::json;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod state;
pub mod store;

use middleware::ApiResponse;
use state::AppState;

/// Assemble the full router. Three tiers: public reads and token
/// acquisition, authenticated storefront routes, and the admin panel.
pub fn app(state: AppState) -> Router {
    let public = Router::new()
        .route("/api/health-check", get(health_check))
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/admin-login", post(handlers::auth::admin_login))
        .route("/api/auth/check-first-admin", get(handlers::auth::check_first_admin))
        .route("/api/auth/setup-first-admin", post(handlers::auth::setup_first_admin))
        .route("/api/categories", get(handlers::categories::list))
        .route("/api/categories/:id", get(handlers::categories::get))
        .route("/api/products", get(handlers::products::list))
        .route("/api/products/featured", get(handlers::products::featured))
        .route("/api/products/category/:id", get(handlers::products::by_category))
        .route("/api/products/:id", get(handlers::products::get));

    let authed = Router::new()
        .route("/api/auth/me", get(handlers::auth::me))
        .route("/api/users/profile", put(handlers::users::update_profile))
        .route("/api/orders", post(handlers::orders::create))
        .route("/api/orders/myorders", get(handlers::orders::my_orders))
        .route("/api/orders/:id", get(handlers::orders::get))
        .route("/api/orders/:id/cancel", put(handlers::orders::cancel))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::authenticate,
        ));

    // Authentication runs before the role check (outermost layer first)
    let admin = Router::new()
        .route("/api/auth/register-admin", post(handlers::auth::register_admin))
        .route("/api/users", get(handlers::users::list).post(handlers::users::create))
        .route(
            "/api/users/:id",
            get(handlers::users::get)
                .put(handlers::users::update)
                .delete(handlers::users::delete),
        )
        .route("/api/categories", post(handlers::categories::create))
        .route(
            "/api/categories/:id",
            put(handlers::categories::update).delete(handlers::categories::delete),
        )
        .route("/api/products", post(handlers::products::create))
        .route(
            "/api/products/:id",
            put(handlers::products::update).delete(handlers::products::delete),
        )
        .route("/api/orders", get(handlers::orders::list))
        .route(
            "/api/orders/:id",
            put(handlers::orders::update).delete(handlers::orders::delete),
        )
        .route("/api/orders/:id/status", put(handlers::orders::update_status))
        .layer(axum::middleware::from_fn(middleware::require_admin))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::authenticate,
        ));

    Router::new()
        .merge(public)
        .merge(authed)
        .merge(admin)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    let origins = &config::config().server.cors_origins;
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn health_check() -> ApiResponse<serde_json::Value> {
    ApiResponse::success(json!({ "timestamp": chrono::Utc::now() }))
        .with_message("Server is running")
}
