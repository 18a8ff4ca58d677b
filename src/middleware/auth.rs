//! The access gate: bearer-token authentication and the admin role check,
//! composed as two middleware layers. Authentication always runs (and
//! short-circuits) before any role evaluation.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth;
use crate::error::ApiError;
use crate::models::{Role, User};
use crate::state::AppState;

/// Authenticated caller, resolved to a full stored user record and injected
/// into request extensions.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

/// Verify the bearer token and resolve its subject to a known user.
/// Missing, malformed or expired tokens and unknown subjects are all 401.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers())?;

    let claims = auth::verify_token(&token)
        .map_err(|e| ApiError::unauthorized(format!("Invalid token: {}", e)))?;

    let user = state
        .accounts
        .find_user(claims.sub)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Token subject no longer exists"))?;

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

/// Role gate layered inside `authenticate`: the caller must already be
/// resolved, and must hold the admin role.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(|| ApiError::unauthorized("Not authenticated"))?;

    if user.0.role != Role::Admin {
        return Err(ApiError::forbidden("Admin access required"));
    }

    Ok(next.run(request).await)
}

fn extract_bearer_token(headers: &HeaderMap) -> Result<String, ApiError> {
    let header = headers
        .get("authorization")
        .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;

    let value = header
        .to_str()
        .map_err(|_| ApiError::unauthorized("Invalid Authorization header format"))?;

    match value.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.to_string()),
        Some(_) => Err(ApiError::unauthorized("Empty bearer token")),
        None => Err(ApiError::unauthorized(
            "Authorization header must use Bearer token format",
        )),
    }
}
