//! User management: self-service profile updates plus the admin directory.
//! Role changes only happen through the admin update path.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::password;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::models::{Role, User};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// GET /api/users (admin)
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<User>> {
    Ok(ApiResponse::list(state.accounts.list_users().await?))
}

/// GET /api/users/:id (admin)
pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<User> {
    let user = state
        .accounts
        .find_user(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(ApiResponse::success(user))
}

/// POST /api/users (admin) - provision an account directly.
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateUserRequest>,
) -> ApiResult<User> {
    let name = required(body.name, "Please add a name")?;
    let email = required(body.email, "Please add an email")?;
    let plain = required(body.password, "Please add a password")?;
    if plain.len() < 6 {
        return Err(ApiError::validation("Password must be at least 6 characters"));
    }

    if state.accounts.find_user_by_email(&email).await?.is_some() {
        return Err(ApiError::conflict("Email already in use"));
    }

    let hash = password::hash_password(&plain)
        .map_err(|e| ApiError::internal(format!("password hashing failed: {}", e)))?;
    let mut user = User::new(name, email, hash, body.role.unwrap_or(Role::Customer));
    user.phone = body.phone;
    user.address = body.address;

    let user = state.accounts.insert_user(user).await?;
    Ok(ApiResponse::created(user))
}

/// PUT /api/users/:id (admin). This is the only place a role can change.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateUserRequest>,
) -> ApiResult<User> {
    let mut user = state
        .accounts
        .find_user(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if let Some(name) = body.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()) {
        user.name = name;
    }
    if let Some(email) = body.email.map(|e| e.trim().to_string()).filter(|e| !e.is_empty()) {
        user.email = email;
    }
    if let Some(role) = body.role {
        user.role = role;
    }
    if let Some(phone) = body.phone {
        user.phone = Some(phone);
    }
    if let Some(address) = body.address {
        user.address = Some(address);
    }

    let user = state.accounts.save_user(user).await?;
    Ok(ApiResponse::success(user))
}

/// DELETE /api/users/:id (admin)
pub async fn delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Value> {
    if !state.accounts.delete_user(id).await? {
        return Err(ApiError::not_found("User not found"));
    }
    Ok(ApiResponse::success(json!({})))
}

/// PUT /api/users/profile - self-service contact details. Role and email
/// are deliberately not patchable here.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(CurrentUser(mut user)): Extension<CurrentUser>,
    Json(body): Json<UpdateProfileRequest>,
) -> ApiResult<User> {
    if let Some(name) = body.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()) {
        user.name = name;
    }
    if let Some(phone) = body.phone {
        user.phone = Some(phone);
    }
    if let Some(address) = body.address {
        user.address = Some(address);
    }

    let user = state.accounts.save_user(user).await?;
    Ok(ApiResponse::success(user))
}

fn required(value: Option<String>, message: &str) -> Result<String, ApiError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::validation(message))
}
