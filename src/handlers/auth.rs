//! Credential service endpoints: registration, login, the admin entry point
//! and first-admin bootstrap. One hashed-credential path for everyone.

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::auth::{self, password};
use crate::config;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::models::{Role, User};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupFirstAdminRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub secret_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthData {
    pub token: String,
    pub user: User,
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> ApiResult<AuthData> {
    let (name, email, password) = validate_credentials(body.name, body.email, body.password)?;

    if state.accounts.find_user_by_email(&email).await?.is_some() {
        return Err(ApiError::conflict("Email already in use"));
    }

    let hash = password::hash_password(&password)
        .map_err(|e| ApiError::internal(format!("password hashing failed: {}", e)))?;
    let user = state
        .accounts
        .insert_user(User::new(name, email, hash, Role::Customer))
        .await?;

    let token = issue_token_for(&user)?;
    Ok(ApiResponse::created(AuthData { token, user }))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<AuthData> {
    let user = check_password(&state, body.email, body.password).await?;
    let token = issue_token_for(&user)?;
    Ok(ApiResponse::success(AuthData { token, user }))
}

/// POST /api/auth/admin-login - same credential check plus a role gate.
pub async fn admin_login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<AuthData> {
    let user = check_password(&state, body.email, body.password).await?;
    if !user.is_admin() {
        return Err(ApiError::forbidden("Access restricted to admin users"));
    }

    tracing::info!(email = %user.email, "admin login");
    let token = issue_token_for(&user)?;
    Ok(ApiResponse::success(AuthData { token, user }))
}

/// GET /api/auth/me
pub async fn me(Extension(CurrentUser(user)): Extension<CurrentUser>) -> ApiResult<User> {
    Ok(ApiResponse::success(user))
}

/// GET /api/auth/check-first-admin - does the install still need bootstrapping?
pub async fn check_first_admin(State(state): State<AppState>) -> ApiResult<Value> {
    let has_admin = state.accounts.has_admin().await?;
    Ok(ApiResponse::success(
        json!({ "isFirstAdminSetup": !has_admin }),
    ))
}

/// POST /api/auth/setup-first-admin - guarded by the configured setup key
/// and refused once any admin account exists.
pub async fn setup_first_admin(
    State(state): State<AppState>,
    Json(body): Json<SetupFirstAdminRequest>,
) -> ApiResult<AuthData> {
    let setup_key = &config::config().security.admin_setup_key;
    if setup_key.is_empty() || body.secret_key.as_deref() != Some(setup_key) {
        return Err(ApiError::unauthorized("Invalid secret key"));
    }

    if state.accounts.has_admin().await? {
        return Err(ApiError::bad_request("Admin account already exists"));
    }

    let (name, email, password) = validate_credentials(body.name, body.email, body.password)?;
    let hash = password::hash_password(&password)
        .map_err(|e| ApiError::internal(format!("password hashing failed: {}", e)))?;
    let user = state
        .accounts
        .insert_user(User::new(name, email, hash, Role::Admin))
        .await?;

    let token = issue_token_for(&user)?;
    Ok(ApiResponse::created(AuthData { token, user })
        .with_message("Admin account created successfully"))
}

/// POST /api/auth/register-admin (admin only) - provision another admin.
pub async fn register_admin(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> ApiResult<User> {
    let (name, email, password) = validate_credentials(body.name, body.email, body.password)?;

    if state.accounts.find_user_by_email(&email).await?.is_some() {
        return Err(ApiError::conflict("Email already in use"));
    }

    let hash = password::hash_password(&password)
        .map_err(|e| ApiError::internal(format!("password hashing failed: {}", e)))?;
    let user = state
        .accounts
        .insert_user(User::new(name, email, hash, Role::Admin))
        .await?;

    Ok(ApiResponse::created(user).with_message("Admin account created successfully"))
}

async fn check_password(
    state: &AppState,
    email: Option<String>,
    password: Option<String>,
) -> Result<User, ApiError> {
    let email = non_empty(email)
        .ok_or_else(|| ApiError::bad_request("Please provide an email and password"))?;
    let password = non_empty(password)
        .ok_or_else(|| ApiError::bad_request("Please provide an email and password"))?;

    let user = state
        .accounts
        .find_user_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    let matches = password::verify_password(&password, &user.password_hash)
        .map_err(|e| ApiError::internal(format!("password verification failed: {}", e)))?;
    if !matches {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    Ok(user)
}

fn issue_token_for(user: &User) -> Result<String, ApiError> {
    auth::issue_token(user.id, user.role)
        .map_err(|e| ApiError::internal(format!("token issuance failed: {}", e)))
}

fn validate_credentials(
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
) -> Result<(String, String, String), ApiError> {
    let name = non_empty(name).ok_or_else(|| ApiError::validation("Please add a name"))?;
    let email = non_empty(email).ok_or_else(|| ApiError::validation("Please add an email"))?;
    let password =
        non_empty(password).ok_or_else(|| ApiError::validation("Please add a password"))?;

    if !is_valid_email(&email) {
        return Err(ApiError::validation("Please add a valid email"));
    }
    if password.len() < 6 {
        return Err(ApiError::validation("Password must be at least 6 characters"));
    }

    Ok((name, email, password))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}
