//! Category endpoints. Reads are public; mutations sit behind the admin gate
//! in the router. Slugs derive from the name unless explicitly overridden,
//! and deletion cascade-nulls product references rather than dangling them.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::category::{slugify, Category};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub parent: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub parent: Option<Uuid>,
}

/// GET /api/categories
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Category>> {
    Ok(ApiResponse::list(state.catalog.list_categories().await?))
}

/// GET /api/categories/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Category> {
    let category = state
        .catalog
        .find_category(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Category not found"))?;
    Ok(ApiResponse::success(category))
}

/// POST /api/categories (admin)
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateCategoryRequest>,
) -> ApiResult<Category> {
    let name = body
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::validation("Please add a category name"))?;

    let slug = match body.slug.filter(|s| !s.trim().is_empty()) {
        Some(slug) => slug,
        None => slugify(&name),
    };
    if slug.is_empty() {
        return Err(ApiError::validation("Category name does not produce a valid slug"));
    }

    let category = state
        .catalog
        .insert_category(Category::new(name, slug, body.description, body.parent))
        .await?;
    Ok(ApiResponse::created(category))
}

/// PUT /api/categories/:id (admin). Renaming without an explicit slug
/// re-derives the slug from the new name.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateCategoryRequest>,
) -> ApiResult<Category> {
    let mut category = state
        .catalog
        .find_category(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Category not found"))?;

    // A blank slug counts as absent, so a rename still re-derives
    let slug_override = body.slug.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    if let Some(name) = body.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()) {
        if slug_override.is_none() {
            category.slug = slugify(&name);
        }
        category.name = name;
    }
    if let Some(slug) = slug_override {
        category.slug = slug;
    }
    if let Some(description) = body.description {
        category.description = Some(description);
    }
    if let Some(parent) = body.parent {
        category.parent = Some(parent);
    }

    let category = state.catalog.save_category(category).await?;
    Ok(ApiResponse::success(category))
}

/// DELETE /api/categories/:id (admin)
pub async fn delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Value> {
    if state.catalog.find_category(id).await?.is_none() {
        return Err(ApiError::not_found("Category not found"));
    }

    // Clear product references before removing the category itself
    state.catalog.clear_category_refs(id).await?;
    state.catalog.delete_category(id).await?;

    Ok(ApiResponse::success(json!({})))
}
