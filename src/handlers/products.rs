//! Product endpoints. Reads are public with simple filters; mutations are
//! admin-gated in the router. Stock is only ever set here directly by an
//! admin - checkout goes through the order flow's reservation instead.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::product::{Product, MAX_NAME_LEN};
use crate::state::AppState;
use crate::store::ProductFilter;

#[derive(Debug, Deserialize)]
pub struct ProductListQuery {
    pub category: Option<Uuid>,
    pub featured: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    pub category: Option<Uuid>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub is_featured: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub original_price: Option<Decimal>,
    pub category: Option<Uuid>,
    pub images: Option<Vec<String>>,
    pub stock: Option<i32>,
    pub sizes: Option<Vec<String>>,
    pub colors: Option<Vec<String>>,
    pub is_featured: Option<bool>,
}

/// GET /api/products?category=&featured=
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> ApiResult<Vec<Product>> {
    let products = state
        .catalog
        .list_products(ProductFilter {
            category: query.category,
            featured: query.featured,
        })
        .await?;
    Ok(ApiResponse::list(products))
}

/// GET /api/products/featured
pub async fn featured(State(state): State<AppState>) -> ApiResult<Vec<Product>> {
    let products = state
        .catalog
        .list_products(ProductFilter {
            featured: Some(true),
            ..Default::default()
        })
        .await?;
    Ok(ApiResponse::list(products))
}

/// GET /api/products/category/:id
pub async fn by_category(
    State(state): State<AppState>,
    Path(category_id): Path<Uuid>,
) -> ApiResult<Vec<Product>> {
    let products = state
        .catalog
        .list_products(ProductFilter {
            category: Some(category_id),
            ..Default::default()
        })
        .await?;
    Ok(ApiResponse::list(products))
}

/// GET /api/products/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Product> {
    let product = state
        .catalog
        .find_product(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;
    Ok(ApiResponse::success(product))
}

/// POST /api/products (admin)
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateProductRequest>,
) -> ApiResult<Product> {
    validate_name(&body.name)?;
    validate_price(body.price)?;
    validate_images(&body.images)?;
    validate_stock(body.stock)?;

    let product = Product {
        id: Uuid::new_v4(),
        name: body.name.trim().to_string(),
        description: body.description,
        price: body.price,
        original_price: body.original_price,
        category: body.category,
        images: body.images,
        stock: body.stock,
        sizes: body.sizes,
        colors: body.colors,
        is_featured: body.is_featured,
        ratings: 0.0,
        num_reviews: 0,
        created_at: Utc::now(),
    };

    let product = state.catalog.insert_product(product).await?;
    Ok(ApiResponse::created(product))
}

/// PUT /api/products/:id (admin)
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateProductRequest>,
) -> ApiResult<Product> {
    let mut product = state
        .catalog
        .find_product(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;

    if let Some(name) = body.name {
        validate_name(&name)?;
        product.name = name.trim().to_string();
    }
    if let Some(description) = body.description {
        product.description = description;
    }
    if let Some(price) = body.price {
        validate_price(price)?;
        product.price = price;
    }
    if let Some(original_price) = body.original_price {
        product.original_price = Some(original_price);
    }
    if let Some(category) = body.category {
        product.category = Some(category);
    }
    if let Some(images) = body.images {
        validate_images(&images)?;
        product.images = images;
    }
    if let Some(stock) = body.stock {
        validate_stock(stock)?;
        product.stock = stock;
    }
    if let Some(sizes) = body.sizes {
        product.sizes = sizes;
    }
    if let Some(colors) = body.colors {
        product.colors = colors;
    }
    if let Some(is_featured) = body.is_featured {
        product.is_featured = is_featured;
    }

    let product = state.catalog.save_product(product).await?;
    Ok(ApiResponse::success(product))
}

/// DELETE /api/products/:id (admin)
pub async fn delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Value> {
    if !state.catalog.delete_product(id).await? {
        return Err(ApiError::not_found("Product not found"));
    }
    Ok(ApiResponse::success(json!({})))
}

fn validate_name(name: &str) -> Result<(), ApiError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::validation("Please add a product name"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(ApiError::validation("Name cannot be more than 100 characters"));
    }
    Ok(())
}

fn validate_price(price: Decimal) -> Result<(), ApiError> {
    if price < Decimal::ZERO {
        return Err(ApiError::validation("Price must be positive"));
    }
    Ok(())
}

fn validate_images(images: &[String]) -> Result<(), ApiError> {
    if images.is_empty() {
        return Err(ApiError::validation("Please add at least one image"));
    }
    Ok(())
}

fn validate_stock(stock: i32) -> Result<(), ApiError> {
    if stock < 0 {
        return Err(ApiError::validation("Stock cannot be negative"));
    }
    Ok(())
}
