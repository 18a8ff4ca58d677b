use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// Catalog record. `stock` stays non-negative through every mutation; the
/// catalog store owns the counter and orders only reference product ids.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Decimal>,
    /// None once the owning category has been deleted (cascade-null).
    pub category: Option<Uuid>,
    pub images: Vec<String>,
    pub stock: i32,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub is_featured: bool,
    pub ratings: f64,
    pub num_reviews: i32,
    pub created_at: DateTime<Utc>,
}

pub const MAX_NAME_LEN: usize = 100;
