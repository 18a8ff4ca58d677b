//! Persistence boundary: three narrow traits, one per component that owns
//! data. `PgStore` implements them against Postgres; `MemStore` backs the
//! test suite and the database-less dev mode.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Category, Order, Product, User};

pub use memory::MemStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("invalid stored record: {0}")]
    Corrupt(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("migration failed: {0}")]
    Migration(String),
}

/// Outcome of an all-or-nothing stock reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockReservation {
    Reserved,
    /// The first line item that could not be covered; nothing was decremented.
    InsufficientStock(Uuid),
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ProductFilter {
    pub category: Option<Uuid>,
    pub featured: Option<bool>,
}

/// Identity records: credentials, role, contact fields.
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// Persist a new user. Fails with `Conflict` when the email is taken.
    async fn insert_user(&self, user: User) -> Result<User, StoreError>;
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;
    /// Full-record replace. Fails with `Conflict` when the email would
    /// collide with another account, `NotFound` when the id is unknown.
    async fn save_user(&self, user: User) -> Result<User, StoreError>;
    /// Returns false when no such user existed.
    async fn delete_user(&self, id: Uuid) -> Result<bool, StoreError>;
    async fn has_admin(&self) -> Result<bool, StoreError>;
}

/// Products and categories, including the authoritative stock counters.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn insert_product(&self, product: Product) -> Result<Product, StoreError>;
    async fn find_product(&self, id: Uuid) -> Result<Option<Product>, StoreError>;
    async fn list_products(&self, filter: ProductFilter) -> Result<Vec<Product>, StoreError>;
    async fn save_product(&self, product: Product) -> Result<Product, StoreError>;
    async fn delete_product(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Clamped decrement: `stock = max(0, stock - quantity)`. A missing
    /// product is a silent skip, and hitting the floor is not reported.
    async fn decrement_stock(&self, product_id: Uuid, quantity: u32) -> Result<(), StoreError>;

    /// All-or-nothing conditional decrement across every line item. On
    /// `InsufficientStock` no counter has changed.
    async fn reserve_stock(&self, items: &[(Uuid, u32)]) -> Result<StockReservation, StoreError>;

    /// Return previously reserved quantities to stock (order cancellation).
    async fn restock(&self, items: &[(Uuid, u32)]) -> Result<(), StoreError>;

    async fn insert_category(&self, category: Category) -> Result<Category, StoreError>;
    async fn find_category(&self, id: Uuid) -> Result<Option<Category>, StoreError>;
    async fn list_categories(&self) -> Result<Vec<Category>, StoreError>;
    async fn save_category(&self, category: Category) -> Result<Category, StoreError>;
    async fn delete_category(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Cascade-null: clear `category` on every product referencing the id.
    async fn clear_category_refs(&self, category_id: Uuid) -> Result<(), StoreError>;
}

/// Order records: immutable purchase snapshot plus mutable fulfillment state.
#[async_trait]
pub trait OrderLedger: Send + Sync {
    async fn insert_order(&self, order: Order) -> Result<Order, StoreError>;
    async fn find_order(&self, id: Uuid) -> Result<Option<Order>, StoreError>;
    async fn list_orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>, StoreError>;
    async fn list_orders(&self) -> Result<Vec<Order>, StoreError>;
    async fn save_order(&self, order: Order) -> Result<Order, StoreError>;
    async fn delete_order(&self, id: Uuid) -> Result<bool, StoreError>;
}
