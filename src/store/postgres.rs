//! Postgres implementation of the store traits. All queries are bound at
//! runtime; order line items and shipping addresses live in JSONB columns so
//! the purchase snapshot stays a single document.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::Row;
use uuid::Uuid;

use crate::config;
use crate::models::{Category, Order, OrderItem, Product, ShippingAddress, User};

use super::{
    AccountDirectory, CatalogStore, OrderLedger, ProductFilter, StockReservation, StoreError,
};

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect and bring the schema up to date.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config::config().database.max_connections)
            .connect(url)
            .await?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Migration(e.to_string()))?;
        Ok(Self { pool })
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

fn user_from_row(row: &PgRow) -> Result<User, StoreError> {
    let role: String = row.try_get("role")?;
    Ok(User {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        role: role.parse().map_err(StoreError::Corrupt)?,
        phone: row.try_get("phone")?,
        address: row.try_get("address")?,
        created_at: row.try_get("created_at")?,
    })
}

fn category_from_row(row: &PgRow) -> Result<Category, StoreError> {
    Ok(Category {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        slug: row.try_get("slug")?,
        description: row.try_get("description")?,
        parent: row.try_get("parent")?,
        created_at: row.try_get("created_at")?,
    })
}

fn product_from_row(row: &PgRow) -> Result<Product, StoreError> {
    Ok(Product {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        price: row.try_get("price")?,
        original_price: row.try_get("original_price")?,
        category: row.try_get("category")?,
        images: row.try_get("images")?,
        stock: row.try_get("stock")?,
        sizes: row.try_get("sizes")?,
        colors: row.try_get("colors")?,
        is_featured: row.try_get("is_featured")?,
        ratings: row.try_get("ratings")?,
        num_reviews: row.try_get("num_reviews")?,
        created_at: row.try_get("created_at")?,
    })
}

fn order_from_row(row: &PgRow) -> Result<Order, StoreError> {
    let Json(order_items): Json<Vec<OrderItem>> = row.try_get("order_items")?;
    let Json(shipping_address): Json<ShippingAddress> = row.try_get("shipping_address")?;
    let payment_method: String = row.try_get("payment_method")?;
    let status: String = row.try_get("status")?;
    Ok(Order {
        id: row.try_get("id")?,
        user: row.try_get("user_id")?,
        order_items,
        shipping_address,
        payment_method: payment_method.parse().map_err(StoreError::Corrupt)?,
        total_price: row.try_get("total_price")?,
        shipping_price: row.try_get("shipping_price")?,
        status: status.parse().map_err(StoreError::Corrupt)?,
        is_paid: row.try_get("is_paid")?,
        paid_at: row.try_get("paid_at")?,
        is_delivered: row.try_get("is_delivered")?,
        delivered_at: row.try_get("delivered_at")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl AccountDirectory for PgStore {
    async fn insert_user(&self, user: User) -> Result<User, StoreError> {
        let result = sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, role, phone, address, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(&user.phone)
        .bind(&user.address)
        .bind(user.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(user),
            Err(e) if is_unique_violation(&e) => {
                Err(StoreError::Conflict("Email already in use".into()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        sqlx::query("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(|row| user_from_row(&row))
            .transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        sqlx::query("SELECT * FROM users WHERE lower(email) = lower($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .map(|row| user_from_row(&row))
            .transpose()
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        sqlx::query("SELECT * FROM users ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(user_from_row)
            .collect()
    }

    async fn save_user(&self, user: User) -> Result<User, StoreError> {
        let result = sqlx::query(
            "UPDATE users SET name = $2, email = $3, password_hash = $4, role = $5,
                              phone = $6, address = $7
             WHERE id = $1",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(&user.phone)
        .bind(&user.address)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) if done.rows_affected() == 0 => {
                Err(StoreError::NotFound("User not found".into()))
            }
            Ok(_) => Ok(user),
            Err(e) if is_unique_violation(&e) => {
                Err(StoreError::Conflict("Email already in use".into()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, StoreError> {
        let done = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected() > 0)
    }

    async fn has_admin(&self) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM users WHERE role = 'admin') AS present")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("present")?)
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn insert_product(&self, product: Product) -> Result<Product, StoreError> {
        sqlx::query(
            "INSERT INTO products (id, name, description, price, original_price, category,
                                   images, stock, sizes, colors, is_featured, ratings,
                                   num_reviews, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.original_price)
        .bind(product.category)
        .bind(&product.images)
        .bind(product.stock)
        .bind(&product.sizes)
        .bind(&product.colors)
        .bind(product.is_featured)
        .bind(product.ratings)
        .bind(product.num_reviews)
        .bind(product.created_at)
        .execute(&self.pool)
        .await?;
        Ok(product)
    }

    async fn find_product(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
        sqlx::query("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(|row| product_from_row(&row))
            .transpose()
    }

    async fn list_products(&self, filter: ProductFilter) -> Result<Vec<Product>, StoreError> {
        sqlx::query(
            "SELECT * FROM products
             WHERE ($1::uuid IS NULL OR category = $1)
               AND ($2::boolean IS NULL OR is_featured = $2)
             ORDER BY created_at",
        )
        .bind(filter.category)
        .bind(filter.featured)
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(product_from_row)
        .collect()
    }

    async fn save_product(&self, product: Product) -> Result<Product, StoreError> {
        let done = sqlx::query(
            "UPDATE products SET name = $2, description = $3, price = $4, original_price = $5,
                                 category = $6, images = $7, stock = $8, sizes = $9,
                                 colors = $10, is_featured = $11, ratings = $12, num_reviews = $13
             WHERE id = $1",
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.original_price)
        .bind(product.category)
        .bind(&product.images)
        .bind(product.stock)
        .bind(&product.sizes)
        .bind(&product.colors)
        .bind(product.is_featured)
        .bind(product.ratings)
        .bind(product.num_reviews)
        .execute(&self.pool)
        .await?;
        if done.rows_affected() == 0 {
            return Err(StoreError::NotFound("Product not found".into()));
        }
        Ok(product)
    }

    async fn delete_product(&self, id: Uuid) -> Result<bool, StoreError> {
        let done = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected() > 0)
    }

    async fn decrement_stock(&self, product_id: Uuid, quantity: u32) -> Result<(), StoreError> {
        // Clamped at zero; a missing product affects zero rows and is skipped
        sqlx::query("UPDATE products SET stock = GREATEST(0, stock - $2) WHERE id = $1")
            .bind(product_id)
            .bind(i32::try_from(quantity).unwrap_or(i32::MAX))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn reserve_stock(&self, items: &[(Uuid, u32)]) -> Result<StockReservation, StoreError> {
        let mut tx = self.pool.begin().await?;
        for (product_id, quantity) in items {
            // Stock is an INTEGER column, so a larger quantity can never be covered
            let quantity = match i32::try_from(*quantity) {
                Ok(q) => q,
                Err(_) => {
                    tx.rollback().await?;
                    return Ok(StockReservation::InsufficientStock(*product_id));
                }
            };
            let done =
                sqlx::query("UPDATE products SET stock = stock - $2 WHERE id = $1 AND stock >= $2")
                    .bind(product_id)
                    .bind(quantity)
                    .execute(&mut *tx)
                    .await?;
            if done.rows_affected() == 0 {
                tx.rollback().await?;
                return Ok(StockReservation::InsufficientStock(*product_id));
            }
        }
        tx.commit().await?;
        Ok(StockReservation::Reserved)
    }

    async fn restock(&self, items: &[(Uuid, u32)]) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        for (product_id, quantity) in items {
            sqlx::query("UPDATE products SET stock = stock + $2 WHERE id = $1")
                .bind(product_id)
                .bind(i32::try_from(*quantity).unwrap_or(i32::MAX))
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn insert_category(&self, category: Category) -> Result<Category, StoreError> {
        let result = sqlx::query(
            "INSERT INTO categories (id, name, slug, description, parent, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(category.id)
        .bind(&category.name)
        .bind(&category.slug)
        .bind(&category.description)
        .bind(category.parent)
        .bind(category.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(category),
            Err(e) if is_unique_violation(&e) => {
                Err(StoreError::Conflict("Category slug already in use".into()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_category(&self, id: Uuid) -> Result<Option<Category>, StoreError> {
        sqlx::query("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(|row| category_from_row(&row))
            .transpose()
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        sqlx::query("SELECT * FROM categories ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(category_from_row)
            .collect()
    }

    async fn save_category(&self, category: Category) -> Result<Category, StoreError> {
        let result = sqlx::query(
            "UPDATE categories SET name = $2, slug = $3, description = $4, parent = $5
             WHERE id = $1",
        )
        .bind(category.id)
        .bind(&category.name)
        .bind(&category.slug)
        .bind(&category.description)
        .bind(category.parent)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) if done.rows_affected() == 0 => {
                Err(StoreError::NotFound("Category not found".into()))
            }
            Ok(_) => Ok(category),
            Err(e) if is_unique_violation(&e) => {
                Err(StoreError::Conflict("Category slug already in use".into()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_category(&self, id: Uuid) -> Result<bool, StoreError> {
        let done = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected() > 0)
    }

    async fn clear_category_refs(&self, category_id: Uuid) -> Result<(), StoreError> {
        sqlx::query("UPDATE products SET category = NULL WHERE category = $1")
            .bind(category_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl OrderLedger for PgStore {
    async fn insert_order(&self, order: Order) -> Result<Order, StoreError> {
        sqlx::query(
            "INSERT INTO orders (id, user_id, order_items, shipping_address, payment_method,
                                 total_price, shipping_price, status, is_paid, paid_at,
                                 is_delivered, delivered_at, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(order.id)
        .bind(order.user)
        .bind(Json(&order.order_items))
        .bind(Json(&order.shipping_address))
        .bind(order.payment_method.as_str())
        .bind(order.total_price)
        .bind(order.shipping_price)
        .bind(order.status.as_str())
        .bind(order.is_paid)
        .bind(order.paid_at)
        .bind(order.is_delivered)
        .bind(order.delivered_at)
        .bind(order.created_at)
        .execute(&self.pool)
        .await?;
        Ok(order)
    }

    async fn find_order(&self, id: Uuid) -> Result<Option<Order>, StoreError> {
        sqlx::query("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(|row| order_from_row(&row))
            .transpose()
    }

    async fn list_orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>, StoreError> {
        sqlx::query("SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(order_from_row)
            .collect()
    }

    async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
        sqlx::query("SELECT * FROM orders ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(order_from_row)
            .collect()
    }

    async fn save_order(&self, order: Order) -> Result<Order, StoreError> {
        let done = sqlx::query(
            "UPDATE orders SET shipping_address = $2, status = $3, is_paid = $4, paid_at = $5,
                               is_delivered = $6, delivered_at = $7
             WHERE id = $1",
        )
        .bind(order.id)
        .bind(Json(&order.shipping_address))
        .bind(order.status.as_str())
        .bind(order.is_paid)
        .bind(order.paid_at)
        .bind(order.is_delivered)
        .bind(order.delivered_at)
        .execute(&self.pool)
        .await?;
        if done.rows_affected() == 0 {
            return Err(StoreError::NotFound("Order not found".into()));
        }
        Ok(order)
    }

    async fn delete_order(&self, id: Uuid) -> Result<bool, StoreError> {
        let done = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected() > 0)
    }
}
