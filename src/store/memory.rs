//! In-memory store backing the test suite and the database-less dev mode.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{Category, Order, Product, User};

use super::{
    AccountDirectory, CatalogStore, OrderLedger, ProductFilter, StockReservation, StoreError,
};

#[derive(Default)]
pub struct MemStore {
    users: RwLock<HashMap<Uuid, User>>,
    products: RwLock<HashMap<Uuid, Product>>,
    categories: RwLock<HashMap<Uuid, Category>>,
    orders: RwLock<HashMap<Uuid, Order>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountDirectory for MemStore {
    async fn insert_user(&self, user: User) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(StoreError::Conflict("Email already in use".into()));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn save_user(&self, user: User) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if !users.contains_key(&user.id) {
            return Err(StoreError::NotFound("User not found".into()));
        }
        if users
            .values()
            .any(|u| u.id != user.id && u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(StoreError::Conflict("Email already in use".into()));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.users.write().await.remove(&id).is_some())
    }

    async fn has_admin(&self) -> Result<bool, StoreError> {
        Ok(self.users.read().await.values().any(|u| u.is_admin()))
    }
}

#[async_trait]
impl CatalogStore for MemStore {
    async fn insert_product(&self, product: Product) -> Result<Product, StoreError> {
        self.products
            .write()
            .await
            .insert(product.id, product.clone());
        Ok(product)
    }

    async fn find_product(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
        Ok(self.products.read().await.get(&id).cloned())
    }

    async fn list_products(&self, filter: ProductFilter) -> Result<Vec<Product>, StoreError> {
        let mut products: Vec<Product> = self
            .products
            .read()
            .await
            .values()
            .filter(|p| filter.category.map_or(true, |c| p.category == Some(c)))
            .filter(|p| filter.featured.map_or(true, |f| p.is_featured == f))
            .cloned()
            .collect();
        products.sort_by_key(|p| p.created_at);
        Ok(products)
    }

    async fn save_product(&self, product: Product) -> Result<Product, StoreError> {
        let mut products = self.products.write().await;
        if !products.contains_key(&product.id) {
            return Err(StoreError::NotFound("Product not found".into()));
        }
        products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn delete_product(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.products.write().await.remove(&id).is_some())
    }

    async fn decrement_stock(&self, product_id: Uuid, quantity: u32) -> Result<(), StoreError> {
        let mut products = self.products.write().await;
        // Missing product: non-fatal skip
        if let Some(product) = products.get_mut(&product_id) {
            let quantity = i32::try_from(quantity).unwrap_or(i32::MAX);
            product.stock = product.stock.saturating_sub(quantity).max(0);
        }
        Ok(())
    }

    async fn reserve_stock(&self, items: &[(Uuid, u32)]) -> Result<StockReservation, StoreError> {
        let mut products = self.products.write().await;
        // Check every line under the one write lock before touching anything
        let mut debits = Vec::with_capacity(items.len());
        for (product_id, quantity) in items {
            // Stock is an i32, so a quantity beyond i32::MAX can never be covered
            let quantity = match i32::try_from(*quantity) {
                Ok(q) => q,
                Err(_) => return Ok(StockReservation::InsufficientStock(*product_id)),
            };
            match products.get(product_id) {
                Some(p) if p.stock >= quantity => debits.push((*product_id, quantity)),
                _ => return Ok(StockReservation::InsufficientStock(*product_id)),
            }
        }
        for (product_id, quantity) in debits {
            if let Some(p) = products.get_mut(&product_id) {
                p.stock -= quantity;
            }
        }
        Ok(StockReservation::Reserved)
    }

    async fn restock(&self, items: &[(Uuid, u32)]) -> Result<(), StoreError> {
        let mut products = self.products.write().await;
        for (product_id, quantity) in items {
            if let Some(p) = products.get_mut(product_id) {
                let quantity = i32::try_from(*quantity).unwrap_or(i32::MAX);
                p.stock = p.stock.saturating_add(quantity);
            }
        }
        Ok(())
    }

    async fn insert_category(&self, category: Category) -> Result<Category, StoreError> {
        let mut categories = self.categories.write().await;
        if categories.values().any(|c| c.slug == category.slug) {
            return Err(StoreError::Conflict("Category slug already in use".into()));
        }
        categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn find_category(&self, id: Uuid) -> Result<Option<Category>, StoreError> {
        Ok(self.categories.read().await.get(&id).cloned())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let mut categories: Vec<Category> =
            self.categories.read().await.values().cloned().collect();
        categories.sort_by_key(|c| c.created_at);
        Ok(categories)
    }

    async fn save_category(&self, category: Category) -> Result<Category, StoreError> {
        let mut categories = self.categories.write().await;
        if !categories.contains_key(&category.id) {
            return Err(StoreError::NotFound("Category not found".into()));
        }
        if categories
            .values()
            .any(|c| c.id != category.id && c.slug == category.slug)
        {
            return Err(StoreError::Conflict("Category slug already in use".into()));
        }
        categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn delete_category(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.categories.write().await.remove(&id).is_some())
    }

    async fn clear_category_refs(&self, category_id: Uuid) -> Result<(), StoreError> {
        let mut products = self.products.write().await;
        for product in products.values_mut() {
            if product.category == Some(category_id) {
                product.category = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl OrderLedger for MemStore {
    async fn insert_order(&self, order: Order) -> Result<Order, StoreError> {
        self.orders.write().await.insert(order.id, order.clone());
        Ok(order)
    }

    async fn find_order(&self, id: Uuid) -> Result<Option<Order>, StoreError> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn list_orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>, StoreError> {
        let mut orders: Vec<Order> = self
            .orders
            .read()
            .await
            .values()
            .filter(|o| o.user == user_id)
            .cloned()
            .collect();
        orders.sort_by_key(|o| o.created_at);
        Ok(orders)
    }

    async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
        let mut orders: Vec<Order> = self.orders.read().await.values().cloned().collect();
        orders.sort_by_key(|o| o.created_at);
        Ok(orders)
    }

    async fn save_order(&self, order: Order) -> Result<Order, StoreError> {
        let mut orders = self.orders.write().await;
        if !orders.contains_key(&order.id) {
            return Err(StoreError::NotFound("Order not found".into()));
        }
        orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn delete_order(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.orders.write().await.remove(&id).is_some())
    }
}
