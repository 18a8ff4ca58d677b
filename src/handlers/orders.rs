//! Order endpoints: checkout, the customer's own views, and admin fulfillment.
//!
//! Checkout reserves stock for every line item atomically before the order is
//! written. A failed reservation aborts the whole order and leaves every
//! counter untouched, so inventory can never go inconsistent mid-checkout.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::models::{Order, OrderItem, OrderStatus, PaymentMethod, ShippingAddress, User};
use crate::state::AppState;
use crate::store::StockReservation;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub order_items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub total_price: Decimal,
    #[serde(default)]
    pub shipping_price: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    pub status: Option<OrderStatus>,
    pub is_paid: Option<bool>,
    pub shipping_address: Option<ShippingAddress>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Option<String>,
}

/// Line item resolved against the live product for display: name and image
/// come from the catalog, the price stays the checkout-time snapshot.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemView {
    pub product: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub price: Decimal,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: Uuid,
    pub user: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<UserSummary>,
    pub order_items: Vec<LineItemView>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub total_price: Decimal,
    pub shipping_price: Decimal,
    pub status: OrderStatus,
    pub is_paid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,
    pub is_delivered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// POST /api/orders
pub async fn create(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(body): Json<CreateOrderRequest>,
) -> ApiResult<Order> {
    if body.order_items.is_empty() {
        return Err(ApiError::validation("No order items"));
    }
    for item in &body.order_items {
        if item.quantity < 1 {
            return Err(ApiError::validation("Line item quantity must be at least 1"));
        }
        // Stock counters are i32; a larger quantity can never be fulfilled
        if i32::try_from(item.quantity).is_err() {
            return Err(ApiError::validation("Line item quantity is too large"));
        }
    }

    let wanted: Vec<(Uuid, u32)> = body
        .order_items
        .iter()
        .map(|item| (item.product, item.quantity))
        .collect();

    // Reserve before writing the order: a shortfall aborts the whole
    // checkout with every stock counter unchanged.
    match state.catalog.reserve_stock(&wanted).await? {
        StockReservation::Reserved => {}
        StockReservation::InsufficientStock(product_id) => {
            return Err(ApiError::validation(format!(
                "Insufficient stock for product {}",
                product_id
            )));
        }
    }

    let order = Order::new(
        user.id,
        body.order_items,
        body.shipping_address,
        body.payment_method,
        body.total_price,
        body.shipping_price,
    );

    match state.orders.insert_order(order).await {
        Ok(order) => Ok(ApiResponse::created(order)),
        Err(e) => {
            // The order never existed, so hand the reservation back
            if let Err(restock_err) = state.catalog.restock(&wanted).await {
                tracing::error!("failed to restock after order insert error: {}", restock_err);
            }
            Err(e.into())
        }
    }
}

/// GET /api/orders/myorders
pub async fn my_orders(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> ApiResult<Vec<OrderView>> {
    let orders = state.orders.list_orders_for_user(user.id).await?;
    let mut views = Vec::with_capacity(orders.len());
    for order in orders {
        views.push(resolve_order(&state, order, false).await?);
    }
    Ok(ApiResponse::list(views))
}

/// GET /api/orders/:id - owner or admin only.
pub async fn get(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<OrderView> {
    let order = find_order(&state, id).await?;
    ensure_owner_or_admin(&order, &user)?;
    let view = resolve_order(&state, order, true).await?;
    Ok(ApiResponse::success(view))
}

/// PUT /api/orders/:id/cancel - owner-initiated, pending orders only.
/// Cancelling returns the reserved quantities to stock.
pub async fn cancel(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Order> {
    let mut order = find_order(&state, id).await?;
    ensure_owner_or_admin(&order, &user)?;

    if order.status != OrderStatus::Pending {
        return Err(ApiError::bad_request("Only pending orders can be cancelled"));
    }

    // Return the units first: if the restock fails the order stays pending
    // and can simply be cancelled again.
    let reserved: Vec<(Uuid, u32)> = order
        .order_items
        .iter()
        .map(|item| (item.product, item.quantity))
        .collect();
    state.catalog.restock(&reserved).await?;

    order.set_status(OrderStatus::Cancelled);
    match state.orders.save_order(order).await {
        Ok(order) => Ok(ApiResponse::success(order)),
        Err(e) => {
            // The cancellation never happened, so take the units back
            if let Err(reserve_err) = state.catalog.reserve_stock(&reserved).await {
                tracing::error!(
                    "failed to re-reserve stock after cancel save error: {}",
                    reserve_err
                );
            }
            Err(e.into())
        }
    }
}

/// GET /api/orders (admin) - every order, with customers resolved.
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<OrderView>> {
    let orders = state.orders.list_orders().await?;
    let mut views = Vec::with_capacity(orders.len());
    for order in orders {
        views.push(resolve_order(&state, order, true).await?);
    }
    Ok(ApiResponse::list(views))
}

/// PUT /api/orders/:id (admin) - general fulfillment patch.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateOrderRequest>,
) -> ApiResult<Order> {
    let mut order = find_order(&state, id).await?;

    if let Some(status) = body.status {
        order.set_status(status);
    }
    if let Some(is_paid) = body.is_paid {
        order.set_paid(is_paid);
    }
    if let Some(shipping_address) = body.shipping_address {
        order.shipping_address = shipping_address;
    }

    let order = state.orders.save_order(order).await?;
    Ok(ApiResponse::success(order))
}

/// PUT /api/orders/:id/status (admin). Any target stage is accepted;
/// `delivered` also stamps the delivery flag and timestamp.
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateStatusRequest>,
) -> ApiResult<Order> {
    let status = body
        .status
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::bad_request("Please provide status"))?
        .parse::<OrderStatus>()
        .map_err(ApiError::validation)?;

    let mut order = find_order(&state, id).await?;
    order.set_status(status);
    let order = state.orders.save_order(order).await?;
    Ok(ApiResponse::success(order))
}

/// DELETE /api/orders/:id (admin)
pub async fn delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Value> {
    if !state.orders.delete_order(id).await? {
        return Err(ApiError::not_found("Order not found"));
    }
    Ok(ApiResponse::success(json!({})))
}

async fn find_order(state: &AppState, id: Uuid) -> Result<Order, ApiError> {
    state
        .orders
        .find_order(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Order not found"))
}

fn ensure_owner_or_admin(order: &Order, user: &User) -> Result<(), ApiError> {
    if order.user != user.id && !user.is_admin() {
        return Err(ApiError::forbidden("Not authorized to access this order"));
    }
    Ok(())
}

/// Read-time join: resolve product display fields (and optionally the owning
/// user) for rendering. Snapshot prices are kept as stored.
async fn resolve_order(
    state: &AppState,
    order: Order,
    with_customer: bool,
) -> Result<OrderView, ApiError> {
    let mut order_items = Vec::with_capacity(order.order_items.len());
    for item in &order.order_items {
        let product = state.catalog.find_product(item.product).await?;
        order_items.push(LineItemView {
            product: item.product,
            name: product.as_ref().map(|p| p.name.clone()),
            image: product.as_ref().and_then(|p| p.images.first().cloned()),
            price: item.price,
            quantity: item.quantity,
            size: item.size.clone(),
            color: item.color.clone(),
        });
    }

    let customer = if with_customer {
        state.accounts.find_user(order.user).await?.map(|u| UserSummary {
            id: u.id,
            name: u.name,
            email: u.email,
        })
    } else {
        None
    };

    Ok(OrderView {
        id: order.id,
        user: order.user,
        customer,
        order_items,
        shipping_address: order.shipping_address,
        payment_method: order.payment_method,
        total_price: order.total_price,
        shipping_price: order.shipping_price,
        status: order.status,
        is_paid: order.is_paid,
        paid_at: order.paid_at,
        is_delivered: order.is_delivered,
        delivered_at: order.delivered_at,
        created_at: order.created_at,
    })
}
