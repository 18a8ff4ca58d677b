use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fulfillment stage of an order. The transition graph is deliberately open:
/// an admin may move an order to any stage from any stage. The one coupled
/// side effect is `delivered`, which also stamps the delivery flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "processing" => Ok(OrderStatus::Processing),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(format!("unknown order status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    CashOnDelivery,
    BankTransfer,
    EWallet,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CashOnDelivery => "cash-on-delivery",
            PaymentMethod::BankTransfer => "bank-transfer",
            PaymentMethod::EWallet => "e-wallet",
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash-on-delivery" => Ok(PaymentMethod::CashOnDelivery),
            "bank-transfer" => Ok(PaymentMethod::BankTransfer),
            "e-wallet" => Ok(PaymentMethod::EWallet),
            other => Err(format!("unknown payment method: {}", other)),
        }
    }
}

/// One purchased product selection, frozen at order-creation time. The price
/// is the snapshot taken at checkout, never re-read from the live product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product: Uuid,
    pub quantity: u32,
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub full_name: String,
    pub address: String,
    pub city: String,
    pub phone: String,
}

/// The core transactional record: an immutable snapshot of what was bought,
/// plus mutable fulfillment state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub user: Uuid,
    pub order_items: Vec<OrderItem>,
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

impl Order {
    pub fn new(
        user: Uuid,
        order_items: Vec<OrderItem>,
        shipping_address: ShippingAddress,
        payment_method: PaymentMethod,
        total_price: Decimal,
        shipping_price: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user,
            order_items,
            shipping_address,
            payment_method,
            total_price,
            shipping_price,
            status: OrderStatus::Pending,
            is_paid: false,
            paid_at: None,
            is_delivered: false,
            delivered_at: None,
            created_at: Utc::now(),
        }
    }

    /// Apply a status change. Any target stage is accepted; `delivered`
    /// additionally stamps the delivery flag and timestamp.
    pub fn set_status(&mut self, status: OrderStatus) {
        self.status = status;
        if status == OrderStatus::Delivered {
            self.is_delivered = true;
            self.delivered_at = Some(Utc::now());
        }
    }

    /// Flip the payment flag, stamping or clearing the paid timestamp.
    pub fn set_paid(&mut self, paid: bool) {
        self.is_paid = paid;
        self.paid_at = if paid { Some(Utc::now()) } else { None };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order() -> Order {
        Order::new(
            Uuid::new_v4(),
            vec![OrderItem {
                product: Uuid::new_v4(),
                quantity: 1,
                price: Decimal::from(50_000),
                size: None,
                color: None,
            }],
            ShippingAddress {
                full_name: "Binh Tran".into(),
                address: "12 Le Loi".into(),
                city: "Da Nang".into(),
                phone: "0901234567".into(),
            },
            PaymentMethod::CashOnDelivery,
            Decimal::from(50_000),
            Decimal::ZERO,
        )
    }

    #[test]
    fn new_order_starts_pending_unpaid_undelivered() {
        let order = order();
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(!order.is_paid && order.paid_at.is_none());
        assert!(!order.is_delivered && order.delivered_at.is_none());
    }

    #[test]
    fn delivered_stamps_delivery_flag() {
        let mut order = order();
        order.set_status(OrderStatus::Delivered);
        assert!(order.is_delivered);
        assert!(order.delivered_at.is_some());
    }

    #[test]
    fn other_statuses_never_touch_delivery_flag() {
        let mut order = order();
        for status in [
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Cancelled,
            OrderStatus::Pending,
        ] {
            order.set_status(status);
            assert!(!order.is_delivered);
            assert!(order.delivered_at.is_none());
        }
    }

    #[test]
    fn transitions_are_accepted_in_any_direction() {
        let mut order = order();
        order.set_status(OrderStatus::Shipped);
        order.set_status(OrderStatus::Pending);
        assert_eq!(order.status, OrderStatus::Pending);
        order.set_status(OrderStatus::Cancelled);
        order.set_status(OrderStatus::Processing);
        assert_eq!(order.status, OrderStatus::Processing);
    }

    #[test]
    fn payment_method_wire_names() {
        assert_eq!(
            serde_json::to_value(PaymentMethod::CashOnDelivery).unwrap(),
            "cash-on-delivery"
        );
        assert_eq!(serde_json::to_value(PaymentMethod::EWallet).unwrap(), "e-wallet");
        assert_eq!("bank-transfer".parse::<PaymentMethod>().unwrap(), PaymentMethod::BankTransfer);
    }

    #[test]
    fn status_parse_rejects_unknown() {
        assert!("refunded".parse::<OrderStatus>().is_err());
    }
}
