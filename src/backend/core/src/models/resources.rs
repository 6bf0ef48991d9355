//! Marketplace resources: products, orders, deliveries, reviews, payments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ═══════════════════════════════════════════════════════════════════════════════
// Product
// ═══════════════════════════════════════════════════════════════════════════════

/// A listed item. `seller_id` is optional for listings that predate
/// seller accounts.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    /// Discount percentage, 0 to 100.
    pub discount: f64,
    pub instock: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(name: String, description: String, price: f64, discount: f64, seller_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            description,
            price,
            discount,
            instock: true,
            seller_id: Some(seller_id),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Order
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            "shipped" => Some(Self::Shipped),
            "delivered" => Some(Self::Delivered),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i64,
    /// Discounted unit price times quantity, rounded to 2 decimals at
    /// creation time.
    pub total_amount: f64,
    pub status: OrderStatus,
    pub order_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn new(customer_id: Uuid, product_id: Uuid, quantity: i64, total_amount: f64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            customer_id,
            product_id,
            quantity,
            total_amount,
            status: OrderStatus::Pending,
            order_date: now,
            created_at: now,
            updated_at: now,
        }
    }

    /// Order total: `price * (1 - discount / 100) * quantity`, rounded to
    /// 2 decimal places.
    pub fn compute_total(price: f64, discount: f64, quantity: i64) -> f64 {
        let raw = price * (1.0 - discount / 100.0) * quantity as f64;
        (raw * 100.0).round() / 100.0
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Delivery
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    #[default]
    Pending,
    InTransit,
    Delivered,
    Cancelled,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InTransit => "in_transit",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "in_transit" => Some(Self::InTransit),
            "delivered" => Some(Self::Delivered),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A shipment for an order, optionally assigned to a deliverer.
#[derive(Debug, Clone, Serialize)]
pub struct Delivery {
    pub id: Uuid,
    pub order_id: Uuid,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deliverer_id: Option<Uuid>,

    pub address: String,
    pub status: DeliveryStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivered_date: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Delivery {
    pub fn new(order_id: Uuid, deliverer_id: Option<Uuid>, address: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            order_id,
            deliverer_id,
            address,
            status: DeliveryStatus::Pending,
            delivered_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the status, stamping `delivered_date` on the transition to
    /// `delivered` unless a date was already recorded.
    pub fn set_status(&mut self, status: DeliveryStatus) {
        self.status = status;
        if status == DeliveryStatus::Delivered && self.delivered_date.is_none() {
            self.delivered_date = Some(Utc::now());
        }
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Review
// ═══════════════════════════════════════════════════════════════════════════════

/// A customer's review of an ordered product. One review per order.
#[derive(Debug, Clone, Serialize)]
pub struct Review {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub product_id: Uuid,
    pub order_id: Uuid,
    /// 1 to 5.
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Review {
    pub fn new(customer_id: Uuid, product_id: Uuid, order_id: Uuid, rating: i32, comment: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            customer_id,
            product_id,
            order_id,
            rating,
            comment,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Payment
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    CreditCard,
    Online,
    Upi,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::CreditCard => "credit_card",
            Self::Online => "online",
            Self::Upi => "upi",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "cash" => Some(Self::Cash),
            "credit_card" => Some(Self::CreditCard),
            "online" => Some(Self::Online),
            "upi" => Some(Self::Upi),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment record for an order. Recording only; no processor integration.
#[derive(Debug, Clone, Serialize)]
pub struct Payment {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub order_id: Uuid,
    pub payment_method: PaymentMethod,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(customer_id: Uuid, order_id: Uuid, payment_method: PaymentMethod) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            customer_id,
            order_id,
            payment_method,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_total_applies_discount_per_unit() {
        // 100 at 10% off, twice: 180, not 190.
        assert_eq!(Order::compute_total(100.0, 10.0, 2), 180.0);
    }

    #[test]
    fn test_order_total_rounds_to_cents() {
        assert_eq!(Order::compute_total(19.99, 15.0, 3), 50.97);
        assert_eq!(Order::compute_total(0.1, 0.0, 3), 0.3);
    }

    #[test]
    fn test_order_total_no_discount() {
        assert_eq!(Order::compute_total(25.0, 0.0, 4), 100.0);
    }

    #[test]
    fn test_delivery_status_stamps_delivered_date() {
        let mut delivery = Delivery::new(Uuid::new_v4(), None, "1 Main St".into());
        assert!(delivery.delivered_date.is_none());

        delivery.set_status(DeliveryStatus::InTransit);
        assert!(delivery.delivered_date.is_none());

        delivery.set_status(DeliveryStatus::Delivered);
        let stamped = delivery.delivered_date;
        assert!(stamped.is_some());

        // Re-setting delivered keeps the original stamp.
        delivery.set_status(DeliveryStatus::Delivered);
        assert_eq!(delivery.delivered_date, stamped);
    }

    #[test]
    fn test_status_text_round_trips() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
        for status in [
            DeliveryStatus::Pending,
            DeliveryStatus::InTransit,
            DeliveryStatus::Delivered,
            DeliveryStatus::Cancelled,
        ] {
            assert_eq!(DeliveryStatus::parse(status.as_str()), Some(status));
        }
        for method in [
            PaymentMethod::Cash,
            PaymentMethod::CreditCard,
            PaymentMethod::Online,
            PaymentMethod::Upi,
        ] {
            assert_eq!(PaymentMethod::parse(method.as_str()), Some(method));
        }
    }

    #[test]
    fn test_payment_method_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::CreditCard).unwrap(),
            "\"credit_card\""
        );
    }
}
