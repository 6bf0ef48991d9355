//! Persistence layer.
//!
//! All reads and writes go through the [`Store`] trait so the HTTP layer
//! never depends on a concrete backend. Two implementations exist:
//!
//! - [`MemoryStore`]: in-process maps, used by tests and storeless dev runs
//! - [`Database`]: PostgreSQL via sqlx, the production backend
//!
//! Account collections are strictly separate; an id is only ever looked up
//! in the collection its role names.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::Database;

use async_trait::async_trait;
use uuid::Uuid;

use crate::approval::ApprovalStatus;
use crate::error::Result;
use crate::models::{
    Admin, Customer, Deliverer, Delivery, DeliveryStatus, Order, OrderStatus, Payment, Product,
    Review, Seller,
};
use crate::pagination::OffsetPagination;

// ═══════════════════════════════════════════════════════════════════════════════
// List Results and Filters
// ═══════════════════════════════════════════════════════════════════════════════

/// One page of a filtered listing, with the filtered total for metadata.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

/// Filters shared by the account listings. Name, email and shop name match
/// as case-insensitive substrings.
#[derive(Debug, Clone, Default)]
pub struct AccountFilter {
    pub name: Option<String>,
    pub email: Option<String>,
    pub shop_name: Option<String>,
    pub status: Option<ApprovalStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Case-insensitive substring match.
    pub name: Option<String>,
    pub instock: Option<bool>,
    pub seller_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub customer_id: Option<Uuid>,
    /// Restrict to orders of these products (seller scoping).
    pub product_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone, Default)]
pub struct DeliveryFilter {
    pub status: Option<DeliveryStatus>,
    pub deliverer_id: Option<Uuid>,
    pub order_id: Option<Uuid>,
    /// Restrict to deliveries of these orders (customer/seller scoping).
    pub order_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone, Default)]
pub struct ReviewFilter {
    pub product_id: Option<Uuid>,
    pub order_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct PaymentFilter {
    pub customer_id: Option<Uuid>,
    /// Restrict to payments of these orders (seller scoping).
    pub order_ids: Option<Vec<Uuid>>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Store Trait
// ═══════════════════════════════════════════════════════════════════════════════

/// Backend-agnostic persistence operations.
///
/// Listings sort by creation time, newest first. `update_*` replaces the row
/// with the same id; `delete_*` reports whether a row was removed. The
/// `*_by_email` lookups take an optional id to exclude, for uniqueness
/// checks during self-updates.
#[async_trait]
pub trait Store: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Admins
    // ─────────────────────────────────────────────────────────────────────────

    async fn list_admins(&self, filter: &AccountFilter, page: OffsetPagination)
        -> Result<Page<Admin>>;
    async fn admin(&self, id: Uuid) -> Result<Option<Admin>>;
    async fn admin_by_email(&self, email: &str, exclude: Option<Uuid>) -> Result<Option<Admin>>;
    async fn insert_admin(&self, admin: &Admin) -> Result<()>;
    async fn update_admin(&self, admin: &Admin) -> Result<()>;
    async fn delete_admin(&self, id: Uuid) -> Result<bool>;

    // ─────────────────────────────────────────────────────────────────────────
    // Customers
    // ─────────────────────────────────────────────────────────────────────────

    async fn list_customers(
        &self,
        filter: &AccountFilter,
        page: OffsetPagination,
    ) -> Result<Page<Customer>>;
    async fn customer(&self, id: Uuid) -> Result<Option<Customer>>;
    async fn customer_by_email(
        &self,
        email: &str,
        exclude: Option<Uuid>,
    ) -> Result<Option<Customer>>;
    async fn insert_customer(&self, customer: &Customer) -> Result<()>;
    async fn update_customer(&self, customer: &Customer) -> Result<()>;
    async fn delete_customer(&self, id: Uuid) -> Result<bool>;

    // ─────────────────────────────────────────────────────────────────────────
    // Sellers
    // ─────────────────────────────────────────────────────────────────────────

    async fn list_sellers(
        &self,
        filter: &AccountFilter,
        page: OffsetPagination,
    ) -> Result<Page<Seller>>;
    async fn seller(&self, id: Uuid) -> Result<Option<Seller>>;
    async fn seller_by_email(&self, email: &str, exclude: Option<Uuid>) -> Result<Option<Seller>>;
    async fn insert_seller(&self, seller: &Seller) -> Result<()>;
    async fn update_seller(&self, seller: &Seller) -> Result<()>;
    async fn delete_seller(&self, id: Uuid) -> Result<bool>;

    // ─────────────────────────────────────────────────────────────────────────
    // Deliverers
    // ─────────────────────────────────────────────────────────────────────────

    async fn list_deliverers(
        &self,
        filter: &AccountFilter,
        page: OffsetPagination,
    ) -> Result<Page<Deliverer>>;
    async fn deliverer(&self, id: Uuid) -> Result<Option<Deliverer>>;
    async fn deliverer_by_email(
        &self,
        email: &str,
        exclude: Option<Uuid>,
    ) -> Result<Option<Deliverer>>;
    async fn insert_deliverer(&self, deliverer: &Deliverer) -> Result<()>;
    async fn update_deliverer(&self, deliverer: &Deliverer) -> Result<()>;
    async fn delete_deliverer(&self, id: Uuid) -> Result<bool>;

    // ─────────────────────────────────────────────────────────────────────────
    // Products
    // ─────────────────────────────────────────────────────────────────────────

    async fn list_products(
        &self,
        filter: &ProductFilter,
        page: OffsetPagination,
    ) -> Result<Page<Product>>;
    async fn product(&self, id: Uuid) -> Result<Option<Product>>;
    async fn insert_product(&self, product: &Product) -> Result<()>;
    async fn update_product(&self, product: &Product) -> Result<()>;
    async fn delete_product(&self, id: Uuid) -> Result<bool>;
    /// Ids of all products listed by the given seller.
    async fn product_ids_by_seller(&self, seller_id: Uuid) -> Result<Vec<Uuid>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Orders
    // ─────────────────────────────────────────────────────────────────────────

    async fn list_orders(&self, filter: &OrderFilter, page: OffsetPagination)
        -> Result<Page<Order>>;
    async fn order(&self, id: Uuid) -> Result<Option<Order>>;
    async fn insert_order(&self, order: &Order) -> Result<()>;
    async fn update_order(&self, order: &Order) -> Result<()>;
    async fn delete_order(&self, id: Uuid) -> Result<bool>;
    /// Ids of all orders placed by the given customer.
    async fn order_ids_by_customer(&self, customer_id: Uuid) -> Result<Vec<Uuid>>;
    /// Ids of all orders for any of the given products.
    async fn order_ids_for_products(&self, product_ids: &[Uuid]) -> Result<Vec<Uuid>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Deliveries
    // ─────────────────────────────────────────────────────────────────────────

    async fn list_deliveries(
        &self,
        filter: &DeliveryFilter,
        page: OffsetPagination,
    ) -> Result<Page<Delivery>>;
    async fn delivery(&self, id: Uuid) -> Result<Option<Delivery>>;
    async fn insert_delivery(&self, delivery: &Delivery) -> Result<()>;
    async fn update_delivery(&self, delivery: &Delivery) -> Result<()>;
    async fn delete_delivery(&self, id: Uuid) -> Result<bool>;

    // ─────────────────────────────────────────────────────────────────────────
    // Reviews
    // ─────────────────────────────────────────────────────────────────────────

    async fn list_reviews(
        &self,
        filter: &ReviewFilter,
        page: OffsetPagination,
    ) -> Result<Page<Review>>;
    async fn review(&self, id: Uuid) -> Result<Option<Review>>;
    /// The review for an order, if one exists. One review per order.
    async fn review_by_order(&self, order_id: Uuid) -> Result<Option<Review>>;
    async fn insert_review(&self, review: &Review) -> Result<()>;
    async fn update_review(&self, review: &Review) -> Result<()>;
    async fn delete_review(&self, id: Uuid) -> Result<bool>;

    // ─────────────────────────────────────────────────────────────────────────
    // Payments
    // ─────────────────────────────────────────────────────────────────────────

    async fn list_payments(
        &self,
        filter: &PaymentFilter,
        page: OffsetPagination,
    ) -> Result<Page<Payment>>;
    async fn payment(&self, id: Uuid) -> Result<Option<Payment>>;
    async fn insert_payment(&self, payment: &Payment) -> Result<()>;
    async fn update_payment(&self, payment: &Payment) -> Result<()>;
    async fn delete_payment(&self, id: Uuid) -> Result<bool>;
}
