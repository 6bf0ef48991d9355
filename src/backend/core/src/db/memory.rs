//! In-memory store backend.
//!
//! Backs tests and storeless dev runs with `DashMap` collections. Listing
//! semantics match the Postgres backend: filter, sort newest first, count,
//! then paginate.

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use super::{
    AccountFilter, DeliveryFilter, OrderFilter, Page, PaymentFilter, ProductFilter, ReviewFilter,
    Store,
};
use crate::error::Result;
use crate::models::{
    Admin, Customer, Deliverer, Delivery, Order, Payment, Product, Review, Seller,
};
use crate::pagination::OffsetPagination;

/// In-process store, one map per collection.
#[derive(Debug, Default)]
pub struct MemoryStore {
    admins: DashMap<Uuid, Admin>,
    customers: DashMap<Uuid, Customer>,
    sellers: DashMap<Uuid, Seller>,
    deliverers: DashMap<Uuid, Deliverer>,
    products: DashMap<Uuid, Product>,
    orders: DashMap<Uuid, Order>,
    deliveries: DashMap<Uuid, Delivery>,
    reviews: DashMap<Uuid, Review>,
    payments: DashMap<Uuid, Payment>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Filter, sort newest first, and paginate one collection.
fn list_page<T, F, K>(
    map: &DashMap<Uuid, T>,
    matches: F,
    created_at: K,
    page: OffsetPagination,
) -> Page<T>
where
    T: Clone,
    F: Fn(&T) -> bool,
    K: Fn(&T) -> chrono::DateTime<chrono::Utc>,
{
    let mut items: Vec<T> = map
        .iter()
        .filter(|entry| matches(entry.value()))
        .map(|entry| entry.value().clone())
        .collect();
    items.sort_by_key(|item| std::cmp::Reverse(created_at(item)));

    let total = items.len() as u64;
    let items = page.paginate_slice(&items);
    Page { items, total }
}

#[async_trait]
impl Store for MemoryStore {
    // ─────────────────────────────────────────────────────────────────────────
    // Admins
    // ─────────────────────────────────────────────────────────────────────────

    async fn list_admins(
        &self,
        filter: &AccountFilter,
        page: OffsetPagination,
    ) -> Result<Page<Admin>> {
        Ok(list_page(
            &self.admins,
            |a| {
                filter.name.as_deref().map_or(true, |n| contains_ci(&a.name, n))
                    && filter
                        .email
                        .as_deref()
                        .map_or(true, |e| contains_ci(&a.email, e))
            },
            |a| a.created_at,
            page,
        ))
    }

    async fn admin(&self, id: Uuid) -> Result<Option<Admin>> {
        Ok(self.admins.get(&id).map(|e| e.value().clone()))
    }

    async fn admin_by_email(&self, email: &str, exclude: Option<Uuid>) -> Result<Option<Admin>> {
        Ok(self
            .admins
            .iter()
            .find(|e| e.value().email == email && Some(e.value().id) != exclude)
            .map(|e| e.value().clone()))
    }

    async fn insert_admin(&self, admin: &Admin) -> Result<()> {
        self.admins.insert(admin.id, admin.clone());
        Ok(())
    }

    async fn update_admin(&self, admin: &Admin) -> Result<()> {
        self.admins.insert(admin.id, admin.clone());
        Ok(())
    }

    async fn delete_admin(&self, id: Uuid) -> Result<bool> {
        Ok(self.admins.remove(&id).is_some())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Customers
    // ─────────────────────────────────────────────────────────────────────────

    async fn list_customers(
        &self,
        filter: &AccountFilter,
        page: OffsetPagination,
    ) -> Result<Page<Customer>> {
        Ok(list_page(
            &self.customers,
            |c| {
                filter.name.as_deref().map_or(true, |n| contains_ci(&c.name, n))
                    && filter
                        .email
                        .as_deref()
                        .map_or(true, |e| contains_ci(&c.email, e))
            },
            |c| c.created_at,
            page,
        ))
    }

    async fn customer(&self, id: Uuid) -> Result<Option<Customer>> {
        Ok(self.customers.get(&id).map(|e| e.value().clone()))
    }

    async fn customer_by_email(
        &self,
        email: &str,
        exclude: Option<Uuid>,
    ) -> Result<Option<Customer>> {
        Ok(self
            .customers
            .iter()
            .find(|e| e.value().email == email && Some(e.value().id) != exclude)
            .map(|e| e.value().clone()))
    }

    async fn insert_customer(&self, customer: &Customer) -> Result<()> {
        self.customers.insert(customer.id, customer.clone());
        Ok(())
    }

    async fn update_customer(&self, customer: &Customer) -> Result<()> {
        self.customers.insert(customer.id, customer.clone());
        Ok(())
    }

    async fn delete_customer(&self, id: Uuid) -> Result<bool> {
        Ok(self.customers.remove(&id).is_some())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Sellers
    // ─────────────────────────────────────────────────────────────────────────

    async fn list_sellers(
        &self,
        filter: &AccountFilter,
        page: OffsetPagination,
    ) -> Result<Page<Seller>> {
        Ok(list_page(
            &self.sellers,
            |s| {
                filter.name.as_deref().map_or(true, |n| contains_ci(&s.name, n))
                    && filter
                        .email
                        .as_deref()
                        .map_or(true, |e| contains_ci(&s.email, e))
                    && filter
                        .shop_name
                        .as_deref()
                        .map_or(true, |sn| contains_ci(&s.shop_name, sn))
                    && filter.status.map_or(true, |st| s.approval.status == st)
            },
            |s| s.created_at,
            page,
        ))
    }

    async fn seller(&self, id: Uuid) -> Result<Option<Seller>> {
        Ok(self.sellers.get(&id).map(|e| e.value().clone()))
    }

    async fn seller_by_email(&self, email: &str, exclude: Option<Uuid>) -> Result<Option<Seller>> {
        Ok(self
            .sellers
            .iter()
            .find(|e| e.value().email == email && Some(e.value().id) != exclude)
            .map(|e| e.value().clone()))
    }

    async fn insert_seller(&self, seller: &Seller) -> Result<()> {
        self.sellers.insert(seller.id, seller.clone());
        Ok(())
    }

    async fn update_seller(&self, seller: &Seller) -> Result<()> {
        self.sellers.insert(seller.id, seller.clone());
        Ok(())
    }

    async fn delete_seller(&self, id: Uuid) -> Result<bool> {
        Ok(self.sellers.remove(&id).is_some())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Deliverers
    // ─────────────────────────────────────────────────────────────────────────

    async fn list_deliverers(
        &self,
        filter: &AccountFilter,
        page: OffsetPagination,
    ) -> Result<Page<Deliverer>> {
        Ok(list_page(
            &self.deliverers,
            |d| {
                filter.name.as_deref().map_or(true, |n| contains_ci(&d.name, n))
                    && filter
                        .email
                        .as_deref()
                        .map_or(true, |e| contains_ci(&d.email, e))
                    && filter.status.map_or(true, |st| d.approval.status == st)
            },
            |d| d.created_at,
            page,
        ))
    }

    async fn deliverer(&self, id: Uuid) -> Result<Option<Deliverer>> {
        Ok(self.deliverers.get(&id).map(|e| e.value().clone()))
    }

    async fn deliverer_by_email(
        &self,
        email: &str,
        exclude: Option<Uuid>,
    ) -> Result<Option<Deliverer>> {
        Ok(self
            .deliverers
            .iter()
            .find(|e| e.value().email == email && Some(e.value().id) != exclude)
            .map(|e| e.value().clone()))
    }

    async fn insert_deliverer(&self, deliverer: &Deliverer) -> Result<()> {
        self.deliverers.insert(deliverer.id, deliverer.clone());
        Ok(())
    }

    async fn update_deliverer(&self, deliverer: &Deliverer) -> Result<()> {
        self.deliverers.insert(deliverer.id, deliverer.clone());
        Ok(())
    }

    async fn delete_deliverer(&self, id: Uuid) -> Result<bool> {
        Ok(self.deliverers.remove(&id).is_some())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Products
    // ─────────────────────────────────────────────────────────────────────────

    async fn list_products(
        &self,
        filter: &ProductFilter,
        page: OffsetPagination,
    ) -> Result<Page<Product>> {
        Ok(list_page(
            &self.products,
            |p| {
                filter.name.as_deref().map_or(true, |n| contains_ci(&p.name, n))
                    && filter.instock.map_or(true, |i| p.instock == i)
                    && filter.seller_id.map_or(true, |s| p.seller_id == Some(s))
            },
            |p| p.created_at,
            page,
        ))
    }

    async fn product(&self, id: Uuid) -> Result<Option<Product>> {
        Ok(self.products.get(&id).map(|e| e.value().clone()))
    }

    async fn insert_product(&self, product: &Product) -> Result<()> {
        self.products.insert(product.id, product.clone());
        Ok(())
    }

    async fn update_product(&self, product: &Product) -> Result<()> {
        self.products.insert(product.id, product.clone());
        Ok(())
    }

    async fn delete_product(&self, id: Uuid) -> Result<bool> {
        Ok(self.products.remove(&id).is_some())
    }

    async fn product_ids_by_seller(&self, seller_id: Uuid) -> Result<Vec<Uuid>> {
        Ok(self
            .products
            .iter()
            .filter(|e| e.value().seller_id == Some(seller_id))
            .map(|e| e.value().id)
            .collect())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Orders
    // ─────────────────────────────────────────────────────────────────────────

    async fn list_orders(
        &self,
        filter: &OrderFilter,
        page: OffsetPagination,
    ) -> Result<Page<Order>> {
        Ok(list_page(
            &self.orders,
            |o| {
                filter.status.map_or(true, |s| o.status == s)
                    && filter.customer_id.map_or(true, |c| o.customer_id == c)
                    && filter
                        .product_ids
                        .as_deref()
                        .map_or(true, |ids| ids.contains(&o.product_id))
            },
            |o| o.created_at,
            page,
        ))
    }

    async fn order(&self, id: Uuid) -> Result<Option<Order>> {
        Ok(self.orders.get(&id).map(|e| e.value().clone()))
    }

    async fn insert_order(&self, order: &Order) -> Result<()> {
        self.orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn update_order(&self, order: &Order) -> Result<()> {
        self.orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn delete_order(&self, id: Uuid) -> Result<bool> {
        Ok(self.orders.remove(&id).is_some())
    }

    async fn order_ids_by_customer(&self, customer_id: Uuid) -> Result<Vec<Uuid>> {
        Ok(self
            .orders
            .iter()
            .filter(|e| e.value().customer_id == customer_id)
            .map(|e| e.value().id)
            .collect())
    }

    async fn order_ids_for_products(&self, product_ids: &[Uuid]) -> Result<Vec<Uuid>> {
        Ok(self
            .orders
            .iter()
            .filter(|e| product_ids.contains(&e.value().product_id))
            .map(|e| e.value().id)
            .collect())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Deliveries
    // ─────────────────────────────────────────────────────────────────────────

    async fn list_deliveries(
        &self,
        filter: &DeliveryFilter,
        page: OffsetPagination,
    ) -> Result<Page<Delivery>> {
        Ok(list_page(
            &self.deliveries,
            |d| {
                filter.status.map_or(true, |s| d.status == s)
                    && filter
                        .deliverer_id
                        .map_or(true, |i| d.deliverer_id == Some(i))
                    && filter.order_id.map_or(true, |o| d.order_id == o)
                    && filter
                        .order_ids
                        .as_deref()
                        .map_or(true, |ids| ids.contains(&d.order_id))
            },
            |d| d.created_at,
            page,
        ))
    }

    async fn delivery(&self, id: Uuid) -> Result<Option<Delivery>> {
        Ok(self.deliveries.get(&id).map(|e| e.value().clone()))
    }

    async fn insert_delivery(&self, delivery: &Delivery) -> Result<()> {
        self.deliveries.insert(delivery.id, delivery.clone());
        Ok(())
    }

    async fn update_delivery(&self, delivery: &Delivery) -> Result<()> {
        self.deliveries.insert(delivery.id, delivery.clone());
        Ok(())
    }

    async fn delete_delivery(&self, id: Uuid) -> Result<bool> {
        Ok(self.deliveries.remove(&id).is_some())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Reviews
    // ─────────────────────────────────────────────────────────────────────────

    async fn list_reviews(
        &self,
        filter: &ReviewFilter,
        page: OffsetPagination,
    ) -> Result<Page<Review>> {
        Ok(list_page(
            &self.reviews,
            |r| {
                filter.product_id.map_or(true, |p| r.product_id == p)
                    && filter.order_id.map_or(true, |o| r.order_id == o)
                    && filter.customer_id.map_or(true, |c| r.customer_id == c)
            },
            |r| r.created_at,
            page,
        ))
    }

    async fn review(&self, id: Uuid) -> Result<Option<Review>> {
        Ok(self.reviews.get(&id).map(|e| e.value().clone()))
    }

    async fn review_by_order(&self, order_id: Uuid) -> Result<Option<Review>> {
        Ok(self
            .reviews
            .iter()
            .find(|e| e.value().order_id == order_id)
            .map(|e| e.value().clone()))
    }

    async fn insert_review(&self, review: &Review) -> Result<()> {
        self.reviews.insert(review.id, review.clone());
        Ok(())
    }

    async fn update_review(&self, review: &Review) -> Result<()> {
        self.reviews.insert(review.id, review.clone());
        Ok(())
    }

    async fn delete_review(&self, id: Uuid) -> Result<bool> {
        Ok(self.reviews.remove(&id).is_some())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Payments
    // ─────────────────────────────────────────────────────────────────────────

    async fn list_payments(
        &self,
        filter: &PaymentFilter,
        page: OffsetPagination,
    ) -> Result<Page<Payment>> {
        Ok(list_page(
            &self.payments,
            |p| {
                filter.customer_id.map_or(true, |c| p.customer_id == c)
                    && filter
                        .order_ids
                        .as_deref()
                        .map_or(true, |ids| ids.contains(&p.order_id))
            },
            |p| p.created_at,
            page,
        ))
    }

    async fn payment(&self, id: Uuid) -> Result<Option<Payment>> {
        Ok(self.payments.get(&id).map(|e| e.value().clone()))
    }

    async fn insert_payment(&self, payment: &Payment) -> Result<()> {
        self.payments.insert(payment.id, payment.clone());
        Ok(())
    }

    async fn update_payment(&self, payment: &Payment) -> Result<()> {
        self.payments.insert(payment.id, payment.clone());
        Ok(())
    }

    async fn delete_payment(&self, id: Uuid) -> Result<bool> {
        Ok(self.payments.remove(&id).is_some())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approval::ApprovalStatus;

    fn seller(name: &str, email: &str) -> Seller {
        Seller::new(
            name.to_string(),
            format!("{}'s shop", name),
            email.to_string(),
            "hash".to_string(),
            "1234567890".to_string(),
            "1 Main St".to_string(),
        )
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = MemoryStore::new();
        let s = seller("Ann", "ann@example.com");
        store.insert_seller(&s).await.unwrap();

        let found = store.seller(s.id).await.unwrap().unwrap();
        assert_eq!(found.email, "ann@example.com");
        assert!(store.seller(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_email_lookup_excludes_self() {
        let store = MemoryStore::new();
        let s = seller("Ann", "ann@example.com");
        store.insert_seller(&s).await.unwrap();

        assert!(store
            .seller_by_email("ann@example.com", None)
            .await
            .unwrap()
            .is_some());
        // Excluding the account itself finds nothing, so self-updates pass.
        assert!(store
            .seller_by_email("ann@example.com", Some(s.id))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_list_filters_by_status() {
        let store = MemoryStore::new();
        let mut approved = seller("Ann", "ann@example.com");
        approved
            .approval
            .approve(Uuid::new_v4(), "Seller")
            .unwrap();
        store.insert_seller(&approved).await.unwrap();
        store
            .insert_seller(&seller("Bob", "bob@example.com"))
            .await
            .unwrap();

        let filter = AccountFilter {
            status: Some(ApprovalStatus::Pending),
            ..Default::default()
        };
        let page = store
            .list_sellers(&filter, OffsetPagination::default())
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].email, "bob@example.com");
    }

    #[tokio::test]
    async fn test_list_paginates_and_counts_filtered_total() {
        let store = MemoryStore::new();
        for i in 0..15 {
            store
                .insert_customer(&Customer::new(
                    format!("Customer {}", i),
                    format!("c{}@example.com", i),
                    "hash".to_string(),
                    "1234567890".to_string(),
                ))
                .await
                .unwrap();
        }

        let page = store
            .list_customers(&AccountFilter::default(), OffsetPagination::new(2, 10))
            .await
            .unwrap();
        assert_eq!(page.total, 15);
        assert_eq!(page.items.len(), 5);
    }

    #[tokio::test]
    async fn test_order_scoping_lookups() {
        let store = MemoryStore::new();
        let seller_id = Uuid::new_v4();
        let product = Product::new("Mug".into(), "".into(), 10.0, 0.0, seller_id);
        store.insert_product(&product).await.unwrap();

        let customer_id = Uuid::new_v4();
        let order = Order::new(customer_id, product.id, 1, 10.0);
        store.insert_order(&order).await.unwrap();
        store
            .insert_order(&Order::new(Uuid::new_v4(), Uuid::new_v4(), 1, 5.0))
            .await
            .unwrap();

        let product_ids = store.product_ids_by_seller(seller_id).await.unwrap();
        assert_eq!(product_ids, vec![product.id]);

        let order_ids = store.order_ids_for_products(&product_ids).await.unwrap();
        assert_eq!(order_ids, vec![order.id]);

        let by_customer = store.order_ids_by_customer(customer_id).await.unwrap();
        assert_eq!(by_customer, vec![order.id]);
    }

    #[tokio::test]
    async fn test_one_review_per_order_lookup() {
        let store = MemoryStore::new();
        let order_id = Uuid::new_v4();
        let review = Review::new(Uuid::new_v4(), Uuid::new_v4(), order_id, 5, "Great".into());
        store.insert_review(&review).await.unwrap();

        assert!(store.review_by_order(order_id).await.unwrap().is_some());
        assert!(store
            .review_by_order(Uuid::new_v4())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_delete_reports_removal() {
        let store = MemoryStore::new();
        let s = seller("Ann", "ann@example.com");
        store.insert_seller(&s).await.unwrap();

        assert!(store.delete_seller(s.id).await.unwrap());
        assert!(!store.delete_seller(s.id).await.unwrap());
    }
}
