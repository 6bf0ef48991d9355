//! PostgreSQL store backend.
//!
//! Status enums are stored as text and decoded through the models' `parse`
//! helpers. Deliverer rows with a NULL status predate the approval workflow
//! and load as approved; every row written by this backend carries an
//! explicit status.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Postgres, QueryBuilder, Row};
use std::time::Duration;
use uuid::Uuid;

use super::{
    AccountFilter, DeliveryFilter, OrderFilter, Page, PaymentFilter, ProductFilter, ReviewFilter,
    Store,
};
use crate::approval::{ApprovalRecord, ApprovalStatus};
use crate::error::Result;
use crate::models::{
    Admin, Customer, Deliverer, Delivery, DeliveryStatus, Order, OrderStatus, Payment,
    PaymentMethod, Product, Review, Seller,
};
use crate::pagination::OffsetPagination;

/// PostgreSQL-backed store.
#[derive(Debug, Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to the database and build the connection pool.
    pub async fn new(url: &str, max_connections: u32, min_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(url)
            .await?;

        Ok(Self { pool })
    }

    /// Run pending migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| crate::error::BazaarError::internal(format!("Migration failed: {}", e)))?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Row Decoding
// ═══════════════════════════════════════════════════════════════════════════════

fn decode_error(column: &str, value: &str) -> sqlx::Error {
    sqlx::Error::Decode(format!("unexpected value '{}' in column {}", value, column).into())
}

fn approval_from_row(row: &PgRow) -> std::result::Result<Option<ApprovalRecord>, sqlx::Error> {
    let status: Option<String> = row.try_get("status")?;
    let Some(status) = status else {
        return Ok(None);
    };
    let status = ApprovalStatus::parse(&status).ok_or_else(|| decode_error("status", &status))?;
    Ok(Some(ApprovalRecord {
        status,
        approved_by: row.try_get("approved_by")?,
        approved_at: row.try_get("approved_at")?,
    }))
}

impl sqlx::FromRow<'_, PgRow> for Admin {
    fn from_row(row: &PgRow) -> std::result::Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            is_active: row.try_get("is_active")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl sqlx::FromRow<'_, PgRow> for Customer {
    fn from_row(row: &PgRow) -> std::result::Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            phone_no: row.try_get("phone_no")?,
            address: row.try_get("address")?,
            is_active: row.try_get("is_active")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl sqlx::FromRow<'_, PgRow> for Seller {
    fn from_row(row: &PgRow) -> std::result::Result<Self, sqlx::Error> {
        let approval = approval_from_row(row)?.unwrap_or_default();
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            shop_name: row.try_get("shop_name")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            phone_no: row.try_get("phone_no")?,
            address: row.try_get("address")?,
            approval,
            is_active: row.try_get("is_active")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl sqlx::FromRow<'_, PgRow> for Deliverer {
    fn from_row(row: &PgRow) -> std::result::Result<Self, sqlx::Error> {
        // NULL status means the row predates the approval workflow.
        let approval = approval_from_row(row)?.unwrap_or_else(ApprovalRecord::legacy_approved);
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            phone_no: row.try_get("phone_no")?,
            vehicle_no: row.try_get("vehicle_no")?,
            vehicle_type: row.try_get("vehicle_type")?,
            address: row.try_get("address")?,
            approval,
            is_active: row.try_get("is_active")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl sqlx::FromRow<'_, PgRow> for Product {
    fn from_row(row: &PgRow) -> std::result::Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            price: row.try_get("price")?,
            discount: row.try_get("discount")?,
            instock: row.try_get("instock")?,
            seller_id: row.try_get("seller_id")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl sqlx::FromRow<'_, PgRow> for Order {
    fn from_row(row: &PgRow) -> std::result::Result<Self, sqlx::Error> {
        let status: String = row.try_get("status")?;
        let status = OrderStatus::parse(&status).ok_or_else(|| decode_error("status", &status))?;
        Ok(Self {
            id: row.try_get("id")?,
            customer_id: row.try_get("customer_id")?,
            product_id: row.try_get("product_id")?,
            quantity: row.try_get("quantity")?,
            total_amount: row.try_get("total_amount")?,
            status,
            order_date: row.try_get("order_date")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl sqlx::FromRow<'_, PgRow> for Delivery {
    fn from_row(row: &PgRow) -> std::result::Result<Self, sqlx::Error> {
        let status: String = row.try_get("status")?;
        let status =
            DeliveryStatus::parse(&status).ok_or_else(|| decode_error("status", &status))?;
        Ok(Self {
            id: row.try_get("id")?,
            order_id: row.try_get("order_id")?,
            deliverer_id: row.try_get("deliverer_id")?,
            address: row.try_get("address")?,
            status,
            delivered_date: row.try_get("delivered_date")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl sqlx::FromRow<'_, PgRow> for Review {
    fn from_row(row: &PgRow) -> std::result::Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            customer_id: row.try_get("customer_id")?,
            product_id: row.try_get("product_id")?,
            order_id: row.try_get("order_id")?,
            rating: row.try_get("rating")?,
            comment: row.try_get("comment")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl sqlx::FromRow<'_, PgRow> for Payment {
    fn from_row(row: &PgRow) -> std::result::Result<Self, sqlx::Error> {
        let method: String = row.try_get("payment_method")?;
        let payment_method =
            PaymentMethod::parse(&method).ok_or_else(|| decode_error("payment_method", &method))?;
        Ok(Self {
            id: row.try_get("id")?,
            customer_id: row.try_get("customer_id")?,
            order_id: row.try_get("order_id")?,
            payment_method,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Query Building
// ═══════════════════════════════════════════════════════════════════════════════

fn push_ilike(qb: &mut QueryBuilder<'_, Postgres>, column: &str, needle: &str) {
    qb.push(" AND ")
        .push(column)
        .push(" ILIKE ")
        .push_bind(format!("%{}%", needle));
}

fn push_page(qb: &mut QueryBuilder<'_, Postgres>, page: OffsetPagination) {
    qb.push(" ORDER BY created_at DESC LIMIT ")
        .push_bind(page.limit() as i64)
        .push(" OFFSET ")
        .push_bind(page.offset() as i64);
}

fn account_filter_sql(qb: &mut QueryBuilder<'_, Postgres>, filter: &AccountFilter, shop: bool) {
    qb.push(" WHERE 1=1");
    if let Some(name) = filter.name.as_deref() {
        push_ilike(qb, "name", name);
    }
    if let Some(email) = filter.email.as_deref() {
        push_ilike(qb, "email", email);
    }
    if shop {
        if let Some(shop_name) = filter.shop_name.as_deref() {
            push_ilike(qb, "shop_name", shop_name);
        }
    }
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status.as_str());
    }
}

fn product_filter_sql(qb: &mut QueryBuilder<'_, Postgres>, filter: &ProductFilter) {
    qb.push(" WHERE 1=1");
    if let Some(name) = filter.name.as_deref() {
        push_ilike(qb, "name", name);
    }
    if let Some(instock) = filter.instock {
        qb.push(" AND instock = ").push_bind(instock);
    }
    if let Some(seller_id) = filter.seller_id {
        qb.push(" AND seller_id = ").push_bind(seller_id);
    }
}

fn order_filter_sql(qb: &mut QueryBuilder<'_, Postgres>, filter: &OrderFilter) {
    qb.push(" WHERE 1=1");
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(customer_id) = filter.customer_id {
        qb.push(" AND customer_id = ").push_bind(customer_id);
    }
    if let Some(ids) = filter.product_ids.clone() {
        qb.push(" AND product_id = ANY(").push_bind(ids).push(")");
    }
}

fn delivery_filter_sql(qb: &mut QueryBuilder<'_, Postgres>, filter: &DeliveryFilter) {
    qb.push(" WHERE 1=1");
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(deliverer_id) = filter.deliverer_id {
        qb.push(" AND deliverer_id = ").push_bind(deliverer_id);
    }
    if let Some(order_id) = filter.order_id {
        qb.push(" AND order_id = ").push_bind(order_id);
    }
    if let Some(ids) = filter.order_ids.clone() {
        qb.push(" AND order_id = ANY(").push_bind(ids).push(")");
    }
}

fn review_filter_sql(qb: &mut QueryBuilder<'_, Postgres>, filter: &ReviewFilter) {
    qb.push(" WHERE 1=1");
    if let Some(product_id) = filter.product_id {
        qb.push(" AND product_id = ").push_bind(product_id);
    }
    if let Some(order_id) = filter.order_id {
        qb.push(" AND order_id = ").push_bind(order_id);
    }
    if let Some(customer_id) = filter.customer_id {
        qb.push(" AND customer_id = ").push_bind(customer_id);
    }
}

fn payment_filter_sql(qb: &mut QueryBuilder<'_, Postgres>, filter: &PaymentFilter) {
    qb.push(" WHERE 1=1");
    if let Some(customer_id) = filter.customer_id {
        qb.push(" AND customer_id = ").push_bind(customer_id);
    }
    if let Some(ids) = filter.order_ids.clone() {
        qb.push(" AND order_id = ANY(").push_bind(ids).push(")");
    }
}

impl Database {
    /// Run the filtered count + page pair that every listing needs.
    async fn fetch_page<T, F>(&self, table: &str, apply: F, page: OffsetPagination) -> Result<Page<T>>
    where
        T: for<'r> sqlx::FromRow<'r, PgRow> + Send + Unpin,
        F: Fn(&mut QueryBuilder<'_, Postgres>),
    {
        let mut count_qb = QueryBuilder::new(format!("SELECT COUNT(*) FROM {}", table));
        apply(&mut count_qb);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut qb = QueryBuilder::new(format!("SELECT * FROM {}", table));
        apply(&mut qb);
        push_page(&mut qb, page);
        let items = qb.build_query_as::<T>().fetch_all(&self.pool).await?;

        Ok(Page {
            items,
            total: total as u64,
        })
    }

    async fn fetch_optional<T>(&self, table: &str, id: Uuid) -> Result<Option<T>>
    where
        T: for<'r> sqlx::FromRow<'r, PgRow> + Send + Unpin,
    {
        let mut qb = QueryBuilder::new(format!("SELECT * FROM {} WHERE id = ", table));
        qb.push_bind(id);
        Ok(qb.build_query_as::<T>().fetch_optional(&self.pool).await?)
    }

    async fn fetch_by_email<T>(
        &self,
        table: &str,
        email: &str,
        exclude: Option<Uuid>,
    ) -> Result<Option<T>>
    where
        T: for<'r> sqlx::FromRow<'r, PgRow> + Send + Unpin,
    {
        let mut qb = QueryBuilder::new(format!("SELECT * FROM {} WHERE email = ", table));
        qb.push_bind(email.to_string());
        if let Some(exclude) = exclude {
            qb.push(" AND id <> ").push_bind(exclude);
        }
        Ok(qb.build_query_as::<T>().fetch_optional(&self.pool).await?)
    }

    async fn delete_by_id(&self, table: &str, id: Uuid) -> Result<bool> {
        let mut qb = QueryBuilder::new(format!("DELETE FROM {} WHERE id = ", table));
        qb.push_bind(id);
        let result = qb.build().execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Store Implementation
// ═══════════════════════════════════════════════════════════════════════════════

#[async_trait]
impl Store for Database {
    // ─────────────────────────────────────────────────────────────────────────
    // Admins
    // ─────────────────────────────────────────────────────────────────────────

    async fn list_admins(
        &self,
        filter: &AccountFilter,
        page: OffsetPagination,
    ) -> Result<Page<Admin>> {
        self.fetch_page("admins", |qb| account_filter_sql(qb, filter, false), page)
            .await
    }

    async fn admin(&self, id: Uuid) -> Result<Option<Admin>> {
        self.fetch_optional("admins", id).await
    }

    async fn admin_by_email(&self, email: &str, exclude: Option<Uuid>) -> Result<Option<Admin>> {
        self.fetch_by_email("admins", email, exclude).await
    }

    async fn insert_admin(&self, admin: &Admin) -> Result<()> {
        sqlx::query(
            "INSERT INTO admins (id, name, email, password_hash, is_active, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(admin.id)
        .bind(&admin.name)
        .bind(&admin.email)
        .bind(&admin.password_hash)
        .bind(admin.is_active)
        .bind(admin.created_at)
        .bind(admin.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_admin(&self, admin: &Admin) -> Result<()> {
        sqlx::query(
            "UPDATE admins SET name = $2, email = $3, password_hash = $4, is_active = $5,
             updated_at = $6 WHERE id = $1",
        )
        .bind(admin.id)
        .bind(&admin.name)
        .bind(&admin.email)
        .bind(&admin.password_hash)
        .bind(admin.is_active)
        .bind(admin.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_admin(&self, id: Uuid) -> Result<bool> {
        self.delete_by_id("admins", id).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Customers
    // ─────────────────────────────────────────────────────────────────────────

    async fn list_customers(
        &self,
        filter: &AccountFilter,
        page: OffsetPagination,
    ) -> Result<Page<Customer>> {
        self.fetch_page("customers", |qb| account_filter_sql(qb, filter, false), page)
            .await
    }

    async fn customer(&self, id: Uuid) -> Result<Option<Customer>> {
        self.fetch_optional("customers", id).await
    }

    async fn customer_by_email(
        &self,
        email: &str,
        exclude: Option<Uuid>,
    ) -> Result<Option<Customer>> {
        self.fetch_by_email("customers", email, exclude).await
    }

    async fn insert_customer(&self, customer: &Customer) -> Result<()> {
        sqlx::query(
            "INSERT INTO customers (id, name, email, password_hash, phone_no, address,
             is_active, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(customer.id)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.password_hash)
        .bind(&customer.phone_no)
        .bind(&customer.address)
        .bind(customer.is_active)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_customer(&self, customer: &Customer) -> Result<()> {
        sqlx::query(
            "UPDATE customers SET name = $2, email = $3, password_hash = $4, phone_no = $5,
             address = $6, is_active = $7, updated_at = $8 WHERE id = $1",
        )
        .bind(customer.id)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.password_hash)
        .bind(&customer.phone_no)
        .bind(&customer.address)
        .bind(customer.is_active)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_customer(&self, id: Uuid) -> Result<bool> {
        self.delete_by_id("customers", id).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Sellers
    // ─────────────────────────────────────────────────────────────────────────

    async fn list_sellers(
        &self,
        filter: &AccountFilter,
        page: OffsetPagination,
    ) -> Result<Page<Seller>> {
        self.fetch_page("sellers", |qb| account_filter_sql(qb, filter, true), page)
            .await
    }

    async fn seller(&self, id: Uuid) -> Result<Option<Seller>> {
        self.fetch_optional("sellers", id).await
    }

    async fn seller_by_email(&self, email: &str, exclude: Option<Uuid>) -> Result<Option<Seller>> {
        self.fetch_by_email("sellers", email, exclude).await
    }

    async fn insert_seller(&self, seller: &Seller) -> Result<()> {
        sqlx::query(
            "INSERT INTO sellers (id, name, shop_name, email, password_hash, phone_no, address,
             status, approved_by, approved_at, is_active, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(seller.id)
        .bind(&seller.name)
        .bind(&seller.shop_name)
        .bind(&seller.email)
        .bind(&seller.password_hash)
        .bind(&seller.phone_no)
        .bind(&seller.address)
        .bind(seller.approval.status.as_str())
        .bind(seller.approval.approved_by)
        .bind(seller.approval.approved_at)
        .bind(seller.is_active)
        .bind(seller.created_at)
        .bind(seller.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_seller(&self, seller: &Seller) -> Result<()> {
        // Approval fields travel with the row, so an approve or reject lands
        // in one statement.
        sqlx::query(
            "UPDATE sellers SET name = $2, shop_name = $3, email = $4, password_hash = $5,
             phone_no = $6, address = $7, status = $8, approved_by = $9, approved_at = $10,
             is_active = $11, updated_at = $12 WHERE id = $1",
        )
        .bind(seller.id)
        .bind(&seller.name)
        .bind(&seller.shop_name)
        .bind(&seller.email)
        .bind(&seller.password_hash)
        .bind(&seller.phone_no)
        .bind(&seller.address)
        .bind(seller.approval.status.as_str())
        .bind(seller.approval.approved_by)
        .bind(seller.approval.approved_at)
        .bind(seller.is_active)
        .bind(seller.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_seller(&self, id: Uuid) -> Result<bool> {
        self.delete_by_id("sellers", id).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Deliverers
    // ─────────────────────────────────────────────────────────────────────────

    async fn list_deliverers(
        &self,
        filter: &AccountFilter,
        page: OffsetPagination,
    ) -> Result<Page<Deliverer>> {
        self.fetch_page("deliverers", |qb| account_filter_sql(qb, filter, false), page)
            .await
    }

    async fn deliverer(&self, id: Uuid) -> Result<Option<Deliverer>> {
        self.fetch_optional("deliverers", id).await
    }

    async fn deliverer_by_email(
        &self,
        email: &str,
        exclude: Option<Uuid>,
    ) -> Result<Option<Deliverer>> {
        self.fetch_by_email("deliverers", email, exclude).await
    }

    async fn insert_deliverer(&self, deliverer: &Deliverer) -> Result<()> {
        sqlx::query(
            "INSERT INTO deliverers (id, name, email, password_hash, phone_no, vehicle_no,
             vehicle_type, address, status, approved_by, approved_at, is_active,
             created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
        )
        .bind(deliverer.id)
        .bind(&deliverer.name)
        .bind(&deliverer.email)
        .bind(&deliverer.password_hash)
        .bind(&deliverer.phone_no)
        .bind(&deliverer.vehicle_no)
        .bind(&deliverer.vehicle_type)
        .bind(&deliverer.address)
        .bind(deliverer.approval.status.as_str())
        .bind(deliverer.approval.approved_by)
        .bind(deliverer.approval.approved_at)
        .bind(deliverer.is_active)
        .bind(deliverer.created_at)
        .bind(deliverer.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_deliverer(&self, deliverer: &Deliverer) -> Result<()> {
        sqlx::query(
            "UPDATE deliverers SET name = $2, email = $3, password_hash = $4, phone_no = $5,
             vehicle_no = $6, vehicle_type = $7, address = $8, status = $9, approved_by = $10,
             approved_at = $11, is_active = $12, updated_at = $13 WHERE id = $1",
        )
        .bind(deliverer.id)
        .bind(&deliverer.name)
        .bind(&deliverer.email)
        .bind(&deliverer.password_hash)
        .bind(&deliverer.phone_no)
        .bind(&deliverer.vehicle_no)
        .bind(&deliverer.vehicle_type)
        .bind(&deliverer.address)
        .bind(deliverer.approval.status.as_str())
        .bind(deliverer.approval.approved_by)
        .bind(deliverer.approval.approved_at)
        .bind(deliverer.is_active)
        .bind(deliverer.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_deliverer(&self, id: Uuid) -> Result<bool> {
        self.delete_by_id("deliverers", id).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Products
    // ─────────────────────────────────────────────────────────────────────────

    async fn list_products(
        &self,
        filter: &ProductFilter,
        page: OffsetPagination,
    ) -> Result<Page<Product>> {
        self.fetch_page("products", |qb| product_filter_sql(qb, filter), page)
            .await
    }

    async fn product(&self, id: Uuid) -> Result<Option<Product>> {
        self.fetch_optional("products", id).await
    }

    async fn insert_product(&self, product: &Product) -> Result<()> {
        sqlx::query(
            "INSERT INTO products (id, name, description, price, discount, instock, seller_id,
             created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.discount)
        .bind(product.instock)
        .bind(product.seller_id)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_product(&self, product: &Product) -> Result<()> {
        sqlx::query(
            "UPDATE products SET name = $2, description = $3, price = $4, discount = $5,
             instock = $6, seller_id = $7, updated_at = $8 WHERE id = $1",
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.discount)
        .bind(product.instock)
        .bind(product.seller_id)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_product(&self, id: Uuid) -> Result<bool> {
        self.delete_by_id("products", id).await
    }

    async fn product_ids_by_seller(&self, seller_id: Uuid) -> Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar("SELECT id FROM products WHERE seller_id = $1")
            .bind(seller_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Orders
    // ─────────────────────────────────────────────────────────────────────────

    async fn list_orders(
        &self,
        filter: &OrderFilter,
        page: OffsetPagination,
    ) -> Result<Page<Order>> {
        self.fetch_page("orders", |qb| order_filter_sql(qb, filter), page)
            .await
    }

    async fn order(&self, id: Uuid) -> Result<Option<Order>> {
        self.fetch_optional("orders", id).await
    }

    async fn insert_order(&self, order: &Order) -> Result<()> {
        sqlx::query(
            "INSERT INTO orders (id, customer_id, product_id, quantity, total_amount, status,
             order_date, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(order.id)
        .bind(order.customer_id)
        .bind(order.product_id)
        .bind(order.quantity)
        .bind(order.total_amount)
        .bind(order.status.as_str())
        .bind(order.order_date)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_order(&self, order: &Order) -> Result<()> {
        sqlx::query(
            "UPDATE orders SET quantity = $2, total_amount = $3, status = $4, updated_at = $5
             WHERE id = $1",
        )
        .bind(order.id)
        .bind(order.quantity)
        .bind(order.total_amount)
        .bind(order.status.as_str())
        .bind(order.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_order(&self, id: Uuid) -> Result<bool> {
        self.delete_by_id("orders", id).await
    }

    async fn order_ids_by_customer(&self, customer_id: Uuid) -> Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar("SELECT id FROM orders WHERE customer_id = $1")
            .bind(customer_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    async fn order_ids_for_products(&self, product_ids: &[Uuid]) -> Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar("SELECT id FROM orders WHERE product_id = ANY($1)")
            .bind(product_ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Deliveries
    // ─────────────────────────────────────────────────────────────────────────

    async fn list_deliveries(
        &self,
        filter: &DeliveryFilter,
        page: OffsetPagination,
    ) -> Result<Page<Delivery>> {
        self.fetch_page("deliveries", |qb| delivery_filter_sql(qb, filter), page)
            .await
    }

    async fn delivery(&self, id: Uuid) -> Result<Option<Delivery>> {
        self.fetch_optional("deliveries", id).await
    }

    async fn insert_delivery(&self, delivery: &Delivery) -> Result<()> {
        sqlx::query(
            "INSERT INTO deliveries (id, order_id, deliverer_id, address, status,
             delivered_date, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(delivery.id)
        .bind(delivery.order_id)
        .bind(delivery.deliverer_id)
        .bind(&delivery.address)
        .bind(delivery.status.as_str())
        .bind(delivery.delivered_date)
        .bind(delivery.created_at)
        .bind(delivery.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_delivery(&self, delivery: &Delivery) -> Result<()> {
        sqlx::query(
            "UPDATE deliveries SET deliverer_id = $2, address = $3, status = $4,
             delivered_date = $5, updated_at = $6 WHERE id = $1",
        )
        .bind(delivery.id)
        .bind(delivery.deliverer_id)
        .bind(&delivery.address)
        .bind(delivery.status.as_str())
        .bind(delivery.delivered_date)
        .bind(delivery.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_delivery(&self, id: Uuid) -> Result<bool> {
        self.delete_by_id("deliveries", id).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Reviews
    // ─────────────────────────────────────────────────────────────────────────

    async fn list_reviews(
        &self,
        filter: &ReviewFilter,
        page: OffsetPagination,
    ) -> Result<Page<Review>> {
        self.fetch_page("reviews", |qb| review_filter_sql(qb, filter), page)
            .await
    }

    async fn review(&self, id: Uuid) -> Result<Option<Review>> {
        self.fetch_optional("reviews", id).await
    }

    async fn review_by_order(&self, order_id: Uuid) -> Result<Option<Review>> {
        let review = sqlx::query_as("SELECT * FROM reviews WHERE order_id = $1")
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(review)
    }

    async fn insert_review(&self, review: &Review) -> Result<()> {
        sqlx::query(
            "INSERT INTO reviews (id, customer_id, product_id, order_id, rating, comment,
             created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(review.id)
        .bind(review.customer_id)
        .bind(review.product_id)
        .bind(review.order_id)
        .bind(review.rating)
        .bind(&review.comment)
        .bind(review.created_at)
        .bind(review.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_review(&self, review: &Review) -> Result<()> {
        sqlx::query("UPDATE reviews SET rating = $2, comment = $3, updated_at = $4 WHERE id = $1")
            .bind(review.id)
            .bind(review.rating)
            .bind(&review.comment)
            .bind(review.updated_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_review(&self, id: Uuid) -> Result<bool> {
        self.delete_by_id("reviews", id).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Payments
    // ─────────────────────────────────────────────────────────────────────────

    async fn list_payments(
        &self,
        filter: &PaymentFilter,
        page: OffsetPagination,
    ) -> Result<Page<Payment>> {
        self.fetch_page("payments", |qb| payment_filter_sql(qb, filter), page)
            .await
    }

    async fn payment(&self, id: Uuid) -> Result<Option<Payment>> {
        self.fetch_optional("payments", id).await
    }

    async fn insert_payment(&self, payment: &Payment) -> Result<()> {
        sqlx::query(
            "INSERT INTO payments (id, customer_id, order_id, payment_method, created_at,
             updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(payment.id)
        .bind(payment.customer_id)
        .bind(payment.order_id)
        .bind(payment.payment_method.as_str())
        .bind(payment.created_at)
        .bind(payment.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_payment(&self, payment: &Payment) -> Result<()> {
        sqlx::query("UPDATE payments SET payment_method = $2, updated_at = $3 WHERE id = $1")
            .bind(payment.id)
            .bind(payment.payment_method.as_str())
            .bind(payment.updated_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_payment(&self, id: Uuid) -> Result<bool> {
        self.delete_by_id("payments", id).await
    }
}
