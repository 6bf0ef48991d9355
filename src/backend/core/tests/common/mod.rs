//! Shared harness: a full router over the in-memory store.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use bazaar_core::api::{build_router, AppState};
use bazaar_core::approval::ApprovalStatus;
use bazaar_core::db::{MemoryStore, Store};
use bazaar_core::middleware::auth::{AuthConfig, Authenticator};
use bazaar_core::models::{Admin, Customer, Deliverer, Order, Product, Seller};
use bazaar_core::rbac::Role;

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub auth: Arc<Authenticator>,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let auth = Arc::new(Authenticator::new(&AuthConfig {
            jwt_secret: "integration-test-secret".to_string(),
            token_ttl_secs: 3600,
            leeway_secs: 0,
        }));
        let router = build_router(AppState::new(store.clone(), auth.clone(), None));
        Self {
            router,
            store,
            auth,
        }
    }

    fn email(prefix: &str) -> String {
        format!("{}-{}@example.com", prefix, Uuid::new_v4().simple())
    }

    pub async fn admin(&self) -> (Admin, String) {
        let admin = Admin::new(
            "Root Admin".to_string(),
            Self::email("admin"),
            "hash".to_string(),
        );
        self.store.insert_admin(&admin).await.unwrap();
        let (token, _) = self
            .auth
            .issue_token(admin.id, Role::Admin, &admin.email)
            .unwrap();
        (admin, token)
    }

    pub async fn customer(&self) -> (Customer, String) {
        let customer = Customer::new(
            "Cora Customer".to_string(),
            Self::email("customer"),
            "hash".to_string(),
            "1234567890".to_string(),
        );
        self.store.insert_customer(&customer).await.unwrap();
        let (token, _) = self
            .auth
            .issue_token(customer.id, Role::Customer, &customer.email)
            .unwrap();
        (customer, token)
    }

    pub async fn seller(&self, status: ApprovalStatus) -> (Seller, String) {
        let mut seller = Seller::new(
            "Sam Seller".to_string(),
            "Sam's Shop".to_string(),
            Self::email("seller"),
            "hash".to_string(),
            "1234567890".to_string(),
            "1 Market Square".to_string(),
        );
        seller.approval.status = status;
        self.store.insert_seller(&seller).await.unwrap();
        let (token, _) = self
            .auth
            .issue_token(seller.id, Role::Seller, &seller.email)
            .unwrap();
        (seller, token)
    }

    pub async fn deliverer(&self, status: ApprovalStatus) -> (Deliverer, String) {
        let mut deliverer = Deliverer::new(
            "Dee Deliverer".to_string(),
            Self::email("deliverer"),
            "hash".to_string(),
            "1234567890".to_string(),
        );
        deliverer.approval.status = status;
        self.store.insert_deliverer(&deliverer).await.unwrap();
        let (token, _) = self
            .auth
            .issue_token(deliverer.id, Role::Deliverer, &deliverer.email)
            .unwrap();
        (deliverer, token)
    }

    pub async fn product(&self, seller_id: Uuid, price: f64, discount: f64) -> Product {
        let product = Product::new(
            "Lamp".to_string(),
            "A perfectly ordinary lamp".to_string(),
            price,
            discount,
            seller_id,
        );
        self.store.insert_product(&product).await.unwrap();
        product
    }

    pub async fn order(&self, customer_id: Uuid, product_id: Uuid) -> Order {
        let order = Order::new(customer_id, product_id, 1, 25.0);
        self.store.insert_order(&order).await.unwrap();
        order
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(
        &self,
        uri: &str,
        token: Option<&str>,
        body: Value,
    ) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, token, Some(body)).await
    }
}
