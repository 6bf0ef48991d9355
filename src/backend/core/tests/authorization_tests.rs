//! End-to-end authorization behavior: credentials, role gates, revocation.

mod common;

use axum::http::{Method, StatusCode};
use bazaar_core::approval::ApprovalStatus;
use bazaar_core::db::Store;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn missing_credential_on_protected_route_is_401() {
    let app = TestApp::new();

    let (status, body) = app.get("/api/orders", None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["statusCode"], json!(401));
    assert_eq!(body["message"], json!("Not authorized to access this route"));
}

#[tokio::test]
async fn role_mismatch_names_actual_and_required_roles() {
    let app = TestApp::new();
    let (_, customer_token) = app.customer().await;

    let (status, body) = app.get("/api/users", Some(&customer_token)).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["message"],
        json!("User role 'customer' is not authorized to access this route. Required roles: admin")
    );
}

#[tokio::test]
async fn pending_seller_is_blocked_from_seller_routes() {
    let app = TestApp::new();
    let (_, seller_token) = app.seller(ApprovalStatus::Pending).await;

    let (status, body) = app
        .post(
            "/api/products",
            Some(&seller_token),
            json!({ "name": "Lamp", "description": "A lamp", "price": 25.0 }),
        )
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["message"],
        json!("Your seller account is pending approval. Please wait for admin approval.")
    );
}

#[tokio::test]
async fn pending_seller_on_admin_route_gets_role_mismatch() {
    let app = TestApp::new();
    let (_, seller_token) = app.seller(ApprovalStatus::Pending).await;

    let (status, body) = app.get("/api/users", Some(&seller_token)).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("User role 'seller'"), "{}", message);
}

#[tokio::test]
async fn approved_seller_can_create_products() {
    let app = TestApp::new();
    let (seller, seller_token) = app.seller(ApprovalStatus::Approved).await;

    let (status, body) = app
        .post(
            "/api/products",
            Some(&seller_token),
            json!({ "name": "Lamp", "description": "A lamp", "price": 25.0, "discount": 10.0 }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["product"]["seller_id"], json!(seller.id.to_string()));
}

#[tokio::test]
async fn logout_revokes_the_token_everywhere() {
    let app = TestApp::new();
    let (_, customer_token) = app.customer().await;

    // Works before logout.
    let (status, _) = app.get("/api/orders", Some(&customer_token)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .post("/api/auth/logout", Some(&customer_token), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);

    // The same unexpired token is now rejected on every protected route.
    let (status, body) = app.get("/api/orders", Some(&customer_token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body["message"],
        json!("Token has been invalidated. Please login again.")
    );
}

#[tokio::test]
async fn garbage_token_fails_protected_but_passes_public_routes() {
    let app = TestApp::new();

    let (status, _) = app.get("/api/orders", Some("not-a-token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Public listing treats a bad credential as anonymous.
    let (status, body) = app.get("/api/products", Some("not-a-token")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
}

#[tokio::test]
async fn deactivated_account_cannot_authenticate() {
    let app = TestApp::new();
    let (mut customer, customer_token) = app.customer().await;

    customer.is_active = false;
    app.store.update_customer(&customer).await.unwrap();

    let (status, body) = app.get("/api/orders", Some(&customer_token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], json!("Account is deactivated"));
}

#[tokio::test]
async fn register_login_round_trip() {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            "/api/auth/register/customer",
            None,
            json!({
                "name": "Cora",
                "email": "cora@example.com",
                "password": "super-secret",
                "phone_no": "1234567890",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["token"].is_string());

    let (status, body) = app
        .post(
            "/api/auth/login",
            None,
            json!({ "email": "cora@example.com", "password": "super-secret", "role": "customer" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());
    assert_eq!(body["user"]["name"], json!("Cora"));
    assert!(body["user"].get("password_hash").is_none());

    let (status, body) = app
        .post(
            "/api/auth/login",
            None,
            json!({ "email": "cora@example.com", "password": "wrong", "role": "customer" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], json!("Invalid credentials"));
}

#[tokio::test]
async fn duplicate_registration_email_conflicts() {
    let app = TestApp::new();
    let registration = json!({
        "name": "Cora",
        "email": "cora@example.com",
        "password": "super-secret",
        "phone_no": "1234567890",
    });

    let (status, _) = app
        .post("/api/auth/register/customer", None, registration.clone())
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .post("/api/auth/register/customer", None, registration)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("Email already registered"));
}

#[tokio::test]
async fn validation_reports_first_violation_only() {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            "/api/auth/register/customer",
            None,
            json!({ "name": "C", "email": "bad", "password": "x" }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    // Name fails first; later violations are not reported.
    assert_eq!(body["message"], json!("Name must be at least 2 characters"));
}

#[tokio::test]
async fn legacy_deliverer_without_status_is_treated_as_approved() {
    let app = TestApp::new();
    let (mut deliverer, deliverer_token) = app.deliverer(ApprovalStatus::Pending).await;

    // Simulate a pre-approval-era row.
    deliverer.approval = bazaar_core::approval::ApprovalRecord::legacy_approved();
    app.store.update_deliverer(&deliverer).await.unwrap();

    let (status, _) = app.get("/api/deliveries", Some(&deliverer_token)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn health_is_public() {
    let app = TestApp::new();
    let (status, body) = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("ok"));
}
