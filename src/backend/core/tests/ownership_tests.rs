//! Ownership scoping across resources: lists narrow, writes forbid.

mod common;

use axum::http::{Method, StatusCode};
use bazaar_core::approval::ApprovalStatus;
use bazaar_core::db::Store;
use bazaar_core::models::{Delivery, Review};
use common::TestApp;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn customers_cannot_read_each_others_profiles() {
    let app = TestApp::new();
    let (customer_a, _) = app.customer().await;
    let (_, token_b) = app.customer().await;
    let (_, admin_token) = app.admin().await;

    let uri = format!("/api/customers/{}", customer_a.id);

    let (status, body) = app.get(&uri, Some(&token_b)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], json!("Not authorized to access this account"));

    let (status, _) = app.get(&uri, Some(&admin_token)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn order_lists_are_scoped_per_role() {
    let app = TestApp::new();
    let (customer_a, token_a) = app.customer().await;
    let (customer_b, token_b) = app.customer().await;
    let (seller, seller_token) = app.seller(ApprovalStatus::Approved).await;
    let (other_seller, other_seller_token) = app.seller(ApprovalStatus::Approved).await;
    let (_, admin_token) = app.admin().await;

    let product = app.product(seller.id, 100.0, 0.0).await;
    let other_product = app.product(other_seller.id, 50.0, 0.0).await;
    app.order(customer_a.id, product.id).await;
    app.order(customer_b.id, other_product.id).await;

    // Each customer sees only their own order.
    let (_, body) = app.get("/api/orders", Some(&token_a)).await;
    assert_eq!(body["totalOrders"], json!(1));
    assert_eq!(
        body["orders"][0]["customer_id"],
        json!(customer_a.id.to_string())
    );

    let (_, body) = app.get("/api/orders", Some(&token_b)).await;
    assert_eq!(body["totalOrders"], json!(1));

    // Sellers see orders of their products only.
    let (_, body) = app.get("/api/orders", Some(&seller_token)).await;
    assert_eq!(body["totalOrders"], json!(1));
    assert_eq!(
        body["orders"][0]["product_id"],
        json!(product.id.to_string())
    );

    let (_, body) = app.get("/api/orders", Some(&other_seller_token)).await;
    assert_eq!(body["totalOrders"], json!(1));

    // Admin sees everything.
    let (_, body) = app.get("/api/orders", Some(&admin_token)).await;
    assert_eq!(body["totalOrders"], json!(2));
}

#[tokio::test]
async fn foreign_order_read_is_forbidden() {
    let app = TestApp::new();
    let (customer_a, _) = app.customer().await;
    let (_, token_b) = app.customer().await;
    let (seller, _) = app.seller(ApprovalStatus::Approved).await;
    let product = app.product(seller.id, 100.0, 0.0).await;
    let order = app.order(customer_a.id, product.id).await;

    let (status, _) = app
        .get(&format!("/api/orders/{}", order.id), Some(&token_b))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn order_total_is_discounted_price_times_quantity() {
    let app = TestApp::new();
    let (_, customer_token) = app.customer().await;
    let (seller, _) = app.seller(ApprovalStatus::Approved).await;
    let product = app.product(seller.id, 100.0, 10.0).await;

    let (status, body) = app
        .post(
            "/api/orders",
            Some(&customer_token),
            json!({ "product_id": product.id, "quantity": 2 }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["order"]["total_amount"], json!(180.0));
}

#[tokio::test]
async fn out_of_stock_product_cannot_be_ordered() {
    let app = TestApp::new();
    let (_, customer_token) = app.customer().await;
    let (seller, _) = app.seller(ApprovalStatus::Approved).await;
    let mut product = app.product(seller.id, 100.0, 0.0).await;
    product.instock = false;
    app.store.update_product(&product).await.unwrap();

    let (status, body) = app
        .post(
            "/api/orders",
            Some(&customer_token),
            json!({ "product_id": product.id, "quantity": 1 }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("Product is out of stock"));
}

#[tokio::test]
async fn sellers_cannot_touch_foreign_products() {
    let app = TestApp::new();
    let (seller, _) = app.seller(ApprovalStatus::Approved).await;
    let (_, other_token) = app.seller(ApprovalStatus::Approved).await;
    let product = app.product(seller.id, 25.0, 0.0).await;

    let (status, _) = app
        .put(
            &format!("/api/products/{}", product.id),
            Some(&other_token),
            json!({ "price": 1.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn review_requires_owning_the_order_and_is_unique_per_order() {
    let app = TestApp::new();
    let (customer_a, token_a) = app.customer().await;
    let (_, token_b) = app.customer().await;
    let (seller, _) = app.seller(ApprovalStatus::Approved).await;
    let product = app.product(seller.id, 25.0, 0.0).await;
    let order = app.order(customer_a.id, product.id).await;

    // Another customer cannot review this order.
    let (status, _) = app
        .post(
            "/api/reviews",
            Some(&token_b),
            json!({ "order_id": order.id, "rating": 5 }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The owner can, once.
    let (status, _) = app
        .post(
            "/api/reviews",
            Some(&token_a),
            json!({ "order_id": order.id, "rating": 5, "comment": "Great" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .post(
            "/api/reviews",
            Some(&token_a),
            json!({ "order_id": order.id, "rating": 4 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("Review already exists for this order"));
}

#[tokio::test]
async fn customers_cannot_edit_foreign_reviews() {
    let app = TestApp::new();
    let (customer_a, _) = app.customer().await;
    let (_, token_b) = app.customer().await;

    let review = Review::new(
        customer_a.id,
        Uuid::new_v4(),
        Uuid::new_v4(),
        5,
        "Great".to_string(),
    );
    app.store.insert_review(&review).await.unwrap();

    let (status, _) = app
        .put(
            &format!("/api/reviews/{}", review.id),
            Some(&token_b),
            json!({ "rating": 1 }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admins_cannot_edit_or_delete_reviews() {
    let app = TestApp::new();
    let (customer, _) = app.customer().await;
    let (_, admin_token) = app.admin().await;

    let review = Review::new(
        customer.id,
        Uuid::new_v4(),
        Uuid::new_v4(),
        5,
        "Great".to_string(),
    );
    app.store.insert_review(&review).await.unwrap();
    let uri = format!("/api/reviews/{}", review.id);

    // Reviews are author-owned; admins may only read them.
    let (status, _) = app
        .put(&uri, Some(&admin_token), json!({ "rating": 1 }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .request(Method::DELETE, &uri, Some(&admin_token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Admins still read the review, which survives untouched.
    let (status, body) = app.get(&uri, Some(&admin_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["review"]["rating"], json!(5));
}

#[tokio::test]
async fn deliverer_cannot_update_unassigned_delivery() {
    let app = TestApp::new();
    let (customer, _) = app.customer().await;
    let (seller, _) = app.seller(ApprovalStatus::Approved).await;
    let (assigned, _) = app.deliverer(ApprovalStatus::Approved).await;
    let (_, outsider_token) = app.deliverer(ApprovalStatus::Approved).await;

    let product = app.product(seller.id, 25.0, 0.0).await;
    let order = app.order(customer.id, product.id).await;
    let delivery = Delivery::new(order.id, Some(assigned.id), "2 Harbor Lane".to_string());
    app.store.insert_delivery(&delivery).await.unwrap();

    let (status, _) = app
        .put(
            &format!("/api/deliveries/{}", delivery.id),
            Some(&outsider_token),
            json!({ "status": "delivered" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Record unchanged.
    let unchanged = app.store.delivery(delivery.id).await.unwrap().unwrap();
    assert_eq!(unchanged.status, delivery.status);
    assert!(unchanged.delivered_date.is_none());
}

#[tokio::test]
async fn assigned_deliverer_status_update_stamps_delivered_date() {
    let app = TestApp::new();
    let (customer, _) = app.customer().await;
    let (seller, _) = app.seller(ApprovalStatus::Approved).await;
    let (assigned, assigned_token) = app.deliverer(ApprovalStatus::Approved).await;

    let product = app.product(seller.id, 25.0, 0.0).await;
    let order = app.order(customer.id, product.id).await;
    let delivery = Delivery::new(order.id, Some(assigned.id), "2 Harbor Lane".to_string());
    app.store.insert_delivery(&delivery).await.unwrap();

    // Deliverers may only touch the status.
    let (status, _) = app
        .put(
            &format!("/api/deliveries/{}", delivery.id),
            Some(&assigned_token),
            json!({ "address": "elsewhere" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .put(
            &format!("/api/deliveries/{}", delivery.id),
            Some(&assigned_token),
            json!({ "status": "delivered" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["delivery"]["status"], json!("delivered"));
    assert!(body["delivery"]["delivered_date"].is_string());
}

#[tokio::test]
async fn profile_patch_rejects_password_and_approval_fields() {
    let app = TestApp::new();
    let (customer, customer_token) = app.customer().await;
    let (seller, seller_token) = app.seller(ApprovalStatus::Approved).await;

    let (status, body) = app
        .put(
            &format!("/api/customers/{}", customer.id),
            Some(&customer_token),
            json!({ "password": "new-password" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        json!("Password cannot be updated through this route")
    );

    let (status, body) = app
        .put(
            &format!("/api/sellers/{}", seller.id),
            Some(&seller_token),
            json!({ "status": "approved" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        json!("Approval status cannot be updated through this route")
    );
}

#[tokio::test]
async fn seller_product_listing_is_self_scoped() {
    let app = TestApp::new();
    let (seller, seller_token) = app.seller(ApprovalStatus::Approved).await;
    let (other_seller, _) = app.seller(ApprovalStatus::Approved).await;
    app.product(seller.id, 25.0, 0.0).await;
    app.product(other_seller.id, 30.0, 0.0).await;

    // Anonymous browsing sees the whole catalog.
    let (_, body) = app.get("/api/products", None).await;
    assert_eq!(body["totalProducts"], json!(2));

    // A seller browsing sees only their own.
    let (_, body) = app.get("/api/products", Some(&seller_token)).await;
    assert_eq!(body["totalProducts"], json!(1));
    assert_eq!(
        body["products"][0]["seller_id"],
        json!(seller.id.to_string())
    );
}
