//! Approval workflow over the wire: pending listings and transitions.

mod common;

use axum::http::StatusCode;
use bazaar_core::approval::ApprovalStatus;
use bazaar_core::db::Store;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn pending_listing_shows_only_pending_sellers() {
    let app = TestApp::new();
    let (_, admin_token) = app.admin().await;
    let (pending, _) = app.seller(ApprovalStatus::Pending).await;
    app.seller(ApprovalStatus::Approved).await;
    app.seller(ApprovalStatus::Rejected).await;

    let (status, body) = app.get("/api/admin/sellers/pending", Some(&admin_token)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalSellers"], json!(1));
    assert_eq!(body["sellers"][0]["id"], json!(pending.id.to_string()));
    assert_eq!(body["sellers"][0]["status"], json!("pending"));
}

#[tokio::test]
async fn approve_stamps_admin_and_time() {
    let app = TestApp::new();
    let (admin, admin_token) = app.admin().await;
    let (seller, _) = app.seller(ApprovalStatus::Pending).await;

    let (status, body) = app
        .put(
            &format!("/api/admin/sellers/{}/approve", seller.id),
            Some(&admin_token),
            json!({}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Seller approved successfully"));
    assert_eq!(body["seller"]["status"], json!("approved"));
    assert_eq!(body["seller"]["approved_by"], json!(admin.id.to_string()));
    assert!(body["seller"]["approved_at"].is_string());

    let stored = app.store.seller(seller.id).await.unwrap().unwrap();
    assert_eq!(stored.approval.status, ApprovalStatus::Approved);
    assert_eq!(stored.approval.approved_by, Some(admin.id));
}

#[tokio::test]
async fn double_approve_is_rejected_and_stamps_survive() {
    let app = TestApp::new();
    let (first_admin, first_token) = app.admin().await;
    let (_, second_token) = app.admin().await;
    let (seller, _) = app.seller(ApprovalStatus::Pending).await;
    let uri = format!("/api/admin/sellers/{}/approve", seller.id);

    let (status, _) = app.put(&uri, Some(&first_token), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    let stamped = app.store.seller(seller.id).await.unwrap().unwrap();

    let (status, body) = app.put(&uri, Some(&second_token), json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("Seller is already approved"));

    // The second attempt left the record alone.
    let after = app.store.seller(seller.id).await.unwrap().unwrap();
    assert_eq!(after.approval.approved_by, Some(first_admin.id));
    assert_eq!(after.approval.approved_at, stamped.approval.approved_at);
}

#[tokio::test]
async fn rejection_is_revisitable() {
    let app = TestApp::new();
    let (_, admin_token) = app.admin().await;
    let (seller, _) = app.seller(ApprovalStatus::Pending).await;

    let (status, body) = app
        .put(
            &format!("/api/admin/sellers/{}/reject", seller.id),
            Some(&admin_token),
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Seller rejected"));
    assert_eq!(body["seller"]["status"], json!("rejected"));

    // A rejected seller can still be approved later.
    let (status, body) = app
        .put(
            &format!("/api/admin/sellers/{}/approve", seller.id),
            Some(&admin_token),
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["seller"]["status"], json!("approved"));
}

#[tokio::test]
async fn double_reject_is_a_conflict() {
    let app = TestApp::new();
    let (_, admin_token) = app.admin().await;
    let (deliverer, _) = app.deliverer(ApprovalStatus::Pending).await;
    let uri = format!("/api/admin/deliverers/{}/reject", deliverer.id);

    let (status, _) = app.put(&uri, Some(&admin_token), json!({})).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.put(&uri, Some(&admin_token), json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("Deliverer is already rejected"));
}

#[tokio::test]
async fn deliverer_approval_mirrors_sellers() {
    let app = TestApp::new();
    let (admin, admin_token) = app.admin().await;
    let (deliverer, deliverer_token) = app.deliverer(ApprovalStatus::Pending).await;

    // Pending deliverers cannot act yet.
    let (status, _) = app.get("/api/deliveries", Some(&deliverer_token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .put(
            &format!("/api/admin/deliverers/{}/approve", deliverer.id),
            Some(&admin_token),
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Deliverer approved successfully"));
    assert_eq!(body["deliverer"]["approved_by"], json!(admin.id.to_string()));

    // The existing token works once the account is approved.
    let (status, _) = app.get("/api/deliveries", Some(&deliverer_token)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn approval_routes_are_admin_only() {
    let app = TestApp::new();
    let (seller, seller_token) = app.seller(ApprovalStatus::Approved).await;

    let (status, _) = app
        .put(
            &format!("/api/admin/sellers/{}/approve", seller.id),
            Some(&seller_token),
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.get("/api/admin/sellers/pending", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_account_is_404() {
    let app = TestApp::new();
    let (_, admin_token) = app.admin().await;

    let (status, body) = app
        .put(
            &format!("/api/admin/sellers/{}/approve", uuid::Uuid::new_v4()),
            Some(&admin_token),
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], json!("Seller not found"));
}
