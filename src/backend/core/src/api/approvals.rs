//! Admin approval workflow (`/api/admin/...`).
//!
//! Pending listings plus the approve/reject transitions. Transitions are
//! guarded: approving an approved account or rejecting a rejected one is a
//! 400, and the stamps (`approved_by`, `approved_at`) change only on a
//! successful approve.

use axum::{
    extract::{Path, Query, State},
    response::Response,
    routing::{get, put},
    Router,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::{envelope, AppState};
use crate::approval::ApprovalStatus;
use crate::db::AccountFilter;
use crate::error::{BazaarError, Result};
use crate::pagination::OffsetPagination;
use crate::rbac::{Principal, RequireRoleLayer, Role};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/sellers/pending", get(pending_sellers))
        .route("/admin/sellers/:id/approve", put(approve_seller))
        .route("/admin/sellers/:id/reject", put(reject_seller))
        .route("/admin/deliverers/pending", get(pending_deliverers))
        .route("/admin/deliverers/:id/approve", put(approve_deliverer))
        .route("/admin/deliverers/:id/reject", put(reject_deliverer))
        .route_layer(RequireRoleLayer::new(&[Role::Admin]))
}

#[derive(Debug, Default, Deserialize)]
pub struct PendingQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

fn pending_filter() -> AccountFilter {
    AccountFilter {
        status: Some(ApprovalStatus::Pending),
        ..Default::default()
    }
}

fn pagination_of(query: &PendingQuery) -> OffsetPagination {
    OffsetPagination::new(
        query.page.unwrap_or(crate::pagination::MIN_PAGE_NUMBER),
        query.limit.unwrap_or(crate::pagination::DEFAULT_PAGE_SIZE),
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Sellers
// ─────────────────────────────────────────────────────────────────────────────

async fn pending_sellers(
    State(state): State<AppState>,
    Query(query): Query<PendingQuery>,
) -> Result<Response> {
    let pagination = pagination_of(&query);
    let page = state
        .store
        .list_sellers(&pending_filter(), pagination)
        .await?;
    envelope::list(
        "sellers",
        "totalSellers",
        &page.items,
        &pagination.metadata(page.total),
    )
}

async fn approve_seller(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    principal: Principal,
) -> Result<Response> {
    let mut seller = state
        .store
        .seller(id)
        .await?
        .ok_or_else(|| BazaarError::not_found("Seller"))?;

    seller.approval.approve(principal.id, "Seller")?;
    seller.touch();
    state.store.update_seller(&seller).await?;

    info!(seller_id = %id, admin_id = %principal.id, "seller approved");

    envelope::resource_with_message(
        axum::http::StatusCode::OK,
        "Seller approved successfully",
        "seller",
        &seller,
    )
}

async fn reject_seller(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    principal: Principal,
) -> Result<Response> {
    let mut seller = state
        .store
        .seller(id)
        .await?
        .ok_or_else(|| BazaarError::not_found("Seller"))?;

    seller.approval.reject("Seller")?;
    seller.touch();
    state.store.update_seller(&seller).await?;

    info!(seller_id = %id, admin_id = %principal.id, "seller rejected");

    envelope::resource_with_message(
        axum::http::StatusCode::OK,
        "Seller rejected",
        "seller",
        &seller,
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Deliverers
// ─────────────────────────────────────────────────────────────────────────────

async fn pending_deliverers(
    State(state): State<AppState>,
    Query(query): Query<PendingQuery>,
) -> Result<Response> {
    let pagination = pagination_of(&query);
    let page = state
        .store
        .list_deliverers(&pending_filter(), pagination)
        .await?;
    envelope::list(
        "deliverers",
        "totalDeliverers",
        &page.items,
        &pagination.metadata(page.total),
    )
}

async fn approve_deliverer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    principal: Principal,
) -> Result<Response> {
    let mut deliverer = state
        .store
        .deliverer(id)
        .await?
        .ok_or_else(|| BazaarError::not_found("Deliverer"))?;

    deliverer.approval.approve(principal.id, "Deliverer")?;
    deliverer.touch();
    state.store.update_deliverer(&deliverer).await?;

    info!(deliverer_id = %id, admin_id = %principal.id, "deliverer approved");

    envelope::resource_with_message(
        axum::http::StatusCode::OK,
        "Deliverer approved successfully",
        "deliverer",
        &deliverer,
    )
}

async fn reject_deliverer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    principal: Principal,
) -> Result<Response> {
    let mut deliverer = state
        .store
        .deliverer(id)
        .await?
        .ok_or_else(|| BazaarError::not_found("Deliverer"))?;

    deliverer.approval.reject("Deliverer")?;
    deliverer.touch();
    state.store.update_deliverer(&deliverer).await?;

    info!(deliverer_id = %id, admin_id = %principal.id, "deliverer rejected");

    envelope::resource_with_message(
        axum::http::StatusCode::OK,
        "Deliverer rejected",
        "deliverer",
        &deliverer,
    )
}
