//! Seller profiles (`/api/sellers`).

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    routing::{delete, get},
    Router,
};
use serde::Deserialize;
use uuid::Uuid;

use super::{envelope, AppJson, AppState};
use crate::approval::ApprovalStatus;
use crate::db::AccountFilter;
use crate::error::{BazaarError, Result};
use crate::models::validate;
use crate::pagination::OffsetPagination;
use crate::rbac::{Principal, RequireRoleLayer, Role};
use crate::scope;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sellers", get(list_sellers))
        .route("/sellers/:id", get(get_seller).put(update_seller))
        .route_layer(RequireRoleLayer::new(&[Role::Admin, Role::Seller]))
        .merge(
            Router::new()
                .route("/sellers/:id", delete(delete_seller))
                .route_layer(RequireRoleLayer::new(&[Role::Admin])),
        )
}

#[derive(Debug, Default, Deserialize)]
pub struct SellerListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub shop_name: Option<String>,
    pub status: Option<String>,
}

async fn list_sellers(
    State(state): State<AppState>,
    Query(query): Query<SellerListQuery>,
    principal: Principal,
) -> Result<Response> {
    let pagination = OffsetPagination::new(
        query.page.unwrap_or(crate::pagination::MIN_PAGE_NUMBER),
        query.limit.unwrap_or(crate::pagination::DEFAULT_PAGE_SIZE),
    );

    // A seller's listing is just their own profile.
    if principal.role == Role::Seller {
        let seller = state
            .store
            .seller(principal.id)
            .await?
            .ok_or_else(|| BazaarError::not_found("Seller"))?;
        return envelope::list(
            "sellers",
            "totalSellers",
            &[seller],
            &pagination.metadata(1),
        );
    }

    let status = match query.status.as_deref() {
        None => None,
        Some(raw) => Some(
            ApprovalStatus::parse(raw)
                .ok_or_else(|| BazaarError::validation("Invalid approval status"))?,
        ),
    };
    let filter = AccountFilter {
        name: query.name,
        email: query.email,
        shop_name: query.shop_name,
        status,
    };

    let page = state.store.list_sellers(&filter, pagination).await?;
    envelope::list(
        "sellers",
        "totalSellers",
        &page.items,
        &pagination.metadata(page.total),
    )
}

async fn get_seller(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    principal: Principal,
) -> Result<Response> {
    scope::require_self_or_admin(&principal, id)?;

    let seller = state
        .store
        .seller(id)
        .await?
        .ok_or_else(|| BazaarError::not_found("Seller"))?;
    envelope::resource("seller", &seller)
}

#[derive(Debug, Deserialize)]
pub struct UpdateSellerRequest {
    pub name: Option<String>,
    pub shop_name: Option<String>,
    pub email: Option<String>,
    pub phone_no: Option<String>,
    pub address: Option<String>,
    /// Present only to be rejected.
    pub password: Option<serde_json::Value>,
    /// Approval fields are writable solely through the approval endpoints,
    /// for admins included.
    pub status: Option<serde_json::Value>,
    pub approved_by: Option<serde_json::Value>,
    pub approved_at: Option<serde_json::Value>,
}

async fn update_seller(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    principal: Principal,
    AppJson(req): AppJson<UpdateSellerRequest>,
) -> Result<Response> {
    scope::require_self_or_admin(&principal, id)?;

    if req.password.is_some() {
        return Err(BazaarError::validation(
            "Password cannot be updated through this route",
        ));
    }
    if req.status.is_some() || req.approved_by.is_some() || req.approved_at.is_some() {
        return Err(BazaarError::validation(
            "Approval status cannot be updated through this route",
        ));
    }

    let mut seller = state
        .store
        .seller(id)
        .await?
        .ok_or_else(|| BazaarError::not_found("Seller"))?;

    if let Some(name) = req.name.as_deref() {
        seller.name = validate::name(name)?;
    }
    if let Some(shop_name) = req.shop_name.as_deref() {
        seller.shop_name = validate::shop_name(shop_name)?;
    }
    if let Some(email) = req.email.as_deref() {
        let email = validate::email(email)?;
        if state
            .store
            .seller_by_email(&email, Some(id))
            .await?
            .is_some()
        {
            return Err(BazaarError::conflict("Email already registered"));
        }
        seller.email = email;
    }
    if let Some(phone_no) = req.phone_no.as_deref() {
        seller.phone_no = validate::phone_no(phone_no)?;
    }
    if let Some(address) = req.address {
        seller.address = address;
    }

    seller.touch();
    state.store.update_seller(&seller).await?;

    envelope::resource_with_message(
        StatusCode::OK,
        "Seller updated successfully",
        "seller",
        &seller,
    )
}

async fn delete_seller(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Response> {
    if !state.store.delete_seller(id).await? {
        return Err(BazaarError::not_found("Seller"));
    }
    Ok(envelope::message("Seller deleted successfully"))
}
