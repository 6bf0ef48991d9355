//! Deliverer profiles (`/api/deliverers`).

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
        .route("/deliverers", get(list_deliverers))
        .route_layer(RequireRoleLayer::new(&[Role::Admin]))
        .merge(
            Router::new()
                .route("/deliverers/:id", get(get_deliverer).put(update_deliverer))
                .route_layer(RequireRoleLayer::new(&[Role::Admin, Role::Deliverer])),
        )
        .merge(
            Router::new()
                .route("/deliverers/:id", delete(delete_deliverer))
                .route_layer(RequireRoleLayer::new(&[Role::Admin])),
        )
}

#[derive(Debug, Default, Deserialize)]
pub struct DelivererListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub status: Option<String>,
}

async fn list_deliverers(
    State(state): State<AppState>,
    Query(query): Query<DelivererListQuery>,
) -> Result<Response> {
    let pagination = OffsetPagination::new(
        query.page.unwrap_or(crate::pagination::MIN_PAGE_NUMBER),
        query.limit.unwrap_or(crate::pagination::DEFAULT_PAGE_SIZE),
    );
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
        status,
        ..Default::default()
    };

    let page = state.store.list_deliverers(&filter, pagination).await?;
    envelope::list(
        "deliverers",
        "totalDeliverers",
        &page.items,
        &pagination.metadata(page.total),
    )
}

async fn get_deliverer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    principal: Principal,
) -> Result<Response> {
    scope::require_self_or_admin(&principal, id)?;

    let deliverer = state
        .store
        .deliverer(id)
        .await?
        .ok_or_else(|| BazaarError::not_found("Deliverer"))?;
    envelope::resource("deliverer", &deliverer)
}

#[derive(Debug, Deserialize)]
pub struct UpdateDelivererRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone_no: Option<String>,
    pub vehicle_no: Option<String>,
    pub vehicle_type: Option<String>,
    pub address: Option<String>,
    /// Present only to be rejected.
    pub password: Option<serde_json::Value>,
    pub status: Option<serde_json::Value>,
    pub approved_by: Option<serde_json::Value>,
    pub approved_at: Option<serde_json::Value>,
}

async fn update_deliverer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    principal: Principal,
    AppJson(req): AppJson<UpdateDelivererRequest>,
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

    let mut deliverer = state
        .store
        .deliverer(id)
        .await?
        .ok_or_else(|| BazaarError::not_found("Deliverer"))?;

    if let Some(name) = req.name.as_deref() {
        deliverer.name = validate::name(name)?;
    }
    if let Some(email) = req.email.as_deref() {
        let email = validate::email(email)?;
        if state
            .store
            .deliverer_by_email(&email, Some(id))
            .await?
            .is_some()
        {
            return Err(BazaarError::conflict("Email already registered"));
        }
        deliverer.email = email;
    }
    if let Some(phone_no) = req.phone_no.as_deref() {
        deliverer.phone_no = validate::phone_no(phone_no)?;
    }
    if req.vehicle_no.is_some() {
        deliverer.vehicle_no = req.vehicle_no;
    }
    if req.vehicle_type.is_some() {
        deliverer.vehicle_type = req.vehicle_type;
    }
    if req.address.is_some() {
        deliverer.address = req.address;
    }

    deliverer.touch();
    state.store.update_deliverer(&deliverer).await?;

    envelope::resource_with_message(
        StatusCode::OK,
        "Deliverer updated successfully",
        "deliverer",
        &deliverer,
    )
}

async fn delete_deliverer(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Response> {
    if !state.store.delete_deliverer(id).await? {
        return Err(BazaarError::not_found("Deliverer"));
    }
    Ok(envelope::message("Deliverer deleted successfully"))
}
