//! Deliveries (`/api/deliveries`).

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;
use uuid::Uuid;

use super::{envelope, AppJson, AppState};
use crate::error::{BazaarError, Result};
use crate::models::{validate, Delivery, DeliveryStatus};
use crate::pagination::OffsetPagination;
use crate::rbac::{Principal, RequireRoleLayer, Role};
use crate::scope;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/deliveries", get(list_deliveries))
        .route("/deliveries/:id", get(get_delivery))
        .route_layer(RequireRoleLayer::new(&Role::ALL))
        .merge(
            Router::new()
                .route("/deliveries", post(create_delivery))
                .route_layer(RequireRoleLayer::new(&[Role::Seller, Role::Deliverer])),
        )
        .merge(
            Router::new()
                .route("/deliveries/:id", put(update_delivery))
                .route_layer(RequireRoleLayer::new(&[Role::Admin, Role::Deliverer])),
        )
        .merge(
            Router::new()
                .route("/deliveries/:id", delete(delete_delivery))
                .route_layer(RequireRoleLayer::new(&[Role::Admin])),
        )
}

#[derive(Debug, Default, Deserialize)]
pub struct DeliveryListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub status: Option<String>,
    pub deliverer_id: Option<Uuid>,
    pub order_id: Option<Uuid>,
}

async fn list_deliveries(
    State(state): State<AppState>,
    Query(query): Query<DeliveryListQuery>,
    principal: Principal,
) -> Result<Response> {
    let pagination = OffsetPagination::new(
        query.page.unwrap_or(crate::pagination::MIN_PAGE_NUMBER),
        query.limit.unwrap_or(crate::pagination::DEFAULT_PAGE_SIZE),
    );

    // Ownership scoping wins over whatever the query asks for.
    let mut filter = scope::delivery_list_filter(state.store.as_ref(), &principal).await?;
    if let Some(raw) = query.status.as_deref() {
        filter.status = Some(
            DeliveryStatus::parse(raw)
                .ok_or_else(|| BazaarError::validation("Invalid delivery status"))?,
        );
    }
    if principal.role == Role::Admin {
        filter.deliverer_id = query.deliverer_id;
    }
    filter.order_id = query.order_id;

    let page = state.store.list_deliveries(&filter, pagination).await?;
    envelope::list(
        "deliveries",
        "totalDeliveries",
        &page.items,
        &pagination.metadata(page.total),
    )
}

async fn get_delivery(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    principal: Principal,
) -> Result<Response> {
    let delivery = state
        .store
        .delivery(id)
        .await?
        .ok_or_else(|| BazaarError::not_found("Delivery"))?;

    scope::check_delivery_read(state.store.as_ref(), &principal, &delivery).await?;
    envelope::resource("delivery", &delivery)
}

#[derive(Debug, Deserialize)]
pub struct CreateDeliveryRequest {
    pub order_id: Option<Uuid>,
    pub deliverer_id: Option<Uuid>,
    pub address: Option<String>,
}

async fn create_delivery(
    State(state): State<AppState>,
    AppJson(req): AppJson<CreateDeliveryRequest>,
) -> Result<Response> {
    let order_id = req
        .order_id
        .ok_or_else(|| BazaarError::validation("Order id is required"))?;
    let address = validate::required(req.address.as_deref(), "Address is required")?.to_string();

    if state.store.order(order_id).await?.is_none() {
        return Err(BazaarError::not_found("Order"));
    }
    if let Some(deliverer_id) = req.deliverer_id {
        if state.store.deliverer(deliverer_id).await?.is_none() {
            return Err(BazaarError::not_found("Deliverer"));
        }
    }

    let delivery = Delivery::new(order_id, req.deliverer_id, address);
    state.store.insert_delivery(&delivery).await?;

    envelope::resource_with_message(
        StatusCode::CREATED,
        "Delivery created successfully",
        "delivery",
        &delivery,
    )
}

#[derive(Debug, Deserialize)]
pub struct UpdateDeliveryRequest {
    pub status: Option<String>,
    pub deliverer_id: Option<Uuid>,
    pub address: Option<String>,
}

async fn update_delivery(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    principal: Principal,
    AppJson(req): AppJson<UpdateDeliveryRequest>,
) -> Result<Response> {
    let mut delivery = state
        .store
        .delivery(id)
        .await?
        .ok_or_else(|| BazaarError::not_found("Delivery"))?;

    scope::check_delivery_write(&principal, &delivery)?;

    // Deliverers may only move the status of their own assignment.
    if principal.role == Role::Deliverer
        && (req.deliverer_id.is_some() || req.address.is_some())
    {
        return Err(BazaarError::validation(
            "Only the delivery status can be updated by a deliverer",
        ));
    }

    if principal.role == Role::Admin {
        if let Some(deliverer_id) = req.deliverer_id {
            if state.store.deliverer(deliverer_id).await?.is_none() {
                return Err(BazaarError::not_found("Deliverer"));
            }
            delivery.deliverer_id = Some(deliverer_id);
        }
        if let Some(address) = req.address {
            delivery.address = address;
        }
    }

    if let Some(raw) = req.status.as_deref() {
        let status = DeliveryStatus::parse(raw)
            .ok_or_else(|| BazaarError::validation("Invalid delivery status"))?;
        // Stamps delivered_date when the status becomes delivered.
        delivery.set_status(status);
    }

    delivery.touch();
    state.store.update_delivery(&delivery).await?;

    envelope::resource_with_message(
        StatusCode::OK,
        "Delivery updated successfully",
        "delivery",
        &delivery,
    )
}

async fn delete_delivery(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Response> {
    if !state.store.delete_delivery(id).await? {
        return Err(BazaarError::not_found("Delivery"));
    }
    Ok(envelope::message("Delivery deleted successfully"))
}
