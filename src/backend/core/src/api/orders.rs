//! Orders (`/api/orders`).

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    routing::{delete, get, put},
    Router,
};
use serde::Deserialize;
use uuid::Uuid;

use super::{envelope, AppJson, AppState};
use crate::error::{BazaarError, Result};
use crate::models::{validate, Order, OrderStatus};
use crate::pagination::OffsetPagination;
use crate::rbac::{Principal, RequireRoleLayer, Role};
use crate::scope;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders))
        .route("/orders/:id", get(get_order))
        .route_layer(RequireRoleLayer::new(&[
            Role::Admin,
            Role::Customer,
            Role::Seller,
        ]))
        .merge(
            Router::new()
                .route("/orders", axum::routing::post(create_order))
                .route_layer(RequireRoleLayer::new(&[Role::Customer])),
        )
        .merge(
            Router::new()
                .route("/orders/:id", put(update_order))
                .route_layer(RequireRoleLayer::new(&[Role::Admin, Role::Seller])),
        )
        .merge(
            Router::new()
                .route("/orders/:id", delete(delete_order))
                .route_layer(RequireRoleLayer::new(&[Role::Admin])),
        )
}

#[derive(Debug, Default, Deserialize)]
pub struct OrderListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub status: Option<String>,
}

async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
    principal: Principal,
) -> Result<Response> {
    let pagination = OffsetPagination::new(
        query.page.unwrap_or(crate::pagination::MIN_PAGE_NUMBER),
        query.limit.unwrap_or(crate::pagination::DEFAULT_PAGE_SIZE),
    );

    let mut filter = scope::order_list_filter(state.store.as_ref(), &principal).await?;
    if let Some(raw) = query.status.as_deref() {
        filter.status = Some(
            OrderStatus::parse(raw).ok_or_else(|| BazaarError::validation("Invalid order status"))?,
        );
    }

    let page = state.store.list_orders(&filter, pagination).await?;
    envelope::list(
        "orders",
        "totalOrders",
        &page.items,
        &pagination.metadata(page.total),
    )
}

async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    principal: Principal,
) -> Result<Response> {
    let order = state
        .store
        .order(id)
        .await?
        .ok_or_else(|| BazaarError::not_found("Order"))?;

    scope::check_order_read(state.store.as_ref(), &principal, &order).await?;
    envelope::resource("order", &order)
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub product_id: Option<Uuid>,
    pub quantity: Option<i64>,
}

async fn create_order(
    State(state): State<AppState>,
    principal: Principal,
    AppJson(req): AppJson<CreateOrderRequest>,
) -> Result<Response> {
    let product_id = req
        .product_id
        .ok_or_else(|| BazaarError::validation("Product id is required"))?;
    let quantity = validate::quantity(req.quantity.unwrap_or(0))?;

    let product = state
        .store
        .product(product_id)
        .await?
        .ok_or_else(|| BazaarError::not_found("Product"))?;
    if !product.instock {
        return Err(BazaarError::validation("Product is out of stock"));
    }

    let total = Order::compute_total(product.price, product.discount, quantity);
    let order = Order::new(principal.id, product_id, quantity, total);
    state.store.insert_order(&order).await?;

    envelope::resource_with_message(
        StatusCode::CREATED,
        "Order placed successfully",
        "order",
        &order,
    )
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderRequest {
    pub quantity: Option<i64>,
    pub status: Option<String>,
}

async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    principal: Principal,
    AppJson(req): AppJson<UpdateOrderRequest>,
) -> Result<Response> {
    let mut order = state
        .store
        .order(id)
        .await?
        .ok_or_else(|| BazaarError::not_found("Order"))?;

    scope::check_order_write(state.store.as_ref(), &principal, &order).await?;

    if let Some(quantity) = req.quantity {
        let quantity = validate::quantity(quantity)?;
        // Re-derive the total from the product's current price.
        let product = state
            .store
            .product(order.product_id)
            .await?
            .ok_or_else(|| BazaarError::not_found("Product"))?;
        order.quantity = quantity;
        order.total_amount = Order::compute_total(product.price, product.discount, quantity);
    }
    if let Some(raw) = req.status.as_deref() {
        order.status = OrderStatus::parse(raw)
            .ok_or_else(|| BazaarError::validation("Invalid order status"))?;
    }

    order.touch();
    state.store.update_order(&order).await?;

    envelope::resource_with_message(StatusCode::OK, "Order updated successfully", "order", &order)
}

async fn delete_order(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Response> {
    if !state.store.delete_order(id).await? {
        return Err(BazaarError::not_found("Order"));
    }
    Ok(envelope::message("Order deleted successfully"))
}
