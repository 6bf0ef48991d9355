//! Payments (`/api/payments`).

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
use crate::models::{Payment, PaymentMethod};
use crate::pagination::OffsetPagination;
use crate::rbac::{Principal, RequireRoleLayer, Role};
use crate::scope;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/payments", get(list_payments))
        .route("/payments/:id", get(get_payment))
        .route_layer(RequireRoleLayer::new(&[
            Role::Admin,
            Role::Customer,
            Role::Seller,
        ]))
        .merge(
            Router::new()
                .route("/payments", post(create_payment))
                .route_layer(RequireRoleLayer::new(&[Role::Customer])),
        )
        .merge(
            Router::new()
                .route("/payments/:id", put(update_payment))
                .route_layer(RequireRoleLayer::new(&[Role::Admin, Role::Customer])),
        )
        .merge(
            Router::new()
                .route("/payments/:id", delete(delete_payment))
                .route_layer(RequireRoleLayer::new(&[Role::Admin])),
        )
}

#[derive(Debug, Default, Deserialize)]
pub struct PaymentListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

async fn list_payments(
    State(state): State<AppState>,
    Query(query): Query<PaymentListQuery>,
    principal: Principal,
) -> Result<Response> {
    let pagination = OffsetPagination::new(
        query.page.unwrap_or(crate::pagination::MIN_PAGE_NUMBER),
        query.limit.unwrap_or(crate::pagination::DEFAULT_PAGE_SIZE),
    );

    let filter = scope::payment_list_filter(state.store.as_ref(), &principal).await?;

    let page = state.store.list_payments(&filter, pagination).await?;
    envelope::list(
        "payments",
        "totalPayments",
        &page.items,
        &pagination.metadata(page.total),
    )
}

async fn get_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    principal: Principal,
) -> Result<Response> {
    let payment = state
        .store
        .payment(id)
        .await?
        .ok_or_else(|| BazaarError::not_found("Payment"))?;

    scope::check_payment_read(state.store.as_ref(), &principal, &payment).await?;
    envelope::resource("payment", &payment)
}

#[derive(Debug, Deserialize)]
pub struct CreatePaymentRequest {
    pub order_id: Option<Uuid>,
    pub payment_method: Option<String>,
}

async fn create_payment(
    State(state): State<AppState>,
    principal: Principal,
    AppJson(req): AppJson<CreatePaymentRequest>,
) -> Result<Response> {
    let order_id = req
        .order_id
        .ok_or_else(|| BazaarError::validation("Order id is required"))?;
    let method = parse_method(req.payment_method.as_deref())?;

    let order = state
        .store
        .order(order_id)
        .await?
        .ok_or_else(|| BazaarError::not_found("Order"))?;
    if order.customer_id != principal.id {
        return Err(BazaarError::forbidden(
            "Not authorized to pay for this order",
        ));
    }

    let payment = Payment::new(principal.id, order_id, method);
    state.store.insert_payment(&payment).await?;

    envelope::resource_with_message(
        StatusCode::CREATED,
        "Payment recorded successfully",
        "payment",
        &payment,
    )
}

#[derive(Debug, Deserialize)]
pub struct UpdatePaymentRequest {
    pub payment_method: Option<String>,
}

async fn update_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    principal: Principal,
    AppJson(req): AppJson<UpdatePaymentRequest>,
) -> Result<Response> {
    let mut payment = state
        .store
        .payment(id)
        .await?
        .ok_or_else(|| BazaarError::not_found("Payment"))?;

    scope::check_payment_write(&principal, &payment)?;

    payment.payment_method = parse_method(req.payment_method.as_deref())?;
    payment.touch();
    state.store.update_payment(&payment).await?;

    envelope::resource_with_message(
        StatusCode::OK,
        "Payment updated successfully",
        "payment",
        &payment,
    )
}

async fn delete_payment(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Response> {
    if !state.store.delete_payment(id).await? {
        return Err(BazaarError::not_found("Payment"));
    }
    Ok(envelope::message("Payment deleted successfully"))
}

fn parse_method(raw: Option<&str>) -> Result<PaymentMethod> {
    let raw = raw.ok_or_else(|| BazaarError::validation("Payment method is required"))?;
    PaymentMethod::parse(raw).ok_or_else(|| BazaarError::validation("Invalid payment method"))
}
