//! Customer profiles (`/api/customers`).

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    routing::get,
    Router,
};
use serde::Deserialize;
use uuid::Uuid;

use super::{envelope, AppJson, AppState};
use crate::db::AccountFilter;
use crate::error::{BazaarError, Result};
use crate::models::validate;
use crate::pagination::OffsetPagination;
use crate::rbac::{Principal, RequireRoleLayer, Role};
use crate::scope;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/customers", get(list_customers))
        .route_layer(RequireRoleLayer::new(&[Role::Admin]))
        .merge(
            Router::new()
                .route(
                    "/customers/:id",
                    get(get_customer)
                        .put(update_customer)
                        .delete(delete_customer),
                )
                .route_layer(RequireRoleLayer::new(&[Role::Admin, Role::Customer])),
        )
}

#[derive(Debug, Default, Deserialize)]
pub struct CustomerListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub name: Option<String>,
    pub email: Option<String>,
}

async fn list_customers(
    State(state): State<AppState>,
    Query(query): Query<CustomerListQuery>,
) -> Result<Response> {
    let pagination = OffsetPagination::new(
        query.page.unwrap_or(crate::pagination::MIN_PAGE_NUMBER),
        query.limit.unwrap_or(crate::pagination::DEFAULT_PAGE_SIZE),
    );
    let filter = AccountFilter {
        name: query.name,
        email: query.email,
        ..Default::default()
    };

    let page = state.store.list_customers(&filter, pagination).await?;
    envelope::list(
        "customers",
        "totalCustomers",
        &page.items,
        &pagination.metadata(page.total),
    )
}

async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    principal: Principal,
) -> Result<Response> {
    scope::require_self_or_admin(&principal, id)?;

    let customer = state
        .store
        .customer(id)
        .await?
        .ok_or_else(|| BazaarError::not_found("Customer"))?;
    envelope::resource("customer", &customer)
}

#[derive(Debug, Deserialize)]
pub struct UpdateCustomerRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone_no: Option<String>,
    pub address: Option<String>,
    pub is_active: Option<bool>,
    /// Present only to be rejected.
    pub password: Option<serde_json::Value>,
}

async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    principal: Principal,
    AppJson(req): AppJson<UpdateCustomerRequest>,
) -> Result<Response> {
    scope::require_self_or_admin(&principal, id)?;

    if req.password.is_some() {
        return Err(BazaarError::validation(
            "Password cannot be updated through this route",
        ));
    }
    // Customers cannot deactivate or reactivate themselves.
    if req.is_active.is_some() && principal.role != Role::Admin {
        return Err(BazaarError::validation(
            "Account status cannot be updated through this route",
        ));
    }

    let mut customer = state
        .store
        .customer(id)
        .await?
        .ok_or_else(|| BazaarError::not_found("Customer"))?;

    if let Some(name) = req.name.as_deref() {
        customer.name = validate::name(name)?;
    }
    if let Some(email) = req.email.as_deref() {
        let email = validate::email(email)?;
        if state
            .store
            .customer_by_email(&email, Some(id))
            .await?
            .is_some()
        {
            return Err(BazaarError::conflict("Email already registered"));
        }
        customer.email = email;
    }
    if let Some(phone_no) = req.phone_no.as_deref() {
        customer.phone_no = validate::phone_no(phone_no)?;
    }
    if let Some(address) = req.address {
        customer.address = address;
    }
    if let Some(is_active) = req.is_active {
        customer.is_active = is_active;
    }

    customer.touch();
    state.store.update_customer(&customer).await?;

    envelope::resource_with_message(
        StatusCode::OK,
        "Customer updated successfully",
        "customer",
        &customer,
    )
}

async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    principal: Principal,
) -> Result<Response> {
    scope::require_self_or_admin(&principal, id)?;

    if !state.store.delete_customer(id).await? {
        return Err(BazaarError::not_found("Customer"));
    }
    Ok(envelope::message("Customer deleted successfully"))
}
