//! Admin account management (`/api/users`).

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
use crate::models::{validate, Admin};
use crate::pagination::OffsetPagination;
use crate::rbac::{Principal, RequireRoleLayer, Role};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route_layer(RequireRoleLayer::new(&[Role::Admin]))
}

#[derive(Debug, Default, Deserialize)]
pub struct UserListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub name: Option<String>,
    pub email: Option<String>,
}

async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
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

    let page = state.store.list_admins(&filter, pagination).await?;
    envelope::list(
        "users",
        "totalUsers",
        &page.items,
        &pagination.metadata(page.total),
    )
}

async fn get_user(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Response> {
    let admin = state
        .store
        .admin(id)
        .await?
        .ok_or_else(|| BazaarError::not_found("User"))?;
    envelope::resource("user", &admin)
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

async fn create_user(
    State(state): State<AppState>,
    AppJson(req): AppJson<CreateUserRequest>,
) -> Result<Response> {
    let name = validate::name(validate::required(req.name.as_deref(), "Name is required")?)?;
    let email = validate::email(validate::required(req.email.as_deref(), "Email is required")?)?;
    let password = validate::password(validate::required(
        req.password.as_deref(),
        "Password is required",
    )?)?;

    if state.store.admin_by_email(&email, None).await?.is_some() {
        return Err(BazaarError::conflict("Email already registered"));
    }

    let admin = Admin::new(name, email, super::auth::hash_password(password)?);
    state.store.insert_admin(&admin).await?;

    envelope::resource_with_message(
        StatusCode::CREATED,
        "User created successfully",
        "user",
        &admin,
    )
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub is_active: Option<bool>,
    /// Present only to be rejected.
    pub password: Option<serde_json::Value>,
}

async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(req): AppJson<UpdateUserRequest>,
) -> Result<Response> {
    if req.password.is_some() {
        return Err(BazaarError::validation(
            "Password cannot be updated through this route",
        ));
    }

    let mut admin = state
        .store
        .admin(id)
        .await?
        .ok_or_else(|| BazaarError::not_found("User"))?;

    if let Some(name) = req.name.as_deref() {
        admin.name = validate::name(name)?;
    }
    if let Some(email) = req.email.as_deref() {
        let email = validate::email(email)?;
        if state
            .store
            .admin_by_email(&email, Some(id))
            .await?
            .is_some()
        {
            return Err(BazaarError::conflict("Email already registered"));
        }
        admin.email = email;
    }
    if let Some(is_active) = req.is_active {
        admin.is_active = is_active;
    }

    admin.touch();
    state.store.update_admin(&admin).await?;

    envelope::resource_with_message(StatusCode::OK, "User updated successfully", "user", &admin)
}

async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    principal: Principal,
) -> Result<Response> {
    if principal.is_self(id) {
        return Err(BazaarError::validation("Cannot delete your own account"));
    }

    if !state.store.delete_admin(id).await? {
        return Err(BazaarError::not_found("User"));
    }
    Ok(envelope::message("User deleted successfully"))
}
