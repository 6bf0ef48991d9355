//! Registration, login, logout.

use argon2::password_hash::{rand_core::OsRng, PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use axum::http::StatusCode;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::{envelope, AppJson, AppState};
use crate::error::{BazaarError, Result};
use crate::models::{validate, Customer, Deliverer, Seller};
use crate::rbac::{Principal, RequireRoleLayer, Role};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/register/customer", post(register_customer))
        .route("/auth/register/seller", post(register_seller))
        .route("/auth/register/deliverer", post(register_deliverer))
        .route("/auth/login", post(login))
        .merge(
            Router::new()
                .route("/auth/logout", post(logout))
                .route_layer(RequireRoleLayer::new(&Role::ALL)),
        )
}

// ═══════════════════════════════════════════════════════════════════════════════
// Password Hashing
// ═══════════════════════════════════════════════════════════════════════════════

pub(super) fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| BazaarError::internal(format!("Password hashing failed: {}", e)))?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Registration
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
pub struct RegisterCustomerRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone_no: Option<String>,
    pub address: Option<String>,
}

async fn register_customer(
    State(state): State<AppState>,
    AppJson(req): AppJson<RegisterCustomerRequest>,
) -> Result<Response> {
    let name = validate::name(validate::required(req.name.as_deref(), "Name is required")?)?;
    let email = validate::email(validate::required(req.email.as_deref(), "Email is required")?)?;
    let password = validate::password(validate::required(
        req.password.as_deref(),
        "Password is required",
    )?)?;
    let phone_no = validate::phone_no(validate::required(
        req.phone_no.as_deref(),
        "Phone number is required",
    )?)?;

    if state.store.customer_by_email(&email, None).await?.is_some() {
        return Err(BazaarError::conflict("Email already registered"));
    }

    let mut customer = Customer::new(name, email, hash_password(password)?, phone_no);
    if let Some(address) = req.address {
        customer.address = address;
    }
    state.store.insert_customer(&customer).await?;

    info!(customer_id = %customer.id, "customer registered");

    let (token, _) = state
        .auth
        .issue_token(customer.id, Role::Customer, &customer.email)?;

    registered_response("Customer registered successfully", "customer", &customer, token)
}

#[derive(Debug, Deserialize)]
pub struct RegisterSellerRequest {
    pub name: Option<String>,
    pub shop_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone_no: Option<String>,
    pub address: Option<String>,
}

async fn register_seller(
    State(state): State<AppState>,
    AppJson(req): AppJson<RegisterSellerRequest>,
) -> Result<Response> {
    let name = validate::name(validate::required(req.name.as_deref(), "Name is required")?)?;
    let shop_name = validate::shop_name(validate::required(
        req.shop_name.as_deref(),
        "Shop name is required",
    )?)?;
    let email = validate::email(validate::required(req.email.as_deref(), "Email is required")?)?;
    let password = validate::password(validate::required(
        req.password.as_deref(),
        "Password is required",
    )?)?;
    let phone_no = validate::phone_no(validate::required(
        req.phone_no.as_deref(),
        "Phone number is required",
    )?)?;
    let address = validate::required(req.address.as_deref(), "Address is required")?.to_string();

    if state.store.seller_by_email(&email, None).await?.is_some() {
        return Err(BazaarError::conflict("Email already registered"));
    }

    // New sellers always start pending, whatever the request says.
    let seller = Seller::new(
        name,
        shop_name,
        email,
        hash_password(password)?,
        phone_no,
        address,
    );
    state.store.insert_seller(&seller).await?;

    info!(seller_id = %seller.id, "seller registered, awaiting approval");

    let (token, _) = state
        .auth
        .issue_token(seller.id, Role::Seller, &seller.email)?;

    registered_response(
        "Seller registered successfully. Your account is pending admin approval.",
        "seller",
        &seller,
        token,
    )
}

#[derive(Debug, Deserialize)]
pub struct RegisterDelivererRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone_no: Option<String>,
    pub vehicle_no: Option<String>,
    pub vehicle_type: Option<String>,
    pub address: Option<String>,
}

async fn register_deliverer(
    State(state): State<AppState>,
    AppJson(req): AppJson<RegisterDelivererRequest>,
) -> Result<Response> {
    let name = validate::name(validate::required(req.name.as_deref(), "Name is required")?)?;
    let email = validate::email(validate::required(req.email.as_deref(), "Email is required")?)?;
    let password = validate::password(validate::required(
        req.password.as_deref(),
        "Password is required",
    )?)?;
    let phone_no = validate::phone_no(validate::required(
        req.phone_no.as_deref(),
        "Phone number is required",
    )?)?;

    if state.store.deliverer_by_email(&email, None).await?.is_some() {
        return Err(BazaarError::conflict("Email already registered"));
    }

    let mut deliverer = Deliverer::new(name, email, hash_password(password)?, phone_no);
    deliverer.vehicle_no = req.vehicle_no;
    deliverer.vehicle_type = req.vehicle_type;
    deliverer.address = req.address;
    state.store.insert_deliverer(&deliverer).await?;

    info!(deliverer_id = %deliverer.id, "deliverer registered, awaiting approval");

    let (token, _) = state
        .auth
        .issue_token(deliverer.id, Role::Deliverer, &deliverer.email)?;

    registered_response(
        "Deliverer registered successfully. Your account is pending admin approval.",
        "deliverer",
        &deliverer,
        token,
    )
}

fn registered_response<T: serde::Serialize>(
    message: &str,
    name: &str,
    account: &T,
    token: String,
) -> Result<Response> {
    let mut body = serde_json::Map::new();
    body.insert("success".to_string(), json!(true));
    body.insert("message".to_string(), json!(message));
    body.insert("token".to_string(), json!(token));
    body.insert(name.to_string(), serde_json::to_value(account)?);

    let mut response = axum::Json(serde_json::Value::Object(body)).into_response();
    *response.status_mut() = StatusCode::CREATED;
    Ok(response)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Login / Logout
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

async fn login(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<Response> {
    let email = validate::email(validate::required(req.email.as_deref(), "Email is required")?)?;
    let password = validate::required(req.password.as_deref(), "Password is required")?;
    let role = req
        .role
        .ok_or_else(|| BazaarError::validation("Role is required"))?;

    // (id, email, hash, is_active, serialized account)
    let account = match role {
        Role::Admin => state
            .store
            .admin_by_email(&email, None)
            .await?
            .map(|a| (a.id, a.email.clone(), a.password_hash.clone(), a.is_active, serde_json::to_value(&a))),
        Role::Customer => state
            .store
            .customer_by_email(&email, None)
            .await?
            .map(|c| (c.id, c.email.clone(), c.password_hash.clone(), c.is_active, serde_json::to_value(&c))),
        Role::Seller => state
            .store
            .seller_by_email(&email, None)
            .await?
            .map(|s| (s.id, s.email.clone(), s.password_hash.clone(), s.is_active, serde_json::to_value(&s))),
        Role::Deliverer => state
            .store
            .deliverer_by_email(&email, None)
            .await?
            .map(|d| (d.id, d.email.clone(), d.password_hash.clone(), d.is_active, serde_json::to_value(&d))),
    };

    let Some((id, account_email, hash, is_active, user)) = account else {
        return Err(BazaarError::unauthenticated("Invalid credentials"));
    };

    if !verify_password(password, &hash) {
        return Err(BazaarError::unauthenticated("Invalid credentials"));
    }

    if !is_active {
        return Err(BazaarError::account_deactivated());
    }

    let (token, _) = state.auth.issue_token(id, role, &account_email)?;

    info!(account_id = %id, %role, "login");

    let mut body = serde_json::Map::new();
    body.insert("success".to_string(), json!(true));
    body.insert("message".to_string(), json!("Login successful"));
    body.insert("token".to_string(), json!(token));
    body.insert("user".to_string(), user?);
    Ok(axum::Json(serde_json::Value::Object(body)).into_response())
}

async fn logout(State(state): State<AppState>, principal: Principal) -> Result<Response> {
    state
        .auth
        .revoke_token(&principal.token_id, principal.token_expires_at);

    info!(account_id = %principal.id, "logout");

    Ok(envelope::message("Logged out successfully"))
}
