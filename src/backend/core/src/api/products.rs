//! Product catalog (`/api/products`).
//!
//! Reads are public. An authenticated seller browsing the catalog sees only
//! their own products; everyone else sees everything.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use uuid::Uuid;

use super::{envelope, AppJson, AppState};
use crate::error::{BazaarError, Result};
use crate::middleware::auth::OptionalPrincipal;
use crate::models::{validate, Product};
use crate::pagination::OffsetPagination;
use crate::rbac::{Principal, RequireRoleLayer, Role};
use crate::scope;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/:id", get(get_product))
        .merge(
            Router::new()
                .route("/products", post(create_product))
                .route_layer(RequireRoleLayer::new(&[Role::Seller])),
        )
        .merge(
            Router::new()
                .route("/products/:id", put(update_product).delete(delete_product))
                .route_layer(RequireRoleLayer::new(&[Role::Admin, Role::Seller])),
        )
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub name: Option<String>,
    pub instock: Option<bool>,
}

async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
    OptionalPrincipal(principal): OptionalPrincipal,
) -> Result<Response> {
    let pagination = OffsetPagination::new(
        query.page.unwrap_or(crate::pagination::MIN_PAGE_NUMBER),
        query.limit.unwrap_or(crate::pagination::DEFAULT_PAGE_SIZE),
    );

    let mut filter = scope::product_list_filter(principal.as_ref());
    filter.name = query.name;
    filter.instock = query.instock;

    let page = state.store.list_products(&filter, pagination).await?;
    envelope::list(
        "products",
        "totalProducts",
        &page.items,
        &pagination.metadata(page.total),
    )
}

async fn get_product(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Response> {
    let product = state
        .store
        .product(id)
        .await?
        .ok_or_else(|| BazaarError::not_found("Product"))?;
    envelope::resource("product", &product)
}

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub discount: Option<f64>,
    pub instock: Option<bool>,
}

async fn create_product(
    State(state): State<AppState>,
    principal: Principal,
    AppJson(req): AppJson<CreateProductRequest>,
) -> Result<Response> {
    let name = validate::required(req.name.as_deref(), "Product name is required")?.to_string();
    let description =
        validate::required(req.description.as_deref(), "Description is required")?.to_string();
    let price = validate::price(
        req.price
            .ok_or_else(|| BazaarError::validation("Price is required"))?,
    )?;
    let discount = validate::discount(req.discount.unwrap_or(0.0))?;

    // The creating seller always owns the product.
    let mut product = Product::new(name, description, price, discount, principal.id);
    if let Some(instock) = req.instock {
        product.instock = instock;
    }
    state.store.insert_product(&product).await?;

    envelope::resource_with_message(
        StatusCode::CREATED,
        "Product created successfully",
        "product",
        &product,
    )
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub discount: Option<f64>,
    pub instock: Option<bool>,
}

async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    principal: Principal,
    AppJson(req): AppJson<UpdateProductRequest>,
) -> Result<Response> {
    let mut product = state
        .store
        .product(id)
        .await?
        .ok_or_else(|| BazaarError::not_found("Product"))?;

    scope::check_product_write(&principal, &product)?;

    if let Some(name) = req.name {
        product.name = name;
    }
    if let Some(description) = req.description {
        product.description = description;
    }
    if let Some(price) = req.price {
        product.price = validate::price(price)?;
    }
    if let Some(discount) = req.discount {
        product.discount = validate::discount(discount)?;
    }
    if let Some(instock) = req.instock {
        product.instock = instock;
    }

    product.touch();
    state.store.update_product(&product).await?;

    envelope::resource_with_message(
        StatusCode::OK,
        "Product updated successfully",
        "product",
        &product,
    )
}

async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    principal: Principal,
) -> Result<Response> {
    let product = state
        .store
        .product(id)
        .await?
        .ok_or_else(|| BazaarError::not_found("Product"))?;

    scope::check_product_write(&principal, &product)?;

    state.store.delete_product(id).await?;
    Ok(envelope::message("Product deleted successfully"))
}
