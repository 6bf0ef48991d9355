//! Reviews (`/api/reviews`).
//!
//! Reads are public; `my_reviews=true` narrows to the authenticated
//! customer's own reviews. One review per order. Writes belong to the
//! authoring customer alone; admins only read.

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
use crate::models::{validate, Review};
use crate::pagination::OffsetPagination;
use crate::rbac::{Principal, RequireRoleLayer, Role};
use crate::scope;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/reviews", get(list_reviews))
        .route("/reviews/:id", get(get_review))
        .merge(
            Router::new()
                .route("/reviews", post(create_review))
                .route_layer(RequireRoleLayer::new(&[Role::Customer])),
        )
        .merge(
            Router::new()
                .route("/reviews/:id", put(update_review).delete(delete_review))
                .route_layer(RequireRoleLayer::new(&[Role::Customer])),
        )
}

#[derive(Debug, Default, Deserialize)]
pub struct ReviewListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub product_id: Option<Uuid>,
    pub order_id: Option<Uuid>,
    pub my_reviews: Option<bool>,
}

async fn list_reviews(
    State(state): State<AppState>,
    Query(query): Query<ReviewListQuery>,
    OptionalPrincipal(principal): OptionalPrincipal,
) -> Result<Response> {
    let pagination = OffsetPagination::new(
        query.page.unwrap_or(crate::pagination::MIN_PAGE_NUMBER),
        query.limit.unwrap_or(crate::pagination::DEFAULT_PAGE_SIZE),
    );

    let mut filter =
        scope::review_list_filter(principal.as_ref(), query.my_reviews.unwrap_or(false));
    filter.product_id = query.product_id;
    filter.order_id = query.order_id;

    let page = state.store.list_reviews(&filter, pagination).await?;
    envelope::list(
        "reviews",
        "totalReviews",
        &page.items,
        &pagination.metadata(page.total),
    )
}

async fn get_review(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Response> {
    let review = state
        .store
        .review(id)
        .await?
        .ok_or_else(|| BazaarError::not_found("Review"))?;
    envelope::resource("review", &review)
}

#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub order_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub rating: Option<i32>,
    pub comment: Option<String>,
}

async fn create_review(
    State(state): State<AppState>,
    principal: Principal,
    AppJson(req): AppJson<CreateReviewRequest>,
) -> Result<Response> {
    let order_id = req
        .order_id
        .ok_or_else(|| BazaarError::validation("Order id is required"))?;
    let rating = validate::rating(
        req.rating
            .ok_or_else(|| BazaarError::validation("Rating is required"))?,
    )?;

    let order = state
        .store
        .order(order_id)
        .await?
        .ok_or_else(|| BazaarError::not_found("Order"))?;
    if order.customer_id != principal.id {
        return Err(BazaarError::forbidden("Not authorized to review this order"));
    }

    let product_id = req.product_id.unwrap_or(order.product_id);
    if product_id != order.product_id {
        return Err(BazaarError::validation("Product does not match the order"));
    }

    if state.store.review_by_order(order_id).await?.is_some() {
        return Err(BazaarError::conflict("Review already exists for this order"));
    }

    let review = Review::new(
        principal.id,
        product_id,
        order_id,
        rating,
        req.comment.unwrap_or_default(),
    );
    state.store.insert_review(&review).await?;

    envelope::resource_with_message(
        StatusCode::CREATED,
        "Review submitted successfully",
        "review",
        &review,
    )
}

#[derive(Debug, Deserialize)]
pub struct UpdateReviewRequest {
    pub rating: Option<i32>,
    pub comment: Option<String>,
}

async fn update_review(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    principal: Principal,
    AppJson(req): AppJson<UpdateReviewRequest>,
) -> Result<Response> {
    let mut review = state
        .store
        .review(id)
        .await?
        .ok_or_else(|| BazaarError::not_found("Review"))?;

    scope::check_review_write(&principal, &review)?;

    if let Some(rating) = req.rating {
        review.rating = validate::rating(rating)?;
    }
    if let Some(comment) = req.comment {
        review.comment = comment;
    }

    review.touch();
    state.store.update_review(&review).await?;

    envelope::resource_with_message(
        StatusCode::OK,
        "Review updated successfully",
        "review",
        &review,
    )
}

async fn delete_review(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    principal: Principal,
) -> Result<Response> {
    let review = state
        .store
        .review(id)
        .await?
        .ok_or_else(|| BazaarError::not_found("Review"))?;

    scope::check_review_write(&principal, &review)?;

    state.store.delete_review(id).await?;
    Ok(envelope::message("Review deleted successfully"))
}
