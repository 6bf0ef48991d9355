//! HTTP surface: router assembly and per-resource handlers.
//!
//! Assembly pattern: each resource contributes a small router whose routes
//! share a role set, applied with `route_layer(RequireRoleLayer)`. Routers
//! for the same path but different methods merge, so `GET /products` can be
//! public while `POST /products` is seller-only.

mod approvals;
mod auth;
mod customers;
mod deliverers;
mod deliveries;
mod envelope;
mod extract;
mod orders;
mod payments;
mod products;
mod reviews;
mod sellers;
mod users;

pub use extract::AppJson;

use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::db::Store;
use crate::middleware::auth::{AuthLayer, Authenticator};

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub auth: Arc<Authenticator>,
    /// Absent when no recorder is installed (tests).
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        auth: Arc<Authenticator>,
        metrics: Option<PrometheusHandle>,
    ) -> Self {
        Self {
            store,
            auth,
            metrics,
        }
    }
}

/// Build the full application router.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .merge(auth::router())
        .merge(users::router())
        .merge(customers::router())
        .merge(sellers::router())
        .merge(deliverers::router())
        .merge(approvals::router())
        .merge(products::router())
        .merge(orders::router())
        .merge(deliveries::router())
        .merge(reviews::router())
        .merge(payments::router());

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .nest("/api", api)
        .layer(AuthLayer::new(state.auth.clone(), state.store.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => "metrics recorder not installed\n".into_response(),
    }
}
