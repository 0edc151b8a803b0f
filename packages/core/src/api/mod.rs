//! HTTP surface: the water read path, health and Prometheus metrics.

pub mod health;
pub mod metrics;
pub mod water;

use std::sync::Arc;

use axum::{middleware, routing::get, Router};
use tower_http::cors::CorsLayer;

use crate::metrics::AppMetrics;
use crate::scheduler::SharedStore;

/// Shared state for every route.
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub metrics: Arc<AppMetrics>,
}

/// Assemble the full router.
pub fn create_router(state: AppState) -> Router {
    let request_metrics = state.metrics.clone();

    Router::new()
        .route("/water", get(water::water))
        .route("/health", get(health::health))
        .route("/metrics", get(metrics::metrics))
        .with_state(state)
        .layer(middleware::from_fn_with_state(
            request_metrics,
            metrics::track_requests,
        ))
        .layer(CorsLayer::permissive())
}
