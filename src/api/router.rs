//! Axum router: URL paths to handlers

use crate::api::handlers::{client, client_list, data, health, metrics, predict_default, welcome};
use crate::context::SharedContext;
use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

/// Build the full router over an initialized context.
pub fn build_router(ctx: SharedContext) -> Router {
    Router::new()
        .route("/", get(welcome))
        .route("/client_list", get(client_list))
        .route("/client", get(client))
        .route("/data", get(data))
        .route("/predict_default", get(predict_default))
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}
