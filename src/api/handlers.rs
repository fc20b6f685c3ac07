//! Axum handlers: one query operation per request

use crate::api::error::ApiError;
use crate::context::SharedContext;
use crate::dataset::Value;
use crate::metrics::{MetricsSnapshot, Operation, Outcome};
use crate::models::PredictionResult;
use crate::service::WELCOME_MESSAGE;
use crate::types::ClientInfo;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

#[derive(Debug, Deserialize)]
pub struct ClientParams {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct ColumnParams {
    pub col: String,
}

#[derive(Debug, Deserialize)]
pub struct PredictParams {
    pub id_client: i64,
}

/// Readiness payload
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub clients: usize,
    pub columns: usize,
    pub features: usize,
    pub model: String,
}

/// GET /: welcome message
pub async fn welcome() -> Json<&'static str> {
    Json(WELCOME_MESSAGE)
}

/// GET /client_list: all client identifiers
pub async fn client_list(State(ctx): State<SharedContext>) -> Json<Vec<i64>> {
    let started = Instant::now();
    let ids = ctx.list_clients().to_vec();
    ctx.metrics()
        .record_request(Operation::ListClients, Outcome::Success, started.elapsed());
    Json(ids)
}

/// GET /client?id=: age, income, credit and annuity of one client
pub async fn client(
    State(ctx): State<SharedContext>,
    params: Result<Query<ClientParams>, QueryRejection>,
) -> Result<Json<ClientInfo>, ApiError> {
    let started = Instant::now();
    let result = params
        .map_err(ApiError::from)
        .and_then(|Query(params)| ctx.client_info(params.id).map_err(ApiError::from));
    observe(&ctx, Operation::ClientInfo, started, result).map(Json)
}

/// GET /data?col=: raw values of one column across all clients
pub async fn data(
    State(ctx): State<SharedContext>,
    params: Result<Query<ColumnParams>, QueryRejection>,
) -> Result<Json<Vec<Value>>, ApiError> {
    let started = Instant::now();
    let result = params
        .map_err(ApiError::from)
        .and_then(|Query(params)| ctx.column_values(&params.col).map_err(ApiError::from));
    observe(&ctx, Operation::ColumnValues, started, result).map(Json)
}

/// GET /predict_default?id_client=: default probability pair of one client
pub async fn predict_default(
    State(ctx): State<SharedContext>,
    params: Result<Query<PredictParams>, QueryRejection>,
) -> Result<Json<PredictionResult>, ApiError> {
    let started = Instant::now();
    let result = params
        .map_err(ApiError::from)
        .and_then(|Query(params)| ctx.predict_default(params.id_client).map_err(ApiError::from));
    observe(&ctx, Operation::PredictDefault, started, result).map(Json)
}

/// GET /health
pub async fn health(State(ctx): State<SharedContext>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        clients: ctx.store().len(),
        columns: ctx.store().schema().len(),
        features: ctx.engine().feature_count(),
        model: ctx.engine().model_name().to_string(),
    })
}

/// GET /metrics
pub async fn metrics(State(ctx): State<SharedContext>) -> Json<MetricsSnapshot> {
    Json(ctx.metrics().snapshot())
}

fn observe<T>(
    ctx: &SharedContext,
    operation: Operation,
    started: Instant,
    result: Result<T, ApiError>,
) -> Result<T, ApiError> {
    let outcome = match &result {
        Ok(_) => Outcome::Success,
        Err(err) => {
            debug!(operation = operation.as_str(), error = ?err, "Request failed");
            err.outcome()
        }
    };
    ctx.metrics()
        .record_request(operation, outcome, started.elapsed());
    result
}
