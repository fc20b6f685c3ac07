//! HTTP mapping of query failures

use crate::error::QueryError;
use crate::metrics::Outcome;
use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

/// JSON body of every failure response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

/// Failure of one request
#[derive(Debug)]
pub enum ApiError {
    Query(QueryError),
    /// Missing or malformed query string parameter
    BadParameter(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Query(QueryError::ClientNotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Query(QueryError::UnknownColumn(_)) => StatusCode::BAD_REQUEST,
            ApiError::Query(QueryError::DataIntegrityFault { .. }) => StatusCode::CONFLICT,
            ApiError::Query(QueryError::PredictionUnavailable { .. }) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::BadParameter(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Metrics outcome for this failure
    pub fn outcome(&self) -> Outcome {
        match self.status() {
            StatusCode::NOT_FOUND => Outcome::NotFound,
            StatusCode::BAD_REQUEST => Outcome::BadRequest,
            StatusCode::CONFLICT => Outcome::Conflict,
            _ => Outcome::Failed,
        }
    }

    fn body(&self) -> ErrorBody {
        match self {
            ApiError::Query(err) => ErrorBody {
                error: err.kind().to_string(),
                message: err.to_string(),
            },
            ApiError::BadParameter(message) => ErrorBody {
                error: "BadParameter".to_string(),
                message: message.clone(),
            },
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        ApiError::Query(err)
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadParameter(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}
