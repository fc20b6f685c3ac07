//! Error types shared by the store, scaler, model and query layers.

use thiserror::Error;

/// Request-level failures, each mapped to one HTTP outcome.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    /// No record carries the identifier.
    #[error("client {0} not found")]
    ClientNotFound(i64),

    /// The column name is not part of the dataset schema.
    #[error("unknown column: {0}")]
    UnknownColumn(String),

    /// More than one record carries the identifier.
    #[error("data integrity fault: {matches} records share client id {id}")]
    DataIntegrityFault { id: i64, matches: usize },

    /// The model could not score the client's scaled features.
    #[error("prediction unavailable for client {id}: {reason}")]
    PredictionUnavailable { id: i64, reason: String },
}

impl QueryError {
    /// Stable machine-readable name used in error payloads and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            QueryError::ClientNotFound(_) => "ClientNotFound",
            QueryError::UnknownColumn(_) => "UnknownColumn",
            QueryError::DataIntegrityFault { .. } => "DataIntegrityFault",
            QueryError::PredictionUnavailable { .. } => "PredictionUnavailable",
        }
    }
}

/// Feature scaler contract violations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScalerError {
    #[error("schema mismatch: scaler fitted on {expected:?}, got {found:?}")]
    SchemaMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },
}

/// Prediction engine and model contract violations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("feature shape mismatch: model expects {expected} features, got {found}")]
    FeatureShapeMismatch { expected: usize, found: usize },

    #[error("schema mismatch at feature {position}: model expects {expected}, dataset has {found}")]
    SchemaMismatch {
        position: usize,
        expected: String,
        found: String,
    },

    #[error("invalid probabilities from model: {0}")]
    InvalidProbabilities(String),

    #[error("model runtime error: {0}")]
    Runtime(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_error_kinds() {
        assert_eq!(QueryError::ClientNotFound(1).kind(), "ClientNotFound");
        assert_eq!(QueryError::UnknownColumn("X".into()).kind(), "UnknownColumn");
        assert_eq!(
            QueryError::DataIntegrityFault { id: 1, matches: 2 }.kind(),
            "DataIntegrityFault"
        );
        assert_eq!(
            QueryError::PredictionUnavailable {
                id: 1,
                reason: "x".into()
            }
            .kind(),
            "PredictionUnavailable"
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            QueryError::ClientNotFound(999999999).to_string(),
            "client 999999999 not found"
        );
        assert_eq!(
            ModelError::FeatureShapeMismatch {
                expected: 3,
                found: 2
            }
            .to_string(),
            "feature shape mismatch: model expects 3 features, got 2"
        );
    }
}
