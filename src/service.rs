//! Query operations over the application context, independent of transport.

use crate::context::AppContext;
use crate::dataset::Value;
use crate::error::QueryError;
use crate::models::PredictionResult;
use crate::types::ClientInfo;
use tracing::warn;

/// Welcome message served at the root
pub const WELCOME_MESSAGE: &str = "Hello world! Welcome to the loan default API!";

impl AppContext {
    /// All client identifiers in load order
    pub fn list_clients(&self) -> &[i64] {
        self.store.list_identifiers()
    }

    /// Age, income, credit and annuity of exactly one client
    pub fn client_info(&self, id: i64) -> Result<ClientInfo, QueryError> {
        let record = self.store.get_client(id)?;
        ClientInfo::from_record(&record)
    }

    /// Raw values of one column across all clients
    pub fn column_values(&self, name: &str) -> Result<Vec<Value>, QueryError> {
        self.store.get_column(name)
    }

    /// Default probability pair of exactly one client
    pub fn predict_default(&self, id: i64) -> Result<PredictionResult, QueryError> {
        let features = self.store.get_scaled_features(id)?;

        let result = self.engine.predict_proba(features).map_err(|e| {
            warn!(client_id = id, error = %e, "Prediction failed");
            QueryError::PredictionUnavailable {
                id,
                reason: e.to_string(),
            }
        })?;

        self.metrics.record_prediction(result.proba_1);
        Ok(result)
    }
}
