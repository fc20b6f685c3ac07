//! Read-only client store: raw and scaled views sharing row order.

use crate::dataset::loader::Dataset;
use crate::dataset::schema::{Schema, Value};
use crate::error::{QueryError, ScalerError};
use crate::scaler::StandardScaler;
use std::collections::HashMap;
use tracing::{error, warn};

/// Rows matching one identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowMatch {
    Unique(usize),
    Duplicated(usize),
}

/// Borrowed view of one raw record
#[derive(Debug, Clone, Copy)]
pub struct ClientRecord<'a> {
    dataset: &'a Dataset,
    row: usize,
}

impl<'a> ClientRecord<'a> {
    /// Client identifier
    pub fn id(&self) -> i64 {
        self.dataset.ids()[self.row]
    }

    /// Cell of the named column
    pub fn value(&self, name: &str) -> Result<Value, QueryError> {
        let (position, _) = self.dataset.schema().resolve(name)?;
        Ok(self.dataset.column(position).value(self.row))
    }

    /// Numeric cell of the named column, `None` when missing or text
    pub fn number(&self, name: &str) -> Result<Option<f64>, QueryError> {
        Ok(self.value(name)?.as_f64())
    }
}

/// Immutable in-memory client store built once at startup
pub struct ClientStore {
    raw: Dataset,
    index: HashMap<i64, RowMatch>,
    feature_names: Vec<String>,
    /// Row-major scaled features, `NaN` for missing cells
    scaled: Vec<Vec<f64>>,
    scaler: StandardScaler,
}

impl ClientStore {
    /// Build both views; the scaler must have been fitted on this dataset's feature layout
    pub fn new(raw: Dataset, scaler: StandardScaler) -> Result<Self, ScalerError> {
        let scaled_frame = scaler.transform(&raw.feature_frame())?;
        let scaled = (0..scaled_frame.rows()).map(|row| scaled_frame.row(row)).collect();

        let mut index: HashMap<i64, RowMatch> = HashMap::with_capacity(raw.len());
        for (row, &id) in raw.ids().iter().enumerate() {
            index
                .entry(id)
                .and_modify(|m| {
                    *m = match *m {
                        RowMatch::Unique(_) => RowMatch::Duplicated(2),
                        RowMatch::Duplicated(n) => RowMatch::Duplicated(n + 1),
                    }
                })
                .or_insert(RowMatch::Unique(row));
        }

        let duplicated = index
            .values()
            .filter(|m| matches!(m, RowMatch::Duplicated(_)))
            .count();
        if duplicated > 0 {
            warn!(
                identifiers = duplicated,
                id_column = %raw.id_column(),
                "Dataset contains duplicated client identifiers; lookups on them will fail"
            );
        }

        Ok(Self {
            feature_names: scaled_frame.names().to_vec(),
            raw,
            index,
            scaled,
            scaler,
        })
    }

    /// Fit the scaler on the dataset and build the store
    pub fn fit(raw: Dataset) -> Result<Self, ScalerError> {
        let scaler = StandardScaler::fit(&raw.feature_frame());
        Self::new(raw, scaler)
    }

    /// All identifiers in load order
    pub fn list_identifiers(&self) -> &[i64] {
        self.raw.ids()
    }

    /// Raw record for `id`
    pub fn get_client(&self, id: i64) -> Result<ClientRecord<'_>, QueryError> {
        let row = self.locate(id)?;
        Ok(ClientRecord {
            dataset: &self.raw,
            row,
        })
    }

    /// Raw values of a column across all records
    pub fn get_column(&self, name: &str) -> Result<Vec<Value>, QueryError> {
        let (position, _) = self.raw.schema().resolve(name)?;
        Ok(self.raw.column(position).values())
    }

    /// Scaled feature vector for `id`, in `feature_names` order
    pub fn get_scaled_features(&self, id: i64) -> Result<&[f64], QueryError> {
        let row = self.locate(id)?;
        self.scaled
            .get(row)
            .map(Vec::as_slice)
            .ok_or_else(|| QueryError::PredictionUnavailable {
                id,
                reason: "no scaled row for client".to_string(),
            })
    }

    pub fn schema(&self) -> &Schema {
        self.raw.schema()
    }

    /// Model feature layout
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    fn locate(&self, id: i64) -> Result<usize, QueryError> {
        match self.index.get(&id) {
            Some(RowMatch::Unique(row)) => Ok(*row),
            Some(RowMatch::Duplicated(matches)) => {
                error!(client_id = id, matches = *matches, "Duplicated client identifier");
                Err(QueryError::DataIntegrityFault {
                    id,
                    matches: *matches,
                })
            }
            None => Err(QueryError::ClientNotFound(id)),
        }
    }
}
