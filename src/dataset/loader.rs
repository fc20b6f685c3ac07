//! CSV loader for the client sample

use crate::config::DatasetConfig;
use crate::dataset::schema::{Column, ColumnKind, ColumnSpec, Schema};
use crate::scaler::NumericFrame;
use anyhow::{bail, Context, Result};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// Raw client sample held column-major in load order
#[derive(Debug, Clone)]
pub struct Dataset {
    schema: Schema,
    columns: Vec<Column>,
    id_position: usize,
    ids: Vec<i64>,
}

impl Dataset {
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Number of loaded records
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Client identifiers in load order
    pub fn ids(&self) -> &[i64] {
        &self.ids
    }

    /// Name of the identifier column
    pub fn id_column(&self) -> &str {
        &self.schema.columns()[self.id_position].name
    }

    pub fn column(&self, position: usize) -> &Column {
        &self.columns[position]
    }

    /// Numeric columns other than the identifier, in schema order.
    ///
    /// This is the model's feature layout.
    pub fn feature_frame(&self) -> NumericFrame {
        let mut frame = NumericFrame::with_rows(self.len());
        for (position, (spec, column)) in self.schema.columns().iter().zip(&self.columns).enumerate() {
            if position == self.id_position {
                continue;
            }
            if let Some(values) = column.numeric() {
                frame.push(spec.name.clone(), values);
            }
        }
        frame
    }
}

/// Loader reading the first `sample_size` rows of a CSV file
pub struct DatasetLoader {
    sample_size: usize,
    id_column: String,
}

impl DatasetLoader {
    /// Create a loader from the dataset configuration
    pub fn new(config: &DatasetConfig) -> Self {
        Self {
            sample_size: config.sample_size,
            id_column: config.id_column.clone(),
        }
    }

    /// Create a loader with explicit settings
    pub fn with_settings(sample_size: usize, id_column: &str) -> Self {
        Self {
            sample_size,
            id_column: id_column.to_string(),
        }
    }

    /// Load the dataset from a CSV file
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<Dataset> {
        let path = path.as_ref();

        info!(path = %path.display(), sample_size = self.sample_size, "Loading client dataset");

        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open dataset {}", path.display()))?;

        self.load_reader(file)
            .with_context(|| format!("Failed to load dataset from {}", path.display()))
    }

    /// Load the dataset from any CSV source
    pub fn load_reader<R: Read>(&self, reader: R) -> Result<Dataset> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()
            .context("Failed to read CSV header")?
            .iter()
            .map(|h| h.to_string())
            .collect();

        // pandas writes its row index as an unnamed leading column
        let skip_index = headers.first().is_some_and(|h| h.is_empty() || h.starts_with("Unnamed: "));
        let names: Vec<String> = headers.iter().skip(usize::from(skip_index)).cloned().collect();

        let mut cells: Vec<Vec<String>> = vec![Vec::new(); names.len()];
        for (line, record) in reader.records().take(self.sample_size).enumerate() {
            let record = record.with_context(|| format!("Malformed CSV record {}", line + 1))?;
            for (column, cell) in record.iter().skip(usize::from(skip_index)).enumerate() {
                cells[column].push(cell.to_string());
            }
        }

        let mut specs = Vec::with_capacity(names.len());
        let mut columns = Vec::with_capacity(names.len());
        for (name, column_cells) in names.into_iter().zip(cells) {
            let column = Column::infer(column_cells);
            debug!(column = %name, kind = ?column.kind(), "Inferred column kind");
            specs.push(ColumnSpec {
                name,
                kind: column.kind(),
            });
            columns.push(column);
        }

        let schema = Schema::new(specs);
        let Some(id_position) = schema.position(&self.id_column) else {
            bail!("Identifier column {} not present in dataset", self.id_column);
        };

        let ids = match &columns[id_position] {
            Column::Integer(values) => values
                .iter()
                .copied()
                .enumerate()
                .map(|(row, id)| {
                    id.with_context(|| format!("Missing {} in data row {}", self.id_column, row + 1))
                })
                .collect::<Result<Vec<i64>>>()?,
            other => bail!(
                "Identifier column {} must hold integers, found {:?} cells",
                self.id_column,
                other.kind()
            ),
        };

        let numeric = schema.columns().iter().filter(|c| c.kind.is_numeric()).count();
        let text = schema.columns().iter().filter(|c| c.kind == ColumnKind::Text).count();
        if ids.is_empty() {
            warn!("Dataset contains no records");
        }

        info!(
            rows = ids.len(),
            columns = schema.len(),
            numeric_columns = numeric,
            text_columns = text,
            "Client dataset loaded"
        );

        Ok(Dataset {
            schema,
            columns,
            id_position,
            ids,
        })
    }
}
