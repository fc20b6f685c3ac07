//! Column schema and typed column storage for the client dataset

use crate::error::QueryError;
use serde::Serialize;
use std::collections::HashMap;

/// Storage type of a column, inferred from its cells at load time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Integer,
    Float,
    Text,
}

impl ColumnKind {
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnKind::Integer | ColumnKind::Float)
    }
}

/// Name and kind of one column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSpec {
    pub name: String,
    pub kind: ColumnKind,
}

/// Ordered column schema with name lookup
#[derive(Debug, Clone, Default)]
pub struct Schema {
    columns: Vec<ColumnSpec>,
    index: HashMap<String, usize>,
}

impl Schema {
    /// Build a schema; later duplicates of a name are unreachable by name
    pub fn new(columns: Vec<ColumnSpec>) -> Self {
        let mut index = HashMap::with_capacity(columns.len());
        for (position, spec) in columns.iter().enumerate() {
            index.entry(spec.name.clone()).or_insert(position);
        }
        Self { columns, index }
    }

    /// Position of a column by name
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Resolve a column by name, failing with `UnknownColumn`
    pub fn resolve(&self, name: &str) -> Result<(usize, &ColumnSpec), QueryError> {
        self.position(name)
            .map(|position| (position, &self.columns[position]))
            .ok_or_else(|| QueryError::UnknownColumn(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// One cell value as served to clients; missing cells serialize as `null`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Text(String),
    Missing,
}

impl Value {
    /// Numeric view of the cell, `None` for text and missing cells
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            Value::Text(_) | Value::Missing => None,
        }
    }
}

/// Column-major cell storage
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Integer(Vec<Option<i64>>),
    Float(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

impl Column {
    /// Infer the narrowest kind that fits every present cell and build the column.
    ///
    /// Integer if every present cell parses as `i64`, else float if every
    /// present cell parses as `f64`, else text. Empty cells and `NaN`/`NA`
    /// markers are missing.
    pub fn infer(cells: Vec<String>) -> Self {
        let present = || cells.iter().filter(|cell| !is_missing(cell));

        if present().all(|cell| cell.trim().parse::<i64>().is_ok()) {
            return Column::Integer(
                cells
                    .iter()
                    .map(|cell| cell.trim().parse::<i64>().ok())
                    .collect(),
            );
        }

        if present().all(|cell| cell.trim().parse::<f64>().is_ok_and(f64::is_finite)) {
            return Column::Float(
                cells
                    .iter()
                    .map(|cell| {
                        if is_missing(cell) {
                            None
                        } else {
                            cell.trim().parse::<f64>().ok()
                        }
                    })
                    .collect(),
            );
        }

        Column::Text(
            cells
                .into_iter()
                .map(|cell| if is_missing(&cell) { None } else { Some(cell) })
                .collect(),
        )
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            Column::Integer(_) => ColumnKind::Integer,
            Column::Float(_) => ColumnKind::Float,
            Column::Text(_) => ColumnKind::Text,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Integer(values) => values.len(),
            Column::Float(values) => values.len(),
            Column::Text(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cell at `row`
    pub fn value(&self, row: usize) -> Value {
        match self {
            Column::Integer(values) => values[row].map_or(Value::Missing, Value::Integer),
            Column::Float(values) => values[row].map_or(Value::Missing, Value::Float),
            Column::Text(values) => values[row]
                .as_ref()
                .map_or(Value::Missing, |text| Value::Text(text.clone())),
        }
    }

    /// All cells in row order
    pub fn values(&self) -> Vec<Value> {
        (0..self.len()).map(|row| self.value(row)).collect()
    }

    /// Numeric view of the column, `None` for a text column
    pub fn numeric(&self) -> Option<Vec<Option<f64>>> {
        match self {
            Column::Integer(values) => Some(values.iter().map(|v| v.map(|v| v as f64)).collect()),
            Column::Float(values) => Some(values.clone()),
            Column::Text(_) => None,
        }
    }
}

fn is_missing(cell: &str) -> bool {
    matches!(
        cell.trim(),
        "" | "NaN" | "nan" | "NA" | "N/A" | "null" | "None"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_infer_kinds() {
        assert_eq!(Column::infer(cells(&["1", "-2", ""])).kind(), ColumnKind::Integer);
        assert_eq!(Column::infer(cells(&["1", "2.5", "NaN"])).kind(), ColumnKind::Float);
        assert_eq!(Column::infer(cells(&["Cash loans", "1"])).kind(), ColumnKind::Text);
        assert_eq!(Column::infer(cells(&["", ""])).kind(), ColumnKind::Integer);
    }

    #[test]
    fn test_missing_cells() {
        let column = Column::infer(cells(&["1.5", "", "nan"]));
        assert_eq!(column.value(0), Value::Float(1.5));
        assert_eq!(column.value(1), Value::Missing);
        assert_eq!(column.value(2), Value::Missing);
        assert_eq!(column.numeric().unwrap(), vec![Some(1.5), None, None]);
    }

    #[test]
    fn test_text_column_has_no_numeric_view() {
        let column = Column::infer(cells(&["M", "F", ""]));
        assert!(column.numeric().is_none());
        assert_eq!(column.value(2), Value::Missing);
    }

    #[test]
    fn test_value_serialization() {
        let values = vec![
            Value::Integer(-9461),
            Value::Float(202500.0),
            Value::Text("M".into()),
            Value::Missing,
        ];
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(json, r#"[-9461,202500.0,"M",null]"#);
    }

    #[test]
    fn test_schema_resolve() {
        let schema = Schema::new(vec![
            ColumnSpec {
                name: "SK_ID_CURR".into(),
                kind: ColumnKind::Integer,
            },
            ColumnSpec {
                name: "AMT_CREDIT".into(),
                kind: ColumnKind::Float,
            },
        ]);

        assert_eq!(schema.resolve("AMT_CREDIT").unwrap().0, 1);
        assert_eq!(
            schema.resolve("amt_credit").unwrap_err(),
            QueryError::UnknownColumn("amt_credit".into())
        );
        assert!(schema.contains("SK_ID_CURR"));
        assert_eq!(schema.len(), 2);
    }
}
