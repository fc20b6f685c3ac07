//! Standardization of numeric features.
//!
//! The scaler is fitted once over the loaded sample and frozen. Each column is
//! transformed as `(value - mean) / std` with the population standard
//! deviation. A column whose variance is zero keeps a standard deviation of
//! 1.0, so it is centred but never divided by zero. Missing cells do not
//! contribute to the fit and stay missing after the transform.

use crate::error::ScalerError;
use serde::Serialize;

/// Named numeric columns of equal length
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumericFrame {
    names: Vec<String>,
    columns: Vec<Vec<Option<f64>>>,
    rows: usize,
}

impl NumericFrame {
    /// Create an empty frame for `rows` records
    pub fn with_rows(rows: usize) -> Self {
        Self {
            names: Vec::new(),
            columns: Vec::new(),
            rows,
        }
    }

    /// Append a column; its length must equal the frame's row count
    pub fn push(&mut self, name: String, values: Vec<Option<f64>>) {
        debug_assert_eq!(
            values.len(),
            self.rows,
            "column {name} has {} rows, frame has {}",
            values.len(),
            self.rows
        );
        self.names.push(name);
        self.columns.push(values);
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn columns(&self) -> &[Vec<Option<f64>>] {
        &self.columns
    }

    /// Column by name
    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.columns[i].as_slice())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn width(&self) -> usize {
        self.names.len()
    }

    /// One row across all columns, `NaN` for missing cells
    pub fn row(&self, row: usize) -> Vec<f64> {
        self.columns
            .iter()
            .map(|column| column[row].unwrap_or(f64::NAN))
            .collect()
    }
}

/// Per-column statistics frozen at fit time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStats {
    pub name: String,
    pub mean: f64,
    pub std: f64,
}

/// Frozen standardization transform
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandardScaler {
    stats: Vec<ColumnStats>,
}

impl StandardScaler {
    /// Fit mean and standard deviation of every column in the frame.
    pub fn fit(frame: &NumericFrame) -> Self {
        let stats = frame
            .names()
            .iter()
            .zip(frame.columns())
            .map(|(name, values)| {
                let (mean, std) = column_moments(values);
                ColumnStats {
                    name: name.clone(),
                    mean,
                    std,
                }
            })
            .collect();

        Self { stats }
    }

    /// Apply the frozen transform; the frame must carry the fitted columns in order.
    pub fn transform(&self, frame: &NumericFrame) -> Result<NumericFrame, ScalerError> {
        let same_schema = frame.width() == self.stats.len()
            && frame.names().iter().zip(&self.stats).all(|(name, s)| *name == s.name);
        if !same_schema {
            return Err(ScalerError::SchemaMismatch {
                expected: self.feature_names(),
                found: frame.names().to_vec(),
            });
        }

        let mut scaled = NumericFrame::with_rows(frame.rows());
        for (stats, values) in self.stats.iter().zip(frame.columns()) {
            let column = values
                .iter()
                .map(|v| v.map(|v| (v - stats.mean) / stats.std))
                .collect();
            scaled.push(stats.name.clone(), column);
        }
        Ok(scaled)
    }

    /// Fitted column names in order
    pub fn feature_names(&self) -> Vec<String> {
        self.stats.iter().map(|s| s.name.clone()).collect()
    }

    pub fn stats(&self) -> &[ColumnStats] {
        &self.stats
    }

    /// Statistics of one fitted column
    pub fn column_stats(&self, name: &str) -> Option<&ColumnStats> {
        self.stats.iter().find(|s| s.name == name)
    }
}

/// Mean and population standard deviation over present cells.
fn column_moments(values: &[Option<f64>]) -> (f64, f64) {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        return (0.0, 1.0);
    }

    let n = present.len() as f64;
    let mean = present.iter().sum::<f64>() / n;
    let variance = present.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / n;
    let std = variance.sqrt();

    // Near-constant columns only accumulate rounding noise in the variance
    let floor = 10.0 * f64::EPSILON * mean.abs().max(1.0);
    if std.is_finite() && std > floor {
        (mean, std)
    } else {
        (mean, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(columns: &[(&str, Vec<Option<f64>>)]) -> NumericFrame {
        let rows = columns.first().map_or(0, |(_, v)| v.len());
        let mut frame = NumericFrame::with_rows(rows);
        for (name, values) in columns {
            frame.push(name.to_string(), values.clone());
        }
        frame
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "column short has 1 rows, frame has 2")]
    fn test_push_ragged_column_caught_in_debug() {
        let mut frame = NumericFrame::with_rows(2);
        frame.push("short".to_string(), vec![Some(1.0)]);
    }

    fn present(values: &[Option<f64>]) -> Vec<f64> {
        values.iter().flatten().copied().collect()
    }

    #[test]
    fn test_scaled_column_has_zero_mean_unit_std() {
        let raw = frame(&[(
            "AMT_CREDIT",
            vec![Some(406597.5), Some(1293502.5), Some(135000.0), Some(312682.5), Some(513000.0)],
        )]);
        let scaler = StandardScaler::fit(&raw);
        let scaled = scaler.transform(&raw).unwrap();

        let values = present(&scaled.columns()[0]);
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let std = (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();

        assert!(mean.abs() < 1e-9);
        assert!((std - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_variance_column_is_centred_only() {
        let raw = frame(&[("FLAG_MOBIL", vec![Some(1.0), Some(1.0), Some(1.0)])]);
        let scaler = StandardScaler::fit(&raw);

        let stats = scaler.column_stats("FLAG_MOBIL").unwrap();
        assert_eq!(stats.mean, 1.0);
        assert_eq!(stats.std, 1.0);

        let scaled = scaler.transform(&raw).unwrap();
        assert_eq!(scaled.columns()[0], vec![Some(0.0), Some(0.0), Some(0.0)]);
    }

    #[test]
    fn test_missing_cells_are_ignored_and_preserved() {
        let raw = frame(&[("EXT_SOURCE_1", vec![Some(1.0), None, Some(3.0)])]);
        let scaler = StandardScaler::fit(&raw);

        let stats = scaler.column_stats("EXT_SOURCE_1").unwrap();
        assert_eq!(stats.mean, 2.0);
        assert_eq!(stats.std, 1.0);

        let scaled = scaler.transform(&raw).unwrap();
        assert_eq!(scaled.columns()[0], vec![Some(-1.0), None, Some(1.0)]);
        assert!(scaled.row(1)[0].is_nan());
    }

    #[test]
    fn test_all_missing_column() {
        let raw = frame(&[("OWN_CAR_AGE", vec![None, None])]);
        let scaler = StandardScaler::fit(&raw);
        let stats = scaler.column_stats("OWN_CAR_AGE").unwrap();
        assert_eq!((stats.mean, stats.std), (0.0, 1.0));
    }

    #[test]
    fn test_transform_is_frozen() {
        let fit_on = frame(&[("X", vec![Some(0.0), Some(2.0)])]);
        let scaler = StandardScaler::fit(&fit_on);

        let other = frame(&[("X", vec![Some(4.0)])]);
        let scaled = scaler.transform(&other).unwrap();
        assert_eq!(scaled.columns()[0], vec![Some(3.0)]);
        assert_eq!(scaler, StandardScaler::fit(&fit_on));
    }

    #[test]
    fn test_schema_mismatch() {
        let fit_on = frame(&[("A", vec![Some(1.0)]), ("B", vec![Some(2.0)])]);
        let scaler = StandardScaler::fit(&fit_on);

        let reordered = frame(&[("B", vec![Some(2.0)]), ("A", vec![Some(1.0)])]);
        assert!(matches!(
            scaler.transform(&reordered),
            Err(ScalerError::SchemaMismatch { .. })
        ));

        let narrower = frame(&[("A", vec![Some(1.0)])]);
        assert!(scaler.transform(&narrower).is_err());
    }

    #[test]
    fn test_row_view() {
        let raw = frame(&[("A", vec![Some(1.0), Some(2.0)]), ("B", vec![None, Some(5.0)])]);
        assert_eq!(raw.row(1), vec![2.0, 5.0]);
        assert_eq!(raw.column("B"), Some(&[None, Some(5.0)][..]));
    }
}
