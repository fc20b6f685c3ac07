//! Classifier capability and the logistic regression artifact

use crate::error::ModelError;
use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Opaque pre-trained binary classifier.
///
/// Implementations return `[p_no_default, p_default]` for one scaled feature
/// vector. Missing features arrive as `NaN`.
pub trait Classifier: Send + Sync {
    /// Model name for logs and health output
    fn name(&self) -> &str;

    /// Number of features the model was trained on, when the artifact declares it
    fn feature_count(&self) -> Option<usize>;

    /// Feature names in training order, when the artifact declares them
    fn feature_names(&self) -> Option<&[String]> {
        None
    }

    /// Class probabilities for one feature vector
    fn predict_proba(&self, features: &[f64]) -> Result<[f64; 2], ModelError>;
}

/// Logistic regression exported as JSON.
///
/// ```json
/// {"name": "logreg", "features": ["DAYS_BIRTH", ...], "coefficients": [...], "intercept": -2.1}
/// ```
///
/// Missing features contribute nothing, which on standardized inputs is
/// imputation by the fitted mean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    #[serde(default = "default_model_name")]
    pub name: String,
    /// Training feature names; empty when the exporter did not record them
    #[serde(default)]
    pub features: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

fn default_model_name() -> String {
    "logistic_regression".to_string()
}

impl LogisticModel {
    /// Load and validate an artifact from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read model artifact {}", path.display()))?;
        let model: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse model artifact {}", path.display()))?;
        model.validate()?;
        Ok(model)
    }

    /// Reject artifacts that cannot produce valid probabilities
    pub fn validate(&self) -> Result<()> {
        ensure!(!self.coefficients.is_empty(), "Model {} has no coefficients", self.name);
        ensure!(
            self.features.is_empty() || self.features.len() == self.coefficients.len(),
            "Model {} declares {} features but {} coefficients",
            self.name,
            self.features.len(),
            self.coefficients.len()
        );
        ensure!(
            self.intercept.is_finite() && self.coefficients.iter().all(|c| c.is_finite()),
            "Model {} has non-finite parameters",
            self.name
        );
        Ok(())
    }

    /// Linear score before the logistic link
    fn decision_function(&self, features: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(features)
            .filter(|(_, x)| !x.is_nan())
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.intercept
    }
}

impl Classifier for LogisticModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn feature_count(&self) -> Option<usize> {
        Some(self.coefficients.len())
    }

    fn feature_names(&self) -> Option<&[String]> {
        if self.features.is_empty() {
            None
        } else {
            Some(&self.features)
        }
    }

    fn predict_proba(&self, features: &[f64]) -> Result<[f64; 2], ModelError> {
        if features.len() != self.coefficients.len() {
            return Err(ModelError::FeatureShapeMismatch {
                expected: self.coefficients.len(),
                found: features.len(),
            });
        }

        let p_default = sigmoid(self.decision_function(features));
        Ok([1.0 - p_default, p_default])
    }
}

/// Logistic function without overflow for large magnitudes
fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}
