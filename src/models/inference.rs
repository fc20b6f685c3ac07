//! Prediction engine: calling contract around the opaque classifier

use crate::error::ModelError;
use crate::models::classifier::Classifier;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Tolerance on the probability pair
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// Default probability pair for one client
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Probability of no default
    pub proba_0: f64,
    /// Probability of default
    pub proba_1: f64,
}

impl PredictionResult {
    /// Check the raw model output and build a pair that sums to 1.
    pub fn from_model_output([p0, p1]: [f64; 2]) -> Result<Self, ModelError> {
        let in_range = |p: f64| (-PROBABILITY_TOLERANCE..=1.0 + PROBABILITY_TOLERANCE).contains(&p);

        if !p0.is_finite() || !p1.is_finite() {
            return Err(ModelError::InvalidProbabilities(format!(
                "non-finite output [{}, {}]",
                p0, p1
            )));
        }
        if !in_range(p0) || !in_range(p1) {
            return Err(ModelError::InvalidProbabilities(format!(
                "output [{}, {}] outside [0, 1]",
                p0, p1
            )));
        }
        if (p0 + p1 - 1.0).abs() > PROBABILITY_TOLERANCE {
            return Err(ModelError::InvalidProbabilities(format!(
                "output [{}, {}] sums to {}",
                p0,
                p1,
                p0 + p1
            )));
        }

        let proba_1 = p1.clamp(0.0, 1.0);
        Ok(Self {
            proba_0: 1.0 - proba_1,
            proba_1,
        })
    }
}

/// Engine bound to one classifier and the dataset's feature layout
pub struct PredictionEngine {
    classifier: Arc<dyn Classifier>,
    feature_count: usize,
}

impl PredictionEngine {
    /// Bind the classifier to the feature layout of the scaled view.
    ///
    /// Fails when the model declares a different feature count or, when it
    /// names its features, a different order.
    pub fn new(classifier: Arc<dyn Classifier>, feature_names: &[String]) -> Result<Self, ModelError> {
        if let Some(expected) = classifier.feature_count() {
            if expected != feature_names.len() {
                return Err(ModelError::FeatureShapeMismatch {
                    expected,
                    found: feature_names.len(),
                });
            }
        }

        if let Some(trained_on) = classifier.feature_names() {
            if let Some((position, (expected, found))) = trained_on
                .iter()
                .zip(feature_names)
                .enumerate()
                .find(|(_, (expected, found))| expected != found)
            {
                return Err(ModelError::SchemaMismatch {
                    position,
                    expected: expected.clone(),
                    found: found.clone(),
                });
            }
        }

        info!(
            model = %classifier.name(),
            features = feature_names.len(),
            "Prediction engine initialized"
        );

        Ok(Self {
            classifier,
            feature_count: feature_names.len(),
        })
    }

    pub fn model_name(&self) -> &str {
        self.classifier.name()
    }

    pub fn feature_count(&self) -> usize {
        self.feature_count
    }

    /// Probabilities for one client's scaled feature vector
    pub fn predict_proba(&self, features: &[f64]) -> Result<PredictionResult, ModelError> {
        if features.len() != self.feature_count {
            return Err(ModelError::FeatureShapeMismatch {
                expected: self.feature_count,
                found: features.len(),
            });
        }

        let output = self.classifier.predict_proba(features)?;
        let result = PredictionResult::from_model_output(output)?;

        debug!(
            model = %self.classifier.name(),
            proba_1 = result.proba_1,
            "Prediction complete"
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedModel {
        output: [f64; 2],
        names: Option<Vec<String>>,
        count: Option<usize>,
    }

    impl Classifier for FixedModel {
        fn name(&self) -> &str {
            "fixed"
        }

        fn feature_count(&self) -> Option<usize> {
            self.count
        }

        fn feature_names(&self) -> Option<&[String]> {
            self.names.as_deref()
        }

        fn predict_proba(&self, _features: &[f64]) -> Result<[f64; 2], ModelError> {
            Ok(self.output)
        }
    }

    fn names(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn engine(output: [f64; 2]) -> PredictionEngine {
        let model = FixedModel {
            output,
            names: None,
            count: Some(2),
        };
        PredictionEngine::new(Arc::new(model), &names(&["A", "B"])).unwrap()
    }

    #[test]
    fn test_prediction_result() {
        let result = engine([0.82, 0.18]).predict_proba(&[0.0, 1.0]).unwrap();
        assert!((result.proba_0 - 0.82).abs() < 1e-12);
        assert!((result.proba_1 - 0.18).abs() < 1e-12);
        assert!((result.proba_0 + result.proba_1 - 1.0).abs() < PROBABILITY_TOLERANCE);
    }

    #[test]
    fn test_f32_rounding_is_absorbed() {
        let result = PredictionResult::from_model_output([0.7000001, 0.3]).unwrap();
        assert!((result.proba_0 + result.proba_1 - 1.0).abs() < 1e-15);
        assert_eq!(result.proba_1, 0.3);

        let result = PredictionResult::from_model_output([1.0000004, -0.0000004]).unwrap();
        assert_eq!(result.proba_1, 0.0);
        assert_eq!(result.proba_0, 1.0);
    }

    #[test]
    fn test_invalid_outputs_are_rejected() {
        for output in [[0.5, 0.6], [1.5, -0.5], [f64::NAN, 0.5], [0.2, 0.2]] {
            assert!(matches!(
                engine(output).predict_proba(&[0.0, 0.0]),
                Err(ModelError::InvalidProbabilities(_))
            ));
        }
    }

    #[test]
    fn test_wrong_vector_length() {
        let err = engine([0.5, 0.5]).predict_proba(&[0.0]).unwrap_err();
        assert_eq!(
            err,
            ModelError::FeatureShapeMismatch {
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_feature_count_checked_at_bind() {
        let model = FixedModel {
            output: [0.5, 0.5],
            names: None,
            count: Some(3),
        };
        let err = PredictionEngine::new(Arc::new(model), &names(&["A", "B"])).err().unwrap();
        assert!(matches!(err, ModelError::FeatureShapeMismatch { expected: 3, found: 2 }));
    }

    #[test]
    fn test_feature_order_checked_at_bind() {
        let model = FixedModel {
            output: [0.5, 0.5],
            names: Some(names(&["A", "B"])),
            count: Some(2),
        };
        let err = PredictionEngine::new(Arc::new(model), &names(&["B", "A"])).err().unwrap();
        assert_eq!(
            err,
            ModelError::SchemaMismatch {
                position: 0,
                expected: "A".into(),
                found: "B".into()
            }
        );
    }

    #[test]
    fn test_undeclared_shape_uses_dataset_layout() {
        let model = FixedModel {
            output: [0.4, 0.6],
            names: None,
            count: None,
        };
        let engine = PredictionEngine::new(Arc::new(model), &names(&["A", "B", "C"])).unwrap();
        assert_eq!(engine.feature_count(), 3);
        assert!(engine.predict_proba(&[0.0, 0.0, 0.0]).is_ok());
    }
}
