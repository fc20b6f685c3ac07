//! ONNX Runtime backed classifier

use crate::error::ModelError;
use crate::models::classifier::Classifier;
use anyhow::{Context, Result};
use ort::memory::Allocator;
use ort::session::{builder::GraphOptimizationLevel, Session, SessionOutputs};
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType, DynValue, Tensor};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

/// Classifier exported to ONNX (sklearn, LightGBM, XGBoost converters)
pub struct OnnxClassifier {
    name: String,
    /// Running a session needs exclusive access
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
}

impl OnnxClassifier {
    /// Load a model graph from file
    pub fn load<P: AsRef<Path>>(path: P, name: &str, threads: usize) -> Result<Self> {
        let path = path.as_ref();

        info!(model = %name, path = %path.display(), threads = threads, "Loading ONNX model");

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(threads)?
            .commit_from_file(path)
            .with_context(|| format!("Failed to load model from {}", path.display()))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "float_input".to_string());

        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name.contains("prob"))
            .or_else(|| session.outputs.last())
            .map(|o| o.name.clone())
            .unwrap_or_else(|| "probabilities".to_string());

        info!(
            model = %name,
            input = %input_name,
            output = %output_name,
            "Model loaded successfully"
        );

        Ok(Self {
            name: name.to_string(),
            session: Mutex::new(session),
            input_name,
            output_name,
        })
    }

    fn run(&self, features: &[f64]) -> Result<[f64; 2]> {
        // Shape [1, num_features]; sklearn converters declare float inputs
        let shape = vec![1_i64, features.len() as i64];
        let values: Vec<f32> = features.iter().map(|&x| x as f32).collect();
        let input = Tensor::from_array((shape, values)).context("Failed to create input tensor")?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| anyhow::anyhow!("Session lock poisoned: {}", e))?;
        let outputs = session.run(ort::inputs![self.input_name.as_str() => input])?;

        self.extract_probabilities(&outputs)
    }

    /// Probabilities from a `[1, 2]` tensor or a `seq(map(int64, float))` output
    fn extract_probabilities(&self, outputs: &SessionOutputs) -> Result<[f64; 2]> {
        let output = outputs
            .get(self.output_name.as_str())
            .with_context(|| format!("Model output {} missing", self.output_name))?;

        if let Ok((_, data)) = output.try_extract_tensor::<f32>() {
            debug!(model = %self.name, values = data.len(), "Extracted from tensor");
            return match data {
                [p0, p1, ..] => Ok([*p0 as f64, *p1 as f64]),
                [p1] => Ok([1.0 - *p1 as f64, *p1 as f64]),
                [] => Err(anyhow::anyhow!("Empty probability tensor")),
            };
        }

        if DynSequenceValueType::can_downcast(&output.dtype()) {
            return self.extract_from_sequence_map(output);
        }

        Err(anyhow::anyhow!(
            "Unsupported output type for {}",
            self.output_name
        ))
    }

    /// `seq(map(int64, float))` as written by LightGBM and CatBoost converters
    fn extract_from_sequence_map(&self, output: &DynValue) -> Result<[f64; 2]> {
        let allocator = Allocator::default();

        let sequence = output
            .downcast_ref::<DynSequenceValueType>()
            .map_err(|e| anyhow::anyhow!("Failed to downcast to sequence: {}", e))?;
        let maps = sequence.try_extract_sequence::<DynMapValueType>(&allocator)?;
        let first = maps.first().context("Empty probability sequence")?;
        let pairs = first.try_extract_key_values::<i64, f32>()?;

        let class = |wanted: i64| {
            pairs
                .iter()
                .find(|(class_id, _)| *class_id == wanted)
                .map(|(_, p)| *p as f64)
        };

        match (class(0), class(1)) {
            (Some(p0), Some(p1)) => Ok([p0, p1]),
            (None, Some(p1)) => Ok([1.0 - p1, p1]),
            (Some(p0), None) => Ok([p0, 1.0 - p0]),
            (None, None) => Err(anyhow::anyhow!("No class probability found in map")),
        }
    }
}

impl Classifier for OnnxClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    // Input dimensions may be symbolic; the startup probe checks the layout instead
    fn feature_count(&self) -> Option<usize> {
        None
    }

    fn predict_proba(&self, features: &[f64]) -> Result<[f64; 2], ModelError> {
        self.run(features)
            .map_err(|e| ModelError::Runtime(format!("{:#}", e)))
    }
}
