//! Model artifact loader

use crate::models::classifier::{Classifier, LogisticModel};
use anyhow::{bail, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Loader choosing the backend from the artifact's file extension
pub struct ModelLoader {
    /// Number of threads for ONNX inference
    onnx_threads: usize,
}

impl ModelLoader {
    /// Create a new model loader with default settings (1 thread)
    pub fn new() -> Result<Self> {
        Self::with_threads(1)
    }

    /// Create a new model loader with specified number of ONNX threads
    pub fn with_threads(onnx_threads: usize) -> Result<Self> {
        #[cfg(feature = "onnx")]
        {
            ort::init().commit()?;
            info!(onnx_threads = onnx_threads, "ONNX Runtime initialized");
        }
        Ok(Self { onnx_threads })
    }

    /// Load the classifier stored at `path`
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<Arc<dyn Classifier>> {
        let path = path.as_ref();
        if !path.exists() {
            bail!("Model artifact not found: {}", path.display());
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        let model: Arc<dyn Classifier> = match extension.as_deref() {
            Some("json") => Arc::new(LogisticModel::from_file(path)?),
            Some("onnx") => self.load_onnx(path)?,
            _ => bail!(
                "Unsupported model artifact {} (expected .json or .onnx)",
                path.display()
            ),
        };

        info!(
            model = %model.name(),
            path = %path.display(),
            features = ?model.feature_count(),
            "Model loaded"
        );

        Ok(model)
    }

    #[cfg(feature = "onnx")]
    fn load_onnx(&self, path: &Path) -> Result<Arc<dyn Classifier>> {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("onnx_model");
        let model = crate::models::onnx::OnnxClassifier::load(path, name, self.onnx_threads)?;
        Ok(Arc::new(model))
    }

    #[cfg(not(feature = "onnx"))]
    fn load_onnx(&self, path: &Path) -> Result<Arc<dyn Classifier>> {
        bail!(
            "{} is an ONNX model but onnx support is not compiled in (threads={}); rebuild with --features onnx",
            path.display(),
            self.onnx_threads
        )
    }
}

impl Default for ModelLoader {
    fn default() -> Self {
        Self { onnx_threads: 1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(file: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("loan-default-api-{}-{}", std::process::id(), file))
    }

    #[test]
    fn test_load_json_artifact() {
        let path = temp_path("model.json");
        std::fs::write(
            &path,
            r#"{"name": "logreg", "features": ["A", "B"], "coefficients": [0.1, -0.2], "intercept": 0.0}"#,
        )
        .unwrap();

        let model = ModelLoader::default().load(&path).unwrap();
        assert_eq!(model.name(), "logreg");
        assert_eq!(model.feature_count(), Some(2));

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_missing_artifact() {
        let err = ModelLoader::default()
            .load(temp_path("absent.json"))
            .err()
            .unwrap();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_unsupported_extension() {
        let path = temp_path("model.pkl");
        std::fs::write(&path, b"\x80\x04").unwrap();

        let err = ModelLoader::default().load(&path).err().unwrap();
        assert!(err.to_string().contains("Unsupported"));

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_invalid_json_artifact() {
        let path = temp_path("broken.json");
        std::fs::write(&path, r#"{"coefficients": []"#).unwrap();

        assert!(ModelLoader::default().load(&path).is_err());

        std::fs::remove_file(path).ok();
    }
}
