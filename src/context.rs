//! Application context built once at startup and shared read-only by handlers.

use crate::config::AppConfig;
use crate::dataset::{ClientStore, Dataset, DatasetLoader};
use crate::metrics::ServiceMetrics;
use crate::models::{Classifier, ModelLoader, PredictionEngine};
use crate::scaler::StandardScaler;
use crate::types::ClientInfo;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Immutable state behind every request: data, scaled view, model and metrics
pub struct AppContext {
    pub(crate) store: ClientStore,
    pub(crate) engine: PredictionEngine,
    pub(crate) metrics: Arc<ServiceMetrics>,
}

/// Context handle given to the HTTP layer
pub type SharedContext = Arc<AppContext>;

impl AppContext {
    /// Load data and model from the configured paths.
    ///
    /// Any failure aborts startup; no partial context is ever returned.
    pub fn initialize(config: &AppConfig) -> Result<Self> {
        let started = Instant::now();

        let dataset = DatasetLoader::new(&config.dataset).load_file(&config.dataset.path)?;
        let classifier = ModelLoader::with_threads(config.model.onnx_threads)?
            .load(&config.model.path)
            .with_context(|| format!("Failed to load model {}", config.model.path.display()))?;

        let context = Self::from_parts(dataset, classifier)?;

        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Startup initialization complete"
        );
        Ok(context)
    }

    /// Build the context from an already loaded dataset and classifier
    pub fn from_parts(dataset: Dataset, classifier: Arc<dyn Classifier>) -> Result<Self> {
        ClientInfo::check_schema(dataset.schema())?;

        let scaler = StandardScaler::fit(&dataset.feature_frame());
        info!(features = scaler.stats().len(), "Feature scaler fitted");

        let store = ClientStore::new(dataset, scaler).context("Failed to build scaled view")?;
        let engine = PredictionEngine::new(classifier, store.feature_names())
            .context("Model does not match the dataset feature layout")?;

        // Dry run at the all-means point so a model that rejects the layout fails here
        let centre = vec![0.0; store.feature_names().len()];
        engine
            .predict_proba(&centre)
            .context("Model rejected the dataset feature layout")?;

        info!(
            clients = store.len(),
            columns = store.schema().len(),
            features = store.feature_names().len(),
            model = %engine.model_name(),
            "Application context ready"
        );

        Ok(Self {
            store,
            engine,
            metrics: Arc::new(ServiceMetrics::new()),
        })
    }

    pub fn store(&self) -> &ClientStore {
        &self.store
    }

    pub fn engine(&self) -> &PredictionEngine {
        &self.engine
    }

    pub fn metrics(&self) -> &Arc<ServiceMetrics> {
        &self.metrics
    }
}
