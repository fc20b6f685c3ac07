//! Loan Default API Library
//!
//! Serves client lookups and default-risk predictions of a pre-trained
//! classifier over a client sample loaded once at startup.

pub mod api;
pub mod config;
pub mod context;
pub mod dataset;
pub mod error;
pub mod metrics;
pub mod models;
pub mod scaler;
pub mod service;
pub mod types;

pub use config::AppConfig;
pub use context::{AppContext, SharedContext};
pub use dataset::{ClientStore, DatasetLoader};
pub use error::{ModelError, QueryError, ScalerError};
pub use models::{Classifier, PredictionEngine, PredictionResult};
pub use scaler::StandardScaler;
pub use types::ClientInfo;
