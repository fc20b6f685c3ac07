//! ML model components: classifier capability, artifact loading and inference

pub mod classifier;
pub mod inference;
pub mod loader;
#[cfg(feature = "onnx")]
pub mod onnx;

pub use classifier::{Classifier, LogisticModel};
pub use inference::{PredictionEngine, PredictionResult};
pub use loader::ModelLoader;
