//! ML model loading and inference components

pub mod inference;
pub mod loader;

pub use inference::{Inference, OnnxClassifier, RawPrediction};
pub use loader::{ArtifactLoader, LoadedModel, ModelArtifacts};
