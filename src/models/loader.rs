//! Serving-artifact loader.
//!
//! The offline training pipeline persists three artifacts: the classifier
//! exported to ONNX, the fitted scaler parameters and the ordered feature
//! names (JSON). All three are loaded once at startup and are read-only for
//! the lifetime of the process.

use crate::align::{FeatureSpec, ScalingParams};
use crate::config::ArtifactsConfig;
use crate::error::{ScoringError, ScoringResult};
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::fs;
use std::path::Path;
use tracing::info;

/// Loaded ONNX classifier with session metadata.
pub struct LoadedModel {
    /// ONNX Runtime session
    pub session: Session,
    /// Input name for the model
    pub input_name: String,
    /// Output name carrying the binary decision
    pub label_output: Option<String>,
    /// Output name carrying class probabilities
    pub probability_output: Option<String>,
}

/// Everything the detector needs to serve predictions.
pub struct ModelArtifacts {
    pub spec: FeatureSpec,
    pub params: ScalingParams,
    pub model: LoadedModel,
}

/// Loader for the serving artifacts.
pub struct ArtifactLoader {
    /// Number of threads for ONNX inference
    onnx_threads: usize,
}

impl ArtifactLoader {
    /// Create a new loader with default settings (1 thread).
    pub fn new() -> ScoringResult<Self> {
        Self::with_threads(1)
    }

    /// Create a new loader with the specified number of inference threads.
    pub fn with_threads(onnx_threads: usize) -> ScoringResult<Self> {
        // Initialize ONNX Runtime
        ort::init().commit();
        info!(onnx_threads = onnx_threads, "ONNX Runtime initialized");
        Ok(Self { onnx_threads })
    }

    /// Load all serving artifacts from the configured paths.
    pub fn load_all(&self, config: &ArtifactsConfig) -> ScoringResult<ModelArtifacts> {
        let spec = load_feature_spec(&config.feature_names_path)?;
        let params = load_scaling_params(&config.scaler_path)?;
        let model = self.load_model(&config.model_path)?;

        info!(
            features = spec.len(),
            model = %config.model_path,
            "Serving artifacts loaded"
        );

        Ok(ModelArtifacts {
            spec,
            params,
            model,
        })
    }

    /// Load the ONNX classifier from file.
    pub fn load_model<P: AsRef<Path>>(&self, path: P) -> ScoringResult<LoadedModel> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScoringError::Unavailable(format!(
                "model file not found at {}",
                path.display()
            )));
        }

        info!(path = %path.display(), threads = self.onnx_threads, "Loading ONNX model");

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(self.onnx_threads)?
            .commit_from_file(path)
            .map_err(|e| {
                ScoringError::Unavailable(format!(
                    "failed to load model from {}: {e}",
                    path.display()
                ))
            })?;

        // Get input/output names
        let input_name = session
            .inputs()
            .first()
            .map(|i| i.name().to_string())
            .unwrap_or_else(|| "float_input".to_string());

        // scikit-learn ONNX exports emit a label output and a probability
        // output; match them by name.
        let label_output = session
            .outputs()
            .iter()
            .find(|o| o.name().contains("label"))
            .map(|o| o.name().to_string());

        let probability_output = session
            .outputs()
            .iter()
            .find(|o| o.name().contains("prob") || o.name().contains("output"))
            .map(|o| o.name().to_string());

        info!(
            input = %input_name,
            label_output = ?label_output,
            probability_output = ?probability_output,
            "Model loaded successfully"
        );

        Ok(LoadedModel {
            session,
            input_name,
            label_output,
            probability_output,
        })
    }
}

/// Load the ordered feature-name list from JSON.
pub fn load_feature_spec<P: AsRef<Path>>(path: P) -> ScoringResult<FeatureSpec> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|e| {
        ScoringError::Unavailable(format!(
            "feature names file not found at {}: {e}",
            path.display()
        ))
    })?;

    let names: Vec<String> = serde_json::from_str(&raw).map_err(|e| {
        ScoringError::Configuration(format!("malformed feature names in {}: {e}", path.display()))
    })?;

    if names.is_empty() {
        return Err(ScoringError::Configuration(format!(
            "feature names file {} is empty",
            path.display()
        )));
    }

    Ok(FeatureSpec::new(names))
}

/// Load the fitted scaler's per-feature mean/scale vectors from JSON.
pub fn load_scaling_params<P: AsRef<Path>>(path: P) -> ScoringResult<ScalingParams> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|e| {
        ScoringError::Unavailable(format!(
            "scaler file not found at {}: {e}",
            path.display()
        ))
    })?;

    let params: ScalingParams = serde_json::from_str(&raw).map_err(|e| {
        ScoringError::Configuration(format!(
            "malformed scaler params in {}: {e}",
            path.display()
        ))
    })?;

    if params.mean.len() != params.scale.len() {
        return Err(ScoringError::Configuration(format!(
            "scaler params in {} disagree: {} means, {} scales",
            path.display(),
            params.mean.len(),
            params.scale.len()
        )));
    }

    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_feature_spec() {
        let file = write_temp(r#"["Time", "V1", "V2", "Amount"]"#);
        let spec = load_feature_spec(file.path()).unwrap();

        assert_eq!(spec.len(), 4);
        assert_eq!(spec.names()[3], "Amount");
    }

    #[test]
    fn test_missing_feature_spec_is_unavailable() {
        let err = load_feature_spec("/nonexistent/feature_names.json").unwrap_err();
        assert!(matches!(err, ScoringError::Unavailable(_)));
    }

    #[test]
    fn test_malformed_feature_spec_is_configuration_error() {
        let file = write_temp(r#"{"not": "a list"}"#);
        let err = load_feature_spec(file.path()).unwrap_err();
        assert!(matches!(err, ScoringError::Configuration(_)));
    }

    #[test]
    fn test_load_scaling_params() {
        let file = write_temp(r#"{"mean": [10.0, 0.5], "scale": [2.0, 1.0]}"#);
        let params = load_scaling_params(file.path()).unwrap();

        assert_eq!(params.mean, vec![10.0, 0.5]);
        assert_eq!(params.scale, vec![2.0, 1.0]);
    }

    #[test]
    fn test_mismatched_scaler_vectors_are_configuration_error() {
        let file = write_temp(r#"{"mean": [10.0, 0.5], "scale": [2.0]}"#);
        let err = load_scaling_params(file.path()).unwrap_err();
        assert!(matches!(err, ScoringError::Configuration(_)));
    }

    #[test]
    fn test_missing_scaler_is_unavailable() {
        let err = load_scaling_params("/nonexistent/scaler.json").unwrap_err();
        assert!(matches!(err, ScoringError::Unavailable(_)));
    }
}
