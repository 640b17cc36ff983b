//! Feature alignment for fraud model inference.
//!
//! Turns a sparse transaction into the dense, standardized feature vector the
//! model was trained on. Field order and scaling parameters come from the
//! offline training pipeline and are validated once at load time, so the
//! per-request path is infallible and lock-free.

use crate::error::{ScoringError, ScoringResult};
use crate::types::Transaction;
use serde::{Deserialize, Serialize};

/// Ordered list of feature names, fixed at model-training time.
///
/// Length and order must exactly match the dimensionality the scaler and
/// model were fitted with; any change is a breaking change for the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSpec {
    names: Vec<String>,
}

impl FeatureSpec {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// The feature-name list for the credit card dataset this model is
    /// trained on: `Time`, `V1`..`V28` (PCA components), `Amount`.
    pub fn credit_card_default() -> Self {
        let mut names = Vec::with_capacity(30);
        names.push("Time".to_string());
        for i in 1..=28 {
            names.push(format!("V{i}"));
        }
        names.push("Amount".to_string());
        Self { names }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// Per-feature standardization parameters fitted on the training data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalingParams {
    /// Per-feature means subtracted before division
    pub mean: Vec<f64>,
    /// Per-feature standard deviations used as divisors
    pub scale: Vec<f64>,
}

impl ScalingParams {
    /// Identity transform (zero mean, unit scale) for `n` features.
    pub fn identity(n: usize) -> Self {
        Self {
            mean: vec![0.0; n],
            scale: vec![1.0; n],
        }
    }

    pub fn len(&self) -> usize {
        self.mean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }
}

/// Builds the exact feature vector the model expects from an arbitrary,
/// possibly incomplete transaction.
///
/// Missing fields are filled with 0.0 (the system must serve predictions on
/// partial input) and unknown keys are silently dropped. The raw ordered
/// vector is then standardized per feature: `(raw - mean) / scale`.
#[derive(Debug, Clone)]
pub struct FeatureAligner {
    spec: FeatureSpec,
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl FeatureAligner {
    /// Create an aligner, validating that the feature spec and scaling
    /// parameters describe the same dimensionality.
    ///
    /// Zero or non-finite scale entries are treated as unit scale, matching
    /// the behavior of the fitted scaler for zero-variance features.
    pub fn new(spec: FeatureSpec, params: ScalingParams) -> ScoringResult<Self> {
        if spec.is_empty() {
            return Err(ScoringError::Configuration(
                "feature spec is empty".to_string(),
            ));
        }
        if params.mean.len() != spec.len() || params.scale.len() != spec.len() {
            return Err(ScoringError::Configuration(format!(
                "scaler shape mismatch: {} features, {} means, {} scales",
                spec.len(),
                params.mean.len(),
                params.scale.len()
            )));
        }

        let scale = params
            .scale
            .iter()
            .map(|&s| if s.is_finite() && s != 0.0 { s } else { 1.0 })
            .collect();

        Ok(Self {
            spec,
            mean: params.mean,
            scale,
        })
    }

    /// Aligner that passes raw values through unscaled.
    pub fn unscaled(spec: FeatureSpec) -> ScoringResult<Self> {
        let n = spec.len();
        Self::new(spec, ScalingParams::identity(n))
    }

    pub fn spec(&self) -> &FeatureSpec {
        &self.spec
    }

    /// Number of features in the output vector.
    pub fn feature_count(&self) -> usize {
        self.spec.len()
    }

    /// Align a single transaction into a dense standardized vector of length
    /// `feature_count()`.
    pub fn align(&self, tx: &Transaction) -> Vec<f32> {
        self.spec
            .names()
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let raw = tx.get(name).unwrap_or(0.0);
                ((raw - self.mean[i]) / self.scale[i]) as f32
            })
            .collect()
    }

    /// Align a batch of transactions, independently per row, preserving the
    /// input order.
    pub fn align_batch(&self, txs: &[Transaction]) -> Vec<Vec<f32>> {
        txs.iter().map(|tx| self.align(tx)).collect()
    }
}
