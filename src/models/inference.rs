//! ONNX inference adapter for the fraud classifier.
//!
//! The core never implements model math; this module only runs a session and
//! pulls the binary decision and fraud-class probability out of its outputs,
//! handling both tensor outputs and the seq(map) shape scikit-learn ONNX
//! exports produce.

use crate::error::{ScoringError, ScoringResult};
use crate::models::loader::LoadedModel;
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType};
use std::sync::RwLock;
use tracing::{debug, warn};

/// Raw model output for one transaction: the model's own binary decision plus
/// the fraud-class probability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawPrediction {
    /// 0 = genuine, 1 = fraud
    pub label: i64,
    /// Probability of the fraud class in [0, 1]
    pub fraud_probability: f64,
}

/// Inference seam between the scoring core and the ML library.
///
/// The detector depends on this trait rather than on a concrete session so
/// transports and tests can substitute their own engine.
pub trait Inference: Send + Sync {
    fn predict(&self, features: &[f32]) -> ScoringResult<RawPrediction>;
}

/// Binary fraud classifier backed by an ONNX Runtime session.
pub struct OnnxClassifier {
    /// Session runs need exclusive access; requests serialize on this lock.
    model: RwLock<LoadedModel>,
    /// Threshold used only when the model exports no label output
    decision_threshold: f64,
}

impl OnnxClassifier {
    pub fn new(model: LoadedModel, decision_threshold: f64) -> Self {
        Self {
            model: RwLock::new(model),
            decision_threshold,
        }
    }

    fn run(&self, features: &[f32]) -> ScoringResult<RawPrediction> {
        use ort::value::Tensor;

        let mut model = self
            .model
            .write()
            .map_err(|e| ScoringError::Inference(format!("session lock poisoned: {e}")))?;

        // Input tensor shape [1, num_features]
        let shape = vec![1_i64, features.len() as i64];
        let input_tensor = Tensor::from_array((shape, features.to_vec()))
            .map_err(|e| ScoringError::Inference(format!("failed to create input tensor: {e}")))?;

        let input_name = model.input_name.clone();
        let label_output = model.label_output.clone();
        let probability_output = model.probability_output.clone();

        let outputs = model.session.run(ort::inputs![&input_name => input_tensor])?;

        let fraud_probability =
            extract_fraud_probability(&outputs, probability_output.as_deref())?;

        let label = match extract_label(&outputs, label_output.as_deref()) {
            Some(label) => label,
            None => {
                // Model exported without a label output; fall back to
                // thresholding the probability.
                warn!(
                    threshold = self.decision_threshold,
                    "no label output, deriving decision from probability"
                );
                i64::from(fraud_probability >= self.decision_threshold)
            }
        };

        Ok(RawPrediction {
            label,
            fraud_probability,
        })
    }
}

impl Inference for OnnxClassifier {
    fn predict(&self, features: &[f32]) -> ScoringResult<RawPrediction> {
        self.run(features)
    }
}

/// Extract the binary decision from the label output, if present.
fn extract_label(outputs: &ort::session::SessionOutputs, label_output: Option<&str>) -> Option<i64> {
    let output = match label_output {
        Some(name) => outputs.get(name)?,
        None => return None,
    };

    if let Ok((_, data)) = output.try_extract_tensor::<i64>() {
        return data.first().copied();
    }
    // Some exports emit int32 labels
    if let Ok((_, data)) = output.try_extract_tensor::<i32>() {
        return data.first().map(|&v| v as i64);
    }

    None
}

/// Extract the fraud-class probability from the model output.
///
/// Handles tensor outputs (XGBoost-style exports) and seq(map(int64, float))
/// outputs (scikit-learn ZipMap exports).
fn extract_fraud_probability(
    outputs: &ort::session::SessionOutputs,
    probability_output: Option<&str>,
) -> ScoringResult<f64> {
    // First, try the declared probability output by name
    if let Some(name) = probability_output {
        if let Some(output) = outputs.get(name) {
            let dtype = output.dtype();

            if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
                return Ok(fraud_probability_from_tensor(&shape, data));
            }

            if DynSequenceValueType::can_downcast(&dtype) {
                if let Ok(prob) = extract_from_sequence_map(output) {
                    return Ok(prob);
                }
            }
        }
    }

    // Fallback: iterate all outputs and try extraction
    for (name, output) in outputs.iter() {
        if name.contains("label") {
            continue;
        }

        let dtype = output.dtype();

        if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
            debug!(output = %name, "extracted probability from tensor (fallback)");
            return Ok(fraud_probability_from_tensor(&shape, data));
        }

        if DynSequenceValueType::can_downcast(&dtype) {
            if let Ok(prob) = extract_from_sequence_map(&output) {
                debug!(output = %name, "extracted probability from seq(map) (fallback)");
                return Ok(prob);
            }
        }
    }

    Err(ScoringError::Inference(
        "no probability output found in model outputs".to_string(),
    ))
}

/// Extract the fraud-class probability from seq(map(int64, float)) output.
fn extract_from_sequence_map(output: &ort::value::DynValue) -> ScoringResult<f64> {
    let sequence = output
        .downcast_ref::<DynSequenceValueType>()
        .map_err(|e| ScoringError::Inference(format!("failed to downcast to sequence: {e}")))?;

    let maps = sequence.try_extract_sequence::<DynMapValueType>()?;
    if maps.is_empty() {
        return Err(ScoringError::Inference("empty probability sequence".to_string()));
    }

    // Batch size is 1; the first map holds class -> probability
    let kv_pairs = maps[0].try_extract_key_values::<i64, f32>()?;

    // Class 1 is the fraud class
    for (class_id, prob) in &kv_pairs {
        if *class_id == 1 {
            return Ok(*prob as f64);
        }
    }
    for (class_id, prob) in &kv_pairs {
        if *class_id == 0 {
            return Ok(1.0 - *prob as f64);
        }
    }

    Err(ScoringError::Inference(
        "no class probability found in map".to_string(),
    ))
}

/// Extract the fraud-class probability from tensor data.
fn fraud_probability_from_tensor(shape: &ort::value::Shape, data: &[f32]) -> f64 {
    let dims: Vec<i64> = shape.iter().copied().collect();

    if dims.len() == 2 {
        let num_classes = dims[1] as usize;
        if num_classes >= 2 {
            // [batch, num_classes] - fraud class at index 1
            return data[1] as f64;
        } else if num_classes == 1 {
            return data[0] as f64;
        }
    } else if dims.len() == 1 {
        let num_classes = dims[0] as usize;
        if num_classes >= 2 {
            return data[1] as f64;
        } else if num_classes == 1 {
            return data[0] as f64;
        }
    }

    data.last().map(|&v| v as f64).unwrap_or(0.5)
}
