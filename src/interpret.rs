//! Risk interpretation of raw model predictions.
//!
//! Maps the model's binary decision plus fraud probability into a label, risk
//! tier, confidence percentage and recommendation. Pure and stateless; safe
//! to call from any number of concurrent requests.

use crate::types::{Label, PredictionResult, RiskPolicy};

/// Decision threshold the upstream classifier applies when emitting its
/// binary prediction.
pub const DEFAULT_DECISION_THRESHOLD: f64 = 0.5;

/// Interprets raw model output under a fixed risk-tier policy.
///
/// The label always follows the model's own decision; the probability only
/// drives tier, confidence and recommendation. The two can disagree if a
/// caller passes inconsistent inputs, and the interpreter deliberately does
/// not reconcile them.
#[derive(Debug, Clone, Copy)]
pub struct DecisionInterpreter {
    policy: RiskPolicy,
    decision_threshold: f64,
}

impl DecisionInterpreter {
    pub fn new(policy: RiskPolicy) -> Self {
        Self {
            policy,
            decision_threshold: DEFAULT_DECISION_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.decision_threshold = threshold;
        self
    }

    pub fn policy(&self) -> RiskPolicy {
        self.policy
    }

    /// Interpret a raw binary prediction and fraud probability.
    ///
    /// Confidence is the probability of the predicted class, expressed as a
    /// percentage. Probabilities are rounded to 4 places and percentages to
    /// 2 places for stable display and serialization.
    pub fn interpret(&self, raw_prediction: i64, fraud_probability: f64) -> PredictionResult {
        let label = Label::from_raw(raw_prediction);
        let confidence = if label.is_fraud() {
            fraud_probability
        } else {
            1.0 - fraud_probability
        };

        PredictionResult {
            label,
            fraud_probability: round4(fraud_probability),
            genuine_probability: round4(1.0 - fraud_probability),
            confidence: round2(confidence * 100.0),
            risk_tier: self.policy.tier(fraud_probability),
            recommendation: self.recommendation(label, fraud_probability).to_string(),
            decision_threshold: self.decision_threshold,
        }
    }

    fn recommendation(&self, label: Label, fraud_probability: f64) -> &'static str {
        match self.policy {
            RiskPolicy::Standard => {
                if label.is_fraud() {
                    if fraud_probability >= 0.9 {
                        "BLOCK transaction immediately. Manual review required."
                    } else if fraud_probability >= 0.7 {
                        "FLAG for manual review before processing."
                    } else {
                        "Monitor transaction. Consider additional verification."
                    }
                } else {
                    "APPROVE transaction. Appears genuine."
                }
            }
            RiskPolicy::Granular => {
                if label.is_fraud() {
                    "REJECT transaction. High fraud probability detected."
                } else if fraud_probability < 0.2 {
                    "APPROVE transaction. Appears genuine."
                } else {
                    "REVIEW transaction manually before approval."
                }
            }
        }
    }
}

impl Default for DecisionInterpreter {
    fn default() -> Self {
        Self::new(RiskPolicy::Standard)
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
