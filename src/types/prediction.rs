//! Prediction result data structures

use serde::{Deserialize, Serialize};

/// Final decision label for a scored transaction.
///
/// Driven by the upstream model's own decision, not recomputed from the
/// probability here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Label {
    Genuine,
    Fraud,
}

impl Label {
    /// Map the model's raw binary decision (0/1) to a label.
    pub fn from_raw(raw_prediction: i64) -> Self {
        if raw_prediction == 1 {
            Label::Fraud
        } else {
            Label::Genuine
        }
    }

    pub fn is_fraud(self) -> bool {
        self == Label::Fraud
    }
}

/// Discrete risk bucket derived from a continuous fraud probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskTier {
    #[serde(rename = "VERY LOW")]
    VeryLow,
    #[serde(rename = "LOW")]
    Low,
    #[serde(rename = "MEDIUM")]
    Medium,
    #[serde(rename = "HIGH")]
    High,
    #[serde(rename = "VERY HIGH")]
    VeryHigh,
}

/// Named risk-tier policy.
///
/// Two divergent schemes exist in the surrounding system and are exercised by
/// different callers; they stay distinct and selectable rather than unified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskPolicy {
    /// Four tiers with breakpoints at probability 0.3 / 0.5 / 0.8.
    #[default]
    Standard,
    /// Five tiers with breakpoints at probability 0.2 / 0.4 / 0.6 / 0.8,
    /// adding VERY HIGH.
    Granular,
}

impl RiskPolicy {
    /// Bucket a fraud probability into this policy's tier scheme.
    ///
    /// Bands are non-overlapping with inclusive lower bounds, so the tier is
    /// a non-decreasing step function of the probability.
    pub fn tier(self, fraud_probability: f64) -> RiskTier {
        match self {
            RiskPolicy::Standard => {
                if fraud_probability >= 0.8 {
                    RiskTier::High
                } else if fraud_probability >= 0.5 {
                    RiskTier::Medium
                } else if fraud_probability >= 0.3 {
                    RiskTier::Low
                } else {
                    RiskTier::VeryLow
                }
            }
            RiskPolicy::Granular => {
                if fraud_probability >= 0.8 {
                    RiskTier::VeryHigh
                } else if fraud_probability >= 0.6 {
                    RiskTier::High
                } else if fraud_probability >= 0.4 {
                    RiskTier::Medium
                } else if fraud_probability >= 0.2 {
                    RiskTier::Low
                } else {
                    RiskTier::VeryLow
                }
            }
        }
    }
}

/// Interpreted prediction for a single transaction.
///
/// Field names match the wire format both existing transports serialize, so
/// either response shape can be produced from this struct without change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResult {
    /// "GENUINE" or "FRAUD"
    #[serde(rename = "prediction")]
    pub label: Label,

    /// Probability of fraud in [0, 1], rounded to 4 places
    pub fraud_probability: f64,

    /// Complement of the fraud probability, rounded to 4 places
    pub genuine_probability: f64,

    /// Model confidence as a percentage, rounded to 2 places
    pub confidence: f64,

    /// Risk tier under the interpreter's policy
    #[serde(rename = "risk_level")]
    pub risk_tier: RiskTier,

    /// Recommended action for the transaction
    pub recommendation: String,

    /// Decision threshold the upstream model applied
    #[serde(rename = "threshold")]
    pub decision_threshold: f64,
}

/// Aggregate counts for a scored batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub fraud_count: usize,
    pub genuine_count: usize,
    pub fraud_percentage: f64,
}

impl BatchSummary {
    /// Tally a batch of predictions. `fraud_count + genuine_count == total`
    /// always holds.
    pub fn from_predictions(predictions: &[PredictionResult]) -> Self {
        let total = predictions.len();
        let fraud_count = predictions.iter().filter(|p| p.label.is_fraud()).count();
        let fraud_percentage = if total > 0 {
            (fraud_count as f64 / total as f64 * 100.0 * 100.0).round() / 100.0
        } else {
            0.0
        };

        Self {
            total,
            fraud_count,
            genuine_count: total - fraud_count,
            fraud_percentage,
        }
    }
}

/// Result of scoring a batch: predictions in input order plus a summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub predictions: Vec<PredictionResult>,
    pub summary: BatchSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_policy_boundaries() {
        let policy = RiskPolicy::Standard;

        assert_eq!(policy.tier(0.0), RiskTier::VeryLow);
        assert_eq!(policy.tier(0.29), RiskTier::VeryLow);
        // Lower bounds are inclusive
        assert_eq!(policy.tier(0.3), RiskTier::Low);
        assert_eq!(policy.tier(0.49), RiskTier::Low);
        assert_eq!(policy.tier(0.5), RiskTier::Medium);
        assert_eq!(policy.tier(0.79), RiskTier::Medium);
        assert_eq!(policy.tier(0.8), RiskTier::High);
        assert_eq!(policy.tier(1.0), RiskTier::High);
    }

    #[test]
    fn test_granular_policy_boundaries() {
        let policy = RiskPolicy::Granular;

        assert_eq!(policy.tier(0.19), RiskTier::VeryLow);
        assert_eq!(policy.tier(0.2), RiskTier::Low);
        assert_eq!(policy.tier(0.4), RiskTier::Medium);
        assert_eq!(policy.tier(0.6), RiskTier::High);
        assert_eq!(policy.tier(0.8), RiskTier::VeryHigh);
        assert_eq!(policy.tier(0.95), RiskTier::VeryHigh);
    }

    #[test]
    fn test_tier_is_monotonic_in_probability() {
        for policy in [RiskPolicy::Standard, RiskPolicy::Granular] {
            let mut last = policy.tier(0.0);
            for i in 1..=100 {
                let tier = policy.tier(i as f64 / 100.0);
                assert!(tier >= last, "tier regressed at p={}", i as f64 / 100.0);
                last = tier;
            }
        }
    }

    #[test]
    fn test_risk_tier_wire_names() {
        assert_eq!(
            serde_json::to_string(&RiskTier::VeryLow).unwrap(),
            "\"VERY LOW\""
        );
        assert_eq!(
            serde_json::to_string(&RiskTier::VeryHigh).unwrap(),
            "\"VERY HIGH\""
        );
    }

    #[test]
    fn test_batch_summary_reconciles() {
        let fraud = PredictionResult {
            label: Label::Fraud,
            fraud_probability: 0.87,
            genuine_probability: 0.13,
            confidence: 87.0,
            risk_tier: RiskTier::High,
            recommendation: String::new(),
            decision_threshold: 0.5,
        };
        let genuine = PredictionResult {
            label: Label::Genuine,
            fraud_probability: 0.02,
            genuine_probability: 0.98,
            confidence: 98.0,
            risk_tier: RiskTier::VeryLow,
            recommendation: String::new(),
            decision_threshold: 0.5,
        };

        let summary =
            BatchSummary::from_predictions(&[fraud.clone(), genuine.clone(), genuine, fraud]);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.fraud_count, 2);
        assert_eq!(summary.genuine_count, 2);
        assert_eq!(summary.fraud_count + summary.genuine_count, summary.total);
        assert_eq!(summary.fraud_percentage, 50.0);
    }

    #[test]
    fn test_prediction_result_wire_format() {
        let result = PredictionResult {
            label: Label::Genuine,
            fraud_probability: 0.0234,
            genuine_probability: 0.9766,
            confidence: 97.66,
            risk_tier: RiskTier::VeryLow,
            recommendation: "APPROVE transaction. Appears genuine.".to_string(),
            decision_threshold: 0.5,
        };

        let json: serde_json::Value = serde_json::to_value(&result).unwrap();
        assert_eq!(json["prediction"], "GENUINE");
        assert_eq!(json["risk_level"], "VERY LOW");
        assert_eq!(json["fraud_probability"], 0.0234);
        assert_eq!(json["threshold"], 0.5);
    }
}
