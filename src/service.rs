//! Fraud detector service context.
//!
//! Owns the aligner, inference engine and interpreter as immutable state
//! constructed once at startup, replacing any notion of module-level mutable
//! model globals. Transports (HTTP handlers, CLI) hold one of these for the
//! lifetime of the process and call `predict`/`predict_batch` per request.

use crate::align::FeatureAligner;
use crate::audit::PredictionLog;
use crate::config::AppConfig;
use crate::error::{ScoringError, ScoringResult};
use crate::interpret::DecisionInterpreter;
use crate::models::{ArtifactLoader, Inference, OnnxClassifier};
use crate::types::{BatchOutcome, BatchSummary, PredictionResult, Transaction};
use tracing::{debug, info, warn};

/// Long-lived scoring service: align, infer, interpret.
pub struct FraudDetector {
    aligner: FeatureAligner,
    engine: Box<dyn Inference>,
    interpreter: DecisionInterpreter,
    log: Option<PredictionLog>,
}

impl FraudDetector {
    /// Build a detector from loaded components.
    pub fn new(
        aligner: FeatureAligner,
        engine: Box<dyn Inference>,
        interpreter: DecisionInterpreter,
    ) -> Self {
        Self {
            aligner,
            engine,
            interpreter,
            log: None,
        }
    }

    /// Load all serving artifacts per the configuration and assemble the
    /// detector.
    ///
    /// Missing artifacts surface as `ScoringError::Unavailable`, which
    /// callers report as a service-unavailable condition rather than a
    /// request failure.
    pub fn from_config(config: &AppConfig) -> ScoringResult<Self> {
        let loader = ArtifactLoader::with_threads(config.artifacts.onnx_threads)?;
        let artifacts = loader.load_all(&config.artifacts)?;

        let aligner = FeatureAligner::new(artifacts.spec, artifacts.params)?;
        let engine = OnnxClassifier::new(artifacts.model, config.detection.threshold);
        let interpreter = DecisionInterpreter::new(config.detection.risk_policy)
            .with_threshold(config.detection.threshold);

        let mut detector = Self::new(aligner, Box::new(engine), interpreter);
        if config.audit.enabled {
            detector = detector.with_log(PredictionLog::new(&config.audit.log_path));
        }

        info!(
            features = detector.feature_count(),
            policy = ?config.detection.risk_policy,
            threshold = config.detection.threshold,
            "Fraud detector initialized"
        );

        Ok(detector)
    }

    /// Enable the prediction log.
    pub fn with_log(mut self, log: PredictionLog) -> Self {
        self.log = Some(log);
        self
    }

    /// Number of features the loaded model expects.
    pub fn feature_count(&self) -> usize {
        self.aligner.feature_count()
    }

    pub fn aligner(&self) -> &FeatureAligner {
        &self.aligner
    }

    /// Score a single transaction.
    pub fn predict(&self, tx: &Transaction) -> ScoringResult<PredictionResult> {
        let features = self.aligner.align(tx);
        let raw = self.engine.predict(&features)?;
        let result = self.interpreter.interpret(raw.label, raw.fraud_probability);

        debug!(
            prediction = ?result.label,
            fraud_probability = result.fraud_probability,
            risk_level = ?result.risk_tier,
            "Transaction scored"
        );

        if let Some(log) = &self.log {
            // A log write failure must not fail the prediction itself
            if let Err(e) = log.append(tx, &result) {
                warn!(error = %e, "Failed to append prediction log");
            }
        }

        Ok(result)
    }

    /// Score a batch of transactions.
    ///
    /// Predictions come back in input order, each row scored independently,
    /// and the summary counts always reconcile with the prediction list.
    pub fn predict_batch(&self, txs: &[Transaction]) -> ScoringResult<BatchOutcome> {
        if txs.is_empty() {
            return Err(ScoringError::InputShape(
                "batch contains no transactions".to_string(),
            ));
        }

        let predictions = txs
            .iter()
            .map(|tx| self.predict(tx))
            .collect::<ScoringResult<Vec<_>>>()?;
        let summary = BatchSummary::from_predictions(&predictions);

        info!(
            total = summary.total,
            fraud = summary.fraud_count,
            genuine = summary.genuine_count,
            "Batch scored"
        );

        Ok(BatchOutcome {
            predictions,
            summary,
        })
    }
}

/// Parse an untyped JSON value into a transaction batch, failing fast before
/// inference if the overall shape is wrong.
pub fn batch_from_json(value: &serde_json::Value) -> ScoringResult<Vec<Transaction>> {
    let items = value.as_array().ok_or_else(|| {
        ScoringError::InputShape("transactions must be a list of records".to_string())
    })?;

    items
        .iter()
        .map(|item| {
            serde_json::from_value(item.clone()).map_err(|e| {
                ScoringError::InputShape(format!("transaction record is not an object: {e}"))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::FeatureSpec;
    use crate::models::RawPrediction;
    use crate::types::{Label, RiskPolicy, RiskTier};
    use serde_json::json;

    /// Stub engine: first feature is taken as the fraud probability, with
    /// the decision thresholded at 0.5.
    struct StubEngine;

    impl Inference for StubEngine {
        fn predict(&self, features: &[f32]) -> ScoringResult<RawPrediction> {
            let p = features[0] as f64;
            Ok(RawPrediction {
                label: i64::from(p >= 0.5),
                fraud_probability: p,
            })
        }
    }

    /// Engine returning a fixed prediction regardless of input.
    struct FixedEngine(RawPrediction);

    impl Inference for FixedEngine {
        fn predict(&self, _features: &[f32]) -> ScoringResult<RawPrediction> {
            Ok(self.0)
        }
    }

    fn stub_detector() -> FraudDetector {
        let aligner = FeatureAligner::unscaled(FeatureSpec::new(vec!["p".to_string()])).unwrap();
        FraudDetector::new(
            aligner,
            Box::new(StubEngine),
            DecisionInterpreter::new(RiskPolicy::Standard),
        )
    }

    fn tx_with_p(p: f64) -> Transaction {
        Transaction::new().with_field("p", p)
    }

    #[test]
    fn test_end_to_end_genuine_low_risk() {
        let aligner = FeatureAligner::unscaled(FeatureSpec::credit_card_default()).unwrap();
        let detector = FraudDetector::new(
            aligner,
            Box::new(FixedEngine(RawPrediction {
                label: 0,
                fraud_probability: 0.0234,
            })),
            DecisionInterpreter::new(RiskPolicy::Standard),
        );

        // All V-features defaulted to 0
        let tx = Transaction::new()
            .with_field("Time", 1000.0)
            .with_field("Amount", 149.99);
        let result = detector.predict(&tx).unwrap();

        assert_eq!(result.label, Label::Genuine);
        assert_eq!(result.risk_tier, RiskTier::VeryLow);
        assert_eq!(result.confidence, 97.66);
    }

    #[test]
    fn test_end_to_end_fraud_high_risk() {
        let detector = stub_detector();
        let result = detector.predict(&tx_with_p(0.87)).unwrap();

        assert_eq!(result.label, Label::Fraud);
        assert_eq!(result.risk_tier, RiskTier::High);
        assert_eq!(
            result.recommendation,
            "FLAG for manual review before processing."
        );
    }

    #[test]
    fn test_batch_preserves_order_and_summary_reconciles() {
        let detector = stub_detector();
        let txs = vec![tx_with_p(0.02), tx_with_p(0.87), tx_with_p(0.3)];

        let outcome = detector.predict_batch(&txs).unwrap();

        assert_eq!(outcome.predictions.len(), 3);
        assert_eq!(outcome.predictions[0].label, Label::Genuine);
        assert_eq!(outcome.predictions[1].label, Label::Fraud);
        assert_eq!(outcome.predictions[2].label, Label::Genuine);

        let summary = &outcome.summary;
        assert_eq!(summary.total, 3);
        assert_eq!(summary.fraud_count, 1);
        assert_eq!(summary.genuine_count, 2);
        assert_eq!(summary.fraud_count + summary.genuine_count, summary.total);
    }

    #[test]
    fn test_empty_batch_fails_fast() {
        let detector = stub_detector();
        let err = detector.predict_batch(&[]).unwrap_err();
        assert!(matches!(err, ScoringError::InputShape(_)));
    }

    #[test]
    fn test_batch_from_json_accepts_list_of_records() {
        let value = json!([
            {"Time": 1000.0, "Amount": 50.0, "V1": 0.1},
            {"Time": 2000.0, "Amount": 500.0, "V1": 2.5}
        ]);

        let txs = batch_from_json(&value).unwrap();
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[1].get("Amount"), Some(500.0));
    }

    #[test]
    fn test_batch_from_json_rejects_non_list() {
        let err = batch_from_json(&json!({"Time": 1000.0})).unwrap_err();
        assert!(matches!(err, ScoringError::InputShape(_)));
    }

    #[test]
    fn test_batch_from_json_rejects_non_object_rows() {
        let err = batch_from_json(&json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, ScoringError::InputShape(_)));
    }

    #[test]
    fn test_prediction_log_written_when_enabled() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("predictions_log.csv");
        let detector = stub_detector().with_log(PredictionLog::new(&log_path));

        detector.predict(&tx_with_p(0.87)).unwrap();
        detector.predict(&tx_with_p(0.02)).unwrap();

        let contents = std::fs::read_to_string(&log_path).unwrap();
        // Header plus two rows
        assert_eq!(contents.lines().count(), 3);
    }
}
