//! Append-only prediction log.
//!
//! Every scored transaction can be appended to a CSV log for later tracking
//! and offline analysis. The log is created with headers on first write and
//! appended to afterwards.

use crate::error::{ScoringError, ScoringResult};
use crate::types::{Label, PredictionResult, RiskTier, Transaction};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

/// One row of the prediction log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub record_id: String,
    pub timestamp: DateTime<Utc>,
    pub amount: f64,
    pub time: f64,
    pub prediction: Label,
    pub fraud_probability: f64,
    pub risk_level: RiskTier,
}

impl PredictionRecord {
    pub fn new(tx: &Transaction, result: &PredictionResult) -> Self {
        Self {
            record_id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            amount: tx.get("Amount").unwrap_or(0.0),
            time: tx.get("Time").unwrap_or(0.0),
            prediction: result.label,
            fraud_probability: result.fraud_probability,
            risk_level: result.risk_tier,
        }
    }
}

/// CSV prediction log, appended to once per scored transaction.
#[derive(Debug, Clone)]
pub struct PredictionLog {
    path: PathBuf,
}

impl PredictionLog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one scored transaction, writing headers if the file is new.
    pub fn append(&self, tx: &Transaction, result: &PredictionResult) -> ScoringResult<()> {
        let record = PredictionRecord::new(tx, result);
        let write_headers = !self.path.exists();

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    ScoringError::Configuration(format!(
                        "cannot create log directory {}: {e}",
                        parent.display()
                    ))
                })?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                ScoringError::Configuration(format!(
                    "cannot open prediction log {}: {e}",
                    self.path.display()
                ))
            })?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(write_headers)
            .from_writer(file);
        writer
            .serialize(&record)
            .and_then(|_| writer.flush().map_err(csv::Error::from))
            .map_err(|e| ScoringError::Configuration(format!("prediction log write failed: {e}")))?;

        debug!(
            record_id = %record.record_id,
            prediction = ?record.prediction,
            fraud_probability = record.fraud_probability,
            "Prediction logged"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpret::DecisionInterpreter;

    #[test]
    fn test_append_creates_file_with_headers_then_appends() {
        let dir = tempfile::tempdir().unwrap();
        let log = PredictionLog::new(dir.path().join("predictions_log.csv"));

        let interpreter = DecisionInterpreter::default();
        let tx = Transaction::new()
            .with_field("Time", 1000.0)
            .with_field("Amount", 149.99);

        log.append(&tx, &interpreter.interpret(0, 0.0234)).unwrap();
        log.append(&tx, &interpreter.interpret(1, 0.87)).unwrap();

        let mut reader = csv::Reader::from_path(log.path()).unwrap();
        let records: Vec<PredictionRecord> = reader
            .deserialize()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].amount, 149.99);
        assert_eq!(records[0].prediction, Label::Genuine);
        assert_eq!(records[1].prediction, Label::Fraud);
        assert_eq!(records[1].risk_level, RiskTier::High);
    }
}
