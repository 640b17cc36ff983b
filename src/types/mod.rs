//! Type definitions for the fraud scoring service

pub mod prediction;
pub mod transaction;

pub use prediction::{BatchOutcome, BatchSummary, Label, PredictionResult, RiskPolicy, RiskTier};
pub use transaction::Transaction;
