//! Fraud Scoring Service Library
//!
//! Serves credit card fraud predictions: aligns sparse transaction records
//! into the dense feature vectors a trained model expects, runs ONNX
//! inference, and interprets raw model output into labels, risk tiers and
//! recommendations.

pub mod align;
pub mod audit;
pub mod config;
pub mod error;
pub mod interpret;
pub mod models;
pub mod service;
pub mod types;

pub use align::{FeatureAligner, FeatureSpec, ScalingParams};
pub use audit::PredictionLog;
pub use config::AppConfig;
pub use error::{ScoringError, ScoringResult};
pub use interpret::DecisionInterpreter;
pub use models::{Inference, OnnxClassifier, RawPrediction};
pub use service::FraudDetector;
pub use types::{BatchOutcome, Label, PredictionResult, RiskPolicy, RiskTier, Transaction};
