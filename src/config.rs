//! Configuration management for the fraud scoring service

use crate::types::RiskPolicy;
use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub artifacts: ArtifactsConfig,
    pub detection: DetectionConfig,
    #[serde(default)]
    pub audit: AuditConfig,
    pub logging: LoggingConfig,
}

/// Serving-artifact locations
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactsConfig {
    /// Path to the classifier exported to ONNX
    pub model_path: String,
    /// Path to the fitted scaler parameters (JSON)
    pub scaler_path: String,
    /// Path to the ordered feature-name list (JSON)
    pub feature_names_path: String,
    /// Number of threads for ONNX inference (default: 1)
    #[serde(default = "default_onnx_threads")]
    pub onnx_threads: usize,
}

fn default_onnx_threads() -> usize {
    1
}

/// Detection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DetectionConfig {
    /// Decision threshold the classifier applies for its binary prediction
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Risk-tier policy: "standard" (4-tier) or "granular" (5-tier)
    #[serde(default)]
    pub risk_policy: RiskPolicy,
}

fn default_threshold() -> f64 {
    0.5
}

/// Prediction log configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    /// Whether to append scored transactions to the prediction log
    #[serde(default)]
    pub enabled: bool,
    /// CSV file the log is appended to
    #[serde(default = "default_log_path")]
    pub log_path: String,
}

fn default_log_path() -> String {
    "data/predictions_log.csv".to_string()
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_path: default_log_path(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            artifacts: ArtifactsConfig {
                model_path: "models/fraud_detector.onnx".to_string(),
                scaler_path: "models/scaler.json".to_string(),
                feature_names_path: "models/feature_names.json".to_string(),
                onnx_threads: 1,
            },
            detection: DetectionConfig {
                threshold: 0.5,
                risk_policy: RiskPolicy::Standard,
            },
            audit: AuditConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}
