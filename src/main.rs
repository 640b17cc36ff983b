//! Fraud Scoring - Main Entry Point
//!
//! Command-line front end for the scoring service. Loads the serving
//! artifacts once, then scores a single JSON transaction, a CSV batch, or a
//! set of canned demo transactions.
//!
//! Usage:
//!     fraud-scoring predict '<json object>'
//!     fraud-scoring batch <input.csv> [output.csv]
//!     fraud-scoring demo

use anyhow::{bail, Context, Result};
use fraud_scoring::{
    config::AppConfig, service::FraudDetector, types::PredictionResult, types::Transaction,
};
use serde::Serialize;
use std::path::Path;
use tracing::info;

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fraud_scoring=info".parse()?),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let mode = args.get(1).map(|s| s.as_str()).unwrap_or("demo");

    info!("Starting fraud scoring service");

    // Load configuration and serving artifacts
    let config = AppConfig::load()?;
    let detector = FraudDetector::from_config(&config)
        .context("failed to initialize detector; train and export the model first")?;

    match mode {
        "predict" => {
            let payload = args
                .get(2)
                .context("usage: fraud-scoring predict '<json object>'")?;
            let tx: Transaction =
                serde_json::from_str(payload).context("transaction must be a JSON object")?;

            let result = detector.predict(&tx)?;
            log_prediction("transaction", &result);
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        "batch" => {
            let input = args
                .get(2)
                .context("usage: fraud-scoring batch <input.csv> [output.csv]")?;
            let txs = read_transactions_csv(input)?;
            info!(count = txs.len(), input = %input, "Loaded transactions");

            let outcome = detector.predict_batch(&txs)?;
            for (i, result) in outcome.predictions.iter().enumerate() {
                log_prediction(&format!("row {i}"), result);
            }

            let summary = &outcome.summary;
            info!(
                total = summary.total,
                fraud = summary.fraud_count,
                genuine = summary.genuine_count,
                fraud_percentage = summary.fraud_percentage,
                "Batch prediction completed"
            );

            if let Some(output) = args.get(3) {
                write_results_csv(output, &outcome.predictions)?;
                info!(output = %output, "Results saved");
            }
        }
        "demo" => {
            for (name, tx) in demo_transactions() {
                let result = detector.predict(&tx)?;
                log_prediction(name, &result);
            }
        }
        other => bail!("unknown mode '{other}'; expected predict, batch or demo"),
    }

    Ok(())
}

fn log_prediction(subject: &str, result: &PredictionResult) {
    info!(
        subject = %subject,
        prediction = ?result.label,
        fraud_probability = result.fraud_probability,
        confidence = result.confidence,
        risk_level = ?result.risk_tier,
        recommendation = %result.recommendation,
        "Prediction"
    );
}

/// Read a CSV of transactions, taking every numeric column as a named field.
fn read_transactions_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Transaction>> {
    let mut reader = csv::Reader::from_path(path.as_ref())
        .with_context(|| format!("cannot open {}", path.as_ref().display()))?;
    let headers = reader.headers()?.clone();

    let mut txs = Vec::new();
    for record in reader.records() {
        let record = record?;
        let tx: Transaction = headers
            .iter()
            .zip(record.iter())
            .filter_map(|(name, value)| {
                value
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .map(|v| (name.to_string(), v))
            })
            .collect();
        txs.push(tx);
    }

    Ok(txs)
}

#[derive(Serialize)]
struct ResultRow<'a> {
    transaction_index: usize,
    prediction: fraud_scoring::types::Label,
    fraud_probability: f64,
    confidence: f64,
    risk_level: fraud_scoring::types::RiskTier,
    recommendation: &'a str,
}

fn write_results_csv<P: AsRef<Path>>(path: P, predictions: &[PredictionResult]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path.as_ref())
        .with_context(|| format!("cannot create {}", path.as_ref().display()))?;

    for (i, result) in predictions.iter().enumerate() {
        writer.serialize(ResultRow {
            transaction_index: i,
            prediction: result.label,
            fraud_probability: result.fraud_probability,
            confidence: result.confidence,
            risk_level: result.risk_tier,
            recommendation: &result.recommendation,
        })?;
    }
    writer.flush()?;

    Ok(())
}

/// Canned transactions for demo mode. V-features not listed default to 0.
fn demo_transactions() -> Vec<(&'static str, Transaction)> {
    vec![
        (
            "small genuine purchase",
            Transaction::new()
                .with_field("Time", 1000.0)
                .with_field("Amount", 25.50)
                .with_field("V1", 0.1)
                .with_field("V2", -0.2),
        ),
        (
            "large suspicious purchase",
            Transaction::new()
                .with_field("Time", 5000.0)
                .with_field("Amount", 2500.0)
                .with_field("V1", 2.5)
                .with_field("V2", 3.1),
        ),
        (
            "medium transaction",
            Transaction::new()
                .with_field("Time", 3000.0)
                .with_field("Amount", 150.0)
                .with_field("V1", -0.5)
                .with_field("V2", 0.3),
        ),
    ]
}
