//! Transaction data structures for credit card fraud detection

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A transaction to be scored, as a sparse map of named numeric fields.
///
/// Callers may supply any subset of the model's features (`Time`, `V1`..`V28`,
/// `Amount` for this dataset). Missing fields are filled with 0.0 during
/// alignment and unknown keys are ignored, so arbitrary JSON objects
/// deserialize directly into this type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transaction {
    fields: HashMap<String, f64>,
}

impl Transaction {
    /// Create an empty transaction.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field setter.
    pub fn with_field(mut self, name: &str, value: f64) -> Self {
        self.fields.insert(name.to_string(), value);
        self
    }

    /// Set a named field.
    pub fn set(&mut self, name: &str, value: f64) {
        self.fields.insert(name.to_string(), value);
    }

    /// Look up a named field.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.fields.get(name).copied()
    }

    /// Number of fields supplied by the caller.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over the supplied (name, value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.fields.iter().map(|(k, &v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, f64)> for Transaction {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}
