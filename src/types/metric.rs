//! Scalar metric results
//!
//! `value` is NaN when the metric cannot be computed; the reason code
//! says why. NaN serializes as JSON `null`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::types::MetricReason;

/// A metric value with its reason code
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricResult {
    /// Metric value, NaN if it cannot be computed
    #[serde(with = "nan_as_null")]
    pub value: f64,
    pub reason: MetricReason,
    /// How many samples (branches, authors, pooled nodes...) fed the value
    pub samples: usize,
}

impl MetricResult {
    /// A computed value
    pub fn computed(value: f64, reason: MetricReason, samples: usize) -> Self {
        Self { value, reason, samples }
    }

    /// A sentinel value
    pub fn sentinel(value: f64, reason: MetricReason) -> Self {
        Self { value, reason, samples: 0 }
    }

    /// Value is a number (may still be a forced 0.0)
    pub fn is_known(&self) -> bool {
        !self.value.is_nan()
    }

    /// Value as an option, `None` for NaN
    pub fn as_option(&self) -> Option<f64> {
        self.is_known().then_some(self.value)
    }

    /// Format for display
    pub fn display_value(&self) -> String {
        match self.as_option() {
            Some(v) => format!("{:.3}", v),
            None => "n/a".to_string(),
        }
    }
}

/// Serde adapter mapping NaN <-> null
pub mod nan_as_null {
    use super::*;

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_some(value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
    }
}
