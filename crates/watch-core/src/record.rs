//! Scalar metric records forwarded to time-series sinks

use serde::Serialize;

/// One named scalar observation on a run's step axis.
///
/// This is the only shape shared between the device monitor and the metric
/// emitter: the monitor produces values that a caller folds into a metric
/// map, and the emitter forwards each entry to its sink as one of these.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRecord {
    /// Fully qualified metric name (namespace tag already applied)
    pub name: String,

    /// Observed value
    pub value: f64,

    /// Step index on the run's time axis
    pub step: u64,
}

impl MetricRecord {
    /// Create a new record with an already-qualified name
    pub fn new(name: impl Into<String>, value: f64, step: u64) -> Self {
        Self {
            name: name.into(),
            value,
            step,
        }
    }
}

/// Qualify a metric key with an optional namespace tag.
///
/// With a tag the result is `"{tag}/{key}"`; without one the key passes
/// through unchanged.
pub fn qualify_name(namespace: Option<&str>, key: &str) -> String {
    match namespace {
        Some(tag) => format!("{}/{}", tag, key),
        None => key.to_string(),
    }
}
