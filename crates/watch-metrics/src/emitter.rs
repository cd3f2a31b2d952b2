//! Metric emitter

use crate::sink::MetricSink;
use std::collections::HashMap;
use tracing::warn;
use watch_core::{qualify_name, MetricRecord};

/// Whether the emitter has a live sink.
///
/// Disabled is a distinct, exhaustively-handled state rather than a null
/// sink reference: `log` on a disabled emitter is a deliberate no-op, not a
/// skipped null check.
enum SinkState {
    Disabled,
    Enabled(Box<dyn MetricSink>),
}

/// Forwards named scalar metrics to an injected time-series sink.
///
/// Metric names are qualified with the optional namespace tag
/// (`"{tag}/{key}"`). The step passed to [`log`](Self::log) must be
/// non-decreasing across calls for the sink's time axis to stay meaningful;
/// that is a caller contract the emitter does not validate.
pub struct MetricEmitter {
    namespace: Option<String>,
    sink: SinkState,
}

impl MetricEmitter {
    /// Create an emitter with a live sink
    pub fn new(sink: Box<dyn MetricSink>, namespace: Option<String>) -> Self {
        Self {
            namespace,
            sink: SinkState::Enabled(sink),
        }
    }

    /// Create a disabled emitter: every `log` call is a no-op and no sink
    /// resource is ever opened
    pub fn disabled() -> Self {
        Self {
            namespace: None,
            sink: SinkState::Disabled,
        }
    }

    /// Whether a sink is currently attached
    pub fn is_enabled(&self) -> bool {
        matches!(self.sink, SinkState::Enabled(_))
    }

    /// Forward each metric entry to the sink as a qualified record at
    /// `step`.
    ///
    /// Entries are forwarded in no particular order. Never raises:
    /// observability must not crash the host workload, so a disabled or
    /// closed emitter drops the call silently.
    pub fn log(&mut self, metrics: &HashMap<String, f64>, step: u64) {
        let sink = match &mut self.sink {
            SinkState::Enabled(sink) => sink,
            SinkState::Disabled => return,
        };

        for (key, value) in metrics {
            let name = qualify_name(self.namespace.as_deref(), key);
            sink.write(MetricRecord::new(name, *value, step));
        }
    }

    /// Flush and release the sink.
    ///
    /// Idempotent; afterwards the emitter behaves as disabled, so `log`
    /// calls racing a shutdown are dropped rather than erroring.
    pub fn close(&mut self) {
        if let SinkState::Enabled(mut sink) =
            std::mem::replace(&mut self.sink, SinkState::Disabled)
        {
            if let Err(e) = sink.flush_and_close() {
                warn!("failed to close metric sink: {}", e);
            }
        }
    }
}
