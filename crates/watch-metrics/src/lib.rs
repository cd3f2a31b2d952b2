//! # watch-metrics
//!
//! Scalar metric emission for trainwatch.
//!
//! This crate provides:
//! - [`MetricEmitter`], which forwards `name -> value` maps at a step index
//!   to an injected time-series sink, qualifying names with an optional
//!   namespace tag
//! - [`MetricSink`], the boundary trait sinks implement
//! - [`JsonlSink`], a JSON-lines file sink with a bounded drop-oldest queue
//!   and a background writer thread
//! - [`MetricsConfig`] and [`build_metric_emitter`] for wiring an emitter
//!   into a run's output directory layout
//!
//! A disabled emitter is a first-class state: `log` becomes a no-op and no
//! sink resource is ever opened.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::collections::HashMap;
//! use watch_metrics::{build_metric_emitter, MetricsConfig};
//!
//! # fn main() -> watch_metrics::Result<()> {
//! let config = MetricsConfig::default();
//! let mut emitter = build_metric_emitter(&config, "rank_0", Some("train".to_string()))?;
//!
//! let mut metrics = HashMap::new();
//! metrics.insert("loss".to_string(), 1.23);
//! emitter.log(&metrics, 5);
//!
//! emitter.close();
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;
use tracing::info;

pub mod emitter;
pub mod jsonl;
pub mod sink;

// In-memory capture sink for testing
#[cfg(any(feature = "mock", test))]
pub mod memory;

// Re-export commonly used types
pub use emitter::MetricEmitter;
pub use jsonl::JsonlSink;
pub use sink::MetricSink;
pub use watch_core::MetricRecord;

#[cfg(any(feature = "mock", test))]
pub use memory::MemorySink;

/// Result type for metric emission operations
pub type Result<T> = std::result::Result<T, MetricsError>;

/// Errors that can occur while setting up or tearing down metric emission
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// The sink destination could not be prepared at construction time
    #[error("sink initialization failed: {0}")]
    SinkInit(String),

    /// Invalid emitter configuration
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Configuration for metric emission
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MetricsConfig {
    /// Enable metric emission; when false the emitter is a no-op and no
    /// sink resource is opened
    pub enabled: bool,

    /// Root output directory of the run
    pub dump_dir: PathBuf,

    /// Folder under `dump_dir` holding scalar files
    pub save_folder: String,

    /// Sink queue depth; when full, the oldest pending record is dropped
    pub queue_capacity: usize,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dump_dir: PathBuf::from("./outputs"),
            save_folder: "metrics".to_string(),
            queue_capacity: 1000,
        }
    }
}

impl MetricsConfig {
    /// Validate the configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.save_folder.is_empty() {
            return Err("save folder must not be empty".to_string());
        }
        if self.queue_capacity == 0 {
            return Err("queue capacity must be greater than zero".to_string());
        }
        Ok(())
    }
}

/// Build a metric emitter for one worker of a run.
///
/// With `enabled: false` this is a cheap, side-effect-free path that opens
/// nothing. Otherwise the scalar file lands at
/// `{dump_dir}/{save_folder}/{YYYYmmdd-HHMM}/{worker}/scalars.jsonl`; the
/// minute-resolution timestamp identifies the run and `worker` is a
/// pre-resolved identity string such as `"rank_0"` (rank discovery happens
/// upstream, not here).
pub fn build_metric_emitter(
    config: &MetricsConfig,
    worker: &str,
    namespace: Option<String>,
) -> Result<MetricEmitter> {
    if !config.enabled {
        return Ok(MetricEmitter::disabled());
    }
    config.validate().map_err(MetricsError::Config)?;

    // No run id is known yet at this point, so the current minute stands in
    let run_id = chrono::Local::now().format("%Y%m%d-%H%M").to_string();
    let path = config
        .dump_dir
        .join(&config.save_folder)
        .join(run_id)
        .join(worker)
        .join("scalars.jsonl");

    let sink = JsonlSink::create(&path, config.queue_capacity)?;
    info!("metrics logging active, scalars saved at {}", path.display());

    Ok(MetricEmitter::new(Box::new(sink), namespace))
}
