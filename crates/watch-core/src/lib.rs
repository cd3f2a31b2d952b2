//! # watch-core
//!
//! Core types and utilities shared across the trainwatch telemetry crates.
//!
//! This crate provides:
//! - The scalar metric record shape handed to time-series sinks
//! - Metric name qualification by namespace tag
//! - Byte-to-GiB and percent-of-capacity conversions used by the device
//!   memory monitor
//! - Logging initialization helpers

pub mod logging;
pub mod record;
pub mod units;

// Re-export commonly used types at the crate root
pub use logging::{init_logging, LoggingConfig};
pub use record::{qualify_name, MetricRecord};
pub use units::{bytes_to_gib, pct_of_capacity, BYTES_PER_GIB};
