//! # watch-device
//!
//! Device-memory telemetry for accelerator-backed training workloads.
//!
//! This crate provides:
//! - [`DeviceMemoryMonitor`], which binds one accelerator device and samples
//!   peak memory usage and allocator-health counters behind a precise
//!   reset/sample protocol
//! - [`DeviceRuntime`], the boundary trait a device runtime backend
//!   implements to expose capacity, peak counters, and allocator events
//! - [`MemoryStatsSnapshot`], the per-sample value type
//!
//! Peak memory is windowed (reset explicitly via
//! [`DeviceMemoryMonitor::reset_peak`]); allocation-retry and out-of-memory
//! counts are cumulative for the lifetime of the device binding. Conflating
//! the two would hide repeated allocator distress inside a single reset
//! window, so the asymmetry is part of the contract.
//!
//! ## Example
//!
//! ```rust
//! use watch_device::{DeviceMemoryMonitor, DeviceRuntime};
//!
//! fn sample_once(runtime: Box<dyn DeviceRuntime>) -> watch_device::Result<()> {
//!     let mut monitor = DeviceMemoryMonitor::new(runtime)?;
//!
//!     let stats = monitor.snapshot()?;
//!     println!(
//!         "peak active {:.2}GiB ({:.1}% of capacity)",
//!         stats.max_active_gib, stats.max_active_pct
//!     );
//!
//!     // Restart the peak window for the next training step
//!     monitor.reset_peak()?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

pub mod monitor;
pub mod runtime;
pub mod stats;

// Mock implementation for testing
#[cfg(any(feature = "mock", test))]
pub mod mock;

// Re-export main types
pub use monitor::DeviceMemoryMonitor;
pub use runtime::{DeviceRuntime, MemoryCounters};
pub use stats::MemoryStatsSnapshot;

#[cfg(any(feature = "mock", test))]
pub use mock::MockDeviceRuntime;

/// Result type for device telemetry operations
pub type Result<T> = std::result::Result<T, DeviceError>;

/// Errors that can occur while monitoring a device
#[derive(Error, Debug)]
pub enum DeviceError {
    /// No such device, or the device runtime could not be initialized.
    /// Construction-time and fatal to the monitor.
    #[error("device unavailable: {0}")]
    Unavailable(String),

    /// A counter query or reset/release operation failed on an otherwise
    /// bound device.
    #[error("device runtime error: {0}")]
    Runtime(String),
}

impl DeviceError {
    /// Check if this error means there is no device to observe at all
    pub fn is_fatal(&self) -> bool {
        matches!(self, DeviceError::Unavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_error_properties() {
        let unavailable = DeviceError::Unavailable("no device 3".to_string());
        assert!(unavailable.is_fatal());

        let runtime = DeviceError::Runtime("counter read failed".to_string());
        assert!(!runtime.is_fatal());
    }

    #[test]
    fn test_error_display() {
        let error = DeviceError::Unavailable("no device 3".to_string());
        assert_eq!(error.to_string(), "device unavailable: no device 3");
    }
}
