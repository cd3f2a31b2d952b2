//! Device memory monitor

use crate::runtime::DeviceRuntime;
use crate::stats::MemoryStatsSnapshot;
use crate::{DeviceError, Result};

use tracing::{info, warn};
use watch_core::{bytes_to_gib, pct_of_capacity};

/// Peak-memory and allocator-health monitor for one accelerator device.
///
/// Device identity and total capacity are queried once at construction and
/// never re-queried: percentage fields are always relative to the
/// construction-time capacity, so if the device is repartitioned afterwards
/// they go stale (and can exceed 100, which is warned about rather than
/// clamped).
///
/// Peak counters on the device are shared device-level state. When several
/// monitors in one process bind the same physical device, a
/// [`reset_peak`](Self::reset_peak) by any of them restarts the peak window
/// seen by all; callers sharing a device must agree on a single reset
/// authority.
pub struct DeviceMemoryMonitor {
    runtime: Box<dyn DeviceRuntime>,
    device_name: String,
    device_index: u32,
    capacity_bytes: u64,
    capacity_gib: f64,
}

impl DeviceMemoryMonitor {
    /// Bind the monitor to a device runtime.
    ///
    /// Queries and caches the device name, index, and total capacity, then
    /// resets the device's peak counters and releases cached-but-unused
    /// allocator memory so the first snapshot reflects activity strictly
    /// after construction.
    pub fn new(mut runtime: Box<dyn DeviceRuntime>) -> Result<Self> {
        let device_name = runtime.device_name();
        let device_index = runtime.device_index();

        let capacity_bytes = runtime.capacity_bytes()?;
        if capacity_bytes == 0 {
            return Err(DeviceError::Unavailable(format!(
                "device {} ({}) reported zero memory capacity",
                device_index, device_name
            )));
        }
        let capacity_gib = bytes_to_gib(capacity_bytes);

        runtime.reset_peak_counters()?;
        runtime.release_cached_memory()?;

        info!(
            "monitoring device memory: {} ({}) with {:.2}GiB capacity",
            device_name, device_index, capacity_gib
        );

        Ok(Self {
            runtime,
            device_name,
            device_index,
            capacity_bytes,
            capacity_gib,
        })
    }

    /// Sample peak memory usage since the last peak reset, plus cumulative
    /// allocator-distress counters.
    ///
    /// Resets nothing; repeated calls without an intervening
    /// [`reset_peak`](Self::reset_peak) return non-decreasing peaks.
    /// Allocator distress (retries or OOM events) is warned about here, at
    /// sample time, so the warnings appear in causal order with the step
    /// that triggered them.
    pub fn snapshot(&self) -> Result<MemoryStatsSnapshot> {
        let counters = self.runtime.memory_counters()?;

        let stats = MemoryStatsSnapshot {
            max_active_gib: bytes_to_gib(counters.peak_active_bytes),
            max_active_pct: pct_of_capacity(counters.peak_active_bytes, self.capacity_bytes),
            max_reserved_gib: bytes_to_gib(counters.peak_reserved_bytes),
            max_reserved_pct: pct_of_capacity(counters.peak_reserved_bytes, self.capacity_bytes),
            num_alloc_retries: counters.alloc_retries,
            num_ooms: counters.ooms,
        };

        if stats.num_alloc_retries > 0 {
            warn!(
                "{} memory allocation retries on {}",
                stats.num_alloc_retries, self.device_name
            );
        }
        if stats.num_ooms > 0 {
            warn!("{} out-of-memory events on {}", stats.num_ooms, self.device_name);
        }
        if stats.max_active_pct > 100.0 || stats.max_reserved_pct > 100.0 {
            warn!(
                "peak memory on {} exceeds construction-time capacity \
                 (active {:.1}%, reserved {:.1}%)",
                self.device_name, stats.max_active_pct, stats.max_reserved_pct
            );
        }

        Ok(stats)
    }

    /// Restart the peak window: the next snapshot measures peaks from this
    /// point forward. Cumulative retry/OOM counters are untouched.
    pub fn reset_peak(&mut self) -> Result<()> {
        self.runtime.reset_peak_counters()
    }

    /// Device name as reported by the driver
    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Index of the bound device
    pub fn device_index(&self) -> u32 {
        self.device_index
    }

    /// Total device memory in bytes, captured at construction
    pub fn capacity_bytes(&self) -> u64 {
        self.capacity_bytes
    }

    /// Total device memory in GiB, captured at construction
    pub fn capacity_gib(&self) -> f64 {
        self.capacity_gib
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockDeviceRuntime;
    use watch_core::BYTES_PER_GIB;

    fn monitor_with_mock(capacity_bytes: u64) -> (DeviceMemoryMonitor, MockDeviceRuntime) {
        let mock = MockDeviceRuntime::new("Mock Device 0", 0, capacity_bytes);
        let monitor = DeviceMemoryMonitor::new(Box::new(mock.clone())).unwrap();
        (monitor, mock)
    }

    #[test]
    fn test_construction_caches_identity_and_capacity() {
        let (monitor, _mock) = monitor_with_mock(16 * BYTES_PER_GIB);
        assert_eq!(monitor.device_name(), "Mock Device 0");
        assert_eq!(monitor.device_index(), 0);
        assert_eq!(monitor.capacity_bytes(), 16 * BYTES_PER_GIB);
        assert_eq!(monitor.capacity_gib(), 16.0);
    }

    #[test]
    fn test_construction_resets_peaks_and_releases_cache() {
        let mock = MockDeviceRuntime::new("Mock Device 0", 0, 16 * BYTES_PER_GIB);
        mock.set_peak_active(4 * BYTES_PER_GIB);

        let monitor = DeviceMemoryMonitor::new(Box::new(mock.clone())).unwrap();
        assert_eq!(mock.peak_resets(), 1);
        assert_eq!(mock.cache_releases(), 1);

        // First snapshot reflects activity strictly after construction
        let stats = monitor.snapshot().unwrap();
        assert_eq!(stats.max_active_gib, 0.0);
        assert_eq!(stats.num_alloc_retries, 0);
        assert_eq!(stats.num_ooms, 0);
    }

    #[test]
    fn test_zero_capacity_is_unavailable() {
        let mock = MockDeviceRuntime::new("Mock Device 0", 0, 0);
        let result = DeviceMemoryMonitor::new(Box::new(mock));
        assert!(matches!(result, Err(DeviceError::Unavailable(_))));
    }

    #[test]
    fn test_bind_out_of_range_is_unavailable() {
        let result = MockDeviceRuntime::bind(3, 2, 16 * BYTES_PER_GIB);
        assert!(matches!(result, Err(DeviceError::Unavailable(_))));
    }

    #[test]
    fn test_snapshot_math() {
        let (monitor, mock) = monitor_with_mock(16 * BYTES_PER_GIB);
        mock.set_peak_active(8_589_934_592); // 8 GiB
        mock.set_peak_reserved(10 * BYTES_PER_GIB);

        let stats = monitor.snapshot().unwrap();
        assert_eq!(stats.max_active_gib, 8.0);
        assert_eq!(stats.max_active_pct, 50.0);
        assert_eq!(stats.max_reserved_gib, 10.0);
        assert_eq!(stats.max_reserved_pct, 62.5);
    }

    #[test]
    fn test_peaks_are_non_decreasing_between_resets() {
        let (monitor, mock) = monitor_with_mock(16 * BYTES_PER_GIB);

        mock.set_peak_active(4 * BYTES_PER_GIB);
        let first = monitor.snapshot().unwrap();
        assert_eq!(first.max_active_gib, 4.0);

        // Lower instantaneous usage must not shrink the recorded peak
        mock.set_peak_active(2 * BYTES_PER_GIB);
        let second = monitor.snapshot().unwrap();
        assert_eq!(second.max_active_gib, 4.0);
    }

    #[test]
    fn test_reset_peak_restarts_window_but_keeps_distress_counters() {
        let (mut monitor, mock) = monitor_with_mock(16 * BYTES_PER_GIB);

        mock.set_peak_active(8 * BYTES_PER_GIB);
        mock.add_alloc_retries(3);
        mock.add_ooms(1);

        let before = monitor.snapshot().unwrap();
        assert_eq!(before.max_active_gib, 8.0);
        assert_eq!(before.num_alloc_retries, 3);
        assert_eq!(before.num_ooms, 1);

        monitor.reset_peak().unwrap();

        let after = monitor.snapshot().unwrap();
        assert!(after.max_active_gib <= before.max_active_gib);
        assert_eq!(after.max_active_gib, 0.0);
        assert_eq!(after.num_alloc_retries, 3);
        assert_eq!(after.num_ooms, 1);
    }

    #[test]
    fn test_counter_failure_propagates() {
        let (monitor, mock) = monitor_with_mock(16 * BYTES_PER_GIB);
        mock.set_fail_counters(true);

        let result = monitor.snapshot();
        assert!(matches!(result, Err(DeviceError::Runtime(_))));
    }

    #[test]
    fn test_over_capacity_is_reported_not_clamped() {
        let (monitor, mock) = monitor_with_mock(8 * BYTES_PER_GIB);
        mock.set_peak_reserved(16 * BYTES_PER_GIB);

        let stats = monitor.snapshot().unwrap();
        assert_eq!(stats.max_reserved_pct, 200.0);
    }
}
