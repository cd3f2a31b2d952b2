//! Mock device runtime for testing

use crate::runtime::{DeviceRuntime, MemoryCounters};
use crate::{DeviceError, Result};

use std::sync::{Arc, Mutex};

#[derive(Debug)]
struct MockState {
    name: String,
    index: u32,
    capacity_bytes: u64,
    peak_active_bytes: u64,
    peak_reserved_bytes: u64,
    alloc_retries: u64,
    ooms: u64,
    peak_resets: u32,
    cache_releases: u32,
    fail_counters: bool,
}

/// In-memory device runtime for tests.
///
/// Cloning yields a handle onto the same device state, so a test can keep
/// one handle while a monitor owns another and drive the counters from
/// outside. Peak setters saturate upward, matching real peak tracking:
/// setting a value below the recorded peak leaves the peak in place.
#[derive(Debug, Clone)]
pub struct MockDeviceRuntime {
    inner: Arc<Mutex<MockState>>,
}

impl MockDeviceRuntime {
    /// Create a mock device with the given identity and capacity
    pub fn new(name: impl Into<String>, index: u32, capacity_bytes: u64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockState {
                name: name.into(),
                index,
                capacity_bytes,
                peak_active_bytes: 0,
                peak_reserved_bytes: 0,
                alloc_retries: 0,
                ooms: 0,
                peak_resets: 0,
                cache_releases: 0,
                fail_counters: false,
            })),
        }
    }

    /// Bind device `index` out of `device_count` simulated devices.
    ///
    /// Fails with [`DeviceError::Unavailable`] when no such device exists,
    /// mirroring a real backend's enumeration-and-bind path.
    pub fn bind(index: u32, device_count: u32, capacity_bytes: u64) -> Result<Self> {
        if index >= device_count {
            return Err(DeviceError::Unavailable(format!(
                "no device {} (found {} devices)",
                index, device_count
            )));
        }
        Ok(Self::new(format!("Mock Device {}", index), index, capacity_bytes))
    }

    /// Raise the recorded active peak to `bytes` if it is higher
    pub fn set_peak_active(&self, bytes: u64) {
        let mut state = self.inner.lock().unwrap();
        state.peak_active_bytes = state.peak_active_bytes.max(bytes);
    }

    /// Raise the recorded reserved peak to `bytes` if it is higher
    pub fn set_peak_reserved(&self, bytes: u64) {
        let mut state = self.inner.lock().unwrap();
        state.peak_reserved_bytes = state.peak_reserved_bytes.max(bytes);
    }

    /// Record `count` additional allocation retries
    pub fn add_alloc_retries(&self, count: u64) {
        self.inner.lock().unwrap().alloc_retries += count;
    }

    /// Record `count` additional out-of-memory events
    pub fn add_ooms(&self, count: u64) {
        self.inner.lock().unwrap().ooms += count;
    }

    /// Force subsequent counter reads to fail
    pub fn set_fail_counters(&self, fail: bool) {
        self.inner.lock().unwrap().fail_counters = fail;
    }

    /// Number of peak resets performed on this device
    pub fn peak_resets(&self) -> u32 {
        self.inner.lock().unwrap().peak_resets
    }

    /// Number of cache releases performed on this device
    pub fn cache_releases(&self) -> u32 {
        self.inner.lock().unwrap().cache_releases
    }
}

impl DeviceRuntime for MockDeviceRuntime {
    fn device_name(&self) -> String {
        self.inner.lock().unwrap().name.clone()
    }

    fn device_index(&self) -> u32 {
        self.inner.lock().unwrap().index
    }

    fn capacity_bytes(&self) -> Result<u64> {
        Ok(self.inner.lock().unwrap().capacity_bytes)
    }

    fn memory_counters(&self) -> Result<MemoryCounters> {
        let state = self.inner.lock().unwrap();
        if state.fail_counters {
            return Err(DeviceError::Runtime(
                "simulated counter read failure".to_string(),
            ));
        }
        Ok(MemoryCounters {
            peak_active_bytes: state.peak_active_bytes,
            peak_reserved_bytes: state.peak_reserved_bytes,
            alloc_retries: state.alloc_retries,
            ooms: state.ooms,
        })
    }

    fn reset_peak_counters(&mut self) -> Result<()> {
        let mut state = self.inner.lock().unwrap();
        state.peak_active_bytes = 0;
        state.peak_reserved_bytes = 0;
        state.peak_resets += 1;
        Ok(())
    }

    fn release_cached_memory(&mut self) -> Result<()> {
        self.inner.lock().unwrap().cache_releases += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peak_setters_saturate_upward() {
        let mock = MockDeviceRuntime::new("Mock Device 0", 0, 1024);
        mock.set_peak_active(512);
        mock.set_peak_active(256);

        let counters = mock.memory_counters().unwrap();
        assert_eq!(counters.peak_active_bytes, 512);
    }

    #[test]
    fn test_reset_clears_peaks_only() {
        let mut mock = MockDeviceRuntime::new("Mock Device 0", 0, 1024);
        mock.set_peak_active(512);
        mock.set_peak_reserved(768);
        mock.add_alloc_retries(2);
        mock.add_ooms(1);

        mock.reset_peak_counters().unwrap();

        let counters = mock.memory_counters().unwrap();
        assert_eq!(counters.peak_active_bytes, 0);
        assert_eq!(counters.peak_reserved_bytes, 0);
        assert_eq!(counters.alloc_retries, 2);
        assert_eq!(counters.ooms, 1);
    }

    #[test]
    fn test_bind_within_range() {
        let mock = MockDeviceRuntime::bind(1, 2, 1024).unwrap();
        assert_eq!(mock.device_index(), 1);
        assert_eq!(mock.device_name(), "Mock Device 1");
    }

    #[test]
    fn test_clone_shares_state() {
        let mock = MockDeviceRuntime::new("Mock Device 0", 0, 1024);
        let handle = mock.clone();
        handle.add_ooms(1);

        assert_eq!(mock.memory_counters().unwrap().ooms, 1);
    }
}
