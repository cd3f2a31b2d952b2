//! Device runtime boundary

use crate::Result;

/// Allocator-level memory counters read from a bound device.
///
/// The peak fields cover the window since the last peak reset; the retry and
/// OOM counts are cumulative since the device binding was created and are
/// not affected by peak resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryCounters {
    /// Peak active bytes since the last peak reset
    pub peak_active_bytes: u64,

    /// Peak reserved bytes since the last peak reset
    pub peak_reserved_bytes: u64,

    /// Allocation retries since the binding was created
    pub alloc_retries: u64,

    /// Out-of-memory events since the binding was created
    pub ooms: u64,
}

/// Trait implemented by device runtime backends.
///
/// A value of this type represents one already-bound device; enumeration and
/// binding by identifier happen in the backend constructor, which reports a
/// missing device or an uninitializable runtime as
/// [`DeviceError::Unavailable`](crate::DeviceError::Unavailable).
pub trait DeviceRuntime: Send {
    /// Device name as reported by the driver
    fn device_name(&self) -> String;

    /// Stable index of the bound device
    fn device_index(&self) -> u32;

    /// Total device memory in bytes
    fn capacity_bytes(&self) -> Result<u64>;

    /// Read the current peak-usage and allocator-event counters
    fn memory_counters(&self) -> Result<MemoryCounters>;

    /// Zero the device's peak-usage tracking. Cumulative retry/OOM counters
    /// are unaffected.
    fn reset_peak_counters(&mut self) -> Result<()>;

    /// Return cached-but-unused allocator memory to the device
    fn release_cached_memory(&mut self) -> Result<()>;
}
