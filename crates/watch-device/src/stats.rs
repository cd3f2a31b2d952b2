//! Per-sample memory statistics

use serde::Serialize;

/// One sample of device memory usage and allocator health.
///
/// Produced fresh by every [`snapshot`](crate::DeviceMemoryMonitor::snapshot)
/// call; immutable once returned.
/// GiB fields use the binary 1024^3 divisor and percentage fields are
/// relative to the capacity captured when the monitor was constructed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryStatsSnapshot {
    /// Peak active memory in GiB since the last peak reset
    pub max_active_gib: f64,

    /// Peak active memory as a percentage of device capacity
    pub max_active_pct: f64,

    /// Peak reserved memory in GiB since the last peak reset
    pub max_reserved_gib: f64,

    /// Peak reserved memory as a percentage of device capacity
    pub max_reserved_pct: f64,

    /// Allocation retries since the device binding was created
    pub num_alloc_retries: u64,

    /// Out-of-memory events since the device binding was created
    pub num_ooms: u64,
}

impl MemoryStatsSnapshot {
    /// Flatten the snapshot into named scalar entries, ready to extend the
    /// metric map handed to a metric emitter.
    pub fn to_metrics(&self) -> Vec<(String, f64)> {
        vec![
            ("memory/max_active_gib".to_string(), self.max_active_gib),
            ("memory/max_active_pct".to_string(), self.max_active_pct),
            ("memory/max_reserved_gib".to_string(), self.max_reserved_gib),
            ("memory/max_reserved_pct".to_string(), self.max_reserved_pct),
            ("memory/num_alloc_retries".to_string(), self.num_alloc_retries as f64),
            ("memory/num_ooms".to_string(), self.num_ooms as f64),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_metrics_names_and_values() {
        let stats = MemoryStatsSnapshot {
            max_active_gib: 8.0,
            max_active_pct: 50.0,
            max_reserved_gib: 10.0,
            max_reserved_pct: 62.5,
            num_alloc_retries: 2,
            num_ooms: 1,
        };

        let metrics = stats.to_metrics();
        assert_eq!(metrics.len(), 6);
        assert!(metrics.contains(&("memory/max_active_gib".to_string(), 8.0)));
        assert!(metrics.contains(&("memory/max_active_pct".to_string(), 50.0)));
        assert!(metrics.contains(&("memory/max_reserved_gib".to_string(), 10.0)));
        assert!(metrics.contains(&("memory/max_reserved_pct".to_string(), 62.5)));
        assert!(metrics.contains(&("memory/num_alloc_retries".to_string(), 2.0)));
        assert!(metrics.contains(&("memory/num_ooms".to_string(), 1.0)));
    }
}
