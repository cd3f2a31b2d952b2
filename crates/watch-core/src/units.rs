//! Numeric conventions for device memory reporting

/// Bytes per gibibyte. GiB is the binary unit (1024^3), not the decimal
/// GB (1000^3); memory capacities and peaks are always reported in GiB.
pub const BYTES_PER_GIB: u64 = 1024 * 1024 * 1024;

/// Convert a byte count to gibibytes.
pub fn bytes_to_gib(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_GIB as f64
}

/// Express a byte count as a percentage of a capacity.
///
/// The result is not clamped: a value above 100 indicates a measurement or
/// capacity-query anomaly and must reach the caller as-is.
pub fn pct_of_capacity(bytes: u64, capacity_bytes: u64) -> f64 {
    100.0 * bytes as f64 / capacity_bytes as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gib_divisor_is_binary() {
        assert_eq!(BYTES_PER_GIB, 1_073_741_824);
        assert_eq!(bytes_to_gib(1_073_741_824), 1.0);
        assert_eq!(bytes_to_gib(0), 0.0);
        assert_eq!(bytes_to_gib(8 * BYTES_PER_GIB), 8.0);
    }

    #[test]
    fn test_pct_bounds() {
        let capacity = 16 * BYTES_PER_GIB;
        assert_eq!(pct_of_capacity(0, capacity), 0.0);
        assert_eq!(pct_of_capacity(capacity, capacity), 100.0);
        assert_eq!(pct_of_capacity(8 * BYTES_PER_GIB, capacity), 50.0);
    }

    #[test]
    fn test_pct_above_capacity_not_clamped() {
        let capacity = 8 * BYTES_PER_GIB;
        assert_eq!(pct_of_capacity(16 * BYTES_PER_GIB, capacity), 200.0);
    }
}
