//! Synthetic decision latency model.
//!
//! Latencies are modeled constants rather than measurements: the fast
//! path costs a fixed cache lookup, the slow path grows with the scan
//! length and the neighbor count. The model is deterministic so repeated
//! runs produce identical decisions.

/// Deterministic latency estimates for the two decision paths.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LatencyModel {
    /// Fast-path (static lookup) cost, microseconds.
    pub fast_us: u64,
    /// Slow-path fixed overhead, microseconds.
    pub slow_base_us: u64,
    /// Slow-path per-stored-record scan cost, nanoseconds.
    pub slow_per_record_ns: u64,
    /// Slow-path per-neighbor aggregation cost, microseconds.
    pub slow_per_neighbor_us: u64,
}

impl Default for LatencyModel {
    fn default() -> Self {
        Self {
            fast_us: 1_200,
            slow_base_us: 12_000,
            slow_per_record_ns: 1_500,
            slow_per_neighbor_us: 400,
        }
    }
}

impl LatencyModel {
    /// Estimated fast-path latency, microseconds.
    pub fn fast(&self) -> u64 {
        self.fast_us
    }

    /// Estimated slow-path latency for a scan over `store_len` records
    /// returning `k` neighbors, microseconds.
    pub fn slow(&self, store_len: usize, k: usize) -> u64 {
        self.slow_base_us
            + (store_len as u64 * self.slow_per_record_ns) / 1_000
            + k as u64 * self.slow_per_neighbor_us
    }
}
