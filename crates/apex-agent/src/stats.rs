//! Running decision statistics.

use serde::Serialize;

use crate::decision::{Decision, Path};

/// Cumulative counters across decisions.
///
/// An explicit object owned by the orchestrator (or a lap-local copy in
/// the driver) rather than global state, so tests and callers can read,
/// reset, and merge counters freely. Fallback routings are a subset of
/// `slow`, counted separately so fast-path misses stay observable.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DecisionStats {
    /// Total decisions recorded.
    pub decisions: u64,
    /// Decisions resolved on the fast path.
    pub fast: u64,
    /// Decisions resolved on the slow path (including fallbacks).
    pub slow: u64,
    /// Slow routings caused by a fast-path miss.
    pub fallbacks: u64,
    /// Sum of decision confidences, for averaging.
    pub confidence_sum: f64,
    /// Sum of synthetic latencies, microseconds, for averaging.
    pub latency_us_sum: u64,
}

impl DecisionStats {
    /// Fold one decision into the counters.
    pub fn record(&mut self, decision: &Decision) {
        self.decisions += 1;
        match decision.path {
            Path::Fast => self.fast += 1,
            Path::Slow => {
                self.slow += 1;
                if decision.fallback {
                    self.fallbacks += 1;
                }
            }
        }
        self.confidence_sum += decision.confidence;
        self.latency_us_sum += decision.latency_us;
    }

    /// Merge another stats object into this one.
    pub fn merge(&mut self, other: &DecisionStats) {
        self.decisions += other.decisions;
        self.fast += other.fast;
        self.slow += other.slow;
        self.fallbacks += other.fallbacks;
        self.confidence_sum += other.confidence_sum;
        self.latency_us_sum += other.latency_us_sum;
    }

    /// Percentage of decisions on the fast path. 0.0 before any decision.
    pub fn fast_pct(&self) -> f64 {
        self.pct(self.fast)
    }

    /// Percentage of decisions on the slow path. 0.0 before any decision.
    pub fn slow_pct(&self) -> f64 {
        self.pct(self.slow)
    }

    /// Mean decision confidence. 0.0 before any decision.
    pub fn avg_confidence(&self) -> f64 {
        if self.decisions == 0 {
            0.0
        } else {
            self.confidence_sum / self.decisions as f64
        }
    }

    /// Mean synthetic latency, milliseconds. 0.0 before any decision.
    pub fn avg_latency_ms(&self) -> f64 {
        if self.decisions == 0 {
            0.0
        } else {
            self.latency_us_sum as f64 / self.decisions as f64 / 1_000.0
        }
    }

    fn pct(&self, count: u64) -> f64 {
        if self.decisions == 0 {
            0.0
        } else {
            count as f64 / self.decisions as f64 * 100.0
        }
    }
}
