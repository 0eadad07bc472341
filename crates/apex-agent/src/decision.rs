//! Decision records emitted by the orchestrator.

use serde::Serialize;

/// Which memory system resolved the decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Path {
    /// O(1) lookup against the static knowledge store.
    Fast,
    /// O(N) similarity retrieval against the history store.
    Slow,
}

/// Control values resolved for one frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ControlValues {
    /// Throttle fraction in `[0, 1]`.
    pub throttle: f64,
    /// Lean angle, degrees.
    pub lean_angle_deg: f64,
}

/// The outcome of one orchestrated decision.
///
/// Consumed synchronously by the lap driver; never mutated after
/// creation. `fallback` marks decisions that wanted the fast path but
/// were recovered through the slow path; such decisions always have
/// `path == Path::Slow`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Decision {
    /// Routing confidence in `[0, 1]`.
    pub confidence: f64,
    /// The memory system that resolved the controls.
    pub path: Path,
    /// The resolved control values.
    pub controls: ControlValues,
    /// Synthetic latency estimate, microseconds. Modeled, not measured.
    pub latency_us: u64,
    /// True when a fast-path miss was recovered by routing slow.
    pub fallback: bool,
    /// Seconds into the lap at decision time.
    pub timestamp_s: f64,
}
