//! Per-lap summary structures exported to external collaborators.
//!
//! These are the hand-off records consumed by the study's plotting and
//! report tooling. They serialize as plain nested JSON; no byte-level
//! wire format is fixed here.

use apex_core::{LapId, SectorId};
use apex_synth::{AnomalyType, Weather};
use serde::Serialize;

/// Aggregates for one sector of a simulated lap.
///
/// `fallback_frames` is a subset of `slow_frames`;
/// `fast_frames + slow_frames == frames`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SectorSummary {
    /// The sector's configured id.
    pub sector_id: SectorId,
    /// The sector's display name.
    pub sector_name: String,
    /// Frames simulated in this sector.
    pub frames: u64,
    /// Mean synthesized speed, km/h.
    pub avg_speed_kmh: f64,
    /// Mean routing confidence.
    pub avg_confidence: f64,
    /// Frames resolved on the fast path.
    pub fast_frames: u64,
    /// Frames resolved on the slow path (including fallbacks).
    pub slow_frames: u64,
    /// Slow frames caused by a fast-path miss.
    pub fallback_frames: u64,
    /// The anomaly active in this sector, if one was drawn.
    pub anomaly: Option<AnomalyType>,
}

/// Whole-lap performance metrics.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PerformanceMetrics {
    /// Simulated lap time: frames over the sample rate, plus the
    /// weather's lap-time penalty.
    pub total_lap_time_s: f64,
    /// Percentage of frames resolved on the fast path.
    pub fast_path_usage_pct: f64,
    /// Percentage of frames resolved on the slow path.
    pub slow_path_usage_pct: f64,
    /// Fast-path misses recovered through the slow path.
    pub fallback_count: u64,
    /// Mean routing confidence across the lap.
    pub avg_decision_confidence: f64,
    /// Mean synthetic decision latency, milliseconds.
    pub avg_synthetic_latency_ms: f64,
}

/// Complete summary of one simulated lap.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LapSummary {
    /// The lap's identifier within the run.
    pub lap_id: LapId,
    /// Weather the lap was run under.
    pub weather: Weather,
    /// Total frames simulated.
    pub total_frames: u64,
    /// Per-sector aggregates in track order.
    pub per_sector_telemetry: Vec<SectorSummary>,
    /// Whole-lap performance metrics.
    pub performance_metrics: PerformanceMetrics,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_serializes_as_nested_json() {
        let summary = LapSummary {
            lap_id: LapId(3),
            weather: Weather::Cloudy,
            total_frames: 90,
            per_sector_telemetry: vec![SectorSummary {
                sector_id: SectorId::from("S1"),
                sector_name: "Front Straight".to_string(),
                frames: 30,
                avg_speed_kmh: 238.2,
                avg_confidence: 0.91,
                fast_frames: 28,
                slow_frames: 2,
                fallback_frames: 0,
                anomaly: None,
            }],
            performance_metrics: PerformanceMetrics {
                total_lap_time_s: 2.4,
                fast_path_usage_pct: 93.3,
                slow_path_usage_pct: 6.7,
                fallback_count: 0,
                avg_decision_confidence: 0.9,
                avg_synthetic_latency_ms: 2.1,
            },
        };

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["lap_id"], 3);
        assert_eq!(json["weather"], "Cloudy");
        assert_eq!(json["per_sector_telemetry"][0]["sector_id"], "S1");
        assert_eq!(json["performance_metrics"]["fallback_count"], 0);
    }
}
