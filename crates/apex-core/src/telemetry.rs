//! The per-frame telemetry record.

use crate::embedding::Embedding;
use crate::id::SectorId;

/// Tire surface temperatures per wheel, degrees Celsius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TireTemps {
    /// Front left.
    pub fl: f64,
    /// Front right.
    pub fr: f64,
    /// Rear left.
    pub rl: f64,
    /// Rear right.
    pub rr: f64,
}

/// Suspension travel per wheel, millimeters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SuspensionTravel {
    /// Front left.
    pub fl: f64,
    /// Front right.
    pub fr: f64,
    /// Rear left.
    pub rl: f64,
    /// Rear right.
    pub rr: f64,
}

/// A single telemetry measurement frame.
///
/// Created by the telemetry synthesizer and immutable once created. The
/// synthesizer fills the embedding with a placeholder; the frame encoder
/// stamps the real embedding (and the decision confidence) before the
/// record enters the similarity store.
#[derive(Clone, Debug, PartialEq)]
pub struct TelemetryRecord {
    /// Seconds into the lap.
    pub timestamp_s: f64,
    /// Sector the frame was captured in.
    pub sector: SectorId,
    /// Ground speed, km/h.
    pub speed_kmh: f64,
    /// Ground speed, m/s.
    pub speed_ms: f64,
    /// Lean angle, degrees from vertical.
    pub lean_angle_deg: f64,
    /// Longitudinal acceleration, g. Negative under braking.
    pub accel_long_g: f64,
    /// Lateral acceleration, g.
    pub accel_lat_g: f64,
    /// Throttle position, percent.
    pub throttle_pct: f64,
    /// Brake pressure, percent.
    pub brake_pct: f64,
    /// Tire surface temperatures.
    pub tire_temps_c: TireTemps,
    /// Suspension travel per wheel.
    pub suspension_mm: SuspensionTravel,
    /// GPS latitude, degrees.
    pub gps_lat: f64,
    /// GPS longitude, degrees.
    pub gps_lon: f64,
    /// Visual embedding of the frame.
    pub embedding: Embedding,
    /// Confidence attached at capture time, in `[0, 1]`.
    pub confidence: f64,
}

impl TelemetryRecord {
    /// Copy of this record with the embedding replaced.
    pub fn with_embedding(mut self, embedding: Embedding) -> Self {
        self.embedding = embedding;
        self
    }

    /// Copy of this record with the capture confidence replaced.
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }
}
