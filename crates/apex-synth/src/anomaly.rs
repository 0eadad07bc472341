//! Mechanical anomaly injection.
//!
//! A lap may carry at most one anomaly: one sector is drawn and one
//! anomaly class shifts that sector's telemetry with a fixed, documented
//! signature. The draw is deterministic under the lap seed so datasets
//! regenerate identically.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::fmt;

/// Seed stream tag for anomaly draws, kept distinct from telemetry noise.
const ANOMALY_STREAM: u64 = 0x414e_4f4d_414c_5931;

/// Mechanical anomaly classes injected into synthetic laps.
///
/// Signatures applied to the affected sector's frames:
///
/// - `SuspensionChatter`: sinusoidal 17 Hz (front) / 18 Hz (rear)
///   component, amplitude 15 mm, added to suspension travel.
/// - `TireBlistering`: +25 degrees C on both rear tires.
/// - `BrakeFade`: brake pressure scaled by 0.6.
/// - `OilDebris`: speed reduced by 12 km/h, lateral acceleration by 0.3 g.
/// - `ElectricalGlitch`: throttle cut to zero on every seventh frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum AnomalyType {
    /// High-frequency suspension oscillation.
    SuspensionChatter,
    /// Overheated rear tire carcass.
    TireBlistering,
    /// Reduced brake pressure under fade.
    BrakeFade,
    /// Oil or debris on the racing line.
    OilDebris,
    /// Intermittent throttle-by-wire dropout.
    ElectricalGlitch,
}

impl AnomalyType {
    /// All anomaly classes, in draw order.
    pub const ALL: [AnomalyType; 5] = [
        AnomalyType::SuspensionChatter,
        AnomalyType::TireBlistering,
        AnomalyType::BrakeFade,
        AnomalyType::OilDebris,
        AnomalyType::ElectricalGlitch,
    ];
}

impl fmt::Display for AnomalyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SuspensionChatter => "suspension_chatter",
            Self::TireBlistering => "tire_blistering",
            Self::BrakeFade => "brake_fade",
            Self::OilDebris => "oil_debris",
            Self::ElectricalGlitch => "electrical_glitch",
        };
        write!(f, "{name}")
    }
}

/// Per-lap anomaly assignment: at most one sector is anomalous.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct AnomalyPlan {
    /// Index of the affected sector within the circuit's configured order.
    pub sector_index: usize,
    /// The anomaly class active in that sector.
    pub anomaly: AnomalyType,
}

impl AnomalyPlan {
    /// Draw the anomaly plan for one lap.
    ///
    /// With the given probability, exactly one sector (uniform) is
    /// assigned one anomaly class (uniform). The draw is a pure function
    /// of `lap_seed`, `probability`, and `sector_count`; re-running with
    /// the same inputs flags the same sector. A probability of 0.0 (or an
    /// empty circuit) never yields a plan, 1.0 always does.
    pub fn draw(lap_seed: u64, probability: f64, sector_count: usize) -> Option<AnomalyPlan> {
        if sector_count == 0 {
            return None;
        }
        let mut rng = ChaCha8Rng::seed_from_u64(lap_seed ^ ANOMALY_STREAM);
        if rng.random::<f64>() >= probability {
            return None;
        }
        let sector_index = rng.random_range(0..sector_count);
        let anomaly = AnomalyType::ALL[rng.random_range(0..AnomalyType::ALL.len())];
        Some(AnomalyPlan {
            sector_index,
            anomaly,
        })
    }
}
