//! Circuit configuration: sector profiles and startup validation.
//!
//! A [`CircuitConfig`] is the static description of a track consumed once
//! at startup. It deserializes from JSON and must pass [`validate()`]
//! before anything downstream is constructed; each structural invariant
//! maps to its own [`ConfigError`] variant.
//!
//! [`validate()`]: CircuitConfig::validate

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::ConfigError;
use crate::id::SectorId;

/// Static description of one circuit sector.
///
/// Loaded once from configuration and never mutated. The optimal control
/// values are the fast path's precomputed answers for this sector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SectorProfile {
    /// Sector identifier, unique within the circuit.
    pub id: SectorId,
    /// Human-readable name (e.g. `"Turn 4 Banking"`).
    pub name: String,
    /// Distance from the start line where the sector begins, meters.
    #[serde(rename = "distance_start")]
    pub distance_start_m: f64,
    /// Distance from the start line where the sector ends, meters.
    #[serde(rename = "distance_end")]
    pub distance_end_m: f64,
    /// Target average speed through the sector, km/h.
    pub avg_speed_kmh: f64,
    /// Banking of the track surface, degrees. Negative is off-camber.
    pub banking_degrees: f64,
    /// Maximum lean angle reached in the sector, degrees.
    pub max_lean_deg: f64,
    /// Precomputed optimal throttle fraction in `[0, 1]`.
    pub optimal_throttle: f64,
    /// Precomputed optimal lean angle, degrees.
    #[serde(rename = "optimal_lean_angle")]
    pub optimal_lean_deg: f64,
    /// Whether the sector is safety-critical (heavy banking, blind apex).
    #[serde(default)]
    pub is_critical: bool,
}

impl SectorProfile {
    /// Sector length in meters.
    pub fn length_m(&self) -> f64 {
        self.distance_end_m - self.distance_start_m
    }

    /// True when the profile describes a flat-out straight.
    pub fn is_straight(&self) -> bool {
        self.optimal_throttle >= 0.9
    }

    /// True when the sector is taken with the throttle closed.
    pub fn is_heavy_braking(&self) -> bool {
        self.optimal_throttle <= f64::EPSILON
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let id = self.id.as_str().to_string();
        if !(self.distance_end_m > self.distance_start_m) {
            return Err(ConfigError::InvalidDistanceRange {
                id,
                start_m: self.distance_start_m,
                end_m: self.distance_end_m,
            });
        }
        if !self.avg_speed_kmh.is_finite() || self.avg_speed_kmh <= 0.0 {
            return Err(ConfigError::InvalidSpeed {
                id,
                value: self.avg_speed_kmh,
            });
        }
        if !self.optimal_throttle.is_finite()
            || !(0.0..=1.0).contains(&self.optimal_throttle)
        {
            return Err(ConfigError::InvalidThrottle {
                id,
                value: self.optimal_throttle,
            });
        }
        for angle in [self.max_lean_deg, self.optimal_lean_deg] {
            if !angle.is_finite() || !(0.0..=75.0).contains(&angle) {
                return Err(ConfigError::InvalidLeanAngle {
                    id: id.clone(),
                    value: angle,
                });
            }
        }
        if !self.banking_degrees.is_finite() {
            return Err(ConfigError::InvalidBanking {
                id,
                value: self.banking_degrees,
            });
        }
        Ok(())
    }
}

/// Complete circuit description consumed at startup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CircuitConfig {
    /// Circuit name.
    pub name: String,
    /// Geographic location, informational only.
    #[serde(default)]
    pub location: String,
    /// Total circuit length, kilometers.
    pub length_km: f64,
    /// Sector list in track order.
    pub sectors: Vec<SectorProfile>,
}

impl CircuitConfig {
    /// Parse and validate a circuit description from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed JSON and any
    /// validation variant from [`validate()`](CircuitConfig::validate).
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all structural invariants.
    ///
    /// One check per invariant: non-empty sector list, unique ids,
    /// increasing distance ranges, finite positive speeds, throttle in
    /// `[0, 1]`, lean angles in `[0, 75]`, finite banking.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant as a [`ConfigError`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sectors.is_empty() {
            return Err(ConfigError::NoSectors);
        }
        let mut seen = HashSet::new();
        for sector in &self.sectors {
            if !seen.insert(&sector.id) {
                return Err(ConfigError::DuplicateSector {
                    id: sector.id.as_str().to_string(),
                });
            }
            sector.validate()?;
        }
        Ok(())
    }

    /// The built-in 8-sector Aspar Circuit (Valencia, 3.2 km).
    ///
    /// Used when no circuit file is supplied. Sector targets and optimal
    /// control values match the study's reference circuit.
    pub fn aspar() -> Self {
        fn sector(
            id: &str,
            name: &str,
            start_m: f64,
            end_m: f64,
            speed: f64,
            banking: f64,
            max_lean: f64,
            throttle: f64,
            lean: f64,
            critical: bool,
        ) -> SectorProfile {
            SectorProfile {
                id: SectorId::from(id),
                name: name.to_string(),
                distance_start_m: start_m,
                distance_end_m: end_m,
                avg_speed_kmh: speed,
                banking_degrees: banking,
                max_lean_deg: max_lean,
                optimal_throttle: throttle,
                optimal_lean_deg: lean,
                is_critical: critical,
            }
        }

        Self {
            name: "Aspar Circuit".to_string(),
            location: "Valencia, Spain".to_string(),
            length_km: 3.2,
            sectors: vec![
                sector("Sector_1", "Main Straight", 0.0, 600.0, 240.0, 0.0, 5.0, 0.95, 5.0, false),
                sector("Sector_2", "Turn 1 Braking", 600.0, 780.0, 95.0, 2.5, 45.0, 0.0, 45.0, false),
                sector("Sector_3", "Turn 2 Apex", 780.0, 1000.0, 120.0, 0.0, 62.0, 0.3, 62.0, false),
                sector("Sector_4", "Turn 4 Banking", 1000.0, 1450.0, 210.0, 15.0, 48.0, 0.7, 48.0, true),
                sector("Sector_5", "Secondary Straight", 1450.0, 1950.0, 230.0, 0.0, 8.0, 0.95, 8.0, false),
                sector("Sector_6", "Turn 6 Tight", 1950.0, 2100.0, 85.0, -2.0, 64.0, 0.2, 64.0, false),
                sector("Sector_7", "Turn 8 Banking", 2100.0, 2500.0, 190.0, 12.5, 50.0, 0.6, 50.0, true),
                sector("Sector_8", "Final Straight", 2500.0, 3200.0, 260.0, 0.0, 3.0, 1.0, 3.0, false),
            ],
        }
    }
}
