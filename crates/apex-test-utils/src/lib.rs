//! Test fixtures for apex development.
//!
//! Provides a compact three-sector circuit, canonical embeddings with
//! known confidence behavior, and a telemetry record builder with
//! reasonable defaults.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use apex_core::{
    CircuitConfig, Embedding, SectorId, SectorProfile, SuspensionTravel, TelemetryRecord,
    TireTemps,
};

/// A three-sector test circuit: a straight, a braking zone, and a banked
/// corner. Small enough to enumerate in assertions.
pub fn test_circuit() -> CircuitConfig {
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

    CircuitConfig {
        name: "Test Circuit".to_string(),
        location: String::new(),
        length_km: 1.2,
        sectors: vec![
            sector("S1", "Front Straight", 0.0, 600.0, 240.0, 0.0, 5.0, 0.95, 5.0, false),
            sector("S2", "Hairpin Braking", 600.0, 800.0, 95.0, 0.0, 45.0, 0.0, 45.0, false),
            sector("S3", "Banked Corner", 800.0, 1200.0, 190.0, 12.0, 50.0, 0.6, 50.0, true),
        ],
    }
}

/// An embedding with all mass in one component: entropy 0, so the
/// orchestrator's confidence is 1.0.
pub fn one_hot_embedding(dim: usize, index: usize) -> Embedding {
    let mut components = vec![0.0; dim];
    components[index] = 1.0;
    Embedding::from_components(components).expect("one-hot embedding is finite and non-empty")
}

/// An embedding with uniform components: maximum entropy, confidence 0.0.
pub fn uniform_embedding(dim: usize) -> Embedding {
    Embedding::from_components(vec![1.0; dim]).expect("uniform embedding is finite and non-empty")
}

/// A reproducible Gaussian embedding (Box-Muller over a seeded ChaCha8).
pub fn seeded_embedding(dim: usize, seed: u64) -> Embedding {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let components = (0..dim)
        .map(|_| {
            let u1: f64 = rng.random::<f64>().max(1e-300);
            let u2: f64 = rng.random();
            ((-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()) as f32
        })
        .collect();
    Embedding::from_components(components).expect("seeded embedding is finite and non-empty")
}

/// A telemetry record with the given sector, controls, and embedding,
/// and neutral values everywhere else.
pub fn test_record(
    sector: &str,
    speed_kmh: f64,
    lean_angle_deg: f64,
    throttle_pct: f64,
    embedding: Embedding,
) -> TelemetryRecord {
    TelemetryRecord {
        timestamp_s: 0.0,
        sector: SectorId::from(sector),
        speed_kmh,
        speed_ms: speed_kmh / 3.6,
        lean_angle_deg,
        accel_long_g: 0.0,
        accel_lat_g: (lean_angle_deg / 60.0) * 1.8,
        throttle_pct,
        brake_pct: 0.0,
        tire_temps_c: TireTemps {
            fl: 90.0,
            fr: 90.0,
            rl: 90.0,
            rr: 90.0,
        },
        suspension_mm: SuspensionTravel {
            fl: 50.0,
            fr: 50.0,
            rl: 50.0,
            rr: 50.0,
        },
        gps_lat: 39.4899,
        gps_lon: -0.3763,
        embedding,
        confidence: 0.9,
    }
}
