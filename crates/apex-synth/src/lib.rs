//! Deterministic telemetry synthesis for the apex pipeline.
//!
//! Produces physically plausible per-frame telemetry from a sector
//! profile, a frame index, a weather condition, and a seed. Identical
//! inputs yield bit-identical records: every random draw comes from a
//! ChaCha8 RNG seeded from the base seed XOR stream-specific tags, so
//! runs replay exactly.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod anomaly;
pub mod synth;
pub mod weather;

pub use anomaly::{AnomalyPlan, AnomalyType};
pub use synth::{TelemetrySynthesizer, TelemetrySynthesizerBuilder};
pub use weather::Weather;

/// Generate a Gaussian sample using the Box-Muller transform.
/// Avoids the `rand_distr` dependency.
pub fn box_muller(rng: &mut rand_chacha::ChaCha8Rng) -> f64 {
    use rand::Rng;
    let u1: f64 = rng.random::<f64>().max(1e-300); // avoid ln(0)
    let u2: f64 = rng.random();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// FNV-1a hash of a sector id, mixed into per-frame RNG seeds so that
/// different sectors draw independent noise at the same frame index.
pub fn sector_seed(id: &apex_core::SectorId) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in id.as_str().bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}
