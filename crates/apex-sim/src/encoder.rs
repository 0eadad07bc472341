//! Frame encoding: the embedding-function seam.
//!
//! The real system runs a neural encoder over camera frames. This module
//! keeps the pipeline agnostic to that choice behind the [`Embedder`]
//! trait and provides a deterministic synthetic stand-in whose leading
//! components carry sector features, matching how the study's simulated
//! frames were modulated.

use apex_core::{ConfigError, Embedding, FrameId, SectorProfile};
use apex_synth::{box_muller, sector_seed, Weather};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Maps a (synthetic) frame to a fixed-length embedding.
pub trait Embedder {
    /// Embedding dimension produced by this encoder.
    fn dim(&self) -> usize;

    /// Encode one frame captured in the given sector.
    fn encode(&self, profile: &SectorProfile, frame: FrameId, weather: Weather) -> Embedding;
}

/// Deterministic synthetic encoder.
///
/// Components 0..3 carry normalized sector features (speed, lean,
/// throttle); the remainder is seeded Gaussian noise. The result is
/// L2-normalized. `focus` in `[0, 1]` shifts mass into component 0:
/// at 0 the embedding keeps its natural noisy texture (low routing
/// confidence), near 1 a single component dominates (confidence
/// approaches 1).
///
/// Recognizability falls with cornering difficulty: the effective focus
/// scales down with the sector's lean demand, so straights encode
/// concentrated (fast-path) embeddings while technical corners stay
/// diffuse and route through retrieval.
#[derive(Debug)]
pub struct SyntheticEncoder {
    dim: usize,
    seed: u64,
    focus: f64,
}

/// Builder for [`SyntheticEncoder`].
pub struct SyntheticEncoderBuilder {
    dim: usize,
    seed: u64,
    focus: f64,
}

/// Seed stream tag for encoder noise, distinct from telemetry noise.
const ENCODER_STREAM: u64 = 0x454e_434f_4445_5231;

impl SyntheticEncoder {
    /// Create a new builder with defaults: dimension 512, seed 42,
    /// focus 0.0.
    pub fn builder() -> SyntheticEncoderBuilder {
        SyntheticEncoderBuilder {
            dim: 512,
            seed: 42,
            focus: 0.0,
        }
    }
}

impl Embedder for SyntheticEncoder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn encode(&self, profile: &SectorProfile, frame: FrameId, weather: Weather) -> Embedding {
        let mut rng = ChaCha8Rng::seed_from_u64(
            self.seed ^ ENCODER_STREAM ^ sector_seed(&profile.id) ^ frame.0 ^ weather.seed_tag(),
        );

        // Hard cornering is harder to recognize: scale the focus down
        // with the sector's lean demand.
        let difficulty = (profile.max_lean_deg / 75.0).clamp(0.0, 1.0);
        let focus = self.focus * (1.0 - 0.8 * difficulty);

        let noise_scale = 1.0 - focus;
        let mut components: Vec<f32> = (0..self.dim)
            .map(|_| (noise_scale * box_muller(&mut rng)) as f32)
            .collect();

        // Sector features in the leading components, the way the study's
        // simulated frames modulated their color channels.
        components[0] = (profile.avg_speed_kmh * weather.speed_factor() / 300.0) as f32;
        components[1] = (profile.max_lean_deg / 65.0) as f32;
        components[2] = profile.optimal_throttle as f32;
        components[3] += (profile.banking_degrees / 30.0) as f32;

        // Focus mass dominates the feature components when requested.
        components[0] += (focus * (self.dim as f64).sqrt()) as f32;

        Embedding::from_components(components)
            .expect("encoder output is finite by construction")
            .normalized()
    }
}

impl SyntheticEncoderBuilder {
    /// Set the embedding dimension (default: 512). Must be >= 4 to hold
    /// the feature components.
    pub fn dim(mut self, dim: usize) -> Self {
        self.dim = dim;
        self
    }

    /// Set the encoder seed (default: 42).
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the focus in `[0, 1]` (default: 0.0).
    pub fn focus(mut self, focus: f64) -> Self {
        self.focus = focus;
        self
    }

    /// Build the encoder, validating all configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidParameter`] when `dim < 4` or
    /// `focus` is outside `[0, 1]`.
    pub fn build(self) -> Result<SyntheticEncoder, ConfigError> {
        if self.dim < 4 {
            return Err(ConfigError::InvalidParameter {
                reason: format!("encoder dim must be at least 4, got {}", self.dim),
            });
        }
        if !self.focus.is_finite() || !(0.0..=1.0).contains(&self.focus) {
            return Err(ConfigError::InvalidParameter {
                reason: format!("encoder focus must be in [0, 1], got {}", self.focus),
            });
        }
        Ok(SyntheticEncoder {
            dim: self.dim,
            seed: self.seed,
            focus: self.focus,
        })
    }
}
