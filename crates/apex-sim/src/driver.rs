//! The lap simulation driver.
//!
//! Drives a full lap across all configured sectors: per frame it
//! synthesizes telemetry, encodes the frame, routes a decision through
//! the orchestrator, feeds the stamped record back into the similarity
//! store (online learning), and aggregates per-sector and per-lap
//! statistics. A lap always completes; fast-path fallbacks are counted,
//! never fatal.

use std::error::Error;
use std::fmt;

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use apex_agent::{DecisionContext, DecisionError, DecisionOrchestrator, DecisionStats};
use apex_core::{CircuitConfig, ConfigError, EmbeddingError, FrameId, LapId};
use apex_memory::{SimilarityStore, SimilarityStoreStats, StaticKnowledgeStore, StaticStoreStats};
use apex_synth::{AnomalyPlan, TelemetrySynthesizer, Weather};

use crate::encoder::{Embedder, SyntheticEncoder};
use crate::summary::{LapSummary, PerformanceMetrics, SectorSummary};

/// Seed stream tag for hint-dropout draws, distinct from telemetry and
/// encoder noise.
const HINT_STREAM: u64 = 0x4849_4e54_4452_4f50;

/// Fatal simulation errors.
///
/// Fallback routings are not represented here; they are ordinary,
/// counted outcomes. These variants cover configuration rejected at
/// build time and invariant violations that indicate a wiring bug.
#[derive(Clone, Debug, PartialEq)]
pub enum SimError {
    /// A component rejected its configuration.
    Config(ConfigError),
    /// The orchestrator rejected an embedding.
    Decision(DecisionError),
    /// The similarity store rejected a record.
    Store(EmbeddingError),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "configuration: {e}"),
            Self::Decision(e) => write!(f, "decision: {e}"),
            Self::Store(e) => write!(f, "store: {e}"),
        }
    }
}

impl Error for SimError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Decision(e) => Some(e),
            Self::Store(e) => Some(e),
        }
    }
}

impl From<ConfigError> for SimError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<DecisionError> for SimError {
    fn from(e: DecisionError) -> Self {
        Self::Decision(e)
    }
}

impl From<EmbeddingError> for SimError {
    fn from(e: EmbeddingError) -> Self {
        Self::Store(e)
    }
}

/// Full-lap simulation over a configured circuit.
pub struct LapDriver {
    circuit: CircuitConfig,
    fast: StaticKnowledgeStore,
    slow: SimilarityStore,
    orchestrator: DecisionOrchestrator,
    synthesizer: TelemetrySynthesizer,
    encoder: Box<dyn Embedder>,
    frames_per_sector: u64,
    anomaly_probability: f64,
    hint_dropout: f64,
    base_seed: u64,
}

/// Builder for [`LapDriver`].
///
/// Required field: `circuit`. Every component is constructed with a
/// consistent embedding dimension and seed unless explicitly replaced.
pub struct LapDriverBuilder {
    circuit: Option<CircuitConfig>,
    embedding_dim: usize,
    seed: u64,
    frames_per_sector: u64,
    telemetry_hz: f64,
    anomaly_probability: f64,
    hint_dropout: f64,
    confidence_threshold: f64,
    retrieval_k: usize,
    store_capacity: usize,
    encoder_focus: f64,
    encoder: Option<Box<dyn Embedder>>,
}

impl LapDriver {
    /// Create a new builder with study defaults: dimension 512, seed 42,
    /// 30 frames per sector at 100 Hz, 5% anomaly probability, threshold
    /// 0.85, k 5, capacity 10 000, encoder focus 0.9, no hint dropout.
    pub fn builder() -> LapDriverBuilder {
        LapDriverBuilder {
            circuit: None,
            embedding_dim: 512,
            seed: 42,
            frames_per_sector: 30,
            telemetry_hz: 100.0,
            anomaly_probability: 0.05,
            hint_dropout: 0.0,
            confidence_threshold: 0.85,
            retrieval_k: 5,
            store_capacity: 10_000,
            encoder_focus: 0.9,
            encoder: None,
        }
    }

    /// Simulate one complete lap.
    ///
    /// Iterates every configured sector for `frames_per_sector` frames:
    /// synthesize telemetry, encode the frame, decide, then append the
    /// stamped record to the similarity store. The lap completes even
    /// when every frame takes the fallback path; fallback frames are
    /// reported distinctly in the summary.
    ///
    /// # Errors
    ///
    /// Returns [`SimError`] only for wiring bugs (dimension mismatches
    /// between components); routine fast-path misses are not errors.
    pub fn run_lap(&mut self, lap: LapId, weather: Weather) -> Result<LapSummary, SimError> {
        let sectors = self.circuit.sectors.clone();
        let anomaly_plan = AnomalyPlan::draw(
            self.base_seed ^ lap.0,
            self.anomaly_probability,
            sectors.len(),
        );
        let mut hint_rng = ChaCha8Rng::seed_from_u64(self.base_seed ^ lap.0 ^ HINT_STREAM);

        let mut lap_stats = DecisionStats::default();
        let mut sector_summaries = Vec::with_capacity(sectors.len());
        let mut frame_counter = 0u64;

        for (sector_index, profile) in sectors.iter().enumerate() {
            let anomaly = anomaly_plan
                .filter(|plan| plan.sector_index == sector_index)
                .map(|plan| plan.anomaly);

            let mut sector_stats = DecisionStats::default();
            let mut speed_sum = 0.0;

            for _ in 0..self.frames_per_sector {
                let frame = FrameId(frame_counter);
                frame_counter += 1;

                let record = self.synthesizer.generate(profile, frame, weather, anomaly);
                let embedding = self.encoder.encode(profile, frame, weather);

                // Localization dropout: with the configured probability
                // the sector hint is unavailable this frame.
                let dropped = hint_rng.random::<f64>() < self.hint_dropout;
                let context = DecisionContext {
                    sector_hint: (!dropped).then(|| profile.id.clone()),
                    timestamp_s: record.timestamp_s,
                };

                let decision =
                    self.orchestrator
                        .decide(&embedding, &context, &mut self.fast, &mut self.slow)?;

                speed_sum += record.speed_kmh;
                sector_stats.record(&decision);

                // Online learning: the stamped record joins the history.
                let record = record
                    .with_embedding(embedding)
                    .with_confidence(decision.confidence);
                self.slow.add(record)?;
            }

            tracing::debug!(
                sector = %profile.id,
                frames = self.frames_per_sector,
                fast = sector_stats.fast,
                slow = sector_stats.slow,
                fallbacks = sector_stats.fallbacks,
                anomaly = ?anomaly,
                "sector complete"
            );

            sector_summaries.push(SectorSummary {
                sector_id: profile.id.clone(),
                sector_name: profile.name.clone(),
                frames: self.frames_per_sector,
                avg_speed_kmh: speed_sum / self.frames_per_sector as f64,
                avg_confidence: sector_stats.avg_confidence(),
                fast_frames: sector_stats.fast,
                slow_frames: sector_stats.slow,
                fallback_frames: sector_stats.fallbacks,
                anomaly,
            });
            lap_stats.merge(&sector_stats);
        }

        let total_lap_time_s =
            frame_counter as f64 / self.synthesizer.telemetry_hz() + weather.lap_time_penalty_s();
        let performance_metrics = PerformanceMetrics {
            total_lap_time_s,
            fast_path_usage_pct: lap_stats.fast_pct(),
            slow_path_usage_pct: lap_stats.slow_pct(),
            fallback_count: lap_stats.fallbacks,
            avg_decision_confidence: lap_stats.avg_confidence(),
            avg_synthetic_latency_ms: lap_stats.avg_latency_ms(),
        };

        tracing::info!(
            lap = lap.0,
            weather = ?weather,
            total_frames = frame_counter,
            lap_time_s = performance_metrics.total_lap_time_s,
            fast_pct = performance_metrics.fast_path_usage_pct,
            fallbacks = performance_metrics.fallback_count,
            "lap complete"
        );

        Ok(LapSummary {
            lap_id: lap,
            weather,
            total_frames: frame_counter,
            per_sector_telemetry: sector_summaries,
            performance_metrics,
        })
    }

    /// The configured circuit.
    pub fn circuit(&self) -> &CircuitConfig {
        &self.circuit
    }

    /// Cumulative orchestrator statistics across all laps run so far.
    pub fn decision_stats(&self) -> &DecisionStats {
        self.orchestrator.stats()
    }

    /// Static store access statistics.
    pub fn static_store_stats(&self) -> &StaticStoreStats {
        self.fast.stats()
    }

    /// Similarity store usage statistics.
    pub fn similarity_stats(&self) -> SimilarityStoreStats {
        self.slow.stats()
    }
}

impl fmt::Debug for LapDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LapDriver")
            .field("circuit", &self.circuit.name)
            .field("sectors", &self.circuit.sectors.len())
            .field("frames_per_sector", &self.frames_per_sector)
            .field("seed", &self.base_seed)
            .finish()
    }
}

impl LapDriverBuilder {
    /// Set the circuit to simulate. Required.
    pub fn circuit(mut self, circuit: CircuitConfig) -> Self {
        self.circuit = Some(circuit);
        self
    }

    /// Set the embedding dimension shared by every component
    /// (default: 512).
    pub fn embedding_dim(mut self, dim: usize) -> Self {
        self.embedding_dim = dim;
        self
    }

    /// Set the base seed shared by every component (default: 42).
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set frames simulated per sector (default: 30). Must be >= 1.
    pub fn frames_per_sector(mut self, frames: u64) -> Self {
        self.frames_per_sector = frames;
        self
    }

    /// Set the telemetry sample rate, Hz (default: 100).
    pub fn telemetry_hz(mut self, hz: f64) -> Self {
        self.telemetry_hz = hz;
        self
    }

    /// Set the per-lap anomaly probability (default: 0.05).
    /// Must be finite and in `[0, 1]`.
    pub fn anomaly_probability(mut self, probability: f64) -> Self {
        self.anomaly_probability = probability;
        self
    }

    /// Set the per-frame probability that the sector hint is unavailable
    /// (default: 0.0). Must be finite and in `[0, 1]`.
    pub fn hint_dropout(mut self, probability: f64) -> Self {
        self.hint_dropout = probability;
        self
    }

    /// Set the orchestrator's confidence threshold (default: 0.85).
    pub fn confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Set the slow-path retrieval depth (default: 5).
    pub fn retrieval_k(mut self, k: usize) -> Self {
        self.retrieval_k = k;
        self
    }

    /// Set the similarity store capacity (default: 10 000).
    pub fn store_capacity(mut self, capacity: usize) -> Self {
        self.store_capacity = capacity;
        self
    }

    /// Set the synthetic encoder's focus (default: 0.9). Ignored when a
    /// custom encoder is supplied.
    pub fn encoder_focus(mut self, focus: f64) -> Self {
        self.encoder_focus = focus;
        self
    }

    /// Replace the frame encoder. Its dimension must match
    /// `embedding_dim`.
    pub fn encoder(mut self, encoder: Box<dyn Embedder>) -> Self {
        self.encoder = Some(encoder);
        self
    }

    /// Build the driver, validating the circuit and every component
    /// configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the circuit is missing or invalid, a
    /// probability is out of range, `frames_per_sector` is zero, or the
    /// supplied encoder's dimension disagrees with `embedding_dim`.
    pub fn build(self) -> Result<LapDriver, ConfigError> {
        let circuit = self.circuit.ok_or_else(|| ConfigError::InvalidParameter {
            reason: "lap driver requires a circuit".to_string(),
        })?;
        circuit.validate()?;

        if self.frames_per_sector == 0 {
            return Err(ConfigError::InvalidParameter {
                reason: "frames_per_sector must be at least 1".to_string(),
            });
        }
        for (name, probability) in [
            ("anomaly_probability", self.anomaly_probability),
            ("hint_dropout", self.hint_dropout),
        ] {
            if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
                return Err(ConfigError::InvalidParameter {
                    reason: format!("{name} must be in [0, 1], got {probability}"),
                });
            }
        }

        let fast = StaticKnowledgeStore::new(&circuit);
        let slow = SimilarityStore::builder()
            .embedding_dim(self.embedding_dim)
            .capacity(self.store_capacity)
            .build()?;
        let orchestrator = DecisionOrchestrator::builder()
            .embedding_dim(self.embedding_dim)
            .confidence_threshold(self.confidence_threshold)
            .retrieval_k(self.retrieval_k)
            .build()?;
        let synthesizer = TelemetrySynthesizer::builder()
            .seed(self.seed)
            .embedding_dim(self.embedding_dim)
            .telemetry_hz(self.telemetry_hz)
            .build()?;
        let encoder = match self.encoder {
            Some(encoder) => {
                if encoder.dim() != self.embedding_dim {
                    return Err(ConfigError::InvalidParameter {
                        reason: format!(
                            "encoder dimension {} does not match embedding_dim {}",
                            encoder.dim(),
                            self.embedding_dim
                        ),
                    });
                }
                encoder
            }
            None => Box::new(
                SyntheticEncoder::builder()
                    .dim(self.embedding_dim)
                    .seed(self.seed)
                    .focus(self.encoder_focus)
                    .build()?,
            ),
        };

        Ok(LapDriver {
            circuit,
            fast,
            slow,
            orchestrator,
            synthesizer,
            encoder,
            frames_per_sector: self.frames_per_sector,
            anomaly_probability: self.anomaly_probability,
            hint_dropout: self.hint_dropout,
            base_seed: self.seed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apex_test_utils::test_circuit;

    fn driver() -> LapDriver {
        LapDriver::builder()
            .circuit(test_circuit())
            .embedding_dim(32)
            .frames_per_sector(10)
            .build()
            .unwrap()
    }

    // ---------------------------------------------------------------
    // Builder tests
    // ---------------------------------------------------------------

    #[test]
    fn builder_requires_a_circuit() {
        match LapDriver::builder().build() {
            Err(ConfigError::InvalidParameter { reason }) => {
                assert!(reason.contains("circuit"))
            }
            other => panic!("expected InvalidParameter, got {other:?}"),
        }
    }

    #[test]
    fn builder_validates_the_circuit() {
        let mut circuit = test_circuit();
        circuit.sectors[0].optimal_throttle = 2.0;
        assert!(LapDriver::builder().circuit(circuit).build().is_err());
    }

    #[test]
    fn builder_rejects_out_of_range_probabilities() {
        assert!(LapDriver::builder()
            .circuit(test_circuit())
            .anomaly_probability(1.5)
            .build()
            .is_err());
        assert!(LapDriver::builder()
            .circuit(test_circuit())
            .hint_dropout(-0.1)
            .build()
            .is_err());
    }

    #[test]
    fn builder_rejects_zero_frames() {
        assert!(LapDriver::builder()
            .circuit(test_circuit())
            .frames_per_sector(0)
            .build()
            .is_err());
    }

    #[test]
    fn builder_rejects_encoder_dimension_mismatch() {
        let encoder = SyntheticEncoder::builder().dim(16).build().unwrap();
        let result = LapDriver::builder()
            .circuit(test_circuit())
            .embedding_dim(32)
            .encoder(Box::new(encoder))
            .build();
        match result {
            Err(ConfigError::InvalidParameter { reason }) => {
                assert!(reason.contains("encoder dimension"))
            }
            other => panic!("expected InvalidParameter, got {other:?}"),
        }
    }

    // ---------------------------------------------------------------
    // Lap execution
    // ---------------------------------------------------------------

    #[test]
    fn lap_covers_every_sector_and_frame() {
        let mut driver = driver();
        let summary = driver.run_lap(LapId(1), Weather::Sunny).unwrap();

        assert_eq!(summary.total_frames, 30);
        assert_eq!(summary.per_sector_telemetry.len(), 3);
        for (sector, profile) in summary
            .per_sector_telemetry
            .iter()
            .zip(&driver.circuit().sectors)
        {
            assert_eq!(sector.sector_id, profile.id);
            assert_eq!(sector.frames, 10);
            assert_eq!(sector.fast_frames + sector.slow_frames, sector.frames);
            assert!(sector.fallback_frames <= sector.slow_frames);
            assert!((0.0..=1.0).contains(&sector.avg_confidence));
        }
    }

    #[test]
    fn online_learning_grows_the_history() {
        let mut driver = driver();
        assert_eq!(driver.similarity_stats().records, 0);
        driver.run_lap(LapId(1), Weather::Sunny).unwrap();
        assert_eq!(driver.similarity_stats().records, 30);
        driver.run_lap(LapId(2), Weather::Sunny).unwrap();
        assert_eq!(driver.similarity_stats().records, 60);
    }

    #[test]
    fn usage_percentages_are_consistent() {
        let mut driver = driver();
        let summary = driver.run_lap(LapId(1), Weather::Sunny).unwrap();
        let metrics = &summary.performance_metrics;

        assert!(
            (metrics.fast_path_usage_pct + metrics.slow_path_usage_pct - 100.0).abs() < 1e-9
        );
        assert!((0.0..=1.0).contains(&metrics.avg_decision_confidence));
        assert!(metrics.avg_synthetic_latency_ms > 0.0);
    }

    #[test]
    fn lap_time_includes_the_weather_penalty() {
        let run = |weather: Weather| -> f64 {
            let mut driver = driver();
            driver
                .run_lap(LapId(1), weather)
                .unwrap()
                .performance_metrics
                .total_lap_time_s
        };
        let sunny = run(Weather::Sunny);
        let wet = run(Weather::HeavyRain);
        let penalty = Weather::HeavyRain.lap_time_penalty_s();
        assert!((wet - sunny - penalty).abs() < 1e-9);
    }

    #[test]
    fn straights_route_faster_than_hairpins() {
        let mut driver = driver();
        // Warm the history so the slow path has material to retrieve.
        driver.run_lap(LapId(1), Weather::Sunny).unwrap();
        let summary = driver.run_lap(LapId(2), Weather::Sunny).unwrap();

        let straight = &summary.per_sector_telemetry[0];
        let hairpin = &summary.per_sector_telemetry[1];
        assert!(
            straight.fast_frames >= hairpin.fast_frames,
            "straight fast={} hairpin fast={}",
            straight.fast_frames,
            hairpin.fast_frames
        );
    }
}
