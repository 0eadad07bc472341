//! The decision orchestrator: confidence-gated routing between the
//! static knowledge store and the similarity store.
//!
//! Each decision runs three phases. REASON computes confidence from the
//! embedding (plus the capped context boost). ACT routes: at or above
//! the threshold the fast path resolves the hinted sector; a missing or
//! unknown hint is recovered by falling back to the slow path, counted
//! but never surfaced as an error. Below the threshold the slow path
//! aggregates controls over the top-k neighbors. OBSERVE packages the
//! decision and folds it into the running counters.
//!
//! The orchestrator is stateless across decisions except for the
//! cumulative [`DecisionStats`].

use std::error::Error;
use std::fmt;

use apex_core::{ConfigError, Embedding, EmbeddingError, SectorId};
use apex_memory::{SimilarityStore, StaticKnowledgeStore, MAX_RETRIEVAL_K};

use crate::confidence::{boosted, embedding_confidence};
use crate::decision::{ControlValues, Decision, Path};
use crate::latency::LatencyModel;
use crate::stats::DecisionStats;

/// Neutral throttle used when the slow path has no history at all.
const NEUTRAL_THROTTLE: f64 = 0.5;
/// Neutral lean angle used when the slow path has no history at all.
const NEUTRAL_LEAN_DEG: f64 = 20.0;

/// Context accompanying one frame's embedding.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DecisionContext {
    /// Sector the vehicle believes it is in, if localization is available.
    pub sector_hint: Option<SectorId>,
    /// Seconds into the lap at capture time.
    pub timestamp_s: f64,
}

/// Errors from a single decision.
///
/// Sector misses are deliberately absent: they are recovered through the
/// slow path and only show up in [`DecisionStats::fallbacks`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecisionError {
    /// The embedding failed validation before REASON ran. Counters are
    /// untouched and no partial decision is emitted.
    InvalidEmbedding(EmbeddingError),
}

impl fmt::Display for DecisionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEmbedding(e) => write!(f, "invalid embedding: {e}"),
        }
    }
}

impl Error for DecisionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEmbedding(e) => Some(e),
        }
    }
}

impl From<EmbeddingError> for DecisionError {
    fn from(e: EmbeddingError) -> Self {
        Self::InvalidEmbedding(e)
    }
}

/// Routes embeddings to the fast or slow memory path.
pub struct DecisionOrchestrator {
    embedding_dim: usize,
    confidence_threshold: f64,
    retrieval_k: usize,
    latency: LatencyModel,
    stats: DecisionStats,
}

/// Builder for [`DecisionOrchestrator`].
pub struct DecisionOrchestratorBuilder {
    embedding_dim: usize,
    confidence_threshold: f64,
    retrieval_k: usize,
    latency: LatencyModel,
}

impl DecisionOrchestrator {
    /// Create a new builder with study defaults: dimension 512,
    /// threshold 0.85, k 5, default latency model.
    pub fn builder() -> DecisionOrchestratorBuilder {
        DecisionOrchestratorBuilder {
            embedding_dim: 512,
            confidence_threshold: 0.85,
            retrieval_k: 5,
            latency: LatencyModel::default(),
        }
    }

    /// Execute one decision.
    ///
    /// Rejects malformed embeddings before any phase runs, leaving the
    /// counters untouched. Otherwise always produces a decision: fast
    /// path resolution failures fall back to the slow path (flagged and
    /// counted), and an empty similarity store resolves to neutral
    /// controls.
    ///
    /// # Errors
    ///
    /// Returns [`DecisionError::InvalidEmbedding`] when the embedding
    /// dimension does not match the configured dimension.
    pub fn decide(
        &mut self,
        embedding: &Embedding,
        context: &DecisionContext,
        fast: &mut StaticKnowledgeStore,
        slow: &mut SimilarityStore,
    ) -> Result<Decision, DecisionError> {
        embedding.check_dim(self.embedding_dim)?;

        // REASON: confidence from the embedding; the boost applies only
        // when the hint resolves in the static store.
        let hint_known = context
            .sector_hint
            .as_ref()
            .is_some_and(|id| fast.contains(id));
        let confidence = boosted(embedding_confidence(embedding), hint_known);

        // ACT.
        let (path, controls, fallback) = if confidence >= self.confidence_threshold {
            match context.sector_hint.as_ref().and_then(|id| fast.lookup(id)) {
                Some(profile) => (
                    Path::Fast,
                    ControlValues {
                        throttle: profile.optimal_throttle,
                        lean_angle_deg: profile.optimal_lean_deg,
                    },
                    false,
                ),
                // Missing or unknown hint: recover through the slow path
                // and keep the miss visible in the counters.
                None => (Path::Slow, self.resolve_slow(embedding, slow)?, true),
            }
        } else {
            (Path::Slow, self.resolve_slow(embedding, slow)?, false)
        };

        // OBSERVE.
        let latency_us = match path {
            Path::Fast => self.latency.fast(),
            Path::Slow => self.latency.slow(slow.len(), self.retrieval_k),
        };
        let decision = Decision {
            confidence,
            path,
            controls,
            latency_us,
            fallback,
            timestamp_s: context.timestamp_s,
        };
        self.stats.record(&decision);
        Ok(decision)
    }

    /// Similarity-weighted control aggregation over the top-k neighbors.
    ///
    /// Weights are `max(similarity, 0)`: dissimilar history carries no
    /// weight. When all weights vanish the neighbors average uniformly;
    /// an empty store resolves to neutral controls.
    fn resolve_slow(
        &self,
        embedding: &Embedding,
        slow: &mut SimilarityStore,
    ) -> Result<ControlValues, DecisionError> {
        let neighbors = slow.retrieve(embedding, self.retrieval_k)?;
        if neighbors.is_empty() {
            return Ok(ControlValues {
                throttle: NEUTRAL_THROTTLE,
                lean_angle_deg: NEUTRAL_LEAN_DEG,
            });
        }

        let mut weight_sum = 0.0;
        let mut throttle_sum = 0.0;
        let mut lean_sum = 0.0;
        for neighbor in &neighbors {
            let weight = f64::from(neighbor.similarity).max(0.0);
            weight_sum += weight;
            throttle_sum += weight * neighbor.record.throttle_pct / 100.0;
            lean_sum += weight * neighbor.record.lean_angle_deg;
        }
        if weight_sum <= 0.0 {
            let count = neighbors.len() as f64;
            let throttle = neighbors
                .iter()
                .map(|n| n.record.throttle_pct / 100.0)
                .sum::<f64>()
                / count;
            let lean = neighbors
                .iter()
                .map(|n| n.record.lean_angle_deg)
                .sum::<f64>()
                / count;
            return Ok(ControlValues {
                throttle,
                lean_angle_deg: lean,
            });
        }
        Ok(ControlValues {
            throttle: throttle_sum / weight_sum,
            lean_angle_deg: lean_sum / weight_sum,
        })
    }

    /// Cumulative statistics across all decisions.
    pub fn stats(&self) -> &DecisionStats {
        &self.stats
    }

    /// Reset the cumulative statistics to zero.
    pub fn reset_stats(&mut self) {
        self.stats = DecisionStats::default();
    }

    /// The configured confidence threshold.
    pub fn confidence_threshold(&self) -> f64 {
        self.confidence_threshold
    }

    /// The configured retrieval depth.
    pub fn retrieval_k(&self) -> usize {
        self.retrieval_k
    }

    /// The configured embedding dimension.
    pub fn embedding_dim(&self) -> usize {
        self.embedding_dim
    }
}

impl fmt::Debug for DecisionOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecisionOrchestrator")
            .field("embedding_dim", &self.embedding_dim)
            .field("confidence_threshold", &self.confidence_threshold)
            .field("retrieval_k", &self.retrieval_k)
            .field("decisions", &self.stats.decisions)
            .finish()
    }
}

impl DecisionOrchestratorBuilder {
    /// Set the embedding dimension (default: 512). Must be >= 1.
    pub fn embedding_dim(mut self, dim: usize) -> Self {
        self.embedding_dim = dim;
        self
    }

    /// Set the fast/slow confidence threshold (default: 0.85).
    /// Must be finite and in `[0, 1]`.
    pub fn confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Set the slow-path retrieval depth (default: 5).
    /// Must be in `[1, MAX_RETRIEVAL_K]`.
    pub fn retrieval_k(mut self, k: usize) -> Self {
        self.retrieval_k = k;
        self
    }

    /// Replace the synthetic latency model.
    pub fn latency(mut self, model: LatencyModel) -> Self {
        self.latency = model;
        self
    }

    /// Build the orchestrator, validating all configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidParameter`] for a zero dimension,
    /// an out-of-range threshold, or an out-of-range retrieval depth.
    pub fn build(self) -> Result<DecisionOrchestrator, ConfigError> {
        if self.embedding_dim == 0 {
            return Err(ConfigError::InvalidParameter {
                reason: "orchestrator embedding_dim must be at least 1".to_string(),
            });
        }
        if !self.confidence_threshold.is_finite()
            || !(0.0..=1.0).contains(&self.confidence_threshold)
        {
            return Err(ConfigError::InvalidParameter {
                reason: format!(
                    "confidence_threshold must be in [0, 1], got {}",
                    self.confidence_threshold
                ),
            });
        }
        if self.retrieval_k == 0 || self.retrieval_k > MAX_RETRIEVAL_K {
            return Err(ConfigError::InvalidParameter {
                reason: format!(
                    "retrieval_k must be in [1, {MAX_RETRIEVAL_K}], got {}",
                    self.retrieval_k
                ),
            });
        }
        Ok(DecisionOrchestrator {
            embedding_dim: self.embedding_dim,
            confidence_threshold: self.confidence_threshold,
            retrieval_k: self.retrieval_k,
            latency: self.latency,
            stats: DecisionStats::default(),
        })
    }
}
