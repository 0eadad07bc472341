//! The similarity store: bounded telemetry history with top-k cosine
//! retrieval (slow path).
//!
//! History is append-only with FIFO eviction at a configured capacity, so
//! long runs cannot grow the scan without bound. Embeddings are validated
//! and normalized at `add` time; retrieval scans every stored record,
//! which is acceptable at the few-hundred-to-few-thousand record scale
//! this pipeline operates at.
//!
//! Constructed via the builder pattern: [`SimilarityStore::builder`].

use std::collections::VecDeque;

use apex_core::{ConfigError, Embedding, EmbeddingError, SectorId, TelemetryRecord};
use serde::Serialize;
use smallvec::SmallVec;

/// Hard upper bound on `k` for a single retrieval.
///
/// Oversized requests are clamped rather than rejected, keeping the scan
/// and aggregation cost bounded.
pub const MAX_RETRIEVAL_K: usize = 256;

/// Default history capacity.
pub const DEFAULT_CAPACITY: usize = 10_000;

/// Default embedding dimension.
pub const DEFAULT_EMBEDDING_DIM: usize = 512;

/// A retrieval hit: a stored record and its similarity to the query.
#[derive(Clone, Debug, PartialEq)]
pub struct Neighbor {
    /// The stored telemetry record.
    pub record: TelemetryRecord,
    /// Cosine similarity to the query, clamped to `[-1, 1]`.
    pub similarity: f32,
}

/// Retrieval results, ordered by descending similarity.
///
/// Inline for the default `k` of 5; spills to the heap for larger `k`.
pub type NeighborList = SmallVec<[Neighbor; 8]>;

/// Usage statistics for the similarity store.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SimilarityStoreStats {
    /// Records currently held.
    pub records: usize,
    /// Total `retrieve` calls.
    pub retrievals: u64,
    /// Records evicted to stay within capacity.
    pub evictions: u64,
    /// Mean of the per-retrieval mean similarity, over retrievals that
    /// returned at least one neighbor.
    pub mean_similarity: f64,
}

struct StoredRecord {
    record: TelemetryRecord,
    /// Unit-norm copy of the record's embedding, cached for scoring.
    normalized: Embedding,
    /// Monotone insertion sequence; survives eviction and breaks
    /// similarity ties deterministically (earlier wins).
    seq: u64,
}

/// Bounded history of embedded telemetry with cosine retrieval.
pub struct SimilarityStore {
    history: VecDeque<StoredRecord>,
    embedding_dim: usize,
    capacity: usize,
    next_seq: u64,
    retrievals: u64,
    evictions: u64,
    similarity_sum: f64,
    scored_retrievals: u64,
}

/// Builder for [`SimilarityStore`].
pub struct SimilarityStoreBuilder {
    embedding_dim: usize,
    capacity: usize,
}

impl SimilarityStore {
    /// Create a new builder with the default dimension (512) and
    /// capacity (10 000).
    pub fn builder() -> SimilarityStoreBuilder {
        SimilarityStoreBuilder {
            embedding_dim: DEFAULT_EMBEDDING_DIM,
            capacity: DEFAULT_CAPACITY,
        }
    }

    /// Append a record to the history.
    ///
    /// The record's embedding is checked against the configured dimension
    /// (finiteness is already guaranteed by [`Embedding`] construction,
    /// so NaN cannot reach the similarity averages). At capacity the
    /// oldest record is evicted first; eviction is counted, never an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns [`EmbeddingError::DimensionMismatch`] when the record's
    /// embedding has the wrong dimension. The store is unchanged on error.
    pub fn add(&mut self, record: TelemetryRecord) -> Result<(), EmbeddingError> {
        record.embedding.check_dim(self.embedding_dim)?;

        if self.history.len() == self.capacity {
            self.history.pop_front();
            self.evictions += 1;
        }
        let normalized = record.embedding.normalized();
        let seq = self.next_seq;
        self.next_seq += 1;
        self.history.push_back(StoredRecord {
            record,
            normalized,
            seq,
        });
        Ok(())
    }

    /// Retrieve the `k` most similar records to `query`.
    ///
    /// Scores are cosine similarity between the normalized query and each
    /// stored normalized embedding, clamped to `[-1, 1]`. Results are
    /// ordered by descending similarity; ties resolve to the earlier
    /// inserted record. A store holding fewer than `k` records yields all
    /// of them; an empty store yields an empty list. `k` above
    /// [`MAX_RETRIEVAL_K`] is clamped.
    ///
    /// # Errors
    ///
    /// Returns [`EmbeddingError::DimensionMismatch`] when the query has
    /// the wrong dimension.
    pub fn retrieve(
        &mut self,
        query: &Embedding,
        k: usize,
    ) -> Result<NeighborList, EmbeddingError> {
        query.check_dim(self.embedding_dim)?;
        let k = k.min(MAX_RETRIEVAL_K);
        self.retrievals += 1;

        if k == 0 || self.history.is_empty() {
            return Ok(NeighborList::new());
        }

        let query_norm = query.normalized();
        let mut scored: Vec<(f32, u64, usize)> = Vec::with_capacity(self.history.len());
        for (index, stored) in self.history.iter().enumerate() {
            // Dimensions agree by construction; cosine cannot fail here.
            let similarity = query_norm.cosine(&stored.normalized)?;
            scored.push((similarity, stored.seq, index));
        }
        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.1.cmp(&b.1))
        });
        scored.truncate(k);

        let neighbors: NeighborList = scored
            .iter()
            .map(|&(similarity, _, index)| Neighbor {
                record: self.history[index].record.clone(),
                similarity,
            })
            .collect();

        if !neighbors.is_empty() {
            let mean = neighbors
                .iter()
                .map(|n| f64::from(n.similarity))
                .sum::<f64>()
                / neighbors.len() as f64;
            self.similarity_sum += mean;
            self.scored_retrievals += 1;
        }
        Ok(neighbors)
    }

    /// All records captured in the given sector, in insertion order.
    pub fn filter_by_sector(&self, id: &SectorId) -> Vec<&TelemetryRecord> {
        self.history
            .iter()
            .filter(|stored| &stored.record.sector == id)
            .map(|stored| &stored.record)
            .collect()
    }

    /// Aggregate speed and lean statistics for one sector's history.
    ///
    /// `None` when the sector has no stored records.
    pub fn sector_aggregate(&self, id: &SectorId) -> Option<SectorAggregate> {
        let records = self.filter_by_sector(id);
        if records.is_empty() {
            return None;
        }
        let count = records.len();
        let mut speed_sum = 0.0;
        let mut max_speed = f64::MIN;
        let mut min_speed = f64::MAX;
        let mut lean_sum = 0.0;
        let mut max_lean = f64::MIN;
        for record in &records {
            speed_sum += record.speed_kmh;
            max_speed = max_speed.max(record.speed_kmh);
            min_speed = min_speed.min(record.speed_kmh);
            lean_sum += record.lean_angle_deg;
            max_lean = max_lean.max(record.lean_angle_deg);
        }
        Some(SectorAggregate {
            records: count,
            mean_speed_kmh: speed_sum / count as f64,
            max_speed_kmh: max_speed,
            min_speed_kmh: min_speed,
            mean_lean_deg: lean_sum / count as f64,
            max_lean_deg: max_lean,
        })
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// True when no records are held.
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// The configured capacity bound.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The configured embedding dimension.
    pub fn embedding_dim(&self) -> usize {
        self.embedding_dim
    }

    /// Usage statistics so far.
    pub fn stats(&self) -> SimilarityStoreStats {
        SimilarityStoreStats {
            records: self.history.len(),
            retrievals: self.retrievals,
            evictions: self.evictions,
            mean_similarity: if self.scored_retrievals == 0 {
                0.0
            } else {
                self.similarity_sum / self.scored_retrievals as f64
            },
        }
    }
}

impl std::fmt::Debug for SimilarityStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimilarityStore")
            .field("records", &self.history.len())
            .field("capacity", &self.capacity)
            .field("embedding_dim", &self.embedding_dim)
            .finish()
    }
}

/// Aggregate speed and lean statistics for one sector.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SectorAggregate {
    /// Records contributing to the aggregate.
    pub records: usize,
    /// Mean speed, km/h.
    pub mean_speed_kmh: f64,
    /// Maximum speed, km/h.
    pub max_speed_kmh: f64,
    /// Minimum speed, km/h.
    pub min_speed_kmh: f64,
    /// Mean lean angle, degrees.
    pub mean_lean_deg: f64,
    /// Maximum lean angle, degrees.
    pub max_lean_deg: f64,
}

impl SimilarityStoreBuilder {
    /// Set the embedding dimension (default: 512). Must be >= 1.
    pub fn embedding_dim(mut self, dim: usize) -> Self {
        self.embedding_dim = dim;
        self
    }

    /// Set the history capacity (default: 10 000). Must be >= 1.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Build the store, validating all configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidParameter`] when the dimension or
    /// capacity is zero.
    pub fn build(self) -> Result<SimilarityStore, ConfigError> {
        if self.embedding_dim == 0 {
            return Err(ConfigError::InvalidParameter {
                reason: "similarity store embedding_dim must be at least 1".to_string(),
            });
        }
        if self.capacity == 0 {
            return Err(ConfigError::InvalidParameter {
                reason: "similarity store capacity must be at least 1".to_string(),
            });
        }
        Ok(SimilarityStore {
            history: VecDeque::with_capacity(self.capacity.min(4096)),
            embedding_dim: self.embedding_dim,
            capacity: self.capacity,
            next_seq: 0,
            retrievals: 0,
            evictions: 0,
            similarity_sum: 0.0,
            scored_retrievals: 0,
        })
    }
}
