//! The dual memory systems of the apex pipeline.
//!
//! Two stores with opposite cost profiles back the decision orchestrator:
//!
//! - [`StaticKnowledgeStore`]: O(1) lookup of precomputed sector optima
//!   (the fast path). Read-only after construction.
//! - [`SimilarityStore`]: bounded history of embedded telemetry with
//!   O(N) top-k cosine retrieval (the slow path). Append-only with FIFO
//!   eviction at capacity.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod similarity;
pub mod static_store;

pub use similarity::{
    Neighbor, NeighborList, SectorAggregate, SimilarityStore, SimilarityStoreBuilder,
    SimilarityStoreStats, DEFAULT_CAPACITY, MAX_RETRIEVAL_K,
};
pub use static_store::{StaticKnowledgeStore, StaticStoreStats};
