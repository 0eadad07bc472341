//! Confidence-gated decision orchestration.
//!
//! Turns a frame embedding plus context into a routed decision: high
//! confidence resolves through the static knowledge store (fast path),
//! low confidence through similarity retrieval (slow path). Fast-path
//! misses are recovered by falling back to the slow path and counted
//! separately, never surfaced as failures.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod confidence;
pub mod decision;
pub mod latency;
pub mod orchestrator;
pub mod stats;

pub use confidence::{boosted, embedding_confidence, CONTEXT_BOOST};
pub use decision::{ControlValues, Decision, Path};
pub use latency::LatencyModel;
pub use orchestrator::{
    DecisionContext, DecisionError, DecisionOrchestrator, DecisionOrchestratorBuilder,
};
pub use stats::DecisionStats;
