//! Apex: a dual-memory racing perception pipeline.
//!
//! This is the top-level facade crate that re-exports the public API
//! from all apex sub-crates. For most users, adding `apex` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use apex::prelude::*;
//!
//! let circuit = CircuitConfig::aspar();
//! let mut fast = StaticKnowledgeStore::new(&circuit);
//! let mut slow = SimilarityStore::builder()
//!     .embedding_dim(8)
//!     .capacity(100)
//!     .build()
//!     .unwrap();
//! let mut agent = DecisionOrchestrator::builder()
//!     .embedding_dim(8)
//!     .build()
//!     .unwrap();
//!
//! // A concentrated embedding with a known sector hint routes through
//! // the fast path and resolves the precomputed optimal controls.
//! let mut components = vec![0.0_f32; 8];
//! components[0] = 1.0;
//! let embedding = Embedding::from_components(components).unwrap();
//! let context = DecisionContext {
//!     sector_hint: Some("Sector_1".into()),
//!     ..Default::default()
//! };
//! let decision = agent
//!     .decide(&embedding, &context, &mut fast, &mut slow)
//!     .unwrap();
//! assert_eq!(decision.path, Path::Fast);
//! assert_eq!(decision.controls.throttle, 0.95);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the
//! prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `apex-core` | IDs, embeddings, circuit config, telemetry records, errors |
//! | [`memory`] | `apex-memory` | Static knowledge store and similarity store |
//! | [`synth`] | `apex-synth` | Telemetry synthesis, weather, anomaly injection |
//! | [`agent`] | `apex-agent` | Confidence, routing, decisions, statistics |
//! | [`sim`] | `apex-sim` | Frame encoder, lap driver, summaries |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, IDs, and errors (`apex-core`).
pub use apex_core as types;

/// Static knowledge store and similarity store (`apex-memory`).
pub use apex_memory as memory;

/// Telemetry synthesis, weather, and anomalies (`apex-synth`).
pub use apex_synth as synth;

/// Decision orchestration and statistics (`apex-agent`).
pub use apex_agent as agent;

/// Frame encoding and lap simulation (`apex-sim`).
pub use apex_sim as sim;

/// Common imports for typical apex usage.
///
/// ```rust
/// use apex::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use apex_core::{
        CircuitConfig, ConfigError, Embedding, EmbeddingError, FrameId, LapId, SectorId,
        SectorProfile, TelemetryRecord,
    };

    // Memory systems
    pub use apex_memory::{
        Neighbor, SimilarityStore, SimilarityStoreStats, StaticKnowledgeStore, StaticStoreStats,
    };

    // Synthesis
    pub use apex_synth::{AnomalyPlan, AnomalyType, TelemetrySynthesizer, Weather};

    // Orchestration
    pub use apex_agent::{
        ControlValues, Decision, DecisionContext, DecisionError, DecisionOrchestrator,
        DecisionStats, LatencyModel, Path,
    };

    // Simulation
    pub use apex_sim::{
        Embedder, LapDriver, LapSummary, PerformanceMetrics, SectorSummary, SimError,
        SyntheticEncoder,
    };
}
