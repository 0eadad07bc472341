//! Core types for the apex racing perception pipeline.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! shared vocabulary of the apex workspace: strongly-typed identifiers,
//! the validated embedding vector, sector and circuit configuration, the
//! per-frame telemetry record, and the error types raised at startup and
//! at pipeline entry.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod circuit;
pub mod embedding;
pub mod error;
pub mod id;
pub mod telemetry;

pub use circuit::{CircuitConfig, SectorProfile};
pub use embedding::Embedding;
pub use error::{ConfigError, EmbeddingError};
pub use id::{FrameId, LapId, SectorId};
pub use telemetry::{SuspensionTravel, TelemetryRecord, TireTemps};
