//! Error types for the apex pipeline.
//!
//! Organized by when the failure is detected: configuration errors are
//! fatal at startup, embedding errors are rejected at pipeline entry.
//! Fast-path sector misses are deliberately absent here: the decision
//! orchestrator recovers them by routing through the slow path, and they
//! surface only through decision statistics.

use std::error::Error;
use std::fmt;

/// Errors detected while loading or validating the circuit configuration.
///
/// All variants are fatal: the simulation never starts with an invalid
/// circuit or an out-of-range pipeline parameter.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// The configuration text could not be parsed.
    Parse {
        /// Parser diagnostic.
        reason: String,
    },
    /// The sector list is empty.
    NoSectors,
    /// Two sectors share the same id.
    DuplicateSector {
        /// The repeated sector id.
        id: String,
    },
    /// `distance_end_m` is not greater than `distance_start_m`.
    InvalidDistanceRange {
        /// The offending sector id.
        id: String,
        /// Configured sector start, meters.
        start_m: f64,
        /// Configured sector end, meters.
        end_m: f64,
    },
    /// `avg_speed_kmh` is not finite and positive.
    InvalidSpeed {
        /// The offending sector id.
        id: String,
        /// The invalid value.
        value: f64,
    },
    /// `optimal_throttle` is outside `[0, 1]`.
    InvalidThrottle {
        /// The offending sector id.
        id: String,
        /// The invalid value.
        value: f64,
    },
    /// A lean angle is not finite or outside `[0, 75]` degrees.
    InvalidLeanAngle {
        /// The offending sector id.
        id: String,
        /// The invalid value.
        value: f64,
    },
    /// `banking_degrees` is not finite.
    InvalidBanking {
        /// The offending sector id.
        id: String,
        /// The invalid value.
        value: f64,
    },
    /// A store, synthesizer, or orchestrator parameter is out of range.
    InvalidParameter {
        /// Description of which parameter and why.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse { reason } => write!(f, "config parse failed: {reason}"),
            Self::NoSectors => write!(f, "circuit has no sectors"),
            Self::DuplicateSector { id } => write!(f, "duplicate sector id '{id}'"),
            Self::InvalidDistanceRange { id, start_m, end_m } => write!(
                f,
                "sector '{id}' distance range [{start_m}, {end_m}] is not increasing"
            ),
            Self::InvalidSpeed { id, value } => write!(
                f,
                "sector '{id}' avg_speed_kmh must be finite and positive, got {value}"
            ),
            Self::InvalidThrottle { id, value } => write!(
                f,
                "sector '{id}' optimal_throttle must be in [0, 1], got {value}"
            ),
            Self::InvalidLeanAngle { id, value } => write!(
                f,
                "sector '{id}' lean angle must be finite and in [0, 75], got {value}"
            ),
            Self::InvalidBanking { id, value } => {
                write!(f, "sector '{id}' banking_degrees must be finite, got {value}")
            }
            Self::InvalidParameter { reason } => write!(f, "invalid parameter: {reason}"),
        }
    }
}

impl Error for ConfigError {}

/// Errors from embedding validation.
///
/// Raised at orchestrator entry and at similarity-store `add`; a rejected
/// embedding never corrupts counters or stored history.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmbeddingError {
    /// Zero-length component vector.
    Empty,
    /// A component is NaN or infinite.
    NonFinite {
        /// Index of the first non-finite component.
        index: usize,
    },
    /// The vector's dimension does not match the configured dimension.
    DimensionMismatch {
        /// The dimension the pipeline was configured with.
        expected: usize,
        /// The dimension actually supplied.
        got: usize,
    },
}

impl fmt::Display for EmbeddingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "embedding has no components"),
            Self::NonFinite { index } => {
                write!(f, "embedding component {index} is not finite")
            }
            Self::DimensionMismatch { expected, got } => {
                write!(f, "embedding dimension mismatch: expected {expected}, got {got}")
            }
        }
    }
}

impl Error for EmbeddingError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::InvalidThrottle {
            id: "Sector_2".to_string(),
            value: 1.4,
        };
        let msg = format!("{err}");
        assert!(msg.contains("Sector_2"));
        assert!(msg.contains("1.4"));
    }

    #[test]
    fn embedding_error_display() {
        let err = EmbeddingError::DimensionMismatch {
            expected: 512,
            got: 256,
        };
        let msg = format!("{err}");
        assert!(msg.contains("512"));
        assert!(msg.contains("256"));
    }
}
