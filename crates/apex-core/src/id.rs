//! Strongly-typed identifiers for sectors, laps, and frames.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a circuit sector (e.g. `"Sector_4"`).
///
/// Sector IDs come from the circuit configuration and are the lookup key
/// for the static knowledge store. They are unique within a circuit.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectorId(pub String);

impl SectorId {
    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SectorId {
    fn from(v: &str) -> Self {
        Self(v.to_string())
    }
}

impl From<String> for SectorId {
    fn from(v: String) -> Self {
        Self(v)
    }
}

/// Identifies a simulated lap within a run.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct LapId(pub u64);

impl fmt::Display for LapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for LapId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Frame counter within a lap.
///
/// Monotonically increasing across the lap; frame 0 is the first frame of
/// the first sector.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct FrameId(pub u64);

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for FrameId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}
