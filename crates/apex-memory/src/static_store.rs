//! The static knowledge store: O(1) sector lookup (fast path).

use apex_core::{CircuitConfig, SectorId, SectorProfile};
use indexmap::IndexMap;
use serde::Serialize;

/// Access statistics for the static knowledge store.
///
/// An explicit object rather than hidden globals, so callers can read,
/// reset, or merge counters across runs.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct StaticStoreStats {
    /// Lookups that resolved to a profile.
    pub hits: u64,
    /// Lookups for unknown sector ids.
    pub misses: u64,
}

impl StaticStoreStats {
    /// Fraction of lookups that hit, in `[0, 1]`. 0.0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Read-only map from sector id to its precomputed optimal profile.
///
/// Built once from a validated [`CircuitConfig`]; no entries are added or
/// removed afterwards. Lookups are O(1) and counted; a miss returns
/// `None` rather than any default profile.
pub struct StaticKnowledgeStore {
    sectors: IndexMap<SectorId, SectorProfile>,
    access_counts: IndexMap<SectorId, u64>,
    stats: StaticStoreStats,
}

impl StaticKnowledgeStore {
    /// Build the store from a validated circuit configuration.
    ///
    /// Sector order follows the configuration; later duplicates would
    /// overwrite earlier ones, but [`CircuitConfig::validate`] rejects
    /// duplicate ids before a store is ever built.
    pub fn new(config: &CircuitConfig) -> Self {
        let sectors: IndexMap<SectorId, SectorProfile> = config
            .sectors
            .iter()
            .map(|s| (s.id.clone(), s.clone()))
            .collect();
        let access_counts = sectors.keys().map(|id| (id.clone(), 0)).collect();
        Self {
            sectors,
            access_counts,
            stats: StaticStoreStats::default(),
        }
    }

    /// O(1) lookup of a sector profile. Counts the access.
    pub fn lookup(&mut self, id: &SectorId) -> Option<&SectorProfile> {
        match self.sectors.get(id) {
            Some(profile) => {
                self.stats.hits += 1;
                if let Some(count) = self.access_counts.get_mut(id) {
                    *count += 1;
                }
                Some(profile)
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// Whether the store knows the sector, without counting an access.
    pub fn contains(&self, id: &SectorId) -> bool {
        self.sectors.contains_key(id)
    }

    /// All profiles in configured order.
    pub fn all_sectors(&self) -> impl Iterator<Item = &SectorProfile> {
        self.sectors.values()
    }

    /// Number of sectors loaded.
    pub fn len(&self) -> usize {
        self.sectors.len()
    }

    /// True when no sectors are loaded.
    pub fn is_empty(&self) -> bool {
        self.sectors.is_empty()
    }

    /// Access statistics so far.
    pub fn stats(&self) -> &StaticStoreStats {
        &self.stats
    }

    /// The most frequently looked-up sector and its count.
    ///
    /// `None` until at least one lookup has hit. Ties resolve to the
    /// earlier sector in configured order.
    pub fn most_accessed(&self) -> Option<(&SectorId, u64)> {
        self.access_counts
            .iter()
            .filter(|(_, &count)| count > 0)
            .fold(None, |best, (id, &count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((id, count)),
            })
    }
}

impl std::fmt::Debug for StaticKnowledgeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticKnowledgeStore")
            .field("sectors", &self.sectors.len())
            .field("hits", &self.stats.hits)
            .field("misses", &self.stats.misses)
            .finish()
    }
}
