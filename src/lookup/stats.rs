//! Lookup Statistics Module
//!
//! Counts how lookups were answered: positive cache, negative cache, or network.

use serde::Serialize;

// == Lookup Stats ==
/// Tracks how lookups were resolved.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LookupStats {
    /// Lookups answered from the positive cache
    pub hits: u64,
    /// Lookups answered "known absent" from the negative cache
    pub negative_hits: u64,
    /// Lookups that went to the directory
    pub fetches: u64,
    /// Cache reads or writes that failed and were bypassed
    pub cache_errors: u64,
}

impl LookupStats {
    // == Constructor ==
    /// Creates a new LookupStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Share of lookups answered without the network.
    ///
    /// Returns 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let cached = self.hits + self.negative_hits;
        let total = cached + self.fetches;
        if total == 0 {
            0.0
        } else {
            cached as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_negative_hit(&mut self) {
        self.negative_hits += 1;
    }

    pub fn record_fetch(&mut self) {
        self.fetches += 1;
    }

    pub fn record_cache_error(&mut self) {
        self.cache_errors += 1;
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = LookupStats::new();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.negative_hits, 0);
        assert_eq!(stats.fetches, 0);
        assert_eq!(stats.cache_errors, 0);
    }

    #[test]
    fn test_hit_rate_no_requests() {
        let stats = LookupStats::new();
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_counts_negative_hits() {
        let mut stats = LookupStats::new();
        stats.record_hit();
        stats.record_negative_hit();
        stats.record_fetch();
        stats.record_fetch();
        assert_eq!(stats.hit_rate(), 0.5);
    }

    #[test]
    fn test_hit_rate_all_fetches() {
        let mut stats = LookupStats::new();
        stats.record_fetch();
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_record_cache_error() {
        let mut stats = LookupStats::new();
        stats.record_cache_error();
        stats.record_cache_error();
        assert_eq!(stats.cache_errors, 2);
    }
}
