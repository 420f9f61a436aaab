//! The tracer: an append-only collector of refinement records (§4.8).
//!
//! The tracer is the only channel by which operators communicate provenance
//! to the host; no operator reads it back.

use crate::ids::StateKey;
use crate::record::RefinementRecord;

/// Append-only log of `(StateKey, RefinementRecord)` pairs.
#[derive(Debug, Default, Clone)]
pub struct Tracer {
    entries: Vec<(StateKey, RefinementRecord)>,
}

impl Tracer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a refinement. Never fails, never rewrites history.
    pub fn record(&mut self, key: StateKey, record: RefinementRecord) {
        self.entries.push((key, record));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(StateKey, RefinementRecord)> {
        self.entries.iter()
    }

    /// All records for a given key, in the order they were recorded.
    pub fn for_key<'a>(&'a self, key: &'a StateKey) -> impl Iterator<Item = &'a RefinementRecord> {
        self.entries
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, r)| r)
    }
}
