use std::collections::HashMap;

use leadmap_core::ScoredBusiness;

/// Insertion-ordered set of businesses keyed by place id.
///
/// The first business recorded for an id wins; later inserts with the same
/// id are ignored. One accumulator belongs to exactly one run.
#[derive(Debug, Default)]
pub struct DedupAccumulator {
    positions: HashMap<String, usize>,
    entries: Vec<ScoredBusiness>,
}

impl DedupAccumulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, place_id: &str) -> bool {
        self.positions.contains_key(place_id)
    }

    /// Records `business` unless its id is already present. Returns `true`
    /// if it was inserted.
    pub fn insert_if_absent(&mut self, business: ScoredBusiness) -> bool {
        if self.contains(&business.place_id) {
            return false;
        }
        self.positions
            .insert(business.place_id.clone(), self.entries.len());
        self.entries.push(business);
        true
    }

    #[must_use]
    pub fn get(&self, place_id: &str) -> Option<&ScoredBusiness> {
        self.positions.get(place_id).map(|&i| &self.entries[i])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Businesses in discovery order.
    #[must_use]
    pub fn as_slice(&self) -> &[ScoredBusiness] {
        &self.entries
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<ScoredBusiness> {
        self.entries
    }
}
