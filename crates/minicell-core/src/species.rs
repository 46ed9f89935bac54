//! Insertion-ordered species count map.

use indexmap::IndexMap;

use crate::traits::{SpeciesReader, SpeciesWriter};

/// Species particle counts keyed by species name, in declaration order.
///
/// Used as the backing store of the discrete engine and as a standalone
/// store in tests of the coupling layer. Declaration is idempotent: a
/// second [`declare`](SpeciesMap::declare) of the same key keeps the
/// existing count and index.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpeciesMap {
    counts: IndexMap<String, i64>,
}

impl SpeciesMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a species at count 0 if it is not already present.
    ///
    /// Returns the species' stable index.
    pub fn declare(&mut self, key: &str) -> usize {
        match self.counts.get_index_of(key) {
            Some(idx) => idx,
            None => {
                self.counts.insert(key.to_string(), 0);
                self.counts.len() - 1
            }
        }
    }

    /// Stable index of a declared species.
    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.counts.get_index_of(key)
    }

    /// Key of the species at `index`.
    pub fn key_at(&self, index: usize) -> Option<&str> {
        self.counts.get_index(index).map(|(k, _)| k.as_str())
    }

    /// Count of the species at `index`.
    pub fn count_at(&self, index: usize) -> Option<i64> {
        self.counts.get_index(index).map(|(_, &v)| v)
    }

    /// Mutable count of the species at `index`.
    pub fn count_at_mut(&mut self, index: usize) -> Option<&mut i64> {
        self.counts.get_index_mut(index).map(|(_, v)| v)
    }

    /// Number of declared species.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether no species are declared.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Iterate `(key, count)` in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.counts.iter().map(|(k, &v)| (k.as_str(), v))
    }
}

impl SpeciesReader for SpeciesMap {
    fn count(&self, key: &str) -> Option<i64> {
        self.counts.get(key).copied()
    }

    fn species_len(&self) -> usize {
        self.counts.len()
    }

    fn for_each_species(&self, f: &mut dyn FnMut(&str, i64)) {
        for (k, &v) in &self.counts {
            f(k, v);
        }
    }
}

impl SpeciesWriter for SpeciesMap {
    fn count_mut(&mut self, key: &str) -> Option<&mut i64> {
        self.counts.get_mut(key)
    }
}

impl<'a> FromIterator<(&'a str, i64)> for SpeciesMap {
    fn from_iter<T: IntoIterator<Item = (&'a str, i64)>>(iter: T) -> Self {
        let mut map = SpeciesMap::new();
        for (key, count) in iter {
            let idx = map.declare(key);
            if let Some(slot) = map.count_at_mut(idx) {
                *slot = count;
            }
        }
        map
    }
}
