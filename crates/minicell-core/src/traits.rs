//! Species store traits used at communication boundaries.
//!
//! The discrete engine owns the authoritative species counts. The coupling
//! layer and reporting collaborators only see them through these traits,
//! which keeps the coupling code testable against a plain map.

use crate::error::DefinitionError;

/// Read-only access to species particle counts.
pub trait SpeciesReader {
    /// Current particle count of a species.
    ///
    /// Returns `None` if the species was never declared.
    fn count(&self, key: &str) -> Option<i64>;

    /// Whether the species has been declared.
    fn contains(&self, key: &str) -> bool {
        self.count(key).is_some()
    }

    /// Current count of a species that must exist.
    ///
    /// # Errors
    ///
    /// [`DefinitionError::UndeclaredSpecies`] if `key` was never declared.
    fn require(&self, key: &str) -> Result<i64, DefinitionError> {
        self.count(key).ok_or_else(|| undeclared(key))
    }

    /// Number of declared species.
    fn species_len(&self) -> usize;

    /// Visit every `(key, count)` pair in declaration order.
    fn for_each_species(&self, f: &mut dyn FnMut(&str, i64));
}

/// Mutable access to species particle counts.
///
/// Writers never create species: writing an undeclared key is reported
/// to the caller rather than silently registering it.
pub trait SpeciesWriter: SpeciesReader {
    /// Mutable reference to a species count.
    ///
    /// Returns `None` if the species was never declared.
    fn count_mut(&mut self, key: &str) -> Option<&mut i64>;

    /// Overwrite a species count. Returns `false` if undeclared.
    fn set_count(&mut self, key: &str, value: i64) -> bool {
        match self.count_mut(key) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Overwrite the count of a species that must exist.
    ///
    /// # Errors
    ///
    /// [`DefinitionError::UndeclaredSpecies`] if `key` was never declared;
    /// the store is left unchanged.
    fn write_count(&mut self, key: &str, value: i64) -> Result<(), DefinitionError> {
        if self.set_count(key, value) {
            Ok(())
        } else {
            Err(undeclared(key))
        }
    }
}

fn undeclared(key: &str) -> DefinitionError {
    DefinitionError::UndeclaredSpecies {
        species: key.to_string(),
    }
}
