//! Species → reaction dependency graph.
//!
//! After a firing only the reactions that read a changed species need a
//! new propensity. The graph is extended as reactions are added, so the
//! lookup after each event is a slice borrow with no allocation.

use smallvec::SmallVec;

use crate::reaction::Term;

/// For each species index, the reactions that have it as a reactant.
#[derive(Clone, Debug, Default)]
pub struct DependencyGraph {
    readers: Vec<SmallVec<[usize; 8]>>,
}

impl DependencyGraph {
    /// Make room for `n` species.
    pub(crate) fn ensure_species(&mut self, n: usize) {
        if self.readers.len() < n {
            self.readers.resize_with(n, SmallVec::new);
        }
    }

    /// Record that `reaction` reads every species in `reactants`.
    pub(crate) fn register(&mut self, reaction: usize, reactants: &[Term]) {
        for term in reactants {
            self.ensure_species(term.species + 1);
            let list = &mut self.readers[term.species];
            if list.last() != Some(&reaction) {
                list.push(reaction);
            }
        }
    }

    /// Reactions whose propensity depends on `species`.
    pub fn dependents(&self, species: usize) -> &[usize] {
        self.readers.get(species).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Collect the de-duplicated set of reactions affected by a change
    /// to any of `changed` into `out` (cleared first).
    pub(crate) fn collect_affected(
        &self,
        changed: impl IntoIterator<Item = usize>,
        out: &mut Vec<usize>,
    ) {
        out.clear();
        for species in changed {
            out.extend_from_slice(self.dependents(species));
        }
        out.sort_unstable();
        out.dedup();
    }
}
