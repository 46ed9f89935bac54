//! Elementary reactions of the discrete network.

use std::fmt;

use minicell_core::SpeciesMap;
use smallvec::SmallVec;

/// One distinct species on a side of a reaction, with its multiplicity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Term {
    /// Index into the network's [`SpeciesMap`].
    pub species: usize,
    /// Number of occurrences of the species on this side.
    pub multiplicity: u32,
}

pub(crate) type Side = SmallVec<[Term; 4]>;

/// Collapse a list of species indices into distinct terms, keeping the
/// order of first occurrence.
pub(crate) fn collapse(indices: impl IntoIterator<Item = usize>) -> Side {
    let mut side = Side::new();
    for idx in indices {
        match side.iter_mut().find(|t| t.species == idx) {
            Some(term) => term.multiplicity += 1,
            None => side.push(Term {
                species: idx,
                multiplicity: 1,
            }),
        }
    }
    side
}

/// A mass-action reaction over integer particle counts.
///
/// The propensity is `rate × Π count(s)^multiplicity(s)` over the distinct
/// reactant species. Repeated reactants contribute one factor per
/// occurrence with no combinatorial correction.
#[derive(Clone, Debug, PartialEq)]
pub struct ElementaryReaction {
    pub(crate) reactants: Side,
    pub(crate) products: Side,
    pub(crate) rate: f64,
}

impl ElementaryReaction {
    /// Distinct reactant species with multiplicities.
    pub fn reactants(&self) -> &[Term] {
        &self.reactants
    }

    /// Distinct product species with multiplicities.
    pub fn products(&self) -> &[Term] {
        &self.products
    }

    /// The rate constant.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Evaluate the propensity against the current counts.
    pub fn propensity(&self, species: &SpeciesMap) -> f64 {
        let mut a = self.rate;
        for term in &self.reactants {
            let n = species.count_at(term.species).unwrap_or(0) as f64;
            a *= n.powi(term.multiplicity as i32);
        }
        a
    }

    /// Signed count change applied to each touched species by one firing.
    pub(crate) fn deltas(&self) -> impl Iterator<Item = (usize, i64)> + '_ {
        self.reactants
            .iter()
            .map(|t| (t.species, -i64::from(t.multiplicity)))
            .chain(
                self.products
                    .iter()
                    .map(|t| (t.species, i64::from(t.multiplicity))),
            )
    }

    /// Render the reaction with species names, e.g.
    /// `1A + 2B -> 1C (K = 0.100000)`.
    pub fn display<'a>(&'a self, species: &'a SpeciesMap) -> ReactionDisplay<'a> {
        ReactionDisplay {
            reaction: self,
            species,
        }
    }
}

/// [`Display`](fmt::Display) adapter returned by [`ElementaryReaction::display`].
pub struct ReactionDisplay<'a> {
    reaction: &'a ElementaryReaction,
    species: &'a SpeciesMap,
}

impl ReactionDisplay<'_> {
    fn side(&self, f: &mut fmt::Formatter<'_>, side: &[Term]) -> fmt::Result {
        if side.is_empty() {
            return write!(f, "0");
        }
        for (i, term) in side.iter().enumerate() {
            if i > 0 {
                write!(f, " + ")?;
            }
            let key = self.species.key_at(term.species).unwrap_or("?");
            write!(f, "{}{}", term.multiplicity, key)?;
        }
        Ok(())
    }
}

impl fmt::Display for ReactionDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.side(f, &self.reaction.reactants)?;
        write!(f, " -> ")?;
        self.side(f, &self.reaction.products)?;
        write!(f, " (K = {:.6})", self.reaction.rate)
    }
}
