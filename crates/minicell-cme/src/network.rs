//! The discrete reaction network and its cached propensities.

use std::fmt;

use log::debug;
use minicell_core::{
    DefinitionError, NumericError, ReactionId, SimError, SpeciesMap, SpeciesReader,
    SpeciesWriter,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::dependency::DependencyGraph;
use crate::reaction::{collapse, ElementaryReaction};

/// A well-mixed discrete reaction network simulated with the exact SSA.
///
/// The network owns the authoritative species counts for a run. Reactions
/// are kept in declaration order, which is also the order used when
/// selecting the next reaction to fire. Propensities are cached and
/// maintained incrementally through a [`DependencyGraph`]; any external
/// write to counts or rates marks the cache stale and the next firing or
/// solve recomputes it from scratch.
#[derive(Clone, Debug)]
pub struct CmeNetwork {
    pub(crate) species: SpeciesMap,
    pub(crate) reactions: Vec<ElementaryReaction>,
    pub(crate) propensities: Vec<f64>,
    pub(crate) total_propensity: f64,
    pub(crate) firings: Vec<u64>,
    pub(crate) deps: DependencyGraph,
    pub(crate) rng: ChaCha8Rng,
    pub(crate) seed: u64,
    pub(crate) time: f64,
    pub(crate) stale: bool,
    scratch: Vec<usize>,
}

impl CmeNetwork {
    /// Create an empty network with a randomly drawn seed.
    ///
    /// The seed is available through [`seed`](Self::seed) so the
    /// trajectory can be reproduced with [`with_seed`](Self::with_seed).
    pub fn new() -> Self {
        let seed: u64 = rand::rng().random();
        Self::with_seed(seed)
    }

    /// Create an empty network whose random stream is fixed by `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            species: SpeciesMap::new(),
            reactions: Vec::new(),
            propensities: Vec::new(),
            total_propensity: 0.0,
            firings: Vec::new(),
            deps: DependencyGraph::default(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            time: 0.0,
            stale: true,
            scratch: Vec::new(),
        }
    }

    /// The seed of the random stream.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Simulated time of the last event or hook within the current solve.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Register species at count 0. Already declared species keep their
    /// counts.
    pub fn declare_species<I, S>(&mut self, keys: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for key in keys {
            self.species.declare(key.as_ref());
        }
        self.deps.ensure_species(self.species.len());
    }

    /// Add a mass-action reaction.
    ///
    /// Reactant and product lists are multisets: a key listed twice has
    /// multiplicity 2. Every key must already be declared.
    pub fn add_reaction(
        &mut self,
        reactants: &[&str],
        products: &[&str],
        rate: f64,
    ) -> Result<ReactionId, DefinitionError> {
        if reactants.is_empty() && products.is_empty() {
            return Err(DefinitionError::MalformedReaction {
                reason: "reaction has neither reactants nor products".into(),
            });
        }
        let lookup = |key: &&str| {
            self.species
                .index_of(key)
                .ok_or_else(|| DefinitionError::UndeclaredSpecies {
                    species: (*key).to_string(),
                })
        };
        let r_idx = reactants.iter().map(lookup).collect::<Result<Vec<_>, _>>()?;
        let p_idx = products.iter().map(lookup).collect::<Result<Vec<_>, _>>()?;
        if !(rate.is_finite() && rate >= 0.0) {
            return Err(DefinitionError::InvalidRate {
                reaction: format!("{} -> {}", reactants.join(" + "), products.join(" + ")),
                rate,
            });
        }

        let reaction = ElementaryReaction {
            reactants: collapse(r_idx),
            products: collapse(p_idx),
            rate,
        };
        let idx = self.reactions.len();
        self.deps.register(idx, &reaction.reactants);
        self.reactions.push(reaction);
        self.propensities.push(0.0);
        self.firings.push(0);
        self.stale = true;
        Ok(ReactionId(idx as u32))
    }

    /// Add `amount` particles (floored) to a declared species.
    pub fn add_particles(&mut self, species: &str, amount: f64) -> Result<(), SimError> {
        if !amount.is_finite() {
            return Err(SimError::InvalidArgument {
                reason: format!("cannot add {amount} particles of '{species}'"),
            });
        }
        let slot = self
            .species
            .count_mut(species)
            .ok_or_else(|| DefinitionError::UndeclaredSpecies {
                species: species.to_string(),
            })?;
        *slot += amount.floor() as i64;
        self.stale = true;
        Ok(())
    }

    /// Replace the rate constant of a reaction.
    pub fn set_rate(&mut self, id: ReactionId, rate: f64) -> Result<(), DefinitionError> {
        let idx = id.index();
        if idx >= self.reactions.len() {
            return Err(DefinitionError::UnknownReaction {
                reaction: id.to_string(),
            });
        }
        if !(rate.is_finite() && rate >= 0.0) {
            return Err(DefinitionError::InvalidRate {
                reaction: self.describe(idx),
                rate,
            });
        }
        self.reactions[idx].rate = rate;
        self.stale = true;
        Ok(())
    }

    /// The species store.
    pub fn species(&self) -> &SpeciesMap {
        &self.species
    }

    /// A reaction by id.
    pub fn reaction(&self, id: ReactionId) -> Option<&ElementaryReaction> {
        self.reactions.get(id.index())
    }

    /// Number of reactions.
    pub fn reaction_count(&self) -> usize {
        self.reactions.len()
    }

    /// Cached propensity of a reaction.
    ///
    /// Only current after [`refresh_propensities`](Self::refresh_propensities),
    /// a [`fire`](Self::fire), or inside a solve.
    pub fn propensity(&self, id: ReactionId) -> Option<f64> {
        self.propensities.get(id.index()).copied()
    }

    /// Cached sum of all propensities.
    pub fn total_propensity(&self) -> f64 {
        self.total_propensity
    }

    /// Number of times a reaction has fired since construction.
    pub fn firing_count(&self, id: ReactionId) -> u64 {
        self.firings.get(id.index()).copied().unwrap_or(0)
    }

    /// Total number of firings since construction.
    pub fn total_firings(&self) -> u64 {
        self.firings.iter().sum()
    }

    /// Species whose count is below zero.
    pub fn negative_species(&self) -> Vec<(&str, i64)> {
        self.species.iter().filter(|&(_, n)| n < 0).collect()
    }

    /// Human-readable form of a reaction.
    pub fn describe(&self, idx: usize) -> String {
        match self.reactions.get(idx) {
            Some(r) => r.display(&self.species).to_string(),
            None => format!("#{idx}"),
        }
    }

    fn checked_propensity(&self, idx: usize) -> Result<f64, NumericError> {
        let a = self.reactions[idx].propensity(&self.species);
        if a.is_nan() {
            return Err(NumericError::NanPropensity {
                reaction: self.describe(idx),
                time: self.time,
            });
        }
        if a < 0.0 {
            return Err(NumericError::NegativePropensity {
                reaction: self.describe(idx),
                propensity: a,
                time: self.time,
            });
        }
        Ok(a)
    }

    /// Recompute every propensity from the current counts.
    ///
    /// Returns the new total propensity.
    pub fn refresh_propensities(&mut self) -> Result<f64, NumericError> {
        let mut total = 0.0;
        for idx in 0..self.reactions.len() {
            let a = self.checked_propensity(idx)?;
            self.propensities[idx] = a;
            total += a;
        }
        self.total_propensity = total;
        self.stale = false;
        Ok(total)
    }

    /// Fire one reaction and update the affected propensities.
    pub fn fire(&mut self, id: ReactionId) -> Result<(), SimError> {
        let idx = id.index();
        if idx >= self.reactions.len() {
            return Err(DefinitionError::UnknownReaction {
                reaction: id.to_string(),
            }
            .into());
        }
        if self.stale {
            self.refresh_propensities()?;
        }
        self.apply(idx)?;
        Ok(())
    }

    /// Apply the signed multiplicities of reaction `idx` and recompute only
    /// the reactions that read a changed species.
    pub(crate) fn apply(&mut self, idx: usize) -> Result<(), NumericError> {
        let reaction = &self.reactions[idx];
        for (species, delta) in reaction.deltas() {
            if let Some(n) = self.species.count_at_mut(species) {
                *n += delta;
            }
        }
        self.deps
            .collect_affected(reaction.deltas().map(|(s, _)| s), &mut self.scratch);
        self.firings[idx] += 1;

        for k in 0..self.scratch.len() {
            let j = self.scratch[k];
            let a = self.checked_propensity(j)?;
            self.total_propensity += a - self.propensities[j];
            self.propensities[j] = a;
        }
        if self.total_propensity < 0.0 {
            debug!(
                "total propensity drifted to {} at t={}; clamping",
                self.total_propensity, self.time
            );
            self.total_propensity = 0.0;
        }
        Ok(())
    }

    /// Pick the first reaction, in declaration order, whose cumulative
    /// propensity exceeds `threshold`.
    ///
    /// Returns the last reaction with a positive propensity if float drift
    /// leaves the threshold just above the cumulative sum, and `None` only
    /// if every propensity is zero.
    pub(crate) fn select(&self, threshold: f64) -> Option<usize> {
        let mut cumulative = 0.0;
        let mut last_positive = None;
        for (idx, &a) in self.propensities.iter().enumerate() {
            if a <= 0.0 {
                continue;
            }
            cumulative += a;
            if cumulative > threshold {
                return Some(idx);
            }
            last_positive = Some(idx);
        }
        last_positive
    }
}

impl Default for CmeNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeciesReader for CmeNetwork {
    fn count(&self, key: &str) -> Option<i64> {
        self.species.count(key)
    }

    fn species_len(&self) -> usize {
        self.species.len()
    }

    fn for_each_species(&self, f: &mut dyn FnMut(&str, i64)) {
        self.species.for_each_species(f);
    }
}

impl SpeciesWriter for CmeNetwork {
    fn count_mut(&mut self, key: &str) -> Option<&mut i64> {
        self.stale = true;
        self.species.count_mut(key)
    }
}

impl fmt::Display for CmeNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# CME network (seed {})", self.seed)?;
        writeln!(f, "## Species")?;
        for (key, n) in self.species.iter() {
            writeln!(f, "{key}: {n}")?;
        }
        writeln!(f, "## Reactions")?;
        for r in &self.reactions {
            writeln!(f, "{}", r.display(&self.species))?;
        }
        Ok(())
    }
}
