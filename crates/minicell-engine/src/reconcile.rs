//! Reconciliation of accumulated costs against metabolite pools.
//!
//! Discrete processes (transcription, translation, replication, ...)
//! record the nucleotides and energy they consume in counter species
//! instead of drawing from the metabolite pools directly. After each
//! continuous integration the counters are settled against the pools by
//! an ordered list of [`ReconciliationRule`]s.

use log::{debug, warn};
use minicell_core::{SimError, SpeciesWriter};

/// One settlement step.
#[derive(Clone, Debug, PartialEq)]
pub enum ReconciliationRule {
    /// Move `min(counter, pool)` out of `pool`, credit the same amount to
    /// each byproduct, and leave the unpaid remainder in `counter`.
    Drain {
        /// Cost counter species.
        counter: String,
        /// Pool paying the cost.
        pool: String,
        /// Species credited with the consumed amount.
        byproducts: Vec<String>,
    },
    /// Add `counter` to `pool` and reset it.
    Recycle {
        /// Counter species.
        counter: String,
        /// Pool receiving the counter.
        pool: String,
    },
}

impl ReconciliationRule {
    /// The counter species this rule settles.
    pub fn counter(&self) -> &str {
        match self {
            Self::Drain { counter, .. } | Self::Recycle { counter, .. } => counter,
        }
    }
}

/// An ordered rule list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReconciliationRules {
    rules: Vec<ReconciliationRule>,
}

const NTP_COUNTERS: [(&str, &str); 12] = [
    ("ATP_mRNA", "M_atp_c"),
    ("CTP_mRNA", "M_ctp_c"),
    ("UTP_mRNA", "M_utp_c"),
    ("GTP_mRNA", "M_gtp_c"),
    ("ATP_tRNA", "M_atp_c"),
    ("CTP_tRNA", "M_ctp_c"),
    ("UTP_tRNA", "M_utp_c"),
    ("GTP_tRNA", "M_gtp_c"),
    ("ATP_rRNA", "M_atp_c"),
    ("CTP_rRNA", "M_ctp_c"),
    ("UTP_rRNA", "M_utp_c"),
    ("GTP_rRNA", "M_gtp_c"),
];

const DNTP_COUNTERS: [(&str, &str); 4] = [
    ("dATP_DNArep", "M_datp_c"),
    ("dTTP_DNArep", "M_dttp_c"),
    ("dCTP_DNArep", "M_dctp_c"),
    ("dGTP_DNArep", "M_dgtp_c"),
];

const NMP_COUNTERS: [(&str, &str); 4] = [
    ("AMP_mRNAdeg", "M_amp_c"),
    ("UMP_mRNAdeg", "M_ump_c"),
    ("CMP_mRNAdeg", "M_cmp_c"),
    ("GMP_mRNAdeg", "M_gmp_c"),
];

impl ReconciliationRules {
    /// No rules.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Energy, nucleotide and tRNA costs of the minimal cell, in the order
    /// they are settled.
    pub fn minimal_cell() -> Self {
        let mut r = Self::empty()
            .drain("ATP_translat", "M_gtp_c", &["M_gdp_c", "M_pi_c"]);
        for counter in ["ATP_trsc", "ATP_mRNAdeg", "ATP_DNArep", "ATP_transloc"] {
            r = r.drain(counter, "M_atp_c", &["M_adp_c", "M_pi_c"]);
        }
        for (counter, pool) in NTP_COUNTERS.iter().chain(DNTP_COUNTERS.iter()) {
            r = r.drain(counter, pool, &["M_ppi_c"]);
        }
        for (counter, pool) in NMP_COUNTERS {
            r = r.recycle(counter, pool);
        }
        r.drain("FMET_cost", "M_fmettrna_c", &["M_trnamet_c"])
    }

    /// Append a drain rule.
    pub fn drain(mut self, counter: &str, pool: &str, byproducts: &[&str]) -> Self {
        self.rules.push(ReconciliationRule::Drain {
            counter: counter.to_string(),
            pool: pool.to_string(),
            byproducts: byproducts.iter().map(|s| s.to_string()).collect(),
        });
        self
    }

    /// Append a recycle rule.
    pub fn recycle(mut self, counter: &str, pool: &str) -> Self {
        self.rules.push(ReconciliationRule::Recycle {
            counter: counter.to_string(),
            pool: pool.to_string(),
        });
        self
    }

    /// The rules in settlement order.
    pub fn rules(&self) -> &[ReconciliationRule] {
        &self.rules
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether there are no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Settle every counter against its pool.
    ///
    /// A rule whose counter is not a declared species is skipped, so one
    /// rule set can serve partial models. Once the counter exists, its
    /// pool and byproducts must exist too.
    ///
    /// # Errors
    ///
    /// [`minicell_core::DefinitionError::UndeclaredSpecies`] for a missing pool or
    /// byproduct.
    pub fn apply<S: SpeciesWriter + ?Sized>(
        &self,
        store: &mut S,
    ) -> Result<ReconciliationOutcome, SimError> {
        let mut outcome = ReconciliationOutcome::default();
        for rule in &self.rules {
            let Some(cost) = store.count(rule.counter()) else {
                continue;
            };
            match rule {
                ReconciliationRule::Drain {
                    counter,
                    pool,
                    byproducts,
                } => {
                    let mut available = store.require(pool)?;
                    let mut cost = cost;
                    if available < 0 {
                        debug!("pool {pool} at {available}; clamping and charging {counter}");
                        cost -= available;
                        available = 0;
                    }
                    let paid = cost.clamp(0, available);
                    for b in byproducts {
                        let current = store.require(b)?;
                        store.write_count(b, current + paid)?;
                    }
                    store.write_count(pool, available - paid)?;
                    store.write_count(counter, cost - paid)?;
                    outcome.consumed += paid;
                    if cost - paid > 0 {
                        outcome.carried.push((counter.clone(), cost - paid));
                    }
                }
                ReconciliationRule::Recycle { counter, pool } => {
                    let current = store.require(pool)?;
                    store.write_count(pool, current + cost)?;
                    store.write_count(counter, 0)?;
                    outcome.recycled += cost;
                }
            }
        }
        for (counter, remainder) in &outcome.carried {
            warn!("cost {counter} carries {remainder} unpaid particles to the next step");
        }
        Ok(outcome)
    }
}

/// What one reconciliation pass did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReconciliationOutcome {
    /// Particles drained from pools.
    pub consumed: i64,
    /// Particles returned to pools by recycle rules.
    pub recycled: i64,
    /// Counters left with an unpaid remainder.
    pub carried: Vec<(String, i64)>,
}
