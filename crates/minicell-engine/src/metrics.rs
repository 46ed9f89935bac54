//! Per-communication-step metrics.

use minicell_ode::IntegrationReport;

/// What one communication step did and how long it took.
///
/// All durations are in microseconds. The coupling layer fills one of
/// these per step; the hybrid driver forwards it to the reporter.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CommStepMetrics {
    /// Simulated time of the boundary.
    pub time: f64,
    /// Volume used for unit conversion at this step, in litres.
    pub volume_litres: f64,
    /// Whether that volume was capped.
    pub volume_capped: bool,
    /// Volume after the geometry refresh (equal to `volume_litres` for a
    /// fixed geometry).
    pub next_volume_litres: f64,
    /// Integrated metabolites.
    pub metabolites: usize,
    /// Continuous reactions.
    pub reactions: usize,
    /// Wall-clock time for the whole step.
    pub total_us: u64,
    /// Time spent building the continuous network.
    pub assemble_us: u64,
    /// Time spent compiling and integrating.
    pub integrate_us: u64,
    /// Time spent writing counts back and reconciling costs.
    pub writeback_us: u64,
    /// Solver work summary.
    pub integration: IntegrationReport,
    /// Concentration change of every metabolite over the step, in mM.
    pub concentration_deltas: Vec<(String, f64)>,
    /// Cost counters left with an unpaid remainder.
    pub carried_costs: Vec<(String, i64)>,
}

impl CommStepMetrics {
    /// The metabolite with the largest absolute concentration change.
    pub fn largest_delta(&self) -> Option<(&str, f64)> {
        self.concentration_deltas
            .iter()
            .max_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))
            .map(|(k, d)| (k.as_str(), *d))
    }
}
