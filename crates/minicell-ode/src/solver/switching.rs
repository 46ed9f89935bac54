//! Non-stiff to stiff method switching.

use log::debug;

use super::runge_kutta::NON_FINITE_DERIVATIVE;
use super::{OdeSolver, OdeSystem, RungeKutta, Scheme, SolverOutcome, SolverStatus, StepObserver};

/// Step attempts the explicit scheme may spend on one output interval
/// before the system is treated as stiff.
const EXPLICIT_INTERVAL_STEPS: usize = 500;

/// Starts on the explicit DoPri5 scheme and switches to Radau5, LSODA
/// style, once the problem turns out to be stiff.
///
/// The explicit scheme gets a small step budget per output interval. The
/// first interval it cannot finish, for any reason but a non-finite
/// derivative, is taken as stiffness: the rest of the span is integrated
/// from the last output point with Radau5. The switch is one-way within a
/// call; every call starts explicit again.
#[derive(Clone, Debug)]
pub struct StiffnessSwitching {
    atol: f64,
    rtol: f64,
    output_step: f64,
    max_steps: usize,
    switched_at: Option<f64>,
}

impl StiffnessSwitching {
    /// Create a solver. `max_steps` bounds step attempts of both schemes
    /// together.
    pub fn new(atol: f64, rtol: f64, output_step: f64, max_steps: usize) -> Self {
        Self {
            atol,
            rtol,
            output_step,
            max_steps,
            switched_at: None,
        }
    }

    /// Time at which the last call moved to the stiff scheme, if it did.
    pub fn switched_at(&self) -> Option<f64> {
        self.switched_at
    }
}

impl OdeSolver for StiffnessSwitching {
    fn name(&self) -> &'static str {
        "auto"
    }

    fn integrate(
        &mut self,
        system: &mut dyn OdeSystem,
        y: &mut [f64],
        t0: f64,
        t_end: f64,
        observer: &mut dyn StepObserver,
    ) -> SolverOutcome {
        self.switched_at = None;
        let mut explicit = RungeKutta::new(
            Scheme::DoPri5,
            self.atol,
            self.rtol,
            self.output_step,
            self.max_steps,
        )
        .with_interval_budget(EXPLICIT_INTERVAL_STEPS);
        let first = explicit.integrate(system, y, t0, t_end, observer);

        let stiff = matches!(
            first.status,
            SolverStatus::ExcessWork
                | SolverStatus::RepeatedErrorTestFailures
                | SolverStatus::RepeatedConvergenceFailures
        ) && first.detail != Some(NON_FINITE_DERIVATIVE);
        let used = first.stats.attempts();
        if !stiff || used >= self.max_steps as u64 {
            return first;
        }

        debug!(
            "dopri5 stalled at t={} after {used} step attempts; switching to radau5",
            first.t
        );
        self.switched_at = Some(first.t);
        let mut implicit = RungeKutta::new(
            Scheme::Radau5,
            self.atol,
            self.rtol,
            self.output_step,
            self.max_steps - used as usize,
        );
        let mut rest = implicit.integrate(system, y, first.t, t_end, observer);
        rest.stats.absorb(&first.stats);
        rest
    }
}
