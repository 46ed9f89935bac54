//! The ODE solver seam.
//!
//! The host owns the state buffer and hands it to the solver as a mutable
//! slice; solvers never resize or replace it. The right-hand side is a
//! trait object called with strict call/return nesting. Outcomes use
//! LSODA-compatible status codes: a positive code is success, anything
//! `<= 0` is fatal.
//!
//! The numerical methods come from `russell_ode`: [`RungeKutta`] adapts
//! one of its schemes to this seam and [`StiffnessSwitching`] chains an
//! explicit and an implicit scheme the way LSODA does.

use std::ops::ControlFlow;

mod runge_kutta;
mod switching;

pub use runge_kutta::{RungeKutta, Scheme};
pub use switching::StiffnessSwitching;

/// Right-hand side `dy/dt = f(t, y)`.
pub trait OdeSystem {
    /// Length of the state vector.
    fn dimension(&self) -> usize;

    /// Write `f(t, y)` into `dydt`.
    fn derivative(&mut self, t: f64, y: &[f64], dydt: &mut [f64]);
}

/// Called at every output point with the updated state.
///
/// Output points are spaced by the solver's output step; the last one is
/// the end of the span.
pub trait StepObserver {
    /// Inspect the state; `Break` stops integration with
    /// [`SolverStatus::Interrupted`].
    fn on_step(&mut self, t: f64, y: &[f64]) -> ControlFlow<()>;
}

/// Observer that accepts every step.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unobserved;

impl StepObserver for Unobserved {
    fn on_step(&mut self, _t: f64, _y: &[f64]) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}

/// Result of a solver run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolverStatus {
    /// Reached the end of the span.
    Success,
    /// The step budget ran out first.
    ExcessWork,
    /// Invalid span or tolerances.
    IllegalInput,
    /// The step size shrank below the representable minimum while
    /// failing the error test.
    RepeatedErrorTestFailures,
    /// The Newton iteration failed to converge, or its matrix stayed
    /// singular, as the step shrank.
    RepeatedConvergenceFailures,
    /// A [`StepObserver`] stopped the run.
    Interrupted,
}

impl SolverStatus {
    /// LSODA-style integer code.
    pub fn code(self) -> i32 {
        match self {
            Self::Success => 2,
            Self::ExcessWork => -1,
            Self::IllegalInput => -3,
            Self::RepeatedErrorTestFailures => -4,
            Self::RepeatedConvergenceFailures => -5,
            Self::Interrupted => -8,
        }
    }

    /// Whether the code signals success.
    pub fn is_success(self) -> bool {
        self.code() > 0
    }
}

/// Work counters of a solver run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SolverStats {
    /// Accepted steps.
    pub accepted_steps: u64,
    /// Rejected step attempts.
    pub rejected_steps: u64,
    /// Right-hand side evaluations, including those for Jacobians.
    pub rhs_evaluations: u64,
    /// Jacobian evaluations.
    pub jacobian_evaluations: u64,
}

/// What a solver returns.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolverOutcome {
    /// Status code.
    pub status: SolverStatus,
    /// Time reached. Equals the end of the span on success.
    pub t: f64,
    /// Work counters.
    pub stats: SolverStats,
    /// Message of the underlying failure, if any.
    pub detail: Option<&'static str>,
}

impl SolverOutcome {
    pub(crate) fn success(t: f64, stats: SolverStats) -> Self {
        Self {
            status: SolverStatus::Success,
            t,
            stats,
            detail: None,
        }
    }

    pub(crate) fn failure(
        status: SolverStatus,
        t: f64,
        stats: SolverStats,
        detail: Option<&'static str>,
    ) -> Self {
        Self {
            status,
            t,
            stats,
            detail,
        }
    }
}

impl SolverStats {
    /// Step attempts, accepted or not.
    pub fn attempts(&self) -> u64 {
        self.accepted_steps + self.rejected_steps
    }

    pub(crate) fn absorb(&mut self, other: &SolverStats) {
        self.accepted_steps += other.accepted_steps;
        self.rejected_steps += other.rejected_steps;
        self.rhs_evaluations += other.rhs_evaluations;
        self.jacobian_evaluations += other.jacobian_evaluations;
    }
}

/// An integrator from `t0` to `t_end`, updating `y` in place.
pub trait OdeSolver {
    /// Short name for diagnostics.
    fn name(&self) -> &'static str;

    /// Integrate `system` over `[t0, t_end]`.
    fn integrate(
        &mut self,
        system: &mut dyn OdeSystem,
        y: &mut [f64],
        t0: f64,
        t_end: f64,
        observer: &mut dyn StepObserver,
    ) -> SolverOutcome;
}

/// Shared input check; `None` if the span and state are usable.
pub(crate) fn check_input(system: &dyn OdeSystem, y: &[f64], t0: f64, t_end: f64) -> Option<SolverOutcome> {
    if !(t0.is_finite() && t_end.is_finite()) || t_end < t0 || system.dimension() != y.len() {
        return Some(SolverOutcome::failure(
            SolverStatus::IllegalInput,
            t0,
            SolverStats::default(),
            None,
        ));
    }
    None
}

/// End points of the output intervals covering `(t0, t_end]`.
///
/// Points are counted, not accumulated, and the last one is `t_end`
/// exactly. A trailing interval shorter than `step * 1e-9` is merged into
/// the one before it.
pub(crate) fn output_points(t0: f64, t_end: f64, step: f64) -> impl Iterator<Item = f64> {
    let ratio = (t_end - t0) / step;
    let whole = ratio.round();
    let count = if (ratio - whole).abs() <= 1e-9 * whole.max(1.0) {
        whole
    } else {
        ratio.ceil()
    };
    let count = count.max(1.0) as u64;
    (1..=count).map(move |i| {
        if i == count {
            t_end
        } else {
            t0 + step * i as f64
        }
    })
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_lsoda() {
        assert_eq!(SolverStatus::Success.code(), 2);
        assert!(SolverStatus::Success.is_success());
        for s in [
            SolverStatus::ExcessWork,
            SolverStatus::IllegalInput,
            SolverStatus::RepeatedErrorTestFailures,
            SolverStatus::RepeatedConvergenceFailures,
            SolverStatus::Interrupted,
        ] {
            assert!(s.code() <= 0);
            assert!(!s.is_success());
        }
    }

    #[test]
    fn output_points_end_exactly_on_the_span() {
        let points: Vec<f64> = output_points(0.0, 0.3, 0.1).collect();
        assert_eq!(points.len(), 3);
        assert_eq!(points[2], 0.3);

        let points: Vec<f64> = output_points(0.0, 1.0, 0.3).collect();
        assert_eq!(points.len(), 4);
        assert!((points[2] - 0.9).abs() < 1e-12);
        assert_eq!(points[3], 1.0);

        let points: Vec<f64> = output_points(2.0, 2.05, 0.1).collect();
        assert_eq!(points, vec![2.05]);
    }

    #[test]
    fn illegal_spans_are_rejected() {
        let sys = testing::Decay(vec![1.0]);
        assert!(check_input(&sys, &[1.0], 0.0, 1.0).is_none());
        assert!(check_input(&sys, &[1.0], 1.0, 0.0).is_some());
        assert!(check_input(&sys, &[1.0, 2.0], 0.0, 1.0).is_some());
        assert!(check_input(&sys, &[1.0], 0.0, f64::NAN).is_some());
    }
}
