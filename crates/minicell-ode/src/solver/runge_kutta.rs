//! `russell_ode` schemes behind the [`OdeSolver`] seam.

use std::cell::RefCell;
use std::ops::ControlFlow;

use russell_lab::Vector;
use russell_ode::{Method, OdeSolver as Driver, Params, System};

use super::{
    check_input, output_points, OdeSolver, OdeSystem, SolverOutcome, SolverStats, SolverStatus,
    StepObserver,
};

/// Error message returned by the right-hand side when it produced a NaN or
/// infinity and the scheme is adaptive.
pub(crate) const NON_FINITE_DERIVATIVE: &str = "right-hand side is not finite";

/// Integration scheme.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scheme {
    /// Implicit Radau IIA of order 5 with a numerical Jacobian. L-stable;
    /// the workhorse for stiff networks.
    Radau5,
    /// Explicit Dormand-Prince 5(4) with step-size control.
    DoPri5,
    /// Forward Euler, one step per output interval.
    ForwardEuler,
}

impl Scheme {
    fn method(self) -> Method {
        match self {
            Self::Radau5 => Method::Radau5,
            Self::DoPri5 => Method::DoPri5,
            Self::ForwardEuler => Method::FwEuler,
        }
    }

    /// Whether the scheme controls its own step size.
    pub fn is_adaptive(self) -> bool {
        !matches!(self, Self::ForwardEuler)
    }

    /// Short name for diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Self::Radau5 => "radau5",
            Self::DoPri5 => "dopri5",
            Self::ForwardEuler => "forward-euler",
        }
    }
}

#[derive(Debug)]
struct Flags {
    halt_on_non_finite: bool,
}

/// One `russell_ode` scheme integrating interval by interval.
///
/// The span is cut into output intervals of `output_step`; the driver runs
/// once per interval and the observer sees the state at each interval's
/// end. Adaptive schemes choose their own steps inside an interval; forward
/// Euler takes exactly one. `max_steps` bounds step attempts over the whole
/// span.
///
/// Adaptive schemes stop on the first non-finite derivative. Forward Euler
/// lets it reach the state so the observer can report it.
#[derive(Clone, Debug)]
pub struct RungeKutta {
    scheme: Scheme,
    atol: f64,
    rtol: f64,
    output_step: f64,
    max_steps: usize,
    interval_steps: usize,
}

impl RungeKutta {
    /// Create a solver.
    pub fn new(scheme: Scheme, atol: f64, rtol: f64, output_step: f64, max_steps: usize) -> Self {
        Self {
            scheme,
            atol,
            rtol,
            output_step,
            max_steps,
            interval_steps: max_steps,
        }
    }

    /// Also bound the step attempts spent on any single output interval.
    pub fn with_interval_budget(mut self, steps: usize) -> Self {
        self.interval_steps = steps.min(self.max_steps);
        self
    }

    /// The scheme in use.
    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    fn params(&self, step_budget: usize) -> Result<Params, &'static str> {
        let mut params = Params::new(self.scheme.method());
        params.set_tolerances(self.atol, self.rtol, None)?;
        params.step.n_step_max = step_budget;
        params.newton.use_numerical_jacobian = true;
        Ok(params)
    }
}

impl OdeSolver for RungeKutta {
    fn name(&self) -> &'static str {
        self.scheme.name()
    }

    fn integrate(
        &mut self,
        system: &mut dyn OdeSystem,
        y: &mut [f64],
        t0: f64,
        t_end: f64,
        observer: &mut dyn StepObserver,
    ) -> SolverOutcome {
        if let Some(bad) = check_input(&*system, y, t0, t_end) {
            return bad;
        }
        let mut stats = SolverStats::default();
        if !(self.output_step.is_finite() && self.output_step > 0.0) {
            return SolverOutcome::failure(SolverStatus::IllegalInput, t0, stats, None);
        }
        if t_end == t0 {
            return SolverOutcome::success(t0, stats);
        }

        let ndim = y.len();
        let rhs = RefCell::new(system);
        let mut flags = Flags {
            halt_on_non_finite: self.scheme.is_adaptive(),
        };
        let mut state = Vector::new(ndim);
        state.as_mut_data().copy_from_slice(y);
        let mut t = t0;

        for t_next in output_points(t0, t_end, self.output_step) {
            let used = stats.attempts();
            if used >= self.max_steps as u64 {
                return SolverOutcome::failure(SolverStatus::ExcessWork, t, stats, None);
            }
            let cap = (self.max_steps as u64 - used).min(self.interval_steps as u64) as usize;

            let function = System::new(
                ndim,
                |dydt: &mut Vector, x: f64, current: &Vector, flags: &mut Flags| {
                    rhs.borrow_mut()
                        .derivative(x, current.as_data(), dydt.as_mut_data());
                    if flags.halt_on_non_finite && dydt.as_data().iter().any(|d| !d.is_finite()) {
                        return Err(NON_FINITE_DERIVATIVE);
                    }
                    Ok(())
                },
            );
            let mut driver = match self.params(cap).and_then(|p| Driver::new(p, function)) {
                Ok(driver) => driver,
                Err(message) => {
                    return SolverOutcome::failure(
                        SolverStatus::IllegalInput,
                        t,
                        stats,
                        Some(message),
                    )
                }
            };

            let h_equal = (!self.scheme.is_adaptive()).then_some(t_next - t);
            let result = driver.solve(&mut state, t, t_next, h_equal, &mut flags);
            let work = driver.stats();
            let interval = SolverStats {
                accepted_steps: if self.scheme.is_adaptive() {
                    work.n_accepted as u64
                } else {
                    u64::from(result.is_ok())
                },
                rejected_steps: work.n_rejected as u64,
                rhs_evaluations: work.n_function as u64,
                jacobian_evaluations: work.n_jacobian as u64,
            };
            stats.absorb(&interval);

            if let Err(message) = result {
                let status = classify(message, &interval, cap);
                return SolverOutcome::failure(status, t, stats, Some(message));
            }

            t = t_next;
            y.copy_from_slice(state.as_data());
            if let ControlFlow::Break(()) = observer.on_step(t, y) {
                return SolverOutcome::failure(SolverStatus::Interrupted, t, stats, None);
            }
        }
        SolverOutcome::success(t, stats)
    }
}

fn classify(message: &str, interval: &SolverStats, cap: usize) -> SolverStatus {
    let lower = message.to_ascii_lowercase();
    if interval.attempts() >= cap as u64 || lower.contains("n_step_max") {
        SolverStatus::ExcessWork
    } else if lower.contains("singular") || lower.contains("newton") || lower.contains("converge") {
        SolverStatus::RepeatedConvergenceFailures
    } else {
        SolverStatus::RepeatedErrorTestFailures
    }
}
