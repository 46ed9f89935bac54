//! Derivative evaluation and numerical integration of a compiled network.

use std::ops::ControlFlow;

use indexmap::IndexMap;
use log::debug;
use minicell_core::{ConfigError, DefinitionError, NumericError, SimError};

use crate::expr::{self, Expr};
use crate::network::{CompiledNetwork, CompiledReaction, ContinuousNetwork, Symbol};
use crate::solver::{
    OdeSolver, OdeSystem, RungeKutta, Scheme, SolverStats, StepObserver, StiffnessSwitching,
};

/// Which solver [`integrate`] uses.
///
/// Every method reports the state to the NaN check once per `step_size`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Method {
    /// Explicit DoPri5 until the network proves stiff, then Radau5 for the
    /// rest of the span.
    #[default]
    Auto,
    /// Implicit Radau5 with a numerical Jacobian throughout.
    Radau5,
    /// Explicit Dormand-Prince 5(4) throughout.
    DoPri5,
    /// Forward Euler with fixed step `step_size`.
    Euler,
}

/// Solver configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct IntegratorConfig {
    /// Solver choice. Default: [`Method::Auto`].
    pub method: Method,
    /// Absolute tolerance (mM). Default: `1e-12`.
    pub atol: f64,
    /// Relative tolerance. Default: `1e-6`.
    pub rtol: f64,
    /// Output interval of the adaptive methods, fixed step of Euler, in
    /// seconds. Default: `0.1`.
    pub step_size: f64,
    /// Step attempt budget over one integration. Default: `500_000`.
    pub max_steps: usize,
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self {
            method: Method::Auto,
            atol: 1e-12,
            rtol: 1e-6,
            step_size: 0.1,
            max_steps: 500_000,
        }
    }
}

impl IntegratorConfig {
    /// Check tolerances, step size and budget.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [("atol", self.atol), ("rtol", self.rtol)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidTolerance { field, value });
            }
        }
        if !(self.step_size.is_finite() && self.step_size > 0.0) {
            return Err(ConfigError::InvalidInterval {
                field: "step_size",
                value: self.step_size,
            });
        }
        if self.max_steps == 0 {
            return Err(ConfigError::ZeroStepBudget);
        }
        Ok(())
    }

    /// Instantiate the configured solver.
    pub fn solver(&self) -> Box<dyn OdeSolver> {
        let scheme = match self.method {
            Method::Auto => {
                return Box::new(StiffnessSwitching::new(
                    self.atol,
                    self.rtol,
                    self.step_size,
                    self.max_steps,
                ))
            }
            Method::Radau5 => Scheme::Radau5,
            Method::DoPri5 => Scheme::DoPri5,
            Method::Euler => Scheme::ForwardEuler,
        };
        Box::new(RungeKutta::new(
            scheme,
            self.atol,
            self.rtol,
            self.step_size,
            self.max_steps,
        ))
    }
}

/// Where a rate law reads one of its names from.
#[derive(Clone, Copy, Debug)]
enum Operand {
    Slot(usize),
    Constant(f64),
}

/// A compiled rate law with its names bound to state-vector slots.
#[derive(Clone, Debug)]
struct RateLaw {
    expr: Expr,
    operands: IndexMap<String, Operand>,
}

impl RateLaw {
    fn bind(
        reaction: &CompiledReaction,
        compiled: &CompiledNetwork,
    ) -> Result<Self, DefinitionError> {
        let operands = reaction
            .symbols
            .iter()
            .map(|(name, symbol)| {
                let operand = match symbol {
                    Symbol::Constant(v) => Operand::Constant(*v),
                    Symbol::Metabolite(key) => Operand::Slot(compiled.slot_of(key).ok_or_else(
                        || DefinitionError::UnresolvedReference {
                            reaction: reaction.id.clone(),
                            reference: key.clone(),
                        },
                    )?),
                };
                Ok((name.clone(), operand))
            })
            .collect::<Result<_, DefinitionError>>()?;
        Ok(Self {
            expr: reaction.expr.clone(),
            operands,
        })
    }

    fn eval(&self, y: &[f64]) -> f64 {
        expr::eval(&self.expr, |name| match *self.operands.get(name)? {
            Operand::Slot(i) => y.get(i).copied(),
            Operand::Constant(v) => Some(v),
        })
    }
}

/// The right-hand side of a compiled network.
///
/// Built once per communication step and evaluated many times: every
/// reaction rate once, then `dy_i/dt = Σ stoich × rate` over the
/// reactions touching metabolite `i`.
#[derive(Clone, Debug)]
pub struct DerivativeFunction {
    keys: Vec<String>,
    laws: Vec<RateLaw>,
    rows: Vec<Vec<(usize, f64)>>,
    rates: Vec<f64>,
    evaluations: u64,
    first_non_finite: Option<(usize, f64)>,
}

impl DerivativeFunction {
    /// Specialize a compiled network.
    pub fn new(compiled: &CompiledNetwork) -> Result<Self, DefinitionError> {
        let laws = compiled
            .reactions()
            .iter()
            .map(|r| RateLaw::bind(r, compiled))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            keys: compiled.metabolite_keys().map(str::to_string).collect(),
            rows: compiled.metabolite_reactions().values().cloned().collect(),
            rates: vec![0.0; laws.len()],
            laws,
            evaluations: 0,
            first_non_finite: None,
        })
    }

    /// Reaction rates from the last evaluation.
    pub fn rates(&self) -> &[f64] {
        &self.rates
    }

    /// Number of derivative evaluations so far.
    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }

    /// Metabolite key of state slot `i`.
    pub fn key(&self, i: usize) -> Option<&str> {
        self.keys.get(i).map(String::as_str)
    }

    /// First `(slot, time)` at which a derivative came out non-finite.
    pub fn first_non_finite(&self) -> Option<(usize, f64)> {
        self.first_non_finite
    }

    /// Evaluate `dy/dt` without time dependence.
    pub fn evaluate(&mut self, y: &[f64], dydt: &mut [f64]) {
        for (rate, law) in self.rates.iter_mut().zip(&self.laws) {
            *rate = law.eval(y);
        }
        for (d, row) in dydt.iter_mut().zip(&self.rows) {
            *d = row.iter().map(|&(r, s)| s * self.rates[r]).sum();
        }
        self.evaluations += 1;
    }
}

impl OdeSystem for DerivativeFunction {
    fn dimension(&self) -> usize {
        self.keys.len()
    }

    fn derivative(&mut self, t: f64, y: &[f64], dydt: &mut [f64]) {
        self.evaluate(y, dydt);
        if self.first_non_finite.is_none() {
            if let Some(i) = dydt.iter().position(|d| !d.is_finite()) {
                self.first_non_finite = Some((i, t));
            }
        }
    }
}

struct NanGuard<'a> {
    keys: &'a [String],
    found: Option<(usize, f64)>,
}

impl StepObserver for NanGuard<'_> {
    fn on_step(&mut self, t: f64, y: &[f64]) -> ControlFlow<()> {
        match y.iter().position(|v| !v.is_finite()) {
            Some(i) => {
                self.found = Some((i, t));
                ControlFlow::Break(())
            }
            None => ControlFlow::Continue(()),
        }
    }
}

/// Work summary of one integration.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IntegrationReport {
    /// Solver name.
    pub solver: &'static str,
    /// LSODA-style status code.
    pub status: i32,
    /// Time reached.
    pub final_time: f64,
    /// Solver work counters.
    pub stats: SolverStats,
    /// Derivative evaluations as seen by the right-hand side.
    pub derivative_evaluations: u64,
}

/// Final concentrations plus the work report.
#[derive(Clone, Debug, PartialEq)]
pub struct Integration {
    /// Metabolite → concentration (mM) at the end of the span.
    pub concentrations: IndexMap<String, f64>,
    /// Solver work summary.
    pub report: IntegrationReport,
}

/// Integrate a compiled network from its initial values over
/// `[0, total_time]`.
///
/// # Errors
///
/// Configuration errors, [`NumericError::NonFiniteConcentration`] if an
/// accepted state holds a NaN or infinity,
/// [`NumericError::NonFiniteDerivative`] if the solver failed after the
/// right-hand side went non-finite, and [`NumericError::SolverFailed`] for
/// any other status `<= 0`.
pub fn integrate(
    compiled: &CompiledNetwork,
    total_time: f64,
    config: &IntegratorConfig,
) -> Result<Integration, SimError> {
    config.validate()?;
    if !(total_time.is_finite() && total_time >= 0.0) {
        return Err(SimError::InvalidArgument {
            reason: format!("integration span must be finite and >= 0, got {total_time}"),
        });
    }
    let mut rhs = DerivativeFunction::new(compiled)?;
    let keys = rhs.keys.clone();
    let mut y = compiled.initial_state();
    if let Some(i) = y.iter().position(|v| !v.is_finite()) {
        return Err(NumericError::NonFiniteConcentration {
            metabolite: keys[i].clone(),
            time: 0.0,
        }
        .into());
    }

    let mut solver = config.solver();
    let mut guard = NanGuard {
        keys: &keys,
        found: None,
    };
    let outcome = solver.integrate(&mut rhs, &mut y, 0.0, total_time, &mut guard);

    if let Some((i, time)) = guard.found {
        return Err(NumericError::NonFiniteConcentration {
            metabolite: guard.keys[i].clone(),
            time,
        }
        .into());
    }
    if !outcome.status.is_success() {
        if let Some((i, time)) = rhs.first_non_finite() {
            return Err(NumericError::NonFiniteDerivative {
                metabolite: keys[i].clone(),
                time,
            }
            .into());
        }
        return Err(NumericError::SolverFailed {
            solver: solver.name().to_string(),
            status: outcome.status.code(),
            time: outcome.t,
        }
        .into());
    }

    debug!(
        "{} integrated {} metabolites over {total_time}s: {} accepted, {} rejected, {} rhs evals",
        solver.name(),
        keys.len(),
        outcome.stats.accepted_steps,
        outcome.stats.rejected_steps,
        rhs.evaluations()
    );

    Ok(Integration {
        concentrations: keys.into_iter().zip(y).collect(),
        report: IntegrationReport {
            solver: solver.name(),
            status: outcome.status.code(),
            final_time: outcome.t,
            stats: outcome.stats,
            derivative_evaluations: rhs.evaluations(),
        },
    })
}

impl ContinuousNetwork {
    /// Compile and integrate in one call.
    pub fn integrate(
        &self,
        total_time: f64,
        config: &IntegratorConfig,
    ) -> Result<Integration, SimError> {
        let compiled = self.compile()?;
        integrate(&compiled, total_time, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::{Parameter, ParameterScope};
    use crate::rate_law;
    use approx::assert_relative_eq;

    fn decay_net(k: f64, a0: f64) -> ContinuousNetwork {
        let mut net = ContinuousNetwork::new();
        net.declare_metabolite("A", "", a0).unwrap();
        net.declare_metabolite("B", "", 0.0).unwrap();
        net.declare_rate_form("mass1", "$k * $S").unwrap();
        net.declare_reaction("R", "mass1", "").unwrap();
        net.bind_substrate("R", "S", "A", 0.0).unwrap();
        net.bind_product("R", "P", "B", 0.0).unwrap();
        net.declare_parameter(ParameterScope::Reaction("R".into()), Parameter::new("k", k))
            .unwrap();
        net
    }

    #[test]
    fn default_config_validates() {
        assert!(IntegratorConfig::default().validate().is_ok());
        let bad = IntegratorConfig {
            rtol: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            bad.validate(),
            Err(ConfigError::InvalidTolerance { field: "rtol", .. })
        ));
        let bad = IntegratorConfig {
            max_steps: 0,
            ..Default::default()
        };
        assert_eq!(bad.validate(), Err(ConfigError::ZeroStepBudget));
    }

    #[test]
    fn enzymatic_rate_is_five() {
        let mut net = ContinuousNetwork::new();
        net.declare_metabolite("S1", "", 1.0).unwrap();
        net.declare_metabolite("P1", "", 0.0).unwrap();
        net.declare_rate_form("enz", rate_law::enzymatic(1, 1)).unwrap();
        net.declare_reaction("R", "enz", "").unwrap();
        net.bind_substrate("R", "Sub1", "S1", 0.0).unwrap();
        net.bind_product("R", "Prod1", "P1", 0.0).unwrap();
        for (key, v) in [
            ("KmSub1", 1.0),
            ("KmProd1", 1.0),
            ("kcatF", 10.0),
            ("kcatR", 0.0),
            ("Enzyme", 1.0),
            ("onoff", 1.0),
        ] {
            net.declare_parameter(ParameterScope::Reaction("R".into()), Parameter::new(key, v))
                .unwrap();
        }
        let compiled = net.compile().unwrap();
        let mut f = DerivativeFunction::new(&compiled).unwrap();
        let mut dydt = [0.0; 2];
        f.evaluate(&compiled.initial_state(), &mut dydt);
        assert_relative_eq!(f.rates()[0], 5.0, max_relative = 1e-12);
        assert_relative_eq!(dydt[0], -5.0, max_relative = 1e-12);
        assert_relative_eq!(dydt[1], 5.0, max_relative = 1e-12);
    }

    #[test]
    fn buffered_constants_and_live_metabolites_feed_the_rate() {
        let mut net = decay_net(2.0, 1.0);
        net.declare_parameter(ParameterScope::Explicit, Parameter::new("M_glc_e", 3.0))
            .unwrap();
        net.declare_rate_form("uptake", "$k * $S * $Ext").unwrap();
        net.declare_reaction("U", "uptake", "").unwrap();
        net.bind_substrate("U", "S", "A", 0.0).unwrap();
        net.bind_substrate("U", "Ext", "M_glc_e", 0.0).unwrap();
        net.bind_product("U", "P", "B", 0.0).unwrap();
        net.declare_parameter(ParameterScope::Reaction("U".into()), Parameter::new("k", 0.5))
            .unwrap();
        let compiled = net.compile().unwrap();
        let mut f = DerivativeFunction::new(&compiled).unwrap();
        let mut dydt = [0.0; 2];
        f.evaluate(&[2.0, 0.0], &mut dydt);
        assert_relative_eq!(f.rates()[0], 4.0);
        assert_relative_eq!(f.rates()[1], 3.0);
        assert_relative_eq!(dydt[0], -7.0);
        assert_relative_eq!(dydt[1], 7.0);
        assert_eq!(f.evaluations(), 1);
    }

    #[test]
    fn each_method_tracks_linear_decay() {
        for method in [Method::Auto, Method::Radau5, Method::DoPri5, Method::Euler] {
            let config = IntegratorConfig {
                method,
                step_size: 1e-3,
                ..Default::default()
            };
            let out = decay_net(2.0, 1.0).integrate(1.0, &config).unwrap();
            let a = out.concentrations["A"];
            let b = out.concentrations["B"];
            assert_relative_eq!(a, (-2.0f64).exp(), max_relative = 1e-2);
            assert_relative_eq!(a + b, 1.0, max_relative = 1e-9);
            assert_eq!(out.report.status, 2);
            assert_eq!(out.report.final_time, 1.0);
        }
    }

    #[test]
    fn each_method_reports_its_solver() {
        for (method, name) in [
            (Method::Auto, "auto"),
            (Method::Radau5, "radau5"),
            (Method::DoPri5, "dopri5"),
            (Method::Euler, "forward-euler"),
        ] {
            let config = IntegratorConfig {
                method,
                ..Default::default()
            };
            let out = decay_net(1.0, 1.0).integrate(0.5, &config).unwrap();
            assert_eq!(out.report.solver, name);
        }
    }

    #[test]
    fn stiff_network_uses_few_steps() {
        let mut net = decay_net(1e5, 1.0);
        net.declare_metabolite("C", "", 1.0).unwrap();
        net.declare_reaction("slow", "mass1", "").unwrap();
        net.bind_substrate("slow", "S", "C", 0.0).unwrap();
        net.bind_product("slow", "P", "B", 0.0).unwrap();
        net.declare_parameter(ParameterScope::Reaction("slow".into()), Parameter::new("k", 1.0))
            .unwrap();
        let out = net.integrate(1.0, &IntegratorConfig::default()).unwrap();
        assert_relative_eq!(out.concentrations["C"], (-1.0f64).exp(), max_relative = 1e-4);
        assert!(out.concentrations["A"].abs() < 1e-9);
        assert!(out.report.stats.accepted_steps < 5_000);
    }

    #[test]
    fn nan_state_names_the_metabolite() {
        let mut net = ContinuousNetwork::new();
        net.declare_metabolite("X", "", 1.0).unwrap();
        net.declare_rate_form("bad", "$k * ln(0 - $S)").unwrap();
        net.declare_reaction("R", "bad", "").unwrap();
        net.bind_product("R", "S", "X", 0.0).unwrap();
        net.declare_parameter(ParameterScope::Explicit, Parameter::new("k", 1.0))
            .unwrap();
        let config = IntegratorConfig {
            method: Method::Euler,
            ..Default::default()
        };
        match net.integrate(1.0, &config) {
            Err(SimError::Numeric(NumericError::NonFiniteConcentration { metabolite, time })) => {
                assert_eq!(metabolite, "X");
                assert!(time > 0.0);
            }
            other => panic!("expected non-finite concentration, got {other:?}"),
        }
    }

    #[test]
    fn nan_derivative_with_adaptive_solver_names_the_metabolite() {
        let mut net = ContinuousNetwork::new();
        net.declare_metabolite("X", "", 1.0).unwrap();
        net.declare_rate_form("bad", "sqrt(0 - $S)").unwrap();
        net.declare_reaction("R", "bad", "").unwrap();
        net.bind_product("R", "S", "X", 0.0).unwrap();
        for method in [Method::Auto, Method::Radau5] {
            let config = IntegratorConfig {
                method,
                ..Default::default()
            };
            match net.integrate(1.0, &config) {
                Err(SimError::Numeric(NumericError::NonFiniteDerivative { metabolite, .. })) => {
                    assert_eq!(metabolite, "X");
                }
                other => panic!("expected non-finite derivative, got {other:?}"),
            }
        }
    }

    #[test]
    fn exhausted_budget_is_a_solver_failure() {
        let config = IntegratorConfig {
            step_size: 1e-4,
            max_steps: 3,
            ..Default::default()
        };
        match decay_net(1.0, 1.0).integrate(1.0, &config) {
            Err(SimError::Numeric(NumericError::SolverFailed { status, .. })) => {
                assert!(status <= 0);
            }
            other => panic!("expected solver failure, got {other:?}"),
        }
    }

    #[test]
    fn zero_span_returns_initial_values() {
        let out = decay_net(1.0, 0.5)
            .integrate(0.0, &IntegratorConfig::default())
            .unwrap();
        assert_eq!(out.concentrations["A"], 0.5);
        assert!(decay_net(1.0, 0.5)
            .integrate(f64::NAN, &IntegratorConfig::default())
            .is_err());
    }
}
