//! Continuous half of the minicell simulator.
//!
//! A [`ContinuousNetwork`] is declared from metabolites, shared rate-law
//! templates ([`RateForm`]), reactions binding template placeholders to
//! metabolites, and parameters. [`ContinuousNetwork::compile`] resolves
//! every placeholder and produces a [`CompiledNetwork`];
//! [`DerivativeFunction`] binds every rate law to slots of the state
//! vector, and [`integrate`] drives an [`OdeSolver`] over it.
//!
//! Rate laws are parsed once by [`meval`] at compile time; nothing is
//! parsed from text during integration. The solvers wrap `russell_ode`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod expr;
pub mod integrator;
pub mod network;
pub mod parameter;
pub mod rate_law;
pub mod solver;
pub mod template;

pub use expr::{Expr, ParseError};
pub use integrator::{
    integrate, DerivativeFunction, Integration, IntegrationReport, IntegratorConfig, Method,
};
pub use network::{
    BindingTarget, CompiledNetwork, CompiledReaction, ContinuousNetwork, ContinuousReaction,
    Metabolite, Symbol,
};
pub use parameter::{Parameter, ParameterScope, ParameterValue};
pub use solver::{
    OdeSolver, OdeSystem, RungeKutta, Scheme, SolverOutcome, SolverStats, SolverStatus,
    StepObserver, StiffnessSwitching, Unobserved,
};
pub use template::RateForm;
