//! Error types for the minicell simulator.
//!
//! Split by when the failure is detected: [`DefinitionError`] at
//! declaration or compile time (before any simulated time elapses),
//! [`NumericError`] at the step where a non-finite value or a solver
//! failure appears. [`ConfigError`] is raised by `validate()` on the
//! integrator and coupling configuration. [`SimError`] is the umbrella
//! returned by run-level entry points.

use std::error::Error;
use std::fmt;

/// Structural errors in a reaction network definition.
///
/// Every variant names the offending id so that model assembly failures
/// can be traced back to the collaborator that supplied the data.
#[derive(Clone, Debug, PartialEq)]
pub enum DefinitionError {
    /// A reaction or write references a species that was never declared.
    UndeclaredSpecies {
        /// The missing species key.
        species: String,
    },
    /// A rate constant is NaN, infinite, or negative.
    InvalidRate {
        /// Description of the reaction the rate belongs to.
        reaction: String,
        /// The rejected value.
        rate: f64,
    },
    /// A reaction has neither reactants nor products.
    MalformedReaction {
        /// Why the reaction was rejected.
        reason: String,
    },
    /// A reaction id was declared twice.
    DuplicateReaction {
        /// The repeated id.
        reaction: String,
    },
    /// A reaction refers to a rate form that was never declared.
    UnknownRateForm {
        /// The reaction being declared.
        reaction: String,
        /// The missing rate form id.
        rate_form: String,
    },
    /// A binding or parameter refers to a reaction that was never declared.
    UnknownReaction {
        /// The missing reaction id.
        reaction: String,
    },
    /// A substrate or product binding names neither a metabolite nor an
    /// explicit parameter.
    UnknownMetabolite {
        /// The reaction holding the binding.
        reaction: String,
        /// The unresolved metabolite key.
        metabolite: String,
    },
    /// A rate-form placeholder could not be resolved for a reaction.
    UnresolvedPlaceholder {
        /// The reaction being compiled.
        reaction: String,
        /// The placeholder name (without the `$`).
        placeholder: String,
    },
    /// A parameter value references a name that is neither a metabolite
    /// nor an explicit parameter, or the references form a cycle.
    UnresolvedReference {
        /// The reaction being compiled.
        reaction: String,
        /// The reference that failed to resolve.
        reference: String,
    },
    /// A rate-law template could not be parsed.
    InvalidTemplate {
        /// The rate form id.
        rate_form: String,
        /// Parser diagnostic.
        reason: String,
    },
    /// A metabolite was declared with a non-finite or negative initial value.
    InvalidInitialValue {
        /// The metabolite id.
        metabolite: String,
        /// The rejected value.
        value: f64,
    },
}

impl fmt::Display for DefinitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UndeclaredSpecies { species } => write!(f, "species '{species}' does not exist"),
            Self::InvalidRate { reaction, rate } => {
                write!(f, "rate {rate} of reaction '{reaction}' must be finite and >= 0")
            }
            Self::MalformedReaction { reason } => write!(f, "malformed reaction: {reason}"),
            Self::DuplicateReaction { reaction } => {
                write!(f, "reaction '{reaction}' already exists")
            }
            Self::UnknownRateForm {
                reaction,
                rate_form,
            } => write!(
                f,
                "rate form '{rate_form}' not found for reaction '{reaction}'"
            ),
            Self::UnknownReaction { reaction } => write!(f, "reaction '{reaction}' not found"),
            Self::UnknownMetabolite {
                reaction,
                metabolite,
            } => write!(
                f,
                "metabolite '{metabolite}' not found in reaction '{reaction}'"
            ),
            Self::UnresolvedPlaceholder {
                reaction,
                placeholder,
            } => write!(
                f,
                "parameter '{placeholder}' not found in reaction '{reaction}'"
            ),
            Self::UnresolvedReference {
                reaction,
                reference,
            } => write!(
                f,
                "reference '{reference}' in reaction '{reaction}' does not resolve"
            ),
            Self::InvalidTemplate { rate_form, reason } => {
                write!(f, "invalid rate form '{rate_form}': {reason}")
            }
            Self::InvalidInitialValue { metabolite, value } => write!(
                f,
                "initial value {value} of metabolite '{metabolite}' must be finite and >= 0"
            ),
        }
    }
}

impl Error for DefinitionError {}

/// Non-finite values and solver failures detected while simulating.
///
/// Every variant carries the simulated time at which the problem was
/// detected. These are fatal: the trajectory is abandoned.
#[derive(Clone, Debug, PartialEq)]
pub enum NumericError {
    /// A reaction propensity evaluated to NaN.
    NanPropensity {
        /// Description of the reaction.
        reaction: String,
        /// Simulated time of detection.
        time: f64,
    },
    /// A reaction propensity evaluated below zero, which only happens when
    /// a reactant count has already been driven negative.
    NegativePropensity {
        /// Description of the reaction.
        reaction: String,
        /// The offending propensity.
        propensity: f64,
        /// Simulated time of detection.
        time: f64,
    },
    /// A concentration became non-finite after an accepted solver step.
    NonFiniteConcentration {
        /// The metabolite holding the bad value.
        metabolite: String,
        /// Simulated time (within the integration span) of detection.
        time: f64,
    },
    /// A derivative evaluated to a non-finite value.
    NonFiniteDerivative {
        /// The metabolite whose derivative is bad.
        metabolite: String,
        /// Simulated time (within the integration span) of detection.
        time: f64,
    },
    /// Converting between counts and concentrations produced a
    /// non-finite value (usually a zero cell volume).
    NonFiniteConversion {
        /// The species being converted.
        species: String,
        /// The input value.
        value: f64,
        /// The cell volume used, in litres.
        volume_litres: f64,
        /// Simulated time of detection.
        time: f64,
    },
    /// The ODE solver returned a status `<= 0`.
    SolverFailed {
        /// Name of the solver.
        solver: String,
        /// The returned status code.
        status: i32,
        /// Integration time reached before failing.
        time: f64,
    },
}

impl fmt::Display for NumericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NanPropensity { reaction, time } => {
                write!(f, "NaN propensity for reaction '{reaction}' at t={time}")
            }
            Self::NegativePropensity {
                reaction,
                propensity,
                time,
            } => write!(
                f,
                "negative propensity {propensity} for reaction '{reaction}' at t={time}"
            ),
            Self::NonFiniteConcentration { metabolite, time } => {
                write!(f, "non-finite concentration for '{metabolite}' at t={time}")
            }
            Self::NonFiniteDerivative { metabolite, time } => {
                write!(f, "non-finite derivative for '{metabolite}' at t={time}")
            }
            Self::NonFiniteConversion {
                species,
                value,
                volume_litres,
                time,
            } => write!(
                f,
                "converting {value} of '{species}' with volume {volume_litres} L is not finite (t={time})"
            ),
            Self::SolverFailed {
                solver,
                status,
                time,
            } => write!(f, "{solver} failed with status {status} at t={time}"),
        }
    }
}

impl Error for NumericError {}

/// Errors detected while validating integrator or coupling configuration.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// A time interval or step is NaN, infinite, zero, or negative.
    InvalidInterval {
        /// The configuration field.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// A solver tolerance is NaN, infinite, zero, or negative.
    InvalidTolerance {
        /// The configuration field.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// A fixed cell volume is NaN, infinite, zero, or negative.
    InvalidVolume {
        /// The rejected volume, in litres.
        value: f64,
    },
    /// A geometry fraction is outside `(0, 1]`.
    InvalidFraction {
        /// The rejected value.
        value: f64,
    },
    /// A per-molecule area is NaN, infinite, or negative.
    InvalidArea {
        /// The species the area belongs to.
        species: String,
        /// The rejected value.
        value: f64,
    },
    /// The integrator step budget is zero.
    ZeroStepBudget,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInterval { field, value } => {
                write!(f, "{field} must be finite and positive, got {value}")
            }
            Self::InvalidTolerance { field, value } => {
                write!(f, "tolerance {field} must be finite and positive, got {value}")
            }
            Self::InvalidVolume { value } => {
                write!(f, "fixed volume must be finite and positive, got {value} L")
            }
            Self::InvalidFraction { value } => {
                write!(f, "geometry fraction must be in (0, 1], got {value}")
            }
            Self::InvalidArea { species, value } => {
                write!(f, "area {value} nm² for '{species}' must be finite and >= 0")
            }
            Self::ZeroStepBudget => write!(f, "max_steps must be at least 1"),
        }
    }
}

impl Error for ConfigError {}

/// Umbrella error for simulation entry points.
#[derive(Clone, Debug, PartialEq)]
pub enum SimError {
    /// The network definition is invalid.
    Definition(DefinitionError),
    /// A numeric failure aborted the run.
    Numeric(NumericError),
    /// The run configuration is invalid.
    Config(ConfigError),
    /// An argument to a run-level call is out of range.
    InvalidArgument {
        /// Description of the problem.
        reason: String,
    },
    /// A user-supplied hook reported a failure.
    Hook {
        /// Description supplied by the hook.
        reason: String,
    },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Definition(e) => write!(f, "definition: {e}"),
            Self::Numeric(e) => write!(f, "numeric: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::InvalidArgument { reason } => write!(f, "invalid argument: {reason}"),
            Self::Hook { reason } => write!(f, "hook failed: {reason}"),
        }
    }
}

impl Error for SimError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Definition(e) => Some(e),
            Self::Numeric(e) => Some(e),
            Self::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DefinitionError> for SimError {
    fn from(e: DefinitionError) -> Self {
        Self::Definition(e)
    }
}

impl From<NumericError> for SimError {
    fn from(e: NumericError) -> Self {
        Self::Numeric(e)
    }
}

impl From<ConfigError> for SimError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}
