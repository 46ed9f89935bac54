//! Minicell: a hybrid CME/ODE simulator for minimal bacterial cells.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all minicell sub-crates. Gene expression runs as a Gillespie simulation
//! over integer particle counts; metabolism is integrated as a stiff ODE
//! system at fixed communication intervals, with counts and concentrations
//! exchanged through the cell volume.
//!
//! # Quick start
//!
//! ```rust
//! use minicell::prelude::*;
//! use minicell::ode::ParameterScope;
//!
//! // Discrete side: 1000 molecules of S, no discrete reactions.
//! let mut network = CmeNetwork::with_seed(42);
//! network.declare_species(["S", "P"]);
//! network.add_particles("S", 1000.0).unwrap();
//!
//! // Continuous side: S -> P by mass action.
//! let model = ContinuousModel::new()
//!     .metabolite("S", InitialValue::Live)
//!     .metabolite("P", InitialValue::Live)
//!     .rate_form("mass_action", "$k * $S")
//!     .reaction(
//!         ReactionSpec::new("R", "mass_action")
//!             .substrate(BindingSpec::new("S", "S"))
//!             .product(BindingSpec::new("P", "P")),
//!     )
//!     .parameter(ParameterSpec::new(
//!         ParameterScope::Explicit,
//!         "k",
//!         ParameterSource::Literal(0.01),
//!     ));
//!
//! let config = CouplingConfig {
//!     reconciliation: ReconciliationRules::empty(),
//!     geometry: GeometryMode::Fixed { volume_litres: 1e-17 },
//!     ..CouplingConfig::default()
//! };
//! let layer = CouplingLayer::new(config, model).unwrap();
//! let mut sim = HybridSimulation::new(network, layer).unwrap();
//! let report = sim.run(3.0).unwrap();
//!
//! let s = sim.network().count("S").unwrap();
//! let p = sim.network().count("P").unwrap();
//! assert!((s + p - 1000).abs() <= 3);
//! // One communication step per second, even with no discrete reactions.
//! assert_eq!(report.communication_steps, 3);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `minicell-core` | Errors, species storage, unit conversions, core traits |
//! | [`cme`] | `minicell-cme` | Discrete network and the direct-method solve loop |
//! | [`ode`] | `minicell-ode` | Rate-law templates, network compiler, ODE solvers |
//! | [`engine`] | `minicell-engine` | Coupling, reconciliation, geometry, hybrid driver |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits and unit conversions (`minicell-core`).
///
/// Contains the error taxonomy, the species map, and the
/// [`types::SpeciesReader`] / [`types::SpeciesWriter`] traits.
pub use minicell_core as types;

/// Discrete chemical master equation layer (`minicell-cme`).
///
/// [`cme::CmeNetwork`] holds species counts and mass-action reactions and
/// runs the Gillespie direct method with a [`cme::CommunicationHook`].
pub use minicell_cme as cme;

/// Continuous network compiler and integrators (`minicell-ode`).
///
/// Declare a [`ode::ContinuousNetwork`], compile it, and integrate it
/// with one of the [`ode::OdeSolver`] implementations.
pub use minicell_ode as ode;

/// Hybrid coupling (`minicell-engine`).
///
/// [`engine::HybridSimulation`] drives a discrete network with a
/// [`engine::CouplingLayer`] as its communication hook.
pub use minicell_engine as engine;

/// Common imports for typical minicell usage.
///
/// ```rust
/// use minicell::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use minicell_core::{CellVolume, ReactionId, SpeciesReader, SpeciesWriter};

    // Errors
    pub use minicell_core::{ConfigError, DefinitionError, NumericError, SimError};

    // Discrete layer
    pub use minicell_cme::{hook_fn, CmeNetwork, CommunicationHook, SolveReport, Termination};

    // Continuous layer
    pub use minicell_ode::{ContinuousNetwork, IntegratorConfig, Method};

    // Engine
    pub use minicell_engine::{
        BindContext, BindingSpec, CommStepMetrics, ContinuousModel, CouplingConfig, CouplingLayer,
        EnzymeRule, GeometryMode, HybridReport, HybridSimulation, InitialValue, NetworkAssembler,
        ParameterSource, ParameterSpec, ReactionSpec, ReconciliationRules,
    };
}
