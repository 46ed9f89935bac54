//! Coupling of the discrete and continuous halves of the minicell
//! simulator.
//!
//! At every communication boundary of the discrete solve the
//! [`CouplingLayer`] converts live particle counts to concentrations,
//! has a [`NetworkAssembler`] build the continuous network, integrates it,
//! writes the result back as counts, settles accumulated costs
//! ([`ReconciliationRules`]) and refreshes the cell geometry that drives
//! the next conversion. [`HybridSimulation`] wires this into
//! [`CmeNetwork::solve`](minicell_cme::CmeNetwork::solve).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod assembler;
pub mod config;
pub mod coupling;
pub mod geometry;
pub mod hybrid;
pub mod metrics;
pub mod reconcile;

pub use assembler::{
    assembler_fn, BindContext, BindingSpec, ContinuousModel, EnzymeRule, FnAssembler,
    InitialValue, MetaboliteSpec, NetworkAssembler, ParameterSource, ParameterSpec, ReactionSpec,
};
pub use config::{CouplingConfig, GeometryMode};
pub use coupling::CouplingLayer;
pub use geometry::{GeometryConfig, SurfaceArea};
pub use hybrid::{HybridReport, HybridSimulation, Reporter};
pub use metrics::CommStepMetrics;
pub use reconcile::{ReconciliationOutcome, ReconciliationRule, ReconciliationRules};
