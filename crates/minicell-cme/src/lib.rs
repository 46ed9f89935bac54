//! Discrete stochastic reaction network for the minicell simulator.
//!
//! [`CmeNetwork`] holds integer species counts and mass-action
//! [`ElementaryReaction`]s, and advances them with Gillespie's direct
//! method. Propensities are cached and maintained through a
//! species → reaction [`DependencyGraph`], so a firing only touches the
//! reactions that read a changed species.
//!
//! [`CmeNetwork::solve`] suspends at fixed communication boundaries and
//! hands the network to a [`CommunicationHook`], which is where the
//! continuous half of the simulator is coupled in.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod dependency;
pub mod network;
pub mod reaction;
pub mod solve;

pub use dependency::DependencyGraph;
pub use network::CmeNetwork;
pub use reaction::{ElementaryReaction, ReactionDisplay, Term};
pub use solve::{hook_fn, CommunicationHook, FnHook, NoopHook, SolveReport, Termination};
