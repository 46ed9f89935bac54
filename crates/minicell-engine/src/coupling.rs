//! The communication step between the discrete and continuous engines.
//!
//! [`CouplingLayer::exchange`] runs one full step against any species
//! store:
//!
//! 1. snapshot the cell volume,
//! 2. assemble the continuous network from live counts,
//! 3. compile and integrate it over `ode_interval`,
//! 4. write the final concentrations back as counts,
//! 5. settle cost counters,
//! 6. refresh the cell geometry.
//!
//! As a [`CommunicationHook`] the layer plugs straight into
//! [`CmeNetwork::solve`](minicell_cme::CmeNetwork::solve).

use std::time::Instant;

use log::debug;
use minicell_cme::{CmeNetwork, CommunicationHook};
use minicell_core::{
    is_surface_area_species, mm_to_part, CellVolume, ConfigError, NumericError, SimError,
    SpeciesWriter,
};
use minicell_ode::integrate;

use crate::assembler::{BindContext, NetworkAssembler};
use crate::config::{CouplingConfig, GeometryMode};
use crate::geometry::snapshot_volume;
use crate::metrics::CommStepMetrics;

/// Couples a continuous model into the discrete engine.
pub struct CouplingLayer<A> {
    config: CouplingConfig,
    assembler: A,
    steps: u64,
    last: Option<CommStepMetrics>,
}

impl<A: NetworkAssembler> CouplingLayer<A> {
    /// Validate `config` and build the layer.
    pub fn new(config: CouplingConfig, assembler: A) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            assembler,
            steps: 0,
            last: None,
        })
    }

    /// The configuration.
    pub fn config(&self) -> &CouplingConfig {
        &self.config
    }

    /// The assembler.
    pub fn assembler(&self) -> &A {
        &self.assembler
    }

    /// Mutable access to the assembler, e.g. to switch reactions off
    /// between runs.
    pub fn assembler_mut(&mut self) -> &mut A {
        &mut self.assembler
    }

    /// Completed communication steps.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Metrics of the most recent step.
    pub fn last_metrics(&self) -> Option<&CommStepMetrics> {
        self.last.as_ref()
    }

    /// Volume used for conversion at the current state.
    ///
    /// For a dynamic geometry this reads `CellSA` and writes the `CellV`
    /// record.
    pub fn current_volume<S: SpeciesWriter + ?Sized>(
        &self,
        store: &mut S,
    ) -> Result<CellVolume, SimError> {
        match &self.config.geometry {
            GeometryMode::Dynamic(_) => snapshot_volume(store),
            GeometryMode::Fixed { volume_litres } => Ok(CellVolume {
                litres: *volume_litres,
                record: (volume_litres * 1e19).round() as i64,
                capped: false,
            }),
        }
    }

    /// Recompute the geometry pseudo-species from current counts.
    ///
    /// Returns `None` for a fixed geometry.
    pub fn refresh_geometry<S: SpeciesWriter + ?Sized>(
        &self,
        store: &mut S,
    ) -> Result<Option<CellVolume>, SimError> {
        match &self.config.geometry {
            GeometryMode::Dynamic(g) => g.refresh(store).map(Some),
            GeometryMode::Fixed { .. } => Ok(None),
        }
    }

    /// Run one communication step at simulated time `time`.
    ///
    /// # Errors
    ///
    /// Anything the assembler, compiler or integrator reports;
    /// [`NumericError::NonFiniteConversion`] when a concentration cannot be
    /// converted back to a count; [`minicell_core::DefinitionError::UndeclaredSpecies`]
    /// when an integrated metabolite has no discrete counterpart. Either
    /// error leaves every species count untouched.
    pub fn exchange<S: SpeciesWriter>(
        &mut self,
        time: f64,
        store: &mut S,
    ) -> Result<CommStepMetrics, SimError> {
        let started = Instant::now();
        let volume = self.current_volume(store)?;

        let network = {
            let ctx = BindContext::new(&*store, volume.litres, time);
            self.assembler.assemble(&ctx)?
        };
        let assembled = Instant::now();

        let compiled = network.compile()?;
        let initial = compiled.initial_state();
        let integration = integrate(&compiled, self.config.ode_interval, &self.config.integrator)?;
        let integrated = Instant::now();

        // Convert and check every metabolite before touching the store, so a
        // failed step leaves the counts as they were.
        let mut deltas = Vec::with_capacity(integration.concentrations.len());
        let mut writes = Vec::with_capacity(integration.concentrations.len());
        for ((key, &c), c0) in integration.concentrations.iter().zip(initial) {
            deltas.push((key.clone(), c - c0));
            if is_surface_area_species(key) {
                continue;
            }
            let n = mm_to_part(c, volume.litres).map_err(|e| NumericError::NonFiniteConversion {
                species: key.clone(),
                value: e.value,
                volume_litres: e.volume_litres,
                time,
            })?;
            store.require(key)?;
            writes.push((key.as_str(), n));
        }
        for (key, n) in writes {
            store.write_count(key, n)?;
        }

        let reconciled = self.config.reconciliation.apply(store)?;
        let next_volume = self.refresh_geometry(store)?.unwrap_or(volume);
        let finished = Instant::now();

        let metrics = CommStepMetrics {
            time,
            volume_litres: volume.litres,
            volume_capped: volume.capped,
            next_volume_litres: next_volume.litres,
            metabolites: compiled.metabolite_count(),
            reactions: compiled.reactions().len(),
            total_us: micros(finished - started),
            assemble_us: micros(assembled - started),
            integrate_us: micros(integrated - assembled),
            writeback_us: micros(finished - integrated),
            integration: integration.report,
            concentration_deltas: deltas,
            carried_costs: reconciled.carried,
        };
        self.steps += 1;

        debug!(
            "comm step {} at t={time}: V={:.4e} L -> {:.4e} L, {} metabolites, {} accepted steps, {} us",
            self.steps,
            metrics.volume_litres,
            metrics.next_volume_litres,
            metrics.metabolites,
            metrics.integration.stats.accepted_steps,
            metrics.total_us
        );

        self.last = Some(metrics.clone());
        Ok(metrics)
    }
}

impl<A: NetworkAssembler> CommunicationHook for CouplingLayer<A> {
    fn communicate(&mut self, time: f64, network: &mut CmeNetwork) -> Result<(), SimError> {
        self.exchange(time, network).map(|_| ())
    }
}

fn micros(d: std::time::Duration) -> u64 {
    u64::try_from(d.as_micros()).unwrap_or(u64::MAX)
}
