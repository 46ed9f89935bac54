//! Hybrid CME/ODE driver.
//!
//! [`HybridSimulation`] owns the discrete network and the coupling layer.
//! [`run`](HybridSimulation::run) solves the discrete network with the
//! coupling layer as the communication hook, so the continuous model is
//! integrated every `ode_interval` seconds of simulated time.

use log::info;
use minicell_cme::{CmeNetwork, CommunicationHook, SolveReport};
use minicell_core::{
    CellVolume, SimError, SpeciesReader, CELL_SA, CELL_SA_LIP, CELL_SA_PROT, CELL_V,
};

use crate::assembler::NetworkAssembler;
use crate::config::GeometryMode;
use crate::coupling::CouplingLayer;
use crate::metrics::CommStepMetrics;

/// Callback receiving each step's metrics and the live species counts.
pub type Reporter = Box<dyn FnMut(&CommStepMetrics, &dyn SpeciesReader) -> Result<(), SimError>>;

/// Result of [`HybridSimulation::run`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HybridReport {
    /// The discrete solve summary.
    pub solve: SolveReport,
    /// Communication steps completed during this run.
    pub communication_steps: u64,
    /// Volume after the final step, in litres.
    pub final_volume_litres: f64,
}

/// A discrete network with a continuous model coupled in.
pub struct HybridSimulation<A> {
    network: CmeNetwork,
    coupling: CouplingLayer<A>,
    reporter: Option<Reporter>,
}

impl<A: NetworkAssembler> HybridSimulation<A> {
    /// Combine a populated network with a coupling layer.
    ///
    /// With a dynamic geometry the `CellSA*` and `CellV` pseudo-species
    /// are declared if missing and computed from the initial counts.
    pub fn new(mut network: CmeNetwork, coupling: CouplingLayer<A>) -> Result<Self, SimError> {
        if matches!(coupling.config().geometry, GeometryMode::Dynamic(_)) {
            network.declare_species([CELL_SA, CELL_SA_LIP, CELL_SA_PROT, CELL_V]);
            coupling.refresh_geometry(&mut network)?;
        }
        Ok(Self {
            network,
            coupling,
            reporter: None,
        })
    }

    /// Install a reporter called after every communication step.
    pub fn with_reporter<F>(mut self, reporter: F) -> Self
    where
        F: FnMut(&CommStepMetrics, &dyn SpeciesReader) -> Result<(), SimError> + 'static,
    {
        self.reporter = Some(Box::new(reporter));
        self
    }

    /// The discrete network.
    pub fn network(&self) -> &CmeNetwork {
        &self.network
    }

    /// Mutable access to the discrete network.
    pub fn network_mut(&mut self) -> &mut CmeNetwork {
        &mut self.network
    }

    /// The coupling layer.
    pub fn coupling(&self) -> &CouplingLayer<A> {
        &self.coupling
    }

    /// Current cell volume.
    pub fn volume(&mut self) -> Result<CellVolume, SimError> {
        self.coupling.current_volume(&mut self.network)
    }

    /// Run from time 0 to `total_time`, coupling every `ode_interval`.
    ///
    /// # Errors
    ///
    /// Any error of the discrete solve, the coupling step or the reporter.
    /// The trajectory is not resumable after an error.
    pub fn run(&mut self, total_time: f64) -> Result<HybridReport, SimError> {
        let interval = self.coupling.config().ode_interval;
        let steps_before = self.coupling.steps();
        info!(
            "hybrid run: total_time={total_time}, ode_interval={interval}, seed={}",
            self.network.seed()
        );

        let mut driver = Driver {
            coupling: &mut self.coupling,
            reporter: self.reporter.as_mut(),
        };
        let solve = self.network.solve(total_time, interval, &mut driver)?;

        let final_volume = self.coupling.current_volume(&mut self.network)?;
        let report = HybridReport {
            solve,
            communication_steps: self.coupling.steps() - steps_before,
            final_volume_litres: final_volume.litres,
        };
        info!(
            "hybrid run finished at t={}: {} events, {} communication steps, V={:.4e} L",
            solve.final_time, solve.events, report.communication_steps, report.final_volume_litres
        );
        Ok(report)
    }

    /// Take the network and coupling layer apart again.
    pub fn into_parts(self) -> (CmeNetwork, CouplingLayer<A>) {
        (self.network, self.coupling)
    }
}

struct Driver<'a, A> {
    coupling: &'a mut CouplingLayer<A>,
    reporter: Option<&'a mut Reporter>,
}

impl<A: NetworkAssembler> CommunicationHook for Driver<'_, A> {
    fn communicate(&mut self, time: f64, network: &mut CmeNetwork) -> Result<(), SimError> {
        let metrics = self.coupling.exchange(time, network)?;
        if let Some(report) = self.reporter.as_deref_mut() {
            report(&metrics, &*network)?;
        }
        Ok(())
    }
}
