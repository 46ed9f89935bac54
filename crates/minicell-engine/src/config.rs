//! Coupling configuration.

use minicell_core::ConfigError;
use minicell_ode::IntegratorConfig;

use crate::geometry::GeometryConfig;
use crate::reconcile::ReconciliationRules;

/// Where the cell volume used for unit conversion comes from.
#[derive(Clone, Debug, PartialEq)]
pub enum GeometryMode {
    /// Derive the volume from the `CellSA` pseudo-species and refresh the
    /// surface area after every communication step.
    Dynamic(GeometryConfig),
    /// Use a constant volume; the geometry pseudo-species are not touched.
    Fixed {
        /// Cell volume in litres.
        volume_litres: f64,
    },
}

/// Configuration of a [`CouplingLayer`](crate::coupling::CouplingLayer).
#[derive(Clone, Debug, PartialEq)]
pub struct CouplingConfig {
    /// Span of simulated seconds integrated at each communication step.
    /// Also the hook interval used by the hybrid driver.
    pub ode_interval: f64,
    /// Solver and tolerances.
    pub integrator: IntegratorConfig,
    /// Cost counters settled after each integration.
    pub reconciliation: ReconciliationRules,
    /// Volume source.
    pub geometry: GeometryMode,
}

impl Default for CouplingConfig {
    fn default() -> Self {
        Self {
            ode_interval: 1.0,
            integrator: IntegratorConfig::default(),
            reconciliation: ReconciliationRules::minimal_cell(),
            geometry: GeometryMode::Dynamic(GeometryConfig::minimal_cell()),
        }
    }
}

impl CouplingConfig {
    /// Check every field, including the nested integrator and geometry
    /// configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.ode_interval.is_finite() && self.ode_interval > 0.0) {
            return Err(ConfigError::InvalidInterval {
                field: "ode_interval",
                value: self.ode_interval,
            });
        }
        self.integrator.validate()?;
        match &self.geometry {
            GeometryMode::Dynamic(g) => g.validate(),
            GeometryMode::Fixed { volume_litres } => {
                if volume_litres.is_finite() && *volume_litres > 0.0 {
                    Ok(())
                } else {
                    Err(ConfigError::InvalidVolume {
                        value: *volume_litres,
                    })
                }
            }
        }
    }
}
