//! Exact stochastic simulation loop and communication hooks.

use log::{info, trace, warn};
use minicell_core::SimError;
use rand::Rng;

use crate::network::CmeNetwork;

/// Relative distance, in units of the hook interval, within which the last
/// counted boundary is taken to be `total_time`.
const BOUNDARY_TOLERANCE: f64 = 1e-9;

/// Callback invoked at every communication boundary of a solve.
///
/// The hook receives the simulated time of the boundary and mutable
/// access to the network; it may change counts and rates. All
/// propensities are recomputed after it returns. Returning an error
/// aborts the solve.
pub trait CommunicationHook {
    /// Handle one communication boundary.
    fn communicate(&mut self, time: f64, network: &mut CmeNetwork) -> Result<(), SimError>;
}

/// A hook that does nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopHook;

impl CommunicationHook for NoopHook {
    fn communicate(&mut self, _time: f64, _network: &mut CmeNetwork) -> Result<(), SimError> {
        Ok(())
    }
}

/// Hook backed by a closure. Built with [`hook_fn`].
pub struct FnHook<F>(F);

/// Wrap a closure as a [`CommunicationHook`].
pub fn hook_fn<F>(f: F) -> FnHook<F>
where
    F: FnMut(f64, &mut CmeNetwork) -> Result<(), SimError>,
{
    FnHook(f)
}

impl<F> CommunicationHook for FnHook<F>
where
    F: FnMut(f64, &mut CmeNetwork) -> Result<(), SimError>,
{
    fn communicate(&mut self, time: f64, network: &mut CmeNetwork) -> Result<(), SimError> {
        (self.0)(time, network)
    }
}

/// Why a solve returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    /// Simulated time reached `total_time`.
    TimeExhausted,
    /// Total propensity stayed zero across a hook boundary of an
    /// open-ended solve.
    Inert,
}

/// Summary of one call to [`CmeNetwork::solve`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolveReport {
    /// Simulated time at return. Never exceeds `total_time`.
    pub final_time: f64,
    /// Number of reaction events fired.
    pub events: u64,
    /// Number of hook invocations.
    pub hook_calls: u64,
    /// Why the loop stopped.
    pub termination: Termination,
}

impl CmeNetwork {
    /// Run the direct-method SSA from time 0 until `total_time`.
    ///
    /// `hook` is called at every positive multiple of `hook_interval` up to
    /// and including `total_time`. Boundaries are counted, not accumulated,
    /// and the last one snaps onto `total_time` when the two agree to within
    /// `hook_interval * 1e-9`, so `solve(0.3, 0.1, ..)` calls the hook three
    /// times. A waiting time that would carry an event past the next
    /// boundary is discarded: time stops at the boundary and a fresh waiting
    /// time is drawn afterwards.
    ///
    /// With a finite `total_time` an inert network keeps jumping from
    /// boundary to boundary so the hook still runs at every interval. With
    /// an infinite `total_time` the run ends once the network is inert
    /// across a boundary.
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidArgument`] for a NaN or negative `total_time` or
    /// a non-positive `hook_interval`; numeric errors from propensity
    /// evaluation; anything the hook returns.
    pub fn solve<H>(
        &mut self,
        total_time: f64,
        hook_interval: f64,
        hook: &mut H,
    ) -> Result<SolveReport, SimError>
    where
        H: CommunicationHook + ?Sized,
    {
        if total_time.is_nan() || total_time < 0.0 {
            return Err(SimError::InvalidArgument {
                reason: format!("total_time must be >= 0, got {total_time}"),
            });
        }
        if !(hook_interval.is_finite() && hook_interval > 0.0) {
            return Err(SimError::InvalidArgument {
                reason: format!("hook_interval must be finite and > 0, got {hook_interval}"),
            });
        }

        info!(
            "SSA start: {} species, {} reactions, total_time={total_time}, hook_interval={hook_interval}",
            self.species.len(),
            self.reactions.len()
        );

        self.time = 0.0;
        self.refresh_propensities()?;
        let mut boundary_index = 1u64;
        let mut events = 0u64;
        let mut hook_calls = 0u64;

        let termination = loop {
            if self.time >= total_time {
                break Termination::TimeExhausted;
            }
            let scheduled = hook_interval * boundary_index as f64;
            let lands_on_end =
                (total_time - scheduled).abs() <= hook_interval * BOUNDARY_TOLERANCE;
            let (boundary, hook_due) = if lands_on_end {
                (total_time, true)
            } else if scheduled > total_time {
                (total_time, false)
            } else {
                (scheduled, true)
            };
            let a0 = self.total_propensity;
            let tau = (a0 > 0.0).then(|| {
                // r1 in (0, 1]
                let r1 = 1.0 - self.rng.random::<f64>();
                -r1.ln() / a0
            });

            match tau {
                Some(tau) if self.time + tau <= boundary => {
                    self.time += tau;
                    let r2 = self.rng.random::<f64>();
                    match self.select(r2 * a0) {
                        Some(idx) => {
                            self.apply(idx)?;
                            events += 1;
                        }
                        None => {
                            self.refresh_propensities()?;
                        }
                    }
                }
                _ => {
                    self.time = boundary;
                    if !hook_due {
                        continue;
                    }
                    trace!("hook boundary {boundary_index} at t={}", self.time);
                    hook.communicate(self.time, self)?;
                    hook_calls += 1;
                    boundary_index += 1;
                    self.refresh_propensities()?;
                    if total_time.is_infinite() && a0 <= 0.0 && self.total_propensity <= 0.0 {
                        warn!("network inert at t={}; stopping", self.time);
                        break Termination::Inert;
                    }
                }
            }
        };

        info!(
            "SSA end: t={}, {events} events, {hook_calls} hook calls, {termination:?}",
            self.time
        );
        Ok(SolveReport {
            final_time: self.time,
            events,
            hook_calls,
            termination,
        })
    }
}
