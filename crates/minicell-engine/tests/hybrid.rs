//! Integration tests: full hybrid runs.
//!
//! A discrete network charges a transcription cost counter while a
//! continuous enzymatic reaction converts S to P. The runs check step
//! scheduling (including fractional intervals and a discrete network with
//! no reactions), mass conservation across the count/concentration round
//! trip, cost settlement and geometry consistency.

use std::cell::RefCell;
use std::rc::Rc;

use minicell_cme::{CmeNetwork, Termination};
use minicell_core::{
    volume_from_surface_area, ReactionId, SpeciesReader, CELL_SA, CELL_SA_LIP, CELL_SA_PROT,
    CELL_V,
};
use minicell_engine::{
    BindingSpec, CommStepMetrics, ContinuousModel, CouplingConfig, CouplingLayer, EnzymeRule,
    GeometryMode, HybridSimulation, InitialValue, ParameterSource, ParameterSpec, ReactionSpec,
    ReconciliationRules,
};
use minicell_ode::{rate_law, ParameterScope};
use minicell_test_utils::fixtures::minimal_cell_species;

const S0: i64 = 100_000;

fn cell(seed: u64) -> CmeNetwork {
    let mut net = CmeNetwork::with_seed(seed);
    let species = minimal_cell_species();
    net.declare_species(species.iter().map(|&(k, _)| k));
    for (k, n) in species {
        net.add_particles(k, n as f64).unwrap();
    }
    net.declare_species(["S", "P", "E", "ATP_trsc"]);
    net.add_particles("S", S0 as f64).unwrap();
    net.add_particles("E", 100.0).unwrap();
    // Every enzyme molecule spends ATP on its own expression.
    net.add_reaction(&["E"], &["E", "ATP_trsc"], 0.1).unwrap();
    net
}

fn inert_cell() -> CmeNetwork {
    let mut net = CmeNetwork::with_seed(17);
    net.declare_species(["S", "P", "E"]);
    net.add_particles("S", S0 as f64).unwrap();
    net.add_particles("E", 100.0).unwrap();
    net
}

fn fixed_volume(ode_interval: f64) -> CouplingConfig {
    CouplingConfig {
        ode_interval,
        reconciliation: ReconciliationRules::empty(),
        geometry: GeometryMode::Fixed {
            volume_litres: 1e-17,
        },
        ..CouplingConfig::default()
    }
}

fn recorded_times<A>(sim: HybridSimulation<A>) -> (HybridSimulation<A>, Rc<RefCell<Vec<f64>>>)
where
    A: minicell_engine::NetworkAssembler,
{
    let seen: Rc<RefCell<Vec<f64>>> = Rc::default();
    let sink = Rc::clone(&seen);
    let sim = sim.with_reporter(move |m, _| {
        sink.borrow_mut().push(m.time);
        Ok(())
    });
    (sim, seen)
}

fn model() -> ContinuousModel {
    let rxn = || ParameterScope::Reaction("R1".into());
    ContinuousModel::new()
        .metabolite("S", InitialValue::Live)
        .metabolite("P", InitialValue::Live)
        .rate_form("enz_1_1", rate_law::enzymatic(1, 1))
        .reaction(
            ReactionSpec::new("R1", "enz_1_1")
                .substrate(BindingSpec::new("Sub1", "S"))
                .product(BindingSpec::new("Prod1", "P")),
        )
        .parameter(ParameterSpec::new(
            rxn(),
            "Enzyme",
            ParameterSource::EnzymeLevel(EnzymeRule::All(vec!["E".into()])),
        ))
        .parameter(ParameterSpec::new(rxn(), "kcatF", ParameterSource::Literal(10.0)))
        .parameter(ParameterSpec::new(rxn(), "kcatR", ParameterSource::Literal(0.0)))
        .parameter(ParameterSpec::new(rxn(), "KmSub1", ParameterSource::Literal(1.0)))
        .parameter(ParameterSpec::new(rxn(), "KmProd1", ParameterSource::Literal(1.0)))
        .parameter(ParameterSpec::new(
            ParameterScope::Explicit,
            "onoff",
            ParameterSource::Literal(1.0),
        ))
}

#[test]
fn hybrid_run_with_dynamic_geometry() {
    let layer = CouplingLayer::new(CouplingConfig::default(), model()).unwrap();
    let sim = HybridSimulation::new(cell(7), layer).unwrap();

    let initial_sa = sim.network().count(CELL_SA).unwrap();
    assert!(initial_sa > 0);
    assert_eq!(
        initial_sa,
        sim.network().count(CELL_SA_LIP).unwrap() + sim.network().count(CELL_SA_PROT).unwrap()
    );

    let seen: Rc<RefCell<Vec<CommStepMetrics>>> = Rc::default();
    let sink = Rc::clone(&seen);
    let mut sim = sim.with_reporter(move |m, species| {
        assert!(species.count("S").is_some());
        sink.borrow_mut().push(m.clone());
        Ok(())
    });

    let report = sim.run(3.0).unwrap();
    assert_eq!(report.communication_steps, 3);
    assert_eq!(report.solve.final_time, 3.0);

    let steps = seen.borrow();
    assert_eq!(steps.len(), 3);
    let times: Vec<f64> = steps.iter().map(|m| m.time).collect();
    assert_eq!(times, vec![1.0, 2.0, 3.0]);
    assert!(steps.iter().all(|m| m.metabolites == 2 && m.reactions == 1));
    assert!(steps.iter().all(|m| m.carried_costs.is_empty()));

    let net = sim.network();
    // S was converted into P without losing particles beyond rounding.
    let s = net.count("S").unwrap();
    let p = net.count("P").unwrap();
    assert!(p > 0);
    assert!((s + p - S0).abs() <= 6, "S + P = {}", s + p);

    // Every cost was paid in ATP at the final boundary.
    let paid = net.firing_count(ReactionId(0)) as i64;
    assert_eq!(net.count("ATP_trsc"), Some(0));
    assert_eq!(net.count("M_atp_c"), Some(1_000_000 - paid));
    assert_eq!(net.count("M_adp_c"), Some(100_000 + paid));

    // Geometry state is self-consistent.
    let sa = net.count(CELL_SA).unwrap();
    assert_eq!(sa, initial_sa);
    let volume = volume_from_surface_area(sa as f64);
    assert_eq!(net.count(CELL_V), Some(volume.record));
    assert_eq!(report.final_volume_litres, volume.litres);
}

#[test]
fn fixed_geometry_leaves_pseudo_species_alone() {
    let config = CouplingConfig {
        geometry: GeometryMode::Fixed {
            volume_litres: 1e-17,
        },
        reconciliation: ReconciliationRules::empty(),
        ..CouplingConfig::default()
    };
    let layer = CouplingLayer::new(config, model()).unwrap();
    let mut sim = HybridSimulation::new(cell(3), layer).unwrap();
    assert!(sim.network().count(CELL_SA).is_none());

    let report = sim.run(2.0).unwrap();
    assert_eq!(report.communication_steps, 2);
    assert_eq!(report.final_volume_litres, 1e-17);
    // No reconciliation: the counter keeps growing.
    let net = sim.network();
    assert_eq!(
        net.count("ATP_trsc"),
        Some(net.firing_count(ReactionId(0)) as i64)
    );
}

#[test]
fn same_seed_same_hybrid_trajectory() {
    let run = |seed| {
        let layer = CouplingLayer::new(CouplingConfig::default(), model()).unwrap();
        let mut sim = HybridSimulation::new(cell(seed), layer).unwrap();
        sim.run(2.0).unwrap();
        let net = sim.network();
        (net.count("S"), net.count("P"), net.count("M_atp_c"))
    };
    assert_eq!(run(21), run(21));
}

#[test]
fn reporter_errors_abort_the_run() {
    let layer = CouplingLayer::new(CouplingConfig::default(), model()).unwrap();
    let mut sim = HybridSimulation::new(cell(1), layer)
        .unwrap()
        .with_reporter(|m, _| {
            if m.time >= 2.0 {
                Err(minicell_core::SimError::Hook {
                    reason: "reporter closed".into(),
                })
            } else {
                Ok(())
            }
        });
    let err = sim.run(5.0).unwrap_err();
    assert!(err.to_string().contains("reporter closed"));
    assert_eq!(sim.coupling().steps(), 2);
}

#[test]
fn inert_discrete_network_still_couples_every_interval() {
    let layer = CouplingLayer::new(fixed_volume(1.0), model()).unwrap();
    let sim = HybridSimulation::new(inert_cell(), layer).unwrap();
    let (mut sim, seen) = recorded_times(sim);

    let report = sim.run(5.0).unwrap();
    assert_eq!(report.communication_steps, 5);
    assert_eq!(report.solve.termination, Termination::TimeExhausted);
    assert_eq!(report.solve.final_time, 5.0);
    assert_eq!(report.solve.events, 0);
    assert_eq!(*seen.borrow(), vec![1.0, 2.0, 3.0, 4.0, 5.0]);

    // The continuous side kept converting S after the first boundary.
    let net = sim.network();
    let s = net.count("S").unwrap();
    let p = net.count("P").unwrap();
    assert!(p > 0);
    assert!((s + p - S0).abs() <= 10, "S + P = {}", s + p);
}

#[test]
fn tenth_of_a_second_interval_runs_every_step() {
    let layer = CouplingLayer::new(fixed_volume(0.1), model()).unwrap();
    let sim = HybridSimulation::new(cell(5), layer).unwrap();
    let (mut sim, seen) = recorded_times(sim);

    let report = sim.run(1.0).unwrap();
    assert_eq!(report.communication_steps, 10);
    assert_eq!(report.solve.final_time, 1.0);
    let times = seen.borrow();
    assert_eq!(times.len(), 10);
    assert_eq!(times.last().copied(), Some(1.0));
}

#[test]
fn interval_that_does_not_divide_exactly_still_hits_total_time() {
    // 0.3 * 3 is 0.8999999999999999 in floating point.
    let layer = CouplingLayer::new(fixed_volume(0.3), model()).unwrap();
    let sim = HybridSimulation::new(cell(5), layer).unwrap();
    let (mut sim, seen) = recorded_times(sim);

    let report = sim.run(0.9).unwrap();
    assert_eq!(report.communication_steps, 3);
    assert_eq!(report.solve.final_time, 0.9);
    assert_eq!(seen.borrow().last().copied(), Some(0.9));
}

#[test]
fn partial_last_interval_gets_no_step() {
    let layer = CouplingLayer::new(fixed_volume(0.3), model()).unwrap();
    let sim = HybridSimulation::new(cell(5), layer).unwrap();
    let (mut sim, seen) = recorded_times(sim);

    let report = sim.run(1.0).unwrap();
    assert_eq!(report.communication_steps, 3);
    assert_eq!(report.solve.final_time, 1.0);
    let last = seen.borrow().last().copied().unwrap();
    assert!((last - 0.9).abs() < 1e-12);
}
