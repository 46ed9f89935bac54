//! Benchmark profiles for the minicell simulator.
//!
//! - [`random_network`]: seeded random mass-action network for SSA
//!   throughput.
//! - [`metabolic_chain`]: linear enzymatic chain for compile and
//!   integrate costs.
//! - [`hybrid_profile`]: a small cell with a discrete expression layer,
//!   a continuous chain and minimal-cell geometry, used by the benches
//!   and the demo.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use minicell_cme::CmeNetwork;
use minicell_core::SimError;
use minicell_engine::{
    BindingSpec, ContinuousModel, CouplingConfig, CouplingLayer, EnzymeRule, HybridSimulation,
    InitialValue, ParameterSource, ParameterSpec, ReactionSpec,
};
use minicell_ode::{rate_law, ParameterScope};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Random network of `species` species and `reactions` uni- or
/// bimolecular reactions, every species starting at 1000.
pub fn random_network(seed: u64, species: usize, reactions: usize) -> Result<CmeNetwork, SimError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let keys: Vec<String> = (0..species).map(|i| format!("X{i}")).collect();
    let mut net = CmeNetwork::with_seed(seed);
    net.declare_species(&keys);
    for k in &keys {
        net.add_particles(k, 1000.0)?;
    }
    for _ in 0..reactions {
        let arity = rng.random_range(1..=2);
        let reactants: Vec<&str> = (0..arity)
            .map(|_| keys[rng.random_range(0..species)].as_str())
            .collect();
        let products: Vec<&str> = (0..arity)
            .map(|_| keys[rng.random_range(0..species)].as_str())
            .collect();
        let rate = if arity == 1 { 0.1 } else { 1e-4 };
        net.add_reaction(&reactants, &products, rate)?;
    }
    Ok(net)
}

/// Continuous enzymatic chain `M0 -> M1 -> ... -> Mn` with one enzyme
/// `Ei` per step.
pub fn metabolic_chain(n: usize) -> ContinuousModel {
    let mut model = ContinuousModel::new()
        .rate_form("enz_1_1", rate_law::enzymatic(1, 1))
        .parameter(ParameterSpec::new(
            ParameterScope::Explicit,
            "onoff",
            ParameterSource::Literal(1.0),
        ));
    for i in 0..=n {
        model = model.metabolite(&format!("M{i}"), InitialValue::Live);
    }
    for i in 0..n {
        let id = format!("R{i}");
        let scope = || ParameterScope::Reaction(id.clone());
        model = model
            .reaction(
                ReactionSpec::new(id.as_str(), "enz_1_1")
                    .substrate(BindingSpec::new("Sub1", format!("M{i}")))
                    .product(BindingSpec::new("Prod1", format!("M{}", i + 1))),
            )
            .parameter(ParameterSpec::new(
                scope(),
                "Enzyme",
                ParameterSource::EnzymeLevel(EnzymeRule::Any(vec![format!("E{i}")])),
            ))
            .parameter(ParameterSpec::new(scope(), "kcatF", ParameterSource::Literal(20.0)))
            .parameter(ParameterSpec::new(scope(), "kcatR", ParameterSource::Literal(2.0)))
            .parameter(ParameterSpec::new(scope(), "KmSub1", ParameterSource::Literal(0.5)))
            .parameter(ParameterSpec::new(scope(), "KmProd1", ParameterSource::Literal(0.5)));
    }
    model
}

/// Species read by [`metabolic_chain`] of length `n`, with starting counts.
pub fn chain_species(n: usize) -> Vec<(String, i64)> {
    let mut species: Vec<(String, i64)> = (0..=n)
        .map(|i| (format!("M{i}"), if i == 0 { 200_000 } else { 10_000 }))
        .collect();
    species.extend((0..n).map(|i| (format!("E{i}"), 50)));
    species
}

/// Hybrid cell: enzymes are expressed and degraded stochastically, the
/// chain they catalyse is integrated every second, and the membrane is
/// built from a fixed lipid pool.
pub fn hybrid_profile(
    seed: u64,
    chain_length: usize,
) -> Result<HybridSimulation<ContinuousModel>, SimError> {
    let mut net = CmeNetwork::with_seed(seed);
    let lipids = [
        ("M_pc_c", 200_000),
        ("M_pg_c", 150_000),
        ("M_chsterol_c", 300_000),
        ("M_clpn_c", 50_000),
    ];
    net.declare_species(lipids.iter().map(|&(k, _)| k));
    for (k, n) in lipids {
        net.add_particles(k, n as f64)?;
    }
    let species = chain_species(chain_length);
    net.declare_species(species.iter().map(|(k, _)| k));
    for (k, n) in &species {
        net.add_particles(k, *n as f64)?;
    }
    net.declare_species(["ATP_trsc", "M_atp_c", "M_adp_c", "M_pi_c"]);
    net.add_particles("M_atp_c", 2_000_000.0)?;
    for i in 0..chain_length {
        let e = format!("E{i}");
        net.add_reaction(&[], &[e.as_str(), "ATP_trsc"], 0.5)?;
        net.add_reaction(&[e.as_str()], &[], 0.01)?;
    }

    let layer = CouplingLayer::new(CouplingConfig::default(), metabolic_chain(chain_length))?;
    HybridSimulation::new(net, layer)
}
