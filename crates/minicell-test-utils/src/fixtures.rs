//! Reusable networks for tests and benchmarks.
//!
//! - [`decay_network`]: discrete `A -> B` with `n` copies of `A`.
//! - [`dimerization_network`]: discrete `2A <-> A2`.
//! - [`enzyme_network`]: one enzymatic continuous reaction with known rate.
//! - [`decay_chain`]: continuous `X0 -> X1 -> ... -> Xn` mass-action chain.

use minicell_cme::CmeNetwork;
use minicell_ode::{rate_law, ContinuousNetwork, Parameter, ParameterScope};

/// Discrete `A -> B` at rate `k`, starting from `n` molecules of `A`.
pub fn decay_network(seed: u64, n: i64, k: f64) -> CmeNetwork {
    let mut net = CmeNetwork::with_seed(seed);
    net.declare_species(["A", "B"]);
    net.add_particles("A", n as f64)
        .expect("fixture species are declared");
    net.add_reaction(&["A"], &["B"], k)
        .expect("fixture reaction is valid");
    net
}

/// Discrete `A + A -> A2` (rate `kf`) and `A2 -> A + A` (rate `kr`).
pub fn dimerization_network(seed: u64, n: i64, kf: f64, kr: f64) -> CmeNetwork {
    let mut net = CmeNetwork::with_seed(seed);
    net.declare_species(["A", "A2"]);
    net.add_particles("A", n as f64)
        .expect("fixture species are declared");
    net.add_reaction(&["A", "A"], &["A2"], kf)
        .expect("fixture reaction is valid");
    net.add_reaction(&["A2"], &["A", "A"], kr)
        .expect("fixture reaction is valid");
    net
}

/// One reversible enzymatic reaction `S -> P`.
///
/// With `S = 1`, `P = 0`, `Km = 1`, `kcatF = 10`, `kcatR = 0` and
/// `Enzyme = 1` the initial rate is exactly 5.
pub fn enzyme_network() -> ContinuousNetwork {
    let mut net = ContinuousNetwork::new();
    net.declare_metabolite("S", "substrate", 1.0)
        .expect("valid metabolite");
    net.declare_metabolite("P", "product", 0.0)
        .expect("valid metabolite");
    net.declare_rate_form("enz_1_1", rate_law::enzymatic(1, 1))
        .expect("generated template parses");
    net.declare_reaction("R1", "enz_1_1", "S to P")
        .expect("rate form declared");
    net.bind_substrate("R1", "Sub1", "S", 0.0)
        .expect("reaction declared");
    net.bind_product("R1", "Prod1", "P", 0.0)
        .expect("reaction declared");
    let scope = || ParameterScope::Reaction("R1".to_string());
    for (key, value) in [
        ("onoff", 1.0),
        ("Enzyme", 1.0),
        ("kcatF", 10.0),
        ("kcatR", 0.0),
        ("KmSub1", 1.0),
        ("KmProd1", 1.0),
    ] {
        net.declare_parameter(scope(), Parameter::new(key, value))
            .expect("reaction declared");
    }
    net
}

/// Mass-action chain over `n + 1` metabolites, `X0 = 1` mM, every step at
/// rate `k`.
pub fn decay_chain(n: usize, k: f64) -> ContinuousNetwork {
    let mut net = ContinuousNetwork::new();
    net.declare_rate_form("mass_action", "$k * $S")
        .expect("template parses");
    net.declare_parameter(ParameterScope::Explicit, Parameter::new("k", k))
        .expect("explicit scope");
    for i in 0..=n {
        let initial = if i == 0 { 1.0 } else { 0.0 };
        net.declare_metabolite(format!("X{i}"), format!("X{i}"), initial)
            .expect("valid metabolite");
    }
    for i in 0..n {
        let id = format!("R{i}");
        net.declare_reaction(id.as_str(), "mass_action", id.as_str())
            .expect("rate form declared");
        net.bind_substrate(&id, "S", format!("X{i}"), 0.0)
            .expect("reaction declared");
        net.bind_product(&id, "P", format!("X{}", i + 1), 0.0)
            .expect("reaction declared");
    }
    net
}

/// Species of the minimal cell touched by reconciliation and geometry,
/// with modest starting counts.
pub fn minimal_cell_species() -> Vec<(&'static str, i64)> {
    vec![
        ("M_atp_c", 1_000_000),
        ("M_adp_c", 100_000),
        ("M_gtp_c", 500_000),
        ("M_gdp_c", 50_000),
        ("M_ctp_c", 300_000),
        ("M_utp_c", 300_000),
        ("M_pi_c", 1_000_000),
        ("M_ppi_c", 1_000),
        ("M_datp_c", 10_000),
        ("M_dttp_c", 10_000),
        ("M_dctp_c", 10_000),
        ("M_dgtp_c", 10_000),
        ("M_amp_c", 5_000),
        ("M_ump_c", 5_000),
        ("M_cmp_c", 5_000),
        ("M_gmp_c", 5_000),
        ("M_fmettrna_c", 2_000),
        ("M_trnamet_c", 500),
        ("M_clpn_c", 50_000),
        ("M_chsterol_c", 300_000),
        ("M_sm_c", 100_000),
        ("M_pc_c", 200_000),
        ("M_pg_c", 150_000),
        ("M_galfur12dgr_c", 100_000),
        ("M_12dgr_c", 5_000),
        ("M_pa_c", 2_000),
        ("M_cdpdag_c", 1_000),
        ("ptsg", 300),
        ("ptsg_P", 100),
        ("M_PTN_JCVISYN3A_0005_c", 200),
        ("M_PTN_JCVISYN3A_0113_c", 150),
    ]
}
