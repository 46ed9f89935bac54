//! Run a small hybrid cell and print one line per communication step.
//!
//! ```sh
//! RUST_LOG=info cargo run -p minicell-bench --example hybrid_demo -- 20
//! ```

use log::info;
use minicell_bench::hybrid_profile;
use minicell_core::{SimError, SpeciesReader, CELL_SA};

fn main() -> Result<(), SimError> {
    env_logger::init();

    let total_time: f64 = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(10.0);

    let sim = hybrid_profile(42, 10)?;
    let mut sim = sim.with_reporter(|m, species| {
        let (worst, delta) = m.largest_delta().unwrap_or(("-", 0.0));
        println!(
            "t={:>6.1}  V={:.3e} L  SA={:>8}  E0={:>4}  M10={:>8}  rhs={:>5}  {:>6}us  max|dC|={worst}:{delta:.3e}",
            m.time,
            m.volume_litres,
            species.count(CELL_SA).unwrap_or(0),
            species.count("E0").unwrap_or(0),
            species.count("M10").unwrap_or(0),
            m.integration.derivative_evaluations,
            m.total_us,
        );
        Ok(())
    });

    let report = sim.run(total_time)?;
    info!(
        "done: {} events, {} communication steps, {:?}",
        report.solve.events, report.communication_steps, report.solve.termination
    );
    println!(
        "final time {:.1}s, final volume {:.4e} L",
        report.solve.final_time, report.final_volume_litres
    );
    Ok(())
}
