use std::time::Instant;

use crate::error::Result;
use crate::simulation::engine::{integrate, RunOptions};
use crate::simulation::integrator::IntegratorKind;
use crate::simulation::params::Parameters;
use crate::simulation::scenario::{BinaryElements, TripleElements};
use crate::simulation::states::{Subsystem, System};
use crate::simulation::units::G_ASTRO;

/// Options that skip diagnostics, so only stepping is timed
fn bare_options() -> RunOptions {
    RunOptions {
        recover_params: false,
        ..RunOptions::default()
    }
}

/// Helper to build the triple used for timing (astronomical units)
fn make_triple() -> Result<System> {
    let bodies = TripleElements {
        masses: [1.0, 1.0, 0.1],
        sma: [2.0, 7.0],
        ecc: [0.0, 0.1],
        inclination: 80.0,
    }
    .bodies(G_ASTRO)?;
    Ok(System::new(bodies, G_ASTRO)?.recentered())
}

/// Distance between where the second body of a circular equal-mass binary
/// starts and where it ends after one period integrated with `steps` steps.
/// The exact solution returns it to its start.
pub fn circular_return_error(kind: IntegratorKind, steps: usize) -> Result<f64> {
    let elements = BinaryElements {
        masses: [1.0, 1.0],
        sma: 1.0,
        ecc: 0.0,
    };
    let period = elements.period(G_ASTRO);
    let mut sys = System::new(elements.bodies(G_ASTRO)?, G_ASTRO)?;
    let reference = Subsystem::all(&sys);
    let start = sys.bodies()[1].q;

    let params = Parameters::new(period, period / steps as f64);
    integrate(kind, &mut sys, &reference, &params, &bare_options())?;

    Ok((sys.bodies()[1].q - start).norm())
}

/// Wall-clock time per step of both integrators on the triple
pub fn bench_integrators() -> Result<()> {
    let step_counts = [1_000, 10_000, 100_000];

    for n in step_counts {
        let template = make_triple()?;
        let reference = Subsystem::new(&template, vec![0, 1])?;
        let h = 0.001;
        let params = Parameters::new(n as f64 * h, h);

        let mut per_step = Vec::new();
        for kind in [IntegratorKind::Leapfrog, IntegratorKind::Hermite] {
            let mut sys = template.clone();
            let t0 = Instant::now();
            integrate(kind, &mut sys, &reference, &params, &bare_options())?;
            per_step.push(t0.elapsed().as_secs_f64() / n as f64);
        }

        println!(
            "steps = {:7}, leapfrog = {:10.3e} s/step, hermite = {:10.3e} s/step",
            n, per_step[0], per_step[1]
        );
    }
    Ok(())
}

/// Return error after one orbit for halving step sizes, as CSV.
/// The ratio between consecutive rows approaches 2^order.
pub fn bench_convergence() -> Result<()> {
    println!("steps_per_orbit,leapfrog_err,hermite_err");

    for steps in [64, 128, 256, 512, 1024, 2048] {
        let lf = circular_return_error(IntegratorKind::Leapfrog, steps)?;
        let he = circular_return_error(IntegratorKind::Hermite, steps)?;
        println!("{},{:.6e},{:.6e}", steps, lf, he);
    }
    Ok(())
}
