//! Parallel sweep over step sizes
//!
//! Every step size gets its own deep copy of the initial system and runs on
//! the rayon pool. Runs share nothing mutable and report back only through
//! their own `Result`, so one singular run leaves the others untouched.

use rayon::prelude::*;
use tracing::{info, warn};

use crate::error::Result;
use crate::simulation::engine::{Engine, RunOutcome};
use crate::simulation::params::Parameters;
use crate::simulation::states::{Subsystem, System};

/// One slot of a sweep
#[derive(Debug)]
pub struct SweepRun {
    pub h: f64,
    pub outcome: Result<RunOutcome>,
    pub system: System, // final state (or the state at failure)
}

/// Integrate `system` for `duration` once per entry of `steps`. Results come
/// back in the order of `steps`.
pub fn sweep(
    engine: &Engine,
    system: &System,
    reference: &Subsystem,
    duration: f64,
    steps: &[f64],
) -> Vec<SweepRun> {
    info!(runs = steps.len(), integrator = %engine.integrator, "sweep dispatch");

    steps
        .par_iter()
        .map(|&h| {
            let mut run_system = system.clone();
            let outcome = engine.run(&mut run_system, reference, &Parameters::new(duration, h));
            if let Err(err) = &outcome {
                warn!(h, %err, "sweep run failed");
            }
            SweepRun {
                h,
                outcome,
                system: run_system,
            }
        })
        .collect()
}
