//! Run driver
//!
//! Owns the time-stepping loop for either integrator: validates the inputs,
//! walks the step schedule, snapshots diagnostics at the chosen cadence and
//! hands the series back to the caller. A run either covers the whole
//! duration and returns `Ok`, or stops at the first numerical failure and
//! returns `Err`; there is no partial result.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, warn};

use crate::error::{Result, SimError};
use crate::simulation::diagnostics::Diagnostics;
use crate::simulation::forces::NewtonianGravity;
use crate::simulation::integrator::IntegratorKind;
use crate::simulation::params::Parameters;
use crate::simulation::states::{Subsystem, System};

/// Settings for the external plotter. Carried through untouched, they never
/// change the integration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlotOptions {
    #[serde(default)]
    pub display: bool, // live display
    #[serde(default)]
    pub snapshot_name: String, // base name for saved figures
    #[serde(default)]
    pub animate: bool, // produce an animation
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunOptions {
    pub record_every: usize,  // snapshot cadence in steps
    pub recover_params: bool, // false -> no diagnostics at all
    pub record_positions: bool, // keep the trajectory in every snapshot
    pub plot: PlotOptions,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            record_every: 1,
            recover_params: true,
            record_positions: true,
            plot: PlotOptions::default(),
        }
    }
}

/// Result of a run that covered its whole duration
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub integrator: IntegratorKind,
    pub h: f64,
    pub steps_taken: usize,
    pub final_time: f64,
    /// `None` when the run was asked not to recover diagnostics
    pub diagnostics: Option<Diagnostics>,
    pub plot: PlotOptions,
}

/// Integrate `system` for `params.t_end` with steps of `params.h0`.
///
/// Energy, angular momentum and plane angle are read from `system`,
/// semi-major axis and eccentricity from `reference`. The initial state is
/// snapshotted as step 0, then every `record_every` steps and after the final
/// step.
pub fn integrate(
    kind: IntegratorKind,
    system: &mut System,
    reference: &Subsystem,
    params: &Parameters,
    options: &RunOptions,
) -> Result<RunOutcome> {
    if options.record_every == 0 {
        return Err(SimError::InvalidCadence);
    }
    reference.check(system)?;
    let schedule = params.schedule()?;

    let span = info_span!("integrate", integrator = %kind, h = params.h0);
    let _enter = span.enter();

    let gravity = NewtonianGravity::new(system.G());
    let t0 = system.time();
    let n = schedule.steps();

    info!(steps = n, duration = params.t_end, bodies = system.len(), "integration start");
    if options.plot.display || options.plot.animate {
        debug!(plot = ?options.plot, "plot options forwarded to the caller");
    }

    let mut diagnostics = options
        .recover_params
        .then(|| Diagnostics::new().with_positions(options.record_positions));
    if let Some(d) = diagnostics.as_mut() {
        d.record(0, system, reference)?;
    }

    for k in 0..n {
        // overflowed forces leave inf/NaN that the separation check misses
        let stepped = kind
            .step(system, &gravity, schedule.step_size(k))
            .and_then(|()| system.check_finite());
        if let Err(err) = stepped {
            warn!(step = k + 1, %err, "integration aborted");
            return Err(err);
        }
        // snap to the schedule so rounding does not accumulate in t
        system.t = t0 + schedule.elapsed_after(k + 1);

        let done = k + 1;
        if let Some(d) = diagnostics.as_mut() {
            if done % options.record_every == 0 || done == n {
                d.record(done, system, reference)?;
            }
        }
    }

    info!(final_time = system.time(), "integration end");

    Ok(RunOutcome {
        integrator: kind,
        h: params.h0,
        steps_taken: n,
        final_time: system.time(),
        diagnostics,
        plot: options.plot.clone(),
    })
}

/// Integrate with the leapfrog (kick-drift-kick) scheme
pub fn leapfrog(
    system: &mut System,
    reference: &Subsystem,
    duration: f64,
    step: f64,
    options: &RunOptions,
) -> Result<RunOutcome> {
    integrate(
        IntegratorKind::Leapfrog,
        system,
        reference,
        &Parameters::new(duration, step),
        options,
    )
}

/// Integrate with the 4th-order Hermite scheme
pub fn hermite(
    system: &mut System,
    reference: &Subsystem,
    duration: f64,
    step: f64,
    options: &RunOptions,
) -> Result<RunOutcome> {
    integrate(
        IntegratorKind::Hermite,
        system,
        reference,
        &Parameters::new(duration, step),
        options,
    )
}

/// Integrator choice plus run options
#[derive(Debug, Clone)]
pub struct Engine {
    pub integrator: IntegratorKind,
    pub options: RunOptions,
}

impl Engine {
    pub fn new(integrator: IntegratorKind) -> Self {
        Self {
            integrator,
            options: RunOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    pub fn run(
        &self,
        system: &mut System,
        reference: &Subsystem,
        params: &Parameters,
    ) -> Result<RunOutcome> {
        integrate(self.integrator, system, reference, params, &self.options)
    }
}
