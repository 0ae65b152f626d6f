//! Fixed-step time integrators
//!
//! - `leapfrog_step`: kick-drift-kick velocity-Verlet, symplectic, 2nd order,
//!   two acceleration evaluations per step
//! - `hermite_step`: 4th-order Hermite predictor-corrector driven by
//!   acceleration and jerk
//!
//! Both advance `sys.t` by the step they were given. Accelerations and jerks
//! are recomputed from the current state at the start of every step.

use serde::{Deserialize, Serialize};

use super::forces::{NewtonianGravity, Phase};
use super::states::System;
use crate::error::Result;

/// Advance the system by one step using velocity-Verlet (kick-drift-kick)
pub fn leapfrog_step(sys: &mut System, gravity: &NewtonianGravity, h: f64) -> Result<()> {
    let half_h = 0.5 * h;
    let t = sys.t;

    // a_n from x_n
    gravity.accelerations(sys.bodies_mut(), Phase::Current, t)?;

    // Kick: v_n+1/2 = v_n + (h/2) a_n
    // Drift: x_n+1 = x_n + h v_n+1/2
    for b in sys.bodies_mut() {
        b.v += half_h * b.a;
        b.q += h * b.v;
    }

    // a_n+1 from x_n+1
    gravity.accelerations(sys.bodies_mut(), Phase::Current, t + h)?;

    // Second kick: v_n+1 = v_n+1/2 + (h/2) a_n+1
    for b in sys.bodies_mut() {
        b.v += half_h * b.a;
    }

    sys.t += h;
    Ok(())
}

/// Advance the system by one step using the 4th-order Hermite scheme
pub fn hermite_step(sys: &mut System, gravity: &NewtonianGravity, h: f64) -> Result<()> {
    let h2 = h * h;
    let h3 = h2 * h;
    let t = sys.t;

    // a_n, j_n from (x_n, v_n)
    gravity.accelerations_and_jerks(sys.bodies_mut(), Phase::Current, t)?;

    // Predictor: third-order Taylor expansion
    for b in sys.bodies_mut() {
        b.qp = b.q + h * b.v + (h2 / 2.0) * b.a + (h3 / 6.0) * b.j;
        b.vp = b.v + h * b.a + (h2 / 2.0) * b.j;
    }

    // a_p, j_p from the predicted state of every body
    gravity.accelerations_and_jerks(sys.bodies_mut(), Phase::Predicted, t + h)?;

    // Corrector: velocity first, the position update uses the corrected v
    for b in sys.bodies_mut() {
        let v_new = b.v + (h / 2.0) * (b.a + b.ap) + (h2 / 12.0) * (b.j - b.jp);
        b.q += (h / 2.0) * (b.v + v_new) + (h2 / 12.0) * (b.a - b.ap);
        b.v = v_new;
    }

    sys.t += h;
    Ok(())
}

/// Which integrator drives a run
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegratorKind {
    #[serde(rename = "leapfrog", alias = "frogleap", alias = "frog")]
    Leapfrog,

    #[serde(rename = "hermite", alias = "herm")]
    Hermite,
}

impl IntegratorKind {
    pub fn name(&self) -> &'static str {
        match self {
            IntegratorKind::Leapfrog => "leapfrog",
            IntegratorKind::Hermite => "hermite",
        }
    }

    /// Formal order of accuracy
    pub fn order(&self) -> u32 {
        match self {
            IntegratorKind::Leapfrog => 2,
            IntegratorKind::Hermite => 4,
        }
    }

    pub fn step(&self, sys: &mut System, gravity: &NewtonianGravity, h: f64) -> Result<()> {
        match self {
            IntegratorKind::Leapfrog => leapfrog_step(sys, gravity, h),
            IntegratorKind::Hermite => hermite_step(sys, gravity, h),
        }
    }
}

impl std::fmt::Display for IntegratorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for IntegratorKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "leapfrog" | "frogleap" | "frog" => Ok(IntegratorKind::Leapfrog),
            "hermite" | "herm" => Ok(IntegratorKind::Hermite),
            other => Err(format!("unknown integrator `{other}`")),
        }
    }
}
