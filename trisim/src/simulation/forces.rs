//! Newtonian gravity for the integrators
//!
//! Direct pairwise sums of acceleration and jerk (its time derivative).
//! There is no softening: two bodies on the same point make the force
//! undefined and the evaluation fails with [`SimError::Singularity`].

use crate::error::{Result, SimError};
use crate::simulation::states::{Body, NVec3, System};

/// Which copy of the body state an evaluation reads and writes
/// - `Current`: reads `q`, `v`, writes `a`, `j`
/// - `Predicted`: reads `qp`, `vp`, writes `ap`, `jp` (Hermite corrector)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Current,
    Predicted,
}

fn state(b: &Body, phase: Phase) -> (NVec3, NVec3) {
    match phase {
        Phase::Current => (b.q, b.v),
        Phase::Predicted => (b.qp, b.vp),
    }
}

/// Separations whose square underflows the smallest normal f64 count as
/// coincident
fn separation2(r: &NVec3, i: usize, j: usize, t: f64) -> Result<f64> {
    let r2 = r.norm_squared();
    if r2 < f64::MIN_POSITIVE {
        return Err(SimError::Singularity { i, j, time: t });
    }
    Ok(r2)
}

fn body_index(system: &System, i: usize) -> Result<()> {
    if i >= system.len() {
        return Err(SimError::InvalidSubsystem(format!(
            "body index {i} out of range for {} bodies",
            system.len()
        )));
    }
    Ok(())
}

/// Newtonian gravity, direct n^2 sum over unordered pairs
#[allow(non_snake_case)]
#[derive(Debug, Clone, Copy)]
pub struct NewtonianGravity {
    pub G: f64, // gravitational constant
}

#[allow(non_snake_case)]
impl NewtonianGravity {
    pub fn new(G: f64) -> Self {
        Self { G }
    }

    /// Fill `a` (or `ap`) for every body. `t` is only used to report a
    /// singularity.
    pub fn accelerations(&self, bodies: &mut [Body], phase: Phase, t: f64) -> Result<()> {
        let n = bodies.len();
        let mut acc = vec![NVec3::zeros(); n];

        // Loop over each unordered pair (i, j) with i < j
        for i in 0..n {
            let (xi, _) = state(&bodies[i], phase);
            let mi = bodies[i].m();

            for j in (i + 1)..n {
                let (xj, _) = state(&bodies[j], phase);
                let mj = bodies[j].m();

                // r points from i to j: i is pulled along +r, j along -r
                let r = xj - xi;
                let r2 = separation2(&r, i, j, t)?;

                // G / |r|^3
                let coef = self.G / (r2 * r2.sqrt());

                acc[i] += coef * mj * r;
                acc[j] -= coef * mi * r;
            }
        }

        for (b, a) in bodies.iter_mut().zip(acc) {
            match phase {
                Phase::Current => b.a = a,
                Phase::Predicted => b.ap = a,
            }
        }
        Ok(())
    }

    /// Fill `a`, `j` (or `ap`, `jp`) for every body from positions and
    /// velocities of the whole set.
    pub fn accelerations_and_jerks(&self, bodies: &mut [Body], phase: Phase, t: f64) -> Result<()> {
        let n = bodies.len();
        let mut acc = vec![NVec3::zeros(); n];
        let mut jerk = vec![NVec3::zeros(); n];

        for i in 0..n {
            let (xi, vi) = state(&bodies[i], phase);
            let mi = bodies[i].m();

            for j in (i + 1)..n {
                let (xj, vj) = state(&bodies[j], phase);
                let mj = bodies[j].m();

                let r = xj - xi; // relative position, i -> j
                let v = vj - vi; // relative velocity
                let r2 = separation2(&r, i, j, t)?;
                let inv_r3 = 1.0 / (r2 * r2.sqrt());

                // d/dt (r / |r|^3) = v / |r|^3 - 3 (r.v) r / |r|^5
                let da = inv_r3 * r;
                let dj = inv_r3 * (v - (3.0 * r.dot(&v) / r2) * r);

                acc[i] += self.G * mj * da;
                acc[j] -= self.G * mi * da;
                jerk[i] += self.G * mj * dj;
                jerk[j] -= self.G * mi * dj;
            }
        }

        for ((b, a), jk) in bodies.iter_mut().zip(acc).zip(jerk) {
            match phase {
                Phase::Current => {
                    b.a = a;
                    b.j = jk;
                }
                Phase::Predicted => {
                    b.ap = a;
                    b.jp = jk;
                }
            }
        }
        Ok(())
    }
}

/// Acceleration of body `i` from every other body of `system` at the current
/// positions: sum of `-G m_j (q_i - q_j) / |q_i - q_j|^3`.
pub fn gravitational_acceleration(system: &System, i: usize) -> Result<NVec3> {
    body_index(system, i)?;
    let bodies = system.bodies();
    let xi = bodies[i].q;
    let mut acc = NVec3::zeros();

    for (j, bj) in bodies.iter().enumerate() {
        if j == i {
            continue;
        }
        let r = bj.q - xi;
        let r2 = separation2(&r, i.min(j), i.max(j), system.time())?;
        acc += system.G() * bj.m() / (r2 * r2.sqrt()) * r;
    }
    Ok(acc)
}

/// Jerk of body `i`, the time derivative of [`gravitational_acceleration`]
pub fn gravitational_jerk(system: &System, i: usize) -> Result<NVec3> {
    body_index(system, i)?;
    let bodies = system.bodies();
    let (xi, vi) = (bodies[i].q, bodies[i].v);
    let mut jerk = NVec3::zeros();

    for (j, bj) in bodies.iter().enumerate() {
        if j == i {
            continue;
        }
        let r = bj.q - xi;
        let v = bj.v - vi;
        let r2 = separation2(&r, i.min(j), i.max(j), system.time())?;
        let inv_r3 = 1.0 / (r2 * r2.sqrt());
        jerk += system.G() * bj.m() * inv_r3 * (v - (3.0 * r.dot(&v) / r2) * r);
    }
    Ok(jerk)
}
