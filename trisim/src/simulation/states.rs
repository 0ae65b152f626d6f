//! Core state types for the gravitational simulation.
//!
//! - `Body`: a point mass plus the derivative and predictor scratch vectors
//!   the integrators fill in
//! - `System`: the ordered bodies, the elapsed time `t` and the gravitational
//!   constant `G` of the unit system they are expressed in
//! - `Subsystem`: an index set into a `System` (e.g. the inner binary of a
//!   triple); the same bodies are shared by index, never duplicated
//! - `SystemView`: a borrowed selection of bodies exposing every derived
//!   quantity (energy, angular momentum, orbital elements, plane angle)
//! - `PointMass` / `Aggregate`: lets a whole selection stand in for a single
//!   virtual body
//!
//! Derived quantities are recomputed from the current body states on every
//! call, nothing is cached.

use nalgebra::Vector3;
use serde::Serialize;

use crate::error::{Result, SimError};

pub type NVec3 = Vector3<f64>;

#[derive(Debug, Clone)]
pub struct Body {
    m: f64,        // mass, fixed once built
    pub q: NVec3,  // position
    pub v: NVec3,  // velocity
    pub a: NVec3,  // acceleration at (q, v)
    pub j: NVec3,  // jerk at (q, v)
    pub qp: NVec3, // predicted position
    pub vp: NVec3, // predicted velocity
    pub ap: NVec3, // acceleration at (qp, vp)
    pub jp: NVec3, // jerk at (qp, vp)
}

impl Body {
    /// Create a body at rest in its derivatives; `a`, `j` and the predicted
    /// vectors start at zero and are filled by the integrators.
    pub fn new(m: f64, q: NVec3, v: NVec3) -> Self {
        Self {
            m,
            q,
            v,
            a: NVec3::zeros(),
            j: NVec3::zeros(),
            qp: NVec3::zeros(),
            vp: NVec3::zeros(),
            ap: NVec3::zeros(),
            jp: NVec3::zeros(),
        }
    }

    pub fn m(&self) -> f64 {
        self.m
    }

    /// Linear momentum `m v`
    pub fn momentum(&self) -> NVec3 {
        self.v * self.m
    }
}

/// Anything that can be treated as a single mass moving with one velocity.
pub trait PointMass {
    fn mass(&self) -> f64;
    fn position(&self) -> NVec3;
    fn velocity(&self) -> NVec3;
}

impl PointMass for Body {
    fn mass(&self) -> f64 {
        self.m
    }
    fn position(&self) -> NVec3 {
        self.q
    }
    fn velocity(&self) -> NVec3 {
        self.v
    }
}

/// A selection of bodies collapsed to total mass, center of mass and
/// center-of-mass velocity.
#[derive(Debug, Clone, Copy)]
pub struct Aggregate {
    pub m: f64,
    pub q: NVec3,
    pub v: NVec3,
}

impl PointMass for Aggregate {
    fn mass(&self) -> f64 {
        self.m
    }
    fn position(&self) -> NVec3 {
        self.q
    }
    fn velocity(&self) -> NVec3 {
        self.v
    }
}

/// Semi-major axis and eccentricity of a relative two-body orbit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OrbitalElements {
    pub semi_major_axis: f64,
    pub eccentricity: f64,
}

/// Osculating elements of the relative orbit of `p2` around `p1`.
///
/// Either side may be an `Aggregate`, so the outer orbit of a hierarchical
/// triple is `two_body_elements(&inner.aggregate(), outer_body, G)`.
#[allow(non_snake_case)]
pub fn two_body_elements(p1: &impl PointMass, p2: &impl PointMass, G: f64) -> OrbitalElements {
    let r = p2.position() - p1.position();
    let v = p2.velocity() - p1.velocity();
    let gm = G * (p1.mass() + p2.mass());

    let specific_energy = 0.5 * v.norm_squared() - gm / r.norm();
    let h = r.cross(&v);

    OrbitalElements {
        semi_major_axis: -gm / (2.0 * specific_energy),
        eccentricity: (1.0 + 2.0 * specific_energy * h.norm_squared() / (gm * gm))
            .max(0.0)
            .sqrt(),
    }
}

fn is_finite_state(b: &Body) -> bool {
    b.q.iter().chain(b.v.iter()).all(|c| c.is_finite())
}

/// The full set of bodies being integrated.
#[allow(non_snake_case)]
#[derive(Debug, Clone)]
pub struct System {
    bodies: Vec<Body>,
    indices: Vec<usize>, // 0..n, lets the full system share `SystemView`
    pub(crate) t: f64,
    G: f64,
}

#[allow(non_snake_case)]
impl System {
    /// Wrap `bodies` at `t = 0`. Rejects an empty list, non-positive or
    /// non-finite masses, non-finite states and a bad `G`.
    pub fn new(bodies: Vec<Body>, G: f64) -> Result<Self> {
        if !(G.is_finite() && G > 0.0) {
            return Err(SimError::InvalidGravitationalConstant(G));
        }
        if bodies.is_empty() {
            return Err(SimError::EmptySystem);
        }
        for (index, b) in bodies.iter().enumerate() {
            if !(b.m.is_finite() && b.m > 0.0) {
                return Err(SimError::InvalidMass { index, mass: b.m });
            }
            if !is_finite_state(b) {
                return Err(SimError::NonFiniteState { index });
            }
        }

        let indices = (0..bodies.len()).collect();
        Ok(Self {
            bodies,
            indices,
            t: 0.0,
            G,
        })
    }

    /// Shift every body into the center-of-mass frame (COM at the origin and
    /// at rest). Consumes the system so it can only happen while building it.
    pub fn recentered(mut self) -> Self {
        let (com, com_v) = {
            let view = self.view();
            (view.com(), view.com_velocity())
        };
        for b in self.bodies.iter_mut() {
            b.q -= com;
            b.v -= com_v;
        }
        self
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    /// Mutable access to the bodies; the slice keeps the body count fixed.
    pub fn bodies_mut(&mut self) -> &mut [Body] {
        &mut self.bodies
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Fails with the first body whose position or velocity is no longer
    /// finite
    pub fn check_finite(&self) -> Result<()> {
        match self.bodies.iter().position(|b| !is_finite_state(b)) {
            Some(index) => Err(SimError::NonFiniteState { index }),
            None => Ok(()),
        }
    }

    /// Elapsed simulation time
    pub fn time(&self) -> f64 {
        self.t
    }

    pub fn G(&self) -> f64 {
        self.G
    }

    /// View over every body of the system
    pub fn view(&self) -> SystemView<'_> {
        SystemView {
            bodies: &self.bodies,
            members: &self.indices,
            G: self.G,
        }
    }
}

/// A named group of bodies inside a `System`, stored as indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subsystem {
    members: Vec<usize>,
}

impl Subsystem {
    /// Select `members` of `system`. The list must be non-empty, in range and
    /// free of duplicates; its order is kept (it matters for `plane_angle`).
    pub fn new(system: &System, members: Vec<usize>) -> Result<Self> {
        let sub = Self { members };
        sub.check(system)?;
        Ok(sub)
    }

    /// Every body of `system`, in order
    pub fn all(system: &System) -> Self {
        Self {
            members: system.indices.clone(),
        }
    }

    pub fn members(&self) -> &[usize] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Confirm the indices still fit `system`
    pub fn check(&self, system: &System) -> Result<()> {
        if self.members.is_empty() {
            return Err(SimError::InvalidSubsystem("no members".into()));
        }
        for (k, &i) in self.members.iter().enumerate() {
            if i >= system.len() {
                return Err(SimError::InvalidSubsystem(format!(
                    "index {i} out of range for {} bodies",
                    system.len()
                )));
            }
            if self.members[..k].contains(&i) {
                return Err(SimError::InvalidSubsystem(format!("index {i} listed twice")));
            }
        }
        Ok(())
    }

    /// View over the selected bodies of `system`.
    ///
    /// Panics if an index is out of range; `check` first when `system` is not
    /// the one this subsystem was built from.
    pub fn view<'a>(&'a self, system: &'a System) -> SystemView<'a> {
        SystemView {
            bodies: &system.bodies,
            members: &self.members,
            G: system.G,
        }
    }
}

/// Borrowed selection of bodies. All derived quantities live here so the full
/// system and any subsystem compute them the same way.
#[allow(non_snake_case)]
#[derive(Debug, Clone, Copy)]
pub struct SystemView<'a> {
    bodies: &'a [Body],
    members: &'a [usize],
    G: f64,
}

impl<'a> SystemView<'a> {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// `k`-th member of the selection
    pub fn body(&self, k: usize) -> &'a Body {
        &self.bodies[self.members[k]]
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Body> + 'a {
        let (bodies, members) = (self.bodies, self.members);
        members.iter().map(move |&i| &bodies[i])
    }

    pub fn total_mass(&self) -> f64 {
        self.iter().map(|b| b.m).sum()
    }

    /// Product of the masses over their sum (the two-body reduced mass)
    pub fn reduced_mass(&self) -> f64 {
        self.iter().map(|b| b.m).product::<f64>() / self.total_mass()
    }

    pub fn com(&self) -> NVec3 {
        self.iter().fold(NVec3::zeros(), |acc, b| acc + b.q * b.m) / self.total_mass()
    }

    pub fn com_velocity(&self) -> NVec3 {
        self.iter().fold(NVec3::zeros(), |acc, b| acc + b.momentum()) / self.total_mass()
    }

    /// Total linear momentum
    pub fn momentum(&self) -> NVec3 {
        self.iter().fold(NVec3::zeros(), |acc, b| acc + b.momentum())
    }

    /// The selection as one virtual body
    pub fn aggregate(&self) -> Aggregate {
        Aggregate {
            m: self.total_mass(),
            q: self.com(),
            v: self.com_velocity(),
        }
    }

    /// Kinetic energy in the COM frame
    pub fn kinetic_energy(&self) -> f64 {
        let com_v = self.com_velocity();
        self.iter()
            .map(|b| 0.5 * b.m * (b.v - com_v).norm_squared())
            .sum()
    }

    /// Pairwise Newtonian potential energy, each pair counted once
    pub fn potential_energy(&self) -> f64 {
        let mut w = 0.0;
        for (k, bi) in self.iter().enumerate() {
            for bj in self.iter().skip(k + 1) {
                w -= self.G * bi.m * bj.m / (bi.q - bj.q).norm();
            }
        }
        w
    }

    /// Total energy in the COM frame
    pub fn energy(&self) -> f64 {
        self.kinetic_energy() + self.potential_energy()
    }

    /// Total angular momentum about the COM, in the COM frame
    pub fn angular_momentum(&self) -> NVec3 {
        let com = self.com();
        let com_v = self.com_velocity();
        self.iter().fold(NVec3::zeros(), |acc, b| {
            acc + (b.q - com).cross(&((b.v - com_v) * b.m))
        })
    }

    /// Eccentricity of a two-member selection, `None` otherwise
    pub fn eccentricity(&self) -> Option<f64> {
        if self.len() != 2 {
            return None;
        }
        let m = self.total_mass();
        let mu = self.reduced_mass();
        let l2 = self.angular_momentum().norm_squared();
        let radicand = 1.0 + 2.0 * self.energy() * l2 / (self.G * self.G * m * m * mu.powi(3));
        Some(radicand.max(0.0).sqrt())
    }

    /// Semi-major axis of the relative orbit of a two-member selection,
    /// `None` otherwise
    pub fn semi_major_axis(&self) -> Option<f64> {
        if self.len() != 2 {
            return None;
        }
        let (m1, m2) = (self.body(0).m, self.body(1).m);
        Some(-self.G * m1 * m2 / (2.0 * self.energy()))
    }

    /// Semi-major axis of the second member's orbit about the pair's COM,
    /// `-G mu m1 / (2E)`. Equals `semi_major_axis() * m1 / (m1 + m2)`.
    pub fn com_semi_major_axis(&self) -> Option<f64> {
        if self.len() != 2 {
            return None;
        }
        Some(-self.G * self.reduced_mass() * self.body(0).m / (2.0 * self.energy()))
    }

    /// Positions of the members relative to their center of mass
    pub fn com_positions(&self) -> Vec<NVec3> {
        let com = self.com();
        self.iter().map(|b| b.q - com).collect()
    }

    /// Angle in degrees between the z axis and the orbital-plane normal of the
    /// third member about the COM. Only defined for three members, and not
    /// when that member moves radially (zero normal).
    pub fn plane_angle(&self) -> Option<f64> {
        if self.len() != 3 {
            return None;
        }
        let outer = self.body(2);
        let normal = (outer.q - self.com()).cross(&(outer.v - self.com_velocity()));
        let norm = normal.norm();
        if !(norm > 0.0 && norm.is_finite()) {
            return None;
        }
        let cos = NVec3::z().dot(&normal) / norm;
        Some(cos.clamp(-1.0, 1.0).acos().to_degrees())
    }
}
