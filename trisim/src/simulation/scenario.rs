//! Build fully-initialized simulation scenarios
//!
//! Turns orbital elements into body positions and velocities, and a
//! `ScenarioConfig` (YAML-facing) into a runtime bundle (`Scenario`)
//! containing:
//! - the engine (`Engine`: integrator and run options)
//! - duration and the step sizes to run
//! - the system state (`System` in the COM frame at t = 0)
//! - the reference subsystem (`Subsystem`, the inner binary by default)

use std::f64::consts::PI;

use crate::configuration::config::{BodyConfig, ScenarioConfig};
use crate::error::{Result, SimError};
use crate::simulation::engine::{Engine, RunOptions};
use crate::simulation::params::Parameters;
use crate::simulation::states::{Body, NVec3, Subsystem, System};
use crate::simulation::units::UnitSystem;

/// Period of a two-body orbit with semi-major axis `a` and total mass `m`
#[allow(non_snake_case)]
pub fn orbital_period(a: f64, m: f64, G: f64) -> f64 {
    2.0 * PI * (a.powi(3) / (G * m)).sqrt()
}

fn check_orbit(sma: f64, ecc: f64) -> Result<()> {
    if !(sma.is_finite() && sma > 0.0) {
        return Err(SimError::InvalidScenario(format!(
            "semi-major axis must be positive, got {sma}"
        )));
    }
    if !(0.0..1.0).contains(&ecc) {
        return Err(SimError::InvalidScenario(format!(
            "eccentricity must lie in [0, 1), got {ecc}"
        )));
    }
    Ok(())
}

fn check_masses(masses: &[f64]) -> Result<()> {
    for (index, &mass) in masses.iter().enumerate() {
        if !(mass.is_finite() && mass > 0.0) {
            return Err(SimError::InvalidMass { index, mass });
        }
    }
    Ok(())
}

/// Relative position and velocity of a bound orbit at apocentre: separation
/// `a (1 + e)` along `dir`, speed from vis-viva along `along`
#[allow(non_snake_case)]
fn apocentre(sma: f64, ecc: f64, m: f64, G: f64, dir: NVec3, along: NVec3) -> (NVec3, NVec3) {
    let r = sma * (1.0 + ecc);
    let speed = (G * m * (2.0 / r - 1.0 / sma)).sqrt();
    (r * dir, speed * along)
}

/// Isolated binary, both bodies in the xy plane
#[derive(Debug, Clone, Copy)]
pub struct BinaryElements {
    pub masses: [f64; 2],
    pub sma: f64, // relative orbit semi-major axis
    pub ecc: f64,
}

#[allow(non_snake_case)]
impl BinaryElements {
    /// Bodies at apocentre on the y axis, orbiting counter-clockwise about
    /// +z, COM at rest at the origin
    pub fn bodies(&self, G: f64) -> Result<Vec<Body>> {
        check_masses(&self.masses)?;
        check_orbit(self.sma, self.ecc)?;

        let [m0, m1] = self.masses;
        let m = m0 + m1;
        let (r, v) = apocentre(self.sma, self.ecc, m, G, NVec3::y(), -NVec3::x());

        Ok(vec![
            Body::new(m0, -(m1 / m) * r, -(m1 / m) * v),
            Body::new(m1, (m0 / m) * r, (m0 / m) * v),
        ])
    }

    pub fn period(&self, G: f64) -> f64 {
        orbital_period(self.sma, self.masses[0] + self.masses[1], G)
    }
}

/// Hierarchical triple: inner binary (bodies 0, 1) in the xy plane, outer
/// body 2 orbiting the inner pair on a plane inclined by `inclination`
/// degrees about the y axis
#[derive(Debug, Clone, Copy)]
pub struct TripleElements {
    pub masses: [f64; 3],
    pub sma: [f64; 2], // inner, outer
    pub ecc: [f64; 2], // inner, outer
    pub inclination: f64,
}

#[allow(non_snake_case)]
impl TripleElements {
    pub fn bodies(&self, G: f64) -> Result<Vec<Body>> {
        check_masses(&self.masses)?;
        check_orbit(self.sma[1], self.ecc[1])?;

        let inner = BinaryElements {
            masses: [self.masses[0], self.masses[1]],
            sma: self.sma[0],
            ecc: self.ecc[0],
        }
        .bodies(G)?;

        let m_in = self.masses[0] + self.masses[1];
        let m3 = self.masses[2];
        let m = m_in + m3;

        let psi = self.inclination.to_radians();
        let dir = NVec3::new(psi.cos(), 0.0, psi.sin());
        let (r, v) = apocentre(self.sma[1], self.ecc[1], m, G, dir, NVec3::y());

        // inner pair and outer body share the relative orbit by mass ratio
        let (q_in, v_in) = (-(m3 / m) * r, -(m3 / m) * v);

        let mut bodies: Vec<Body> = inner
            .into_iter()
            .map(|b| Body::new(b.m(), b.q + q_in, b.v + v_in))
            .collect();
        bodies.push(Body::new(m3, (m_in / m) * r, (m_in / m) * v));
        Ok(bodies)
    }
}

fn vec3(values: &[f64], what: &str, index: usize) -> Result<NVec3> {
    match values {
        [x, y, z] => Ok(NVec3::new(*x, *y, *z)),
        _ => Err(SimError::InvalidScenario(format!(
            "body {index}: {what} needs 3 components, got {}",
            values.len()
        ))),
    }
}

fn bodies_from_config(cfg: &[BodyConfig]) -> Result<Vec<Body>> {
    cfg.iter()
        .enumerate()
        .map(|(i, bc)| {
            let q = vec3(&bc.x, "position", i)?;
            let v = vec3(&bc.v, "velocity", i)?;
            Ok(Body::new(bc.m, q, v))
        })
        .collect()
}

/// Runtime bundle built from a [`ScenarioConfig`]
#[derive(Debug, Clone)]
pub struct Scenario {
    pub engine: Engine,
    pub units: UnitSystem,
    pub duration: f64,
    pub steps: Vec<f64>,
    pub system: System,
    pub reference: Subsystem,
}

#[allow(non_snake_case)]
impl Scenario {
    pub fn build_scenario(cfg: ScenarioConfig) -> Result<Self> {
        let units = cfg.parameters.units;
        let G = cfg.parameters.G.unwrap_or_else(|| units.gravitational_constant());

        // Bodies: exactly one initial-state source
        let init = &cfg.initial;
        let bodies = match (&init.triple, &init.binary, &init.bodies) {
            (Some(t), None, None) => TripleElements {
                masses: t.masses,
                sma: t.sma,
                ecc: t.ecc,
                inclination: t.inclination,
            }
            .bodies(G)?,
            (None, Some(b), None) => BinaryElements {
                masses: b.masses,
                sma: b.sma,
                ecc: b.ecc,
            }
            .bodies(G)?,
            (None, None, Some(list)) => bodies_from_config(list)?,
            _ => {
                return Err(SimError::InvalidScenario(
                    "`initial` needs exactly one of `triple`, `binary`, `bodies`".into(),
                ))
            }
        };

        let system = System::new(bodies, G)?.recentered();

        let members = cfg
            .reference
            .unwrap_or_else(|| (0..system.len().min(2)).collect());
        let reference = Subsystem::new(&system, members)?;

        if cfg.parameters.steps.is_empty() {
            return Err(SimError::InvalidScenario("no step sizes given".into()));
        }
        // reject bad step sizes before any run starts
        for &h in &cfg.parameters.steps {
            Parameters::new(cfg.parameters.duration, h).validate()?;
        }

        let e_cfg = cfg.engine;
        let engine = Engine::new(e_cfg.integrator).with_options(RunOptions {
            record_every: e_cfg.record_every,
            recover_params: e_cfg.recover_params,
            record_positions: e_cfg.record_positions,
            plot: e_cfg.plot,
        });
        if engine.options.record_every == 0 {
            return Err(SimError::InvalidCadence);
        }

        Ok(Self {
            engine,
            units,
            duration: cfg.parameters.duration,
            steps: cfg.parameters.steps,
            system,
            reference,
        })
    }
}
