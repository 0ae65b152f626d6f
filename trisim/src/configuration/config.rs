//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! scenario. A scenario consists of:
//!
//! - [`EngineConfig`]     – integrator choice, diagnostic cadence, plot options
//! - [`ParametersConfig`] – unit system, duration and the step size(s)
//! - [`InitialConfig`]    – initial state, from orbital elements or explicit bodies
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//! A hierarchical triple integrated with Hermite at two step sizes:
//!
//! ```yaml
//! engine:
//!   integrator: "hermite"     # or "leapfrog"
//!   record_every: 10          # snapshot cadence in steps
//!   recover_params: true      # false -> no diagnostic series
//!   record_positions: true    # false -> no trajectory in the series
//!   plot:
//!     display: false
//!     snapshot_name: "3bodies_hermite"
//!     animate: false
//!
//! parameters:
//!   units: "astronomical"     # or "si"
//!   duration: 500.0           # in the unit system's time unit
//!   steps: [0.01, 0.005]      # one run per step size
//!
//! initial:
//!   triple:
//!     masses: [1.0, 1.0, 0.1]
//!     sma: [2.0, 7.0]         # inner, outer
//!     ecc: [0.0, 0.1]
//!     inclination: 80.0       # degrees
//!
//! reference: [0, 1]           # optional, defaults to the first two bodies
//! ```
//!
//! `initial` takes exactly one of `triple`, `binary` or `bodies`:
//!
//! ```yaml
//! initial:
//!   bodies:
//!     - m: 1.0
//!       x: [ -0.5, 0.0, 0.0 ]
//!       v: [  0.0, -3.14, 0.0 ]
//!     - m: 1.0
//!       x: [  0.5, 0.0, 0.0 ]
//!       v: [  0.0, 3.14, 0.0 ]
//! ```

use serde::Deserialize;

use crate::simulation::engine::PlotOptions;
use crate::simulation::integrator::IntegratorKind;
use crate::simulation::units::UnitSystem;

fn default_record_every() -> usize {
    1
}

fn default_true() -> bool {
    true
}

/// Engine-level configuration
#[derive(Deserialize, Debug, Clone)]
pub struct EngineConfig {
    pub integrator: IntegratorKind, // time integrator advancing the system
    #[serde(default = "default_record_every")]
    pub record_every: usize, // snapshot cadence in steps
    #[serde(default = "default_true")]
    pub recover_params: bool, // compute the diagnostic series at all
    #[serde(default = "default_true")]
    pub record_positions: bool, // keep COM-frame body positions per snapshot
    #[serde(default)]
    pub plot: PlotOptions, // forwarded to the plotter
}

/// Units, duration and step sizes
#[allow(non_snake_case)]
#[derive(Deserialize, Debug, Clone)]
pub struct ParametersConfig {
    #[serde(default)]
    pub units: UnitSystem,
    pub duration: f64,   // total integration time
    pub steps: Vec<f64>, // one run per step size
    pub G: Option<f64>,  // overrides the unit system's constant
}

/// Hierarchical triple from orbital elements: an inner binary of bodies 0
/// and 1 plus an outer body 2
#[derive(Deserialize, Debug, Clone)]
pub struct TripleConfig {
    pub masses: [f64; 3],
    pub sma: [f64; 2],    // inner, outer semi-major axis
    pub ecc: [f64; 2],    // inner, outer eccentricity
    pub inclination: f64, // outer orbit inclination, degrees
}

/// Isolated binary from orbital elements
#[derive(Deserialize, Debug, Clone)]
pub struct BinaryConfig {
    pub masses: [f64; 2],
    pub sma: f64,
    pub ecc: f64,
}

/// Configuration for a single body's initial state
#[derive(Deserialize, Debug, Clone)]
pub struct BodyConfig {
    pub m: f64,      // mass
    pub x: Vec<f64>, // initial position
    pub v: Vec<f64>, // initial velocity
}

/// Initial state; exactly one field must be set
#[derive(Deserialize, Debug, Clone, Default)]
pub struct InitialConfig {
    pub triple: Option<TripleConfig>,
    pub binary: Option<BinaryConfig>,
    pub bodies: Option<Vec<BodyConfig>>,
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    pub engine: EngineConfig,          // integrator and recording settings
    pub parameters: ParametersConfig,  // units, duration, step sizes
    pub initial: InitialConfig,        // bodies at t = 0
    pub reference: Option<Vec<usize>>, // reference subsystem indices
}
