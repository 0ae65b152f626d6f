pub mod error;
pub mod simulation;
pub mod configuration;
pub mod output;
pub mod benchmark;

pub use error::{Result, SimError};

pub use simulation::states::{
    two_body_elements, Aggregate, Body, NVec3, OrbitalElements, PointMass, Subsystem, System,
    SystemView,
};
pub use simulation::forces::{
    gravitational_acceleration, gravitational_jerk, NewtonianGravity, Phase,
};
pub use simulation::integrator::{hermite_step, leapfrog_step, IntegratorKind};
pub use simulation::diagnostics::{Diagnostics, Series, Snapshot};
pub use simulation::params::{Parameters, StepSchedule};
pub use simulation::engine::{
    hermite, integrate, leapfrog, Engine, PlotOptions, RunOptions, RunOutcome,
};
pub use simulation::sweep::{sweep, SweepRun};
pub use simulation::scenario::{orbital_period, BinaryElements, Scenario, TripleElements};
pub use simulation::units::UnitSystem;

pub use configuration::config::{
    BinaryConfig, BodyConfig, EngineConfig, InitialConfig, ParametersConfig, ScenarioConfig,
    TripleConfig,
};

pub use output::report::{RunRecord, RunReport, RunStatus};

pub use benchmark::benchmark::{bench_convergence, bench_integrators, circular_return_error};
