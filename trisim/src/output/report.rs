//! Run report handed to the external plotter.
//!
//! Holds the parameter bundle (integrator, units, duration, reference
//! subsystem, plot options) plus one record per step size. Failed runs are
//! marked as such and carry no series, so a truncated run is never mistaken
//! for a complete one.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::simulation::diagnostics::Series;
use crate::simulation::engine::PlotOptions;
use crate::simulation::integrator::IntegratorKind;
use crate::simulation::scenario::Scenario;
use crate::simulation::sweep::SweepRun;
use crate::simulation::units::UnitSystem;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    Failed,
}

#[derive(Serialize, Debug, Clone)]
pub struct RunRecord {
    pub h: f64,
    pub status: RunStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub steps_taken: Option<usize>,
    pub final_time: Option<f64>,
    pub max_relative_energy_error: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series: Option<Series>,
}

impl RunRecord {
    pub fn from_run(run: &SweepRun) -> Self {
        match &run.outcome {
            Ok(outcome) => Self {
                h: run.h,
                status: RunStatus::Completed,
                error: None,
                steps_taken: Some(outcome.steps_taken),
                final_time: Some(outcome.final_time),
                max_relative_energy_error: outcome
                    .diagnostics
                    .as_ref()
                    .map(|d| d.max_relative_energy_error()),
                series: outcome.diagnostics.as_ref().map(|d| d.series()),
            },
            Err(err) => Self {
                h: run.h,
                status: RunStatus::Failed,
                error: Some(err.to_string()),
                steps_taken: None,
                final_time: None,
                max_relative_energy_error: None,
                series: None,
            },
        }
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct RunReport {
    pub integrator: IntegratorKind,
    pub units: UnitSystem,
    pub duration: f64,
    pub reference: Vec<usize>,
    pub plot: PlotOptions,
    pub runs: Vec<RunRecord>,
}

impl RunReport {
    pub fn new(scenario: &Scenario, runs: &[SweepRun]) -> Self {
        Self {
            integrator: scenario.engine.integrator,
            units: scenario.units,
            duration: scenario.duration,
            reference: scenario.reference.members().to_vec(),
            plot: scenario.engine.options.plot.clone(),
            runs: runs.iter().map(RunRecord::from_run).collect(),
        }
    }

    pub fn completed(&self) -> usize {
        self.runs.iter().filter(|r| r.status == RunStatus::Completed).count()
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("failed to serialize run report")
    }

    pub fn write_yaml(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        serde_yaml::to_writer(BufWriter::new(file), self)
            .with_context(|| format!("failed to write report to {}", path.display()))
    }
}
