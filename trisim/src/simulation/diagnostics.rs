//! Diagnostic time series recorded while integrating.
//!
//! Each [`Snapshot`] freezes the conserved and orbital quantities at one step:
//! energy, angular momentum and plane angle of the full system, and
//! semi-major axis and eccentricity of the reference subsystem. Body
//! positions in the COM frame are kept too when the trajectory is wanted.
//! Snapshots are plain values, later mutation of the bodies does not touch
//! them.

use serde::Serialize;

use super::states::{NVec3, Subsystem, System};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub step: usize,
    pub time: f64,
    pub energy: f64,
    pub angular_momentum: NVec3,
    /// Relative orbit. `None` unless the reference subsystem has two members
    pub semi_major_axis: Option<f64>,
    /// Second member about the pair's COM. `None` unless the reference
    /// subsystem has two members
    pub com_semi_major_axis: Option<f64>,
    /// `None` unless the reference subsystem has two members
    pub eccentricity: Option<f64>,
    /// `None` unless the full system has three members
    pub plane_angle: Option<f64>,
    /// Every body's position relative to the system COM, in body order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub positions: Option<Vec<NVec3>>,
}

impl Snapshot {
    /// Measure `system` and `reference` as they are now. Fails if
    /// `reference` does not fit `system`.
    pub fn capture(
        step: usize,
        system: &System,
        reference: &Subsystem,
        with_positions: bool,
    ) -> Result<Self> {
        reference.check(system)?;
        let full = system.view();
        let sub = reference.view(system);
        Ok(Self {
            step,
            time: system.time(),
            energy: full.energy(),
            angular_momentum: full.angular_momentum(),
            semi_major_axis: sub.semi_major_axis(),
            com_semi_major_axis: sub.com_semi_major_axis(),
            eccentricity: sub.eccentricity(),
            plane_angle: full.plane_angle(),
            positions: with_positions.then(|| full.com_positions()),
        })
    }
}

/// Ordered snapshots of one run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Diagnostics {
    snapshots: Vec<Snapshot>,
    #[serde(skip)]
    record_positions: bool,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also keep COM-frame body positions in every snapshot
    pub fn with_positions(mut self, record_positions: bool) -> Self {
        self.record_positions = record_positions;
        self
    }

    /// Append a snapshot of the current state and return it
    pub fn record(
        &mut self,
        step: usize,
        system: &System,
        reference: &Subsystem,
    ) -> Result<&Snapshot> {
        let snap = Snapshot::capture(step, system, reference, self.record_positions)?;
        self.snapshots.push(snap);
        Ok(&self.snapshots[self.snapshots.len() - 1])
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn first(&self) -> Option<&Snapshot> {
        self.snapshots.first()
    }

    pub fn last(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }

    /// `|E - E0| / |E0|` for every snapshot, relative to the first one
    pub fn relative_energy_error(&self) -> Vec<f64> {
        let Some(e0) = self.first().map(|s| s.energy) else {
            return Vec::new();
        };
        self.snapshots
            .iter()
            .map(|s| {
                if e0.abs() > 0.0 {
                    (s.energy - e0).abs() / e0.abs()
                } else {
                    (s.energy - e0).abs()
                }
            })
            .collect()
    }

    pub fn max_relative_energy_error(&self) -> f64 {
        self.relative_energy_error().into_iter().fold(0.0, f64::max)
    }

    /// Largest `|L - L0|` over the run
    pub fn angular_momentum_drift(&self) -> f64 {
        let Some(l0) = self.first().map(|s| s.angular_momentum) else {
            return 0.0;
        };
        self.snapshots
            .iter()
            .map(|s| (s.angular_momentum - l0).norm())
            .fold(0.0, f64::max)
    }

    /// Column form for plotting
    pub fn series(&self) -> Series {
        let s = &self.snapshots;
        Series {
            time: s.iter().map(|x| x.time).collect(),
            energy: s.iter().map(|x| x.energy).collect(),
            angular_momentum: s.iter().map(|x| x.angular_momentum).collect(),
            semi_major_axis: s.iter().map(|x| x.semi_major_axis).collect(),
            com_semi_major_axis: s.iter().map(|x| x.com_semi_major_axis).collect(),
            eccentricity: s.iter().map(|x| x.eccentricity).collect(),
            plane_angle: s.iter().map(|x| x.plane_angle).collect(),
            // only when every snapshot carries them
            positions: s.iter().map(|x| x.positions.clone()).collect(),
        }
    }
}

/// The diagnostic sequences plus their time axis, equal length and ordered
/// by increasing time
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Series {
    pub time: Vec<f64>,
    pub energy: Vec<f64>,
    pub angular_momentum: Vec<NVec3>,
    pub semi_major_axis: Vec<Option<f64>>,
    pub com_semi_major_axis: Vec<Option<f64>>,
    pub eccentricity: Vec<Option<f64>>,
    pub plane_angle: Vec<Option<f64>>,
    /// Trajectory: per snapshot, every body's COM-frame position
    #[serde(skip_serializing_if = "Option::is_none")]
    pub positions: Option<Vec<Vec<NVec3>>>,
}

impl Series {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}
