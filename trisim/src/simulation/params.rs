//! Numerical parameters of one run and the step schedule they imply
//!
//! `Parameters` holds the total integration time `t_end` and the step size
//! `h0`.
//!
//! The schedule takes `ceil(t_end / h0)` steps and shortens the last one so
//! the elapsed time is exactly `t_end`.

use serde::Serialize;

use crate::error::{Result, SimError};

/// `t_end / h0` values this close (relative) to an integer count as that
/// integer, so 365 steps of `P / 365` do not grow a 366th sliver step
const STEP_COUNT_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Serialize)]
pub struct Parameters {
    pub t_end: f64, // duration to cover
    pub h0: f64,    // step size
}

impl Parameters {
    pub fn new(t_end: f64, h0: f64) -> Self {
        Self { t_end, h0 }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.h0.is_finite() && self.h0 > 0.0) {
            return Err(SimError::InvalidStep(self.h0));
        }
        if !(self.t_end.is_finite() && self.t_end > 0.0) {
            return Err(SimError::InvalidDuration(self.t_end));
        }
        Ok(())
    }

    /// Validate and build the step schedule
    pub fn schedule(&self) -> Result<StepSchedule> {
        self.validate()?;

        let ratio = self.t_end / self.h0;
        let nearest = ratio.round();
        let steps = if (ratio - nearest).abs() <= STEP_COUNT_TOLERANCE * ratio.max(1.0) {
            nearest
        } else {
            ratio.ceil()
        };

        Ok(StepSchedule {
            steps: (steps as usize).max(1),
            h: self.h0,
            duration: self.t_end,
        })
    }
}

/// Fixed step sizes with a truncated final step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepSchedule {
    steps: usize,
    h: f64,
    duration: f64,
}

impl StepSchedule {
    /// Number of steps, `ceil(duration / h)`
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Size of step `k` (0-based): `h`, except the last which covers what is
    /// left of `duration`
    pub fn step_size(&self, k: usize) -> f64 {
        if k + 1 == self.steps {
            self.duration - (self.steps - 1) as f64 * self.h
        } else {
            self.h
        }
    }

    /// Elapsed time after `k` steps. Computed from the step index rather than
    /// summed so rounding does not accumulate; the last step lands exactly on
    /// `duration`.
    pub fn elapsed_after(&self, k: usize) -> f64 {
        if k >= self.steps {
            self.duration
        } else {
            k as f64 * self.h
        }
    }
}
