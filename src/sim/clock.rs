//! Fixed-timestep frame clock
//!
//! Converts stuttery real frame deltas into a whole number of `SIM_DT`
//! steps. Large frames are clamped so a hitch cannot fast-forward the stage.

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};

#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    accumulator: f32,
    steps: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a real frame delta; returns how many fixed steps to run
    pub fn advance(&mut self, real_dt: f32) -> u32 {
        let dt = if real_dt.is_finite() {
            real_dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        self.steps += u64::from(substeps);
        substeps
    }

    /// Total fixed steps handed out so far
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Simulated seconds handed out so far
    pub fn sim_time(&self) -> f64 {
        self.steps as f64 * f64::from(SIM_DT)
    }
}
