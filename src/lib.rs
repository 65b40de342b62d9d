//! Railshot - an on-rails tap-shooter engine core
//!
//! Core modules:
//! - `stage`: Stage data loading (timeline descriptors, zone catalog)
//! - `sim`: Deterministic simulation (timeline playback, actors, combat, stage flow)
//! - `progress`: Save/achievement context fed by stage completions
//! - `settings`: Engine tuning and difficulty

pub mod error;
pub mod progress;
pub mod settings;
pub mod sim;
pub mod stage;

pub use error::{EventError, IntentError, StageLoadError};
pub use progress::{Progress, StageCompletion};
pub use settings::{Difficulty, EngineConfig};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Real frame deltas are clamped to this before accumulating
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Logical viewport
    pub const VIEW_WIDTH: f32 = 1280.0;
    pub const VIEW_HEIGHT: f32 = 720.0;

    /// Rail ground line (actors stand on it)
    pub const GROUND_Y: f32 = 620.0;
    /// Player screen x (the player rides along with the camera)
    pub const PLAYER_SCREEN_X: f32 = 240.0;

    /// Defaults for timeline params that omit a position
    pub const DEFAULT_SPAWN_X: f32 = 900.0;
    pub const POWERUP_LIFT: f32 = 60.0;
    pub const DEFAULT_POWERUP_DURATION: f32 = 6.0;
    pub const DEFAULT_CRATE_COINS: u32 = 10;
    /// Camera pan without an explicit target moves this far
    pub const DEFAULT_PAN_STEP: f32 = 200.0;

    /// Boss spawns this far ahead of the camera
    pub const BOSS_SPAWN_OFFSET: f32 = 900.0;
}

/// Clamp `value` into `[min, max]`
#[inline]
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    value.max(min).min(max)
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Cubic ease-in/out on `t` in [0, 1]
#[inline]
pub fn ease_in_out_cubic(t: f32) -> f32 {
    let t = clamp(t, 0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let f = 2.0 * t - 2.0;
        0.5 * f * f * f + 1.0
    }
}
