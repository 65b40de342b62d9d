//! Deterministic simulation module
//!
//! All stage playback lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by actor ID)
//! - No rendering, audio or platform dependencies

pub mod actors;
pub mod boss;
pub mod camera;
pub mod clock;
pub mod combat;
pub mod director;
pub mod enemies;
pub mod hitbox;
pub mod player;
pub mod registry;
pub mod state;
pub mod tick;
pub mod weapons;

pub use actors::{Actor, ActorId, ActorKind, DespawnReason, PowerupKind, Prop};
pub use camera::{CameraPan, RailCamera};
pub use clock::FrameClock;
pub use combat::{Intent, apply_intent};
pub use director::SpawnDirector;
pub use enemies::{EnemyKind, EnemyRegistry};
pub use hitbox::Hitbox;
pub use player::Player;
pub use registry::ActorRegistry;
pub use state::{RunSetup, StageEvent, StagePhase, StageRun, StageStats};
pub use tick::{TickInput, autopilot, run_frame, tick};
pub use weapons::{Loadout, WeaponKind};
