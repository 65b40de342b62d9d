//! Run state and stage flow types
//!
//! Everything one playthrough mutates lives on [`StageRun`]. The stage
//! descriptor is shared read-only; restart rebuilds everything else from it.

use std::sync::Arc;

use glam::Vec2;
use log::info;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::actors::{Actor, ActorId, DespawnReason, PowerupKind};
use super::camera::RailCamera;
use super::director::SpawnDirector;
use super::enemies::EnemyRegistry;
use super::player::Player;
use super::registry::ActorRegistry;
use super::weapons::WeaponKind;
use crate::consts::{GROUND_Y, PLAYER_SCREEN_X};
use crate::error::Diagnostic;
use crate::progress::{CompletionSink, Outcome, StageCompletion, calculate_stars};
use crate::settings::EngineConfig;
use crate::stage::{EventAction, StageDescriptor};

/// Top-level stage phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StagePhase {
    /// Intro presentation; the timeline has not started
    Intro,
    /// Timeline running
    Playing,
    /// Boss on the rail
    BossEncounter,
    Victory,
    Defeat,
}

impl StagePhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, StagePhase::Victory | StagePhase::Defeat)
    }
}

/// Things collaborators may want to react to. Cleared at the start of every
/// tick; read-only for everyone but the simulation.
#[derive(Debug, Clone, PartialEq)]
pub enum StageEvent {
    PhaseChanged { from: StagePhase, to: StagePhase },
    Paused(bool),
    EventFired { index: usize, action: EventAction },
    ActorSpawned { id: ActorId, label: &'static str },
    ActorDespawned {
        id: ActorId,
        label: &'static str,
        reason: DespawnReason,
    },
    ShotFired { weapon: WeaponKind, hits: u32 },
    EnemyKilled { id: ActorId, label: &'static str },
    HostageRescued(ActorId),
    HostageLost(ActorId),
    BarrelExploded { id: ActorId, kills: u32 },
    CrateOpened { id: ActorId, coins: u32 },
    PowerupCollected(PowerupKind),
    PowerupExpired(PowerupKind),
    PlayerDamaged { amount: f32, health: f32 },
    BombThrown(Vec2),
    BombLanded { pos: Vec2, avoided: bool },
    CoverChanged(bool),
    ReloadStarted(WeaponKind),
    ReloadFinished(WeaponKind),
    WeaponSelected(WeaponKind),
    BossPhaseChanged(usize),
    CameraPan { target: f32, duration: f32 },
}

/// Per-run counters feeding stars and achievements
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageStats {
    pub shots_fired: u32,
    pub hits: u32,
    pub kills: u32,
    pub hostages_saved: u32,
    pub hostages_lost: u32,
    pub damage_taken: f32,
    pub best_combo: u32,
    /// Most enemies killed by a single barrel
    pub barrel_multi_kill: u32,
    pub powerups_collected: u32,
}

impl StageStats {
    pub fn accuracy(&self) -> f32 {
        if self.shots_fired == 0 {
            0.0
        } else {
            self.hits as f32 / self.shots_fired as f32
        }
    }
}

/// Bomb in flight
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bomb {
    pub pos: Vec2,
    /// Seconds until it lands
    pub fuse: f32,
}

pub const BOMB_FUSE: f32 = 1.2;
pub const BOMB_DAMAGE: f32 = 1.0;

/// Everything a run needs besides the stage itself
#[derive(Debug, Clone)]
pub struct RunSetup {
    pub config: EngineConfig,
    pub enemies: Arc<EnemyRegistry>,
    pub unlocked: Vec<WeaponKind>,
    pub seed: u64,
}

impl Default for RunSetup {
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
            enemies: Arc::new(EnemyRegistry::default()),
            unlocked: Vec::new(),
            seed: 0x5EED,
        }
    }
}

/// One playthrough of one stage
#[derive(Debug, Clone)]
pub struct StageRun {
    pub stage: Arc<StageDescriptor>,
    pub setup: RunSetup,
    pub registry: ActorRegistry,
    pub player: Player,
    pub director: SpawnDirector,
    pub camera: RailCamera,
    pub phase: StagePhase,
    pub paused: bool,
    /// Stage seconds since Playing began
    pub elapsed: f64,
    /// Seconds spent in Intro
    pub intro_elapsed: f32,
    pub score: i64,
    pub coins: u32,
    pub rescued: u32,
    pub stats: StageStats,
    pub bombs: Vec<Bomb>,
    pub boss: Option<ActorId>,
    pub rng: Pcg32,
    /// Outbox for the current tick
    pub events: Vec<StageEvent>,
    /// Timeline events that fired but could not be applied
    pub diagnostics: Vec<Diagnostic>,
    completion_reported: bool,
}

impl StageRun {
    pub fn new(stage: Arc<StageDescriptor>, setup: RunSetup) -> Self {
        info!("Starting stage {} (seed {:#x})", stage.id, setup.seed);
        Self {
            player: Player::new(&setup.config, &setup.unlocked),
            rng: Pcg32::seed_from_u64(setup.seed),
            stage,
            setup,
            registry: ActorRegistry::new(),
            director: SpawnDirector::new(),
            camera: RailCamera::new(0.0),
            phase: StagePhase::Intro,
            paused: false,
            elapsed: 0.0,
            intro_elapsed: 0.0,
            score: 0,
            coins: 0,
            rescued: 0,
            stats: StageStats::default(),
            bombs: Vec::new(),
            boss: None,
            events: Vec::new(),
            diagnostics: Vec::new(),
            completion_reported: false,
        }
    }

    /// Throw away all run state and start over from the descriptor
    pub fn restart(&mut self) {
        info!("Restarting stage {}", self.stage.id);
        *self = Self::new(Arc::clone(&self.stage), self.setup.clone());
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.setup.config
    }

    pub fn set_phase(&mut self, to: StagePhase) {
        let from = self.phase;
        if from == to {
            return;
        }
        info!("Stage {}: {:?} -> {:?}", self.stage.id, from, to);
        self.phase = to;
        self.events.push(StageEvent::PhaseChanged { from, to });
    }

    /// Intro presenter finished
    pub fn complete_intro(&mut self) {
        if self.phase == StagePhase::Intro {
            self.set_phase(StagePhase::Playing);
        }
    }

    /// Where enemies aim: the player rides with the camera
    pub fn player_world_pos(&self) -> Vec2 {
        Vec2::new(self.camera.x() + PLAYER_SCREEN_X, GROUND_Y)
    }

    /// Incoming damage multiplier for the configured difficulty
    pub fn difficulty_multiplier(&self) -> f32 {
        self.stage.difficulty.multiplier(self.setup.config.difficulty)
    }

    /// Whether a boss event is still ahead on the timeline
    pub fn boss_pending(&self) -> bool {
        self.director.boss_pending(&self.stage.timeline)
    }

    pub fn spawn(&mut self, actor: Actor) -> ActorId {
        let label = actor.label();
        let id = self.registry.spawn(actor);
        self.events.push(StageEvent::ActorSpawned { id, label });
        id
    }

    pub fn add_score(&mut self, delta: i64) {
        self.score += delta;
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.phase {
            StagePhase::Victory => Some(Outcome::Victory),
            StagePhase::Defeat => Some(Outcome::Defeat),
            _ => None,
        }
    }

    /// Result record once the run has ended
    pub fn completion(&self) -> Option<StageCompletion> {
        let outcome = self.outcome()?;
        let stars = match outcome {
            Outcome::Victory => calculate_stars(&self.stats, self.elapsed, self.stage.duration),
            Outcome::Defeat => 0,
        };
        Some(StageCompletion {
            stage_id: self.stage.id.clone(),
            outcome,
            score: self.score,
            coins: self.coins,
            rescues: self.rescued,
            stars,
            time: self.elapsed,
            stats: self.stats.clone(),
        })
    }

    /// Hand the result to `sink`, once per run
    pub fn report_completion(&mut self, sink: &mut impl CompletionSink) -> Option<StageCompletion> {
        if self.completion_reported {
            return None;
        }
        let completion = self.completion()?;
        sink.stage_completed(&completion);
        self.completion_reported = true;
        Some(completion)
    }
}
