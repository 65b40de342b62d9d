//! Zone boss
//!
//! Bosses run their own state machine on top of the actor lifecycle:
//! health thresholds select the phase (attack rate, weak spot), and each
//! phase alternates between a Guarded window where shots glance off and an
//! Exposed window where the weak spot takes damage. Crossing a threshold
//! slams the guard back up.

use glam::Vec2;

use super::actors::{Actor, ActorKind};
use super::hitbox::Hitbox;

pub const BOSS_SIZE: Vec2 = Vec2::new(200.0, 200.0);
pub const BOSS_HEALTH: f32 = 600.0;
pub const BOSS_ATTACK_DAMAGE: f32 = 2.0;

/// Tuning for one health band
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BossPhase {
    /// Phase applies once health fraction drops to or below this
    pub threshold: f32,
    pub attack_interval: f32,
    /// Weak spot offset from the boss's top-left corner
    pub weak_offset: Vec2,
    pub weak_size: Vec2,
    pub guard_time: f32,
    pub exposed_time: f32,
}

pub const BOSS_PHASES: [BossPhase; 3] = [
    BossPhase {
        threshold: 1.0,
        attack_interval: 2.5,
        weak_offset: Vec2::new(60.0, 40.0),
        weak_size: Vec2::new(40.0, 40.0),
        guard_time: 1.5,
        exposed_time: 2.5,
    },
    BossPhase {
        threshold: 0.6,
        attack_interval: 2.0,
        weak_offset: Vec2::new(80.0, 20.0),
        weak_size: Vec2::new(60.0, 60.0),
        guard_time: 1.2,
        exposed_time: 2.0,
    },
    BossPhase {
        threshold: 0.3,
        attack_interval: 1.6,
        weak_offset: Vec2::new(40.0, 80.0),
        weak_size: Vec2::new(80.0, 40.0),
        guard_time: 0.8,
        exposed_time: 1.6,
    },
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BossWindow {
    Guarded { remaining: f32 },
    Exposed { remaining: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Boss {
    pub phase_index: usize,
    pub window: BossWindow,
    pub attack_timer: f32,
}

impl Default for Boss {
    fn default() -> Self {
        let phase = BOSS_PHASES[0];
        Self {
            phase_index: 0,
            window: BossWindow::Guarded {
                remaining: phase.guard_time,
            },
            attack_timer: phase.attack_interval,
        }
    }
}

impl Boss {
    pub fn phase(&self) -> &BossPhase {
        &BOSS_PHASES[self.phase_index]
    }

    pub fn is_exposed(&self) -> bool {
        matches!(self.window, BossWindow::Exposed { .. })
    }

    /// Advance windows and attack timer; returns damage dealt to the player
    pub fn update(&mut self, dt: f32) -> Option<f32> {
        let phase = *self.phase();
        self.window = match self.window {
            BossWindow::Guarded { remaining } if remaining - dt <= 0.0 => BossWindow::Exposed {
                remaining: phase.exposed_time,
            },
            BossWindow::Guarded { remaining } => BossWindow::Guarded {
                remaining: remaining - dt,
            },
            BossWindow::Exposed { remaining } if remaining - dt <= 0.0 => BossWindow::Guarded {
                remaining: phase.guard_time,
            },
            BossWindow::Exposed { remaining } => BossWindow::Exposed {
                remaining: remaining - dt,
            },
        };

        self.attack_timer -= dt;
        if self.attack_timer <= 0.0 {
            self.attack_timer = phase.attack_interval;
            return Some(BOSS_ATTACK_DAMAGE);
        }
        None
    }

    /// Re-evaluate the phase after health changed; returns the new phase index
    /// when it changed
    pub fn on_health_changed(&mut self, health: f32, max_health: f32) -> Option<usize> {
        let fraction = if max_health > 0.0 { health / max_health } else { 0.0 };
        let next = BOSS_PHASES
            .iter()
            .rposition(|p| fraction <= p.threshold)
            .unwrap_or(0);
        if next <= self.phase_index {
            return None;
        }
        self.phase_index = next;
        let phase = BOSS_PHASES[next];
        self.window = BossWindow::Guarded {
            remaining: phase.guard_time,
        };
        self.attack_timer = (phase.attack_interval * 0.9).max(1.0);
        Some(next)
    }

    /// Weak spot in world space for a boss occupying `bounds`
    pub fn weak_spot(&self, bounds: &Hitbox) -> Hitbox {
        let phase = self.phase();
        bounds.sub_rect(phase.weak_offset, phase.weak_size)
    }
}

/// Boss actor standing at `pos`
pub fn boss_actor(pos: Vec2, max_health: f32) -> Actor {
    Actor::new(ActorKind::Boss(Boss::default()), pos, BOSS_SIZE, max_health)
}
