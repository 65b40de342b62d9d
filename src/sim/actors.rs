//! Actor types
//!
//! Every non-player thing on the rail is an [`Actor`]: a positioned box with
//! health and one behaviour variant. Capabilities (damageable, shootable,
//! per-frame update) are answered per variant rather than through traits.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::boss::Boss;
use super::enemies::Enemy;
use super::hitbox::Hitbox;

/// Stable actor identity, unique for the lifetime of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorId(pub u32);

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Why an actor left the rail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DespawnReason {
    Killed,
    OffRail,
    Rescued,
    Collected,
    Expired,
}

pub const HOSTAGE_SIZE: Vec2 = Vec2::new(60.0, 100.0);
pub const ROPE_SIZE: Vec2 = Vec2::new(10.0, 40.0);
pub const POWERUP_SIZE: Vec2 = Vec2::new(40.0, 40.0);
pub const BARREL_SIZE: Vec2 = Vec2::new(50.0, 70.0);
pub const CRATE_SIZE: Vec2 = Vec2::new(60.0, 60.0);

/// Timed pickup kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerupKind {
    Rapid,
    Spread,
    Armor,
    Slow,
    Health,
}

impl PowerupKind {
    pub const ALL: [PowerupKind; 5] = [
        PowerupKind::Rapid,
        PowerupKind::Spread,
        PowerupKind::Armor,
        PowerupKind::Slow,
        PowerupKind::Health,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PowerupKind::Rapid => "rapid",
            PowerupKind::Spread => "spread",
            PowerupKind::Armor => "armor",
            PowerupKind::Slow => "slow",
            PowerupKind::Health => "health",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hostage;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Powerup {
    pub kind: PowerupKind,
    /// Budget left, counted from spawn; the effect ends when it runs out
    pub remaining: f32,
}

/// Interactive scenery
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Prop {
    /// Explodes when destroyed, hurting nearby enemies
    Barrel,
    /// Breaks open on any hit
    Crate { coins: u32 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActorKind {
    Enemy(Enemy),
    Boss(Boss),
    Hostage(Hostage),
    Powerup(Powerup),
    Prop(Prop),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    pub id: ActorId,
    /// Bottom-center anchor in world space
    pub pos: Vec2,
    pub size: Vec2,
    pub health: f32,
    pub max_health: f32,
    pub kind: ActorKind,
    /// Set once the actor is done; swept at the end of the tick
    pub despawn: Option<DespawnReason>,
}

impl Actor {
    /// New actor; the registry assigns the real id on spawn
    pub fn new(kind: ActorKind, pos: Vec2, size: Vec2, health: f32) -> Self {
        Self {
            id: ActorId(0),
            pos,
            size,
            health,
            max_health: health,
            kind,
            despawn: None,
        }
    }

    pub fn hostage(pos: Vec2) -> Self {
        Self::new(
            ActorKind::Hostage(Hostage),
            pos,
            HOSTAGE_SIZE,
            1.0,
        )
    }

    pub fn powerup(kind: PowerupKind, pos: Vec2, duration: f32) -> Self {
        Self::new(
            ActorKind::Powerup(Powerup {
                kind,
                remaining: duration,
            }),
            pos,
            POWERUP_SIZE,
            1.0,
        )
    }

    pub fn barrel(pos: Vec2) -> Self {
        Self::new(ActorKind::Prop(Prop::Barrel), pos, BARREL_SIZE, 30.0)
    }

    pub fn crate_box(pos: Vec2, coins: u32) -> Self {
        Self::new(ActorKind::Prop(Prop::Crate { coins }), pos, CRATE_SIZE, 1.0)
    }

    pub fn bounds(&self) -> Hitbox {
        Hitbox::from_midbottom(self.pos, self.size)
    }

    /// Head region (enemies only): top third, middle half
    pub fn head(&self) -> Option<Hitbox> {
        match self.kind {
            ActorKind::Enemy(_) => {
                let bounds = self.bounds();
                let size = Vec2::new(bounds.width() / 2.0, bounds.height() / 3.0);
                Some(bounds.sub_rect(Vec2::new(bounds.width() / 4.0, 0.0), size))
            }
            _ => None,
        }
    }

    /// Rope region (hostages only): shooting it frees the hostage
    pub fn rope(&self) -> Option<Hitbox> {
        match self.kind {
            ActorKind::Hostage(_) => {
                let bounds = self.bounds();
                let offset = Vec2::new((bounds.width() - ROPE_SIZE.x) / 2.0, 0.0);
                Some(bounds.sub_rect(offset, ROPE_SIZE))
            }
            _ => None,
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.despawn.is_none()
    }

    /// Whether shots can land on this actor at all
    pub fn collides_with_shots(&self) -> bool {
        self.is_alive()
    }

    /// Whether this actor has a health pool that shots wear down
    pub fn is_damageable(&self) -> bool {
        matches!(
            self.kind,
            ActorKind::Enemy(_) | ActorKind::Boss(_) | ActorKind::Prop(Prop::Barrel)
        )
    }

    /// Whether this actor runs per-frame behaviour
    pub fn updates_per_frame(&self) -> bool {
        matches!(
            self.kind,
            ActorKind::Enemy(_) | ActorKind::Boss(_) | ActorKind::Powerup(_)
        )
    }

    pub fn is_enemy(&self) -> bool {
        matches!(self.kind, ActorKind::Enemy(_))
    }

    pub fn is_boss(&self) -> bool {
        matches!(self.kind, ActorKind::Boss(_))
    }

    /// Mark for removal; the first reason sticks
    pub fn mark(&mut self, reason: DespawnReason) {
        if self.despawn.is_none() {
            self.despawn = Some(reason);
        }
    }

    /// Short name for logs and event records
    pub fn label(&self) -> &'static str {
        match &self.kind {
            ActorKind::Enemy(enemy) => enemy.kind.as_str(),
            ActorKind::Boss(_) => "boss",
            ActorKind::Hostage(_) => "hostage",
            ActorKind::Powerup(powerup) => powerup.kind.as_str(),
            ActorKind::Prop(Prop::Barrel) => "barrel",
            ActorKind::Prop(Prop::Crate { .. }) => "crate",
        }
    }
}
