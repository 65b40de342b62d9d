//! Enemy variants and the type-string registry used by `spawn` events
//!
//! Stage data names enemies by string (`"grunt"`, `"sniper"`, ...). The
//! registry maps those names to constructor functions so the loader can
//! reject unknown types before a stage starts.

use std::collections::HashMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::actors::{Actor, ActorKind};

/// Default enemy body size
pub const ENEMY_SIZE: Vec2 = Vec2::new(64.0, 64.0);
/// Melee enemies stop this close to the player
const MELEE_REACH: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    Grunt,
    Shield,
    Sniper,
    Bomber,
    Turret,
    Melee,
}

impl EnemyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnemyKind::Grunt => "grunt",
            EnemyKind::Shield => "shield",
            EnemyKind::Sniper => "sniper",
            EnemyKind::Bomber => "bomber",
            EnemyKind::Turret => "turret",
            EnemyKind::Melee => "melee",
        }
    }
}

/// Something an enemy did this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnemyAttack {
    /// Direct damage to the player
    Strike(f32),
    /// Lob a bomb that lands after a fuse
    Bomb(Vec2),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    pub kind: EnemyKind,
    /// Seconds until the next basic attack
    pub attack_timer: f32,
    pub attack_interval: f32,
    pub attack_damage: f32,
    /// Frontal shield hit points (shield enemies)
    pub shield: f32,
    /// Sniper charge or bomber throw countdown
    pub special_timer: Option<f32>,
    /// Walk speed toward the player (melee)
    pub speed: f32,
}

impl Enemy {
    fn base(kind: EnemyKind) -> Self {
        Self {
            kind,
            attack_timer: 2.0,
            attack_interval: 2.5,
            attack_damage: 1.0,
            shield: 0.0,
            special_timer: None,
            speed: 0.0,
        }
    }

    /// Advance timers; attacks are pushed onto `out`
    pub fn update(&mut self, pos: &mut Vec2, dt: f32, player_pos: Vec2, out: &mut Vec<EnemyAttack>) {
        if self.speed > 0.0 {
            let to_player = player_pos - *pos;
            if to_player.length() > MELEE_REACH {
                *pos += to_player.normalize() * self.speed * dt;
            }
        }

        self.attack_timer -= dt;
        if self.attack_timer <= 0.0 {
            out.push(EnemyAttack::Strike(self.attack_damage));
            self.attack_timer = self.attack_interval;
        }

        if let Some(timer) = self.special_timer.as_mut() {
            *timer -= dt;
            if *timer <= 0.0 {
                match self.kind {
                    EnemyKind::Sniper => {
                        out.push(EnemyAttack::Strike(2.0));
                        *timer = 3.5;
                    }
                    EnemyKind::Bomber => {
                        out.push(EnemyAttack::Bomb(*pos));
                        *timer = 3.0;
                    }
                    _ => {}
                }
            }
        }
    }

    /// Damage that gets through to health after shields and head-shots
    pub fn damage_taken(&mut self, amount: f32, headshot: bool) -> f32 {
        if self.shield > 0.0 && !headshot {
            self.shield -= amount;
            if self.shield <= 0.0 {
                log::debug!("Shield broken");
            }
            return 0.0;
        }
        if headshot { amount * 2.0 } else { amount }
    }
}

fn enemy_actor(pos: Vec2, enemy: Enemy, health: f32) -> Actor {
    Actor::new(ActorKind::Enemy(enemy), pos, ENEMY_SIZE, health)
}

pub fn grunt(pos: Vec2) -> Actor {
    enemy_actor(pos, Enemy::base(EnemyKind::Grunt), 60.0)
}

pub fn shield(pos: Vec2) -> Actor {
    let enemy = Enemy {
        shield: 50.0,
        ..Enemy::base(EnemyKind::Shield)
    };
    enemy_actor(pos, enemy, 80.0)
}

pub fn sniper(pos: Vec2) -> Actor {
    let enemy = Enemy {
        special_timer: Some(3.0),
        ..Enemy::base(EnemyKind::Sniper)
    };
    enemy_actor(pos, enemy, 50.0)
}

pub fn bomber(pos: Vec2) -> Actor {
    let enemy = Enemy {
        special_timer: Some(2.5),
        ..Enemy::base(EnemyKind::Bomber)
    };
    enemy_actor(pos, enemy, 60.0)
}

pub fn turret(pos: Vec2) -> Actor {
    let enemy = Enemy {
        attack_timer: 1.2,
        attack_interval: 1.2,
        ..Enemy::base(EnemyKind::Turret)
    };
    enemy_actor(pos, enemy, 120.0)
}

pub fn melee(pos: Vec2) -> Actor {
    let enemy = Enemy {
        speed: 80.0,
        ..Enemy::base(EnemyKind::Melee)
    };
    enemy_actor(pos, enemy, 40.0)
}

pub type EnemyConstructor = fn(Vec2) -> Actor;

/// Type-string to constructor lookup
#[derive(Debug, Clone)]
pub struct EnemyRegistry {
    constructors: HashMap<String, EnemyConstructor>,
}

impl Default for EnemyRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl EnemyRegistry {
    /// Registry with no entries
    pub fn empty() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Registry with the six built-in enemy types
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(EnemyKind::Grunt.as_str(), grunt);
        registry.register(EnemyKind::Shield.as_str(), shield);
        registry.register(EnemyKind::Sniper.as_str(), sniper);
        registry.register(EnemyKind::Bomber.as_str(), bomber);
        registry.register(EnemyKind::Turret.as_str(), turret);
        registry.register(EnemyKind::Melee.as_str(), melee);
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, constructor: EnemyConstructor) {
        self.constructors.insert(name.into(), constructor);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Build an enemy actor standing at `pos`
    pub fn build(&self, name: &str, pos: Vec2) -> Option<Actor> {
        self.constructors.get(name).map(|ctor| ctor(pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enemy_of(actor: &Actor) -> &Enemy {
        match &actor.kind {
            ActorKind::Enemy(enemy) => enemy,
            other => panic!("expected enemy, got {other:?}"),
        }
    }

    #[test]
    fn test_registry_defaults() {
        let registry = EnemyRegistry::default();
        for name in ["grunt", "shield", "sniper", "bomber", "turret", "melee"] {
            let actor = registry.build(name, Vec2::new(900.0, 620.0)).unwrap();
            assert_eq!(enemy_of(&actor).kind.as_str(), name);
        }
        assert!(!registry.contains("dragon"));
        assert!(registry.build("dragon", Vec2::ZERO).is_none());
    }

    #[test]
    fn test_grunt_attacks_on_cooldown() {
        let mut actor = grunt(Vec2::new(900.0, 620.0));
        let ActorKind::Enemy(enemy) = &mut actor.kind else {
            unreachable!()
        };
        let mut pos = actor.pos;
        let mut out = Vec::new();
        enemy.update(&mut pos, 1.5, Vec2::ZERO, &mut out);
        assert!(out.is_empty());
        enemy.update(&mut pos, 0.5, Vec2::ZERO, &mut out);
        assert_eq!(out, vec![EnemyAttack::Strike(1.0)]);
        assert_eq!(enemy.attack_timer, 2.5);
    }

    #[test]
    fn test_shield_absorbs_body_shots() {
        let mut actor = shield(Vec2::ZERO);
        let ActorKind::Enemy(enemy) = &mut actor.kind else {
            unreachable!()
        };
        assert_eq!(enemy.damage_taken(25.0, false), 0.0);
        assert_eq!(enemy.damage_taken(25.0, true), 50.0);
        assert_eq!(enemy.damage_taken(25.0, false), 0.0);
        assert_eq!(enemy.damage_taken(25.0, false), 25.0);
    }

    #[test]
    fn test_melee_walks_toward_player() {
        let mut actor = melee(Vec2::new(500.0, 620.0));
        let ActorKind::Enemy(enemy) = &mut actor.kind else {
            unreachable!()
        };
        let mut pos = actor.pos;
        let mut out = Vec::new();
        enemy.update(&mut pos, 1.0, Vec2::new(240.0, 620.0), &mut out);
        assert!((pos.x - 420.0).abs() < 1e-3);
    }

    #[test]
    fn test_bomber_throws() {
        let mut actor = bomber(Vec2::new(700.0, 620.0));
        let ActorKind::Enemy(enemy) = &mut actor.kind else {
            unreachable!()
        };
        let mut pos = actor.pos;
        let mut out = Vec::new();
        enemy.update(&mut pos, 2.5, Vec2::ZERO, &mut out);
        assert!(out.contains(&EnemyAttack::Bomb(Vec2::new(700.0, 620.0))));
    }
}
