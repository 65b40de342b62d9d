//! The player: health, weapons, cover, combo and running powerup effects
//!
//! There is exactly one player per run and it is not an actor; it rides the
//! rail with the camera.

use super::actors::PowerupKind;
use super::weapons::{Loadout, WeaponKind};
use crate::error::IntentError;
use crate::settings::EngineConfig;

/// Countdowns for the timed powerup effects (seconds left, 0 = off)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ActiveEffects {
    pub rapid: f32,
    pub spread: f32,
    pub armor: f32,
    pub slow: f32,
}

impl ActiveEffects {
    fn timer_mut(&mut self, kind: PowerupKind) -> Option<&mut f32> {
        match kind {
            PowerupKind::Rapid => Some(&mut self.rapid),
            PowerupKind::Spread => Some(&mut self.spread),
            PowerupKind::Armor => Some(&mut self.armor),
            PowerupKind::Slow => Some(&mut self.slow),
            PowerupKind::Health => None,
        }
    }

    /// Start (or extend) an effect. Health is instant and has no timer.
    pub fn apply(&mut self, kind: PowerupKind, remaining: f32) {
        if let Some(timer) = self.timer_mut(kind) {
            *timer = timer.max(remaining);
        }
    }

    pub fn is_active(&self, kind: PowerupKind) -> bool {
        match kind {
            PowerupKind::Rapid => self.rapid > 0.0,
            PowerupKind::Spread => self.spread > 0.0,
            PowerupKind::Armor => self.armor > 0.0,
            PowerupKind::Slow => self.slow > 0.0,
            PowerupKind::Health => false,
        }
    }

    /// Count every running effect down; returns the ones that just ended
    pub fn tick(&mut self, dt: f32) -> Vec<PowerupKind> {
        let mut expired = Vec::new();
        for kind in PowerupKind::ALL {
            let Some(timer) = self.timer_mut(kind) else {
                continue;
            };
            if *timer > 0.0 {
                *timer -= dt;
                if *timer <= 0.0 {
                    *timer = 0.0;
                    expired.push(kind);
                }
            }
        }
        expired
    }
}

/// Consecutive-hit streak
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Combo {
    pub hits: u32,
    pub multiplier: f32,
    /// Seconds until the streak lapses
    pub decay: f32,
}

impl Default for Combo {
    fn default() -> Self {
        Self {
            hits: 0,
            multiplier: 1.0,
            decay: 0.0,
        }
    }
}

impl Combo {
    /// Count a hit; returns the multiplier it scores at
    pub fn hit(&mut self, window: f32) -> f32 {
        self.hits += 1;
        self.decay = window;
        self.multiplier = (1.0 + self.hits as f32 / 5.0).clamp(1.0, 5.0);
        self.multiplier
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn tick(&mut self, dt: f32) {
        if self.hits == 0 {
            return;
        }
        self.decay -= dt;
        if self.decay <= 0.0 {
            self.reset();
        }
    }
}

/// What happened to the player's timers during one step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerTimers {
    /// A reload finished this step
    pub reloaded: Option<WeaponKind>,
    /// Effects that ran out this step
    pub expired: Vec<PowerupKind>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub health: f32,
    pub max_health: f32,
    pub loadout: Loadout,
    pub in_cover: bool,
    /// Seconds until the active magazine is full again
    pub reload_timer: Option<f32>,
    /// Seconds until the trigger can be pulled again
    pub shoot_cooldown: f32,
    pub combo: Combo,
    pub effects: ActiveEffects,
}

impl Player {
    pub fn new(config: &EngineConfig, unlocked: &[WeaponKind]) -> Self {
        Self {
            health: config.player_max_health,
            max_health: config.player_max_health,
            loadout: Loadout::new(unlocked),
            in_cover: false,
            reload_timer: None,
            shoot_cooldown: 0.0,
            combo: Combo::default(),
            effects: ActiveEffects::default(),
        }
    }

    #[inline]
    pub fn is_reloading(&self) -> bool {
        self.reload_timer.is_some()
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    pub fn ammo(&self) -> u32 {
        self.loadout.active().ammo
    }

    /// Why a trigger pull would be refused right now, if it would
    pub fn fire_blocker(&self) -> Option<IntentError> {
        if self.in_cover {
            Some(IntentError::InCover)
        } else if self.is_reloading() {
            Some(IntentError::Reloading)
        } else if self.ammo() == 0 {
            Some(IntentError::NoAmmo)
        } else if self.shoot_cooldown > 0.0 {
            Some(IntentError::Cooldown)
        } else {
            None
        }
    }

    /// Start refilling the active magazine
    pub fn start_reload(&mut self) -> Result<(), IntentError> {
        if self.is_reloading() {
            return Err(IntentError::Reloading);
        }
        let stats = self.loadout.active_stats();
        if self.ammo() >= stats.mag_size {
            return Err(IntentError::MagazineFull);
        }
        self.reload_timer = Some(stats.reload_time);
        Ok(())
    }

    /// Switch weapons; an in-progress reload is dropped
    pub fn select_weapon(&mut self, slot: u8) -> Result<WeaponKind, IntentError> {
        let kind = self.loadout.select(slot)?;
        self.reload_timer = None;
        self.shoot_cooldown = 0.0;
        Ok(kind)
    }

    /// Flip cover; returns the new state
    pub fn toggle_cover(&mut self) -> bool {
        self.in_cover = !self.in_cover;
        self.combo.reset();
        self.in_cover
    }

    pub fn heal(&mut self, amount: f32) {
        self.health = (self.health + amount).min(self.max_health);
    }

    /// Count down reload, fire-rate, combo and effect timers
    pub fn tick_timers(&mut self, dt: f32) -> PlayerTimers {
        let mut out = PlayerTimers::default();

        if let Some(timer) = self.reload_timer.as_mut() {
            *timer -= dt;
            if *timer <= 0.0 {
                self.reload_timer = None;
                self.loadout.refill_active();
                out.reloaded = Some(self.loadout.active().kind);
            }
        }

        self.shoot_cooldown = (self.shoot_cooldown - dt).max(0.0);
        self.combo.tick(dt);
        out.expired = self.effects.tick(dt);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> Player {
        Player::new(&EngineConfig::default(), &[WeaponKind::Smg])
    }

    #[test]
    fn test_reload_fills_exactly_capacity() {
        let mut player = player();
        player.loadout.active_mut().ammo = 3;
        player.start_reload().unwrap();
        assert_eq!(player.start_reload(), Err(IntentError::Reloading));

        let timers = player.tick_timers(0.5);
        assert_eq!(timers.reloaded, None);
        assert_eq!(player.ammo(), 3);
        let timers = player.tick_timers(0.5);
        assert_eq!(timers.reloaded, Some(WeaponKind::Pistol));
        assert_eq!(player.ammo(), 12);
        assert!(!player.is_reloading());
    }

    #[test]
    fn test_full_magazine_refuses_reload() {
        let mut player = player();
        assert_eq!(player.start_reload(), Err(IntentError::MagazineFull));
    }

    #[test]
    fn test_switch_cancels_reload() {
        let mut player = player();
        player.loadout.active_mut().ammo = 0;
        player.start_reload().unwrap();
        assert_eq!(player.select_weapon(2), Ok(WeaponKind::Smg));
        assert!(!player.is_reloading());

        // Back on the pistol the magazine is still empty
        player.select_weapon(1).unwrap();
        player.tick_timers(2.0);
        assert_eq!(player.ammo(), 0);
    }

    #[test]
    fn test_locked_switch_keeps_reload() {
        let mut player = player();
        player.loadout.active_mut().ammo = 0;
        player.start_reload().unwrap();
        assert_eq!(player.select_weapon(3), Err(IntentError::LockedWeapon(3)));
        assert!(player.is_reloading());
    }

    #[test]
    fn test_fire_blockers() {
        let mut player = player();
        assert_eq!(player.fire_blocker(), None);
        player.toggle_cover();
        assert_eq!(player.fire_blocker(), Some(IntentError::InCover));
        player.toggle_cover();
        player.shoot_cooldown = 0.1;
        assert_eq!(player.fire_blocker(), Some(IntentError::Cooldown));
        player.loadout.active_mut().ammo = 0;
        assert_eq!(player.fire_blocker(), Some(IntentError::NoAmmo));
    }

    #[test]
    fn test_combo_builds_and_lapses() {
        let mut combo = Combo::default();
        for _ in 0..4 {
            combo.hit(2.0);
        }
        assert!((combo.multiplier - 1.8).abs() < 1e-5);
        combo.tick(1.0);
        assert_eq!(combo.hits, 4);
        combo.tick(1.0);
        assert_eq!(combo, Combo::default());

        for _ in 0..40 {
            combo.hit(2.0);
        }
        assert_eq!(combo.multiplier, 5.0);
    }

    #[test]
    fn test_effects_expire_once() {
        let mut effects = ActiveEffects::default();
        effects.apply(PowerupKind::Spread, 1.0);
        effects.apply(PowerupKind::Health, 5.0);
        assert!(effects.is_active(PowerupKind::Spread));
        assert!(effects.tick(0.5).is_empty());
        assert_eq!(effects.tick(0.5), vec![PowerupKind::Spread]);
        assert!(effects.tick(0.5).is_empty());
        assert!(!effects.is_active(PowerupKind::Spread));
    }

    #[test]
    fn test_heal_caps_at_max() {
        let mut player = player();
        player.health = 4.0;
        player.heal(2.0);
        assert_eq!(player.health, 5.0);
    }
}
