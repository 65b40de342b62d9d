//! Combat resolution
//!
//! Player intents against the actor registry, and enemy attacks against the
//! player. All scoring flows through here.

use glam::Vec2;
use log::debug;

use super::actors::{ActorId, ActorKind, DespawnReason, PowerupKind, Prop};
use super::enemies::EnemyAttack;
use super::registry::ActorRegistry;
use super::state::{BOMB_DAMAGE, BOMB_FUSE, Bomb, StageEvent, StageRun};
use super::weapons::WeaponStats;
use crate::error::IntentError;

/// Score for a landed shot, before the combo multiplier
pub const HIT_SCORE: f32 = 100.0;
pub const HEADSHOT_BONUS: i64 = 50;
/// Kill score, before the combo multiplier
pub const KILL_SCORE: f32 = 200.0;
pub const KILL_COINS: u32 = 5;
pub const HOSTAGE_PENALTY: i64 = 200;
pub const RESCUE_SCORE: i64 = 250;
pub const RESCUE_HEAL: f32 = 1.0;
pub const BOSS_KILL_SCORE: i64 = 2000;
pub const CRATE_SCORE_PER_COIN: i64 = 10;
pub const BARREL_DAMAGE: f32 = 200.0;
/// Barrel blasts and spread splashes reach enemies this far (center x)
pub const BLAST_RADIUS: f32 = 120.0;
pub const SPLASH_FACTOR: f32 = 0.6;

/// Discrete player inputs
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent {
    /// Fire at a screen position
    Shoot { x: f32, y: f32 },
    ToggleCover,
    Reload,
    /// Weapon slot 1-4
    SelectWeapon(u8),
    Pause,
}

/// Apply one intent. Rejected intents leave the run untouched.
pub fn apply_intent(run: &mut StageRun, intent: Intent) -> Result<(), IntentError> {
    match intent {
        Intent::Shoot { x, y } => shoot(run, Vec2::new(x, y)),
        Intent::ToggleCover => {
            let in_cover = run.player.toggle_cover();
            run.events.push(StageEvent::CoverChanged(in_cover));
            Ok(())
        }
        Intent::Reload => {
            run.player.start_reload()?;
            let weapon = run.player.loadout.active().kind;
            run.events.push(StageEvent::ReloadStarted(weapon));
            Ok(())
        }
        Intent::SelectWeapon(slot) => {
            let weapon = run.player.select_weapon(slot)?;
            run.events.push(StageEvent::WeaponSelected(weapon));
            Ok(())
        }
        Intent::Pause => {
            run.paused = !run.paused;
            run.events.push(StageEvent::Paused(run.paused));
            Ok(())
        }
    }
}

/// What a shot did to one actor
#[derive(Debug, Clone, Copy, PartialEq)]
enum HitOutcome {
    Enemy { headshot: bool },
    Boss,
    /// Landed on a guarded boss
    Glanced,
    Rescued,
    HostageLost,
    Collected,
    CrateOpened,
    Barrel,
}

impl HitOutcome {
    fn counts_as_hit(&self) -> bool {
        !matches!(self, HitOutcome::Glanced | HitOutcome::HostageLost)
    }
}

/// Actors a shot at `aim` touches, in resolution order
fn pick_targets(registry: &ActorRegistry, aim: Vec2, stats: &WeaponStats) -> Vec<ActorId> {
    if stats.pellets {
        // Pellets only catch a hostage when aimed straight at one
        registry
            .iter_alive()
            .filter(|a| a.collides_with_shots())
            .filter(|a| match a.kind {
                ActorKind::Hostage(_) => a.bounds().contains_point(aim),
                _ => a.bounds().within_radius(aim, stats.spread),
            })
            .map(|a| a.id)
            .collect()
    } else {
        // Top-most: the most recently spawned actor under the crosshair
        registry
            .iter_alive()
            .rev()
            .find(|a| a.collides_with_shots() && a.bounds().within_radius(aim, stats.spread))
            .map(|a| vec![a.id])
            .unwrap_or_default()
    }
}

fn shoot(run: &mut StageRun, screen: Vec2) -> Result<(), IntentError> {
    if let Some(blocker) = run.player.fire_blocker() {
        return Err(blocker);
    }

    let stats = run.player.loadout.active_stats();
    let weapon = run.player.loadout.active().kind;
    let slot = run.player.loadout.active_mut();
    let rounds = stats.burst.min(slot.ammo);
    slot.ammo -= rounds;

    let mut cooldown = stats.rof;
    if run.player.effects.is_active(PowerupKind::Rapid) {
        cooldown *= run.config().rapid_cooldown_multiplier;
    }
    run.player.shoot_cooldown = cooldown;
    run.stats.shots_fired += 1;

    let aim = run.camera.screen_to_world(screen);
    let damage = stats.damage * rounds as f32;
    let mut landed = 0;
    let mut headshot = false;
    for id in pick_targets(&run.registry, aim, &stats) {
        let Some(center_x) = run.registry.get(id).map(|a| a.bounds().center().x) else {
            continue;
        };
        let Some(outcome) = resolve_hit(run, id, aim, damage, stats.spread) else {
            continue;
        };
        if let HitOutcome::Enemy { headshot: head } = outcome {
            headshot |= head;
            if run.player.effects.is_active(PowerupKind::Spread) {
                for other in enemies_near(&run.registry, center_x, id) {
                    damage_enemy(run, other, stats.damage * SPLASH_FACTOR, false);
                }
            }
        }
        if outcome.counts_as_hit() {
            landed += 1;
        }
    }

    if landed > 0 {
        register_hit(run, headshot);
    } else {
        run.player.combo.reset();
    }
    run.events.push(StageEvent::ShotFired {
        weapon,
        hits: landed,
    });

    if run.player.ammo() == 0 && run.player.start_reload().is_ok() {
        run.events.push(StageEvent::ReloadStarted(weapon));
    }
    Ok(())
}

/// Snapshot of the target taken before mutating anything
enum Target {
    Enemy { headshot: bool },
    Boss,
    Hostage { on_rope: bool },
    Powerup { kind: PowerupKind, remaining: f32 },
    Barrel,
    Crate { coins: u32 },
}

fn resolve_hit(
    run: &mut StageRun,
    id: ActorId,
    aim: Vec2,
    damage: f32,
    spread: f32,
) -> Option<HitOutcome> {
    let actor = run.registry.get(id)?;
    let target = match &actor.kind {
        ActorKind::Enemy(_) => Target::Enemy {
            headshot: actor.head().is_some_and(|h| h.contains_point(aim)),
        },
        ActorKind::Boss(_) => Target::Boss,
        ActorKind::Hostage(_) => Target::Hostage {
            on_rope: actor.rope().is_some_and(|r| r.contains_point(aim)),
        },
        ActorKind::Powerup(p) => Target::Powerup {
            kind: p.kind,
            remaining: p.remaining,
        },
        ActorKind::Prop(Prop::Barrel) => Target::Barrel,
        ActorKind::Prop(Prop::Crate { coins }) => Target::Crate { coins: *coins },
    };

    let outcome = match target {
        Target::Enemy { headshot } => {
            damage_enemy(run, id, damage, headshot);
            HitOutcome::Enemy { headshot }
        }
        Target::Boss => hit_boss(run, id, aim, damage, spread),
        Target::Hostage { on_rope: true } => {
            mark(run, id, DespawnReason::Rescued);
            run.rescued += 1;
            run.stats.hostages_saved += 1;
            run.add_score(RESCUE_SCORE);
            run.player.heal(RESCUE_HEAL);
            run.events.push(StageEvent::HostageRescued(id));
            HitOutcome::Rescued
        }
        Target::Hostage { on_rope: false } => {
            mark(run, id, DespawnReason::Killed);
            run.stats.hostages_lost += 1;
            run.add_score(-HOSTAGE_PENALTY);
            run.events.push(StageEvent::HostageLost(id));
            HitOutcome::HostageLost
        }
        Target::Powerup { kind, remaining } => {
            mark(run, id, DespawnReason::Collected);
            collect_powerup(run, kind, remaining);
            HitOutcome::Collected
        }
        Target::Barrel => {
            let actor = run.registry.get_mut(id)?;
            actor.health -= damage;
            if actor.health <= 0.0 {
                explode_barrel(run, id);
            }
            HitOutcome::Barrel
        }
        Target::Crate { coins } => {
            mark(run, id, DespawnReason::Collected);
            run.coins = run.coins.saturating_add(coins);
            run.add_score(CRATE_SCORE_PER_COIN * i64::from(coins));
            run.events.push(StageEvent::CrateOpened { id, coins });
            HitOutcome::CrateOpened
        }
    };
    Some(outcome)
}

fn mark(run: &mut StageRun, id: ActorId, reason: DespawnReason) {
    if let Some(actor) = run.registry.get_mut(id) {
        actor.mark(reason);
    }
}

fn hit_boss(run: &mut StageRun, id: ActorId, aim: Vec2, damage: f32, spread: f32) -> HitOutcome {
    let Some(actor) = run.registry.get_mut(id) else {
        return HitOutcome::Glanced;
    };
    let bounds = actor.bounds();
    let ActorKind::Boss(boss) = &mut actor.kind else {
        return HitOutcome::Glanced;
    };
    if !boss.is_exposed() || !boss.weak_spot(&bounds).within_radius(aim, spread) {
        return HitOutcome::Glanced;
    }

    actor.health -= damage;
    let phase_change = boss.on_health_changed(actor.health, actor.max_health);
    let killed = actor.health <= 0.0;
    if killed {
        actor.mark(DespawnReason::Killed);
    }

    if let Some(phase) = phase_change {
        debug!("Boss entered phase {phase}");
        run.events.push(StageEvent::BossPhaseChanged(phase));
    }
    if killed {
        run.add_score(BOSS_KILL_SCORE);
        run.stats.kills += 1;
        run.events.push(StageEvent::EnemyKilled { id, label: "boss" });
    }
    HitOutcome::Boss
}

/// Apply damage to an enemy; returns whether it died
fn damage_enemy(run: &mut StageRun, id: ActorId, amount: f32, headshot: bool) -> bool {
    let Some(actor) = run.registry.get_mut(id) else {
        return false;
    };
    let ActorKind::Enemy(enemy) = &mut actor.kind else {
        return false;
    };
    let dealt = enemy.damage_taken(amount, headshot);
    actor.health -= dealt;
    if actor.health > 0.0 {
        return false;
    }
    actor.mark(DespawnReason::Killed);
    let label = actor.label();

    let multiplier = run.player.combo.multiplier;
    run.add_score((KILL_SCORE * multiplier) as i64);
    run.coins = run.coins.saturating_add(KILL_COINS);
    run.stats.kills += 1;
    run.events.push(StageEvent::EnemyKilled { id, label });
    true
}

/// Live enemies other than `origin` within the blast radius of `center_x`
fn enemies_near(registry: &ActorRegistry, center_x: f32, origin: ActorId) -> Vec<ActorId> {
    registry
        .iter_alive()
        .filter(|a| a.id != origin && a.is_enemy())
        .filter(|a| (a.bounds().center().x - center_x).abs() < BLAST_RADIUS)
        .map(|a| a.id)
        .collect()
}

fn explode_barrel(run: &mut StageRun, id: ActorId) {
    let Some(actor) = run.registry.get_mut(id) else {
        return;
    };
    actor.mark(DespawnReason::Killed);
    let center_x = actor.bounds().center().x;
    let victims = enemies_near(&run.registry, center_x, id);
    let mut kills = 0;
    for victim in victims {
        if damage_enemy(run, victim, BARREL_DAMAGE, false) {
            kills += 1;
        }
    }
    run.stats.barrel_multi_kill = run.stats.barrel_multi_kill.max(kills);
    run.events.push(StageEvent::BarrelExploded { id, kills });
}

fn collect_powerup(run: &mut StageRun, kind: PowerupKind, remaining: f32) {
    match kind {
        PowerupKind::Health => {
            let amount = run.config().health_pickup_amount;
            run.player.heal(amount);
        }
        _ => run.player.effects.apply(kind, remaining),
    }
    run.stats.powerups_collected += 1;
    run.events.push(StageEvent::PowerupCollected(kind));
}

fn register_hit(run: &mut StageRun, headshot: bool) {
    run.stats.hits += 1;
    let window = run.config().combo_window;
    let multiplier = run.player.combo.hit(window);
    run.stats.best_combo = run.stats.best_combo.max(run.player.combo.hits);
    let mut bonus = (HIT_SCORE * multiplier) as i64;
    if headshot {
        bonus += HEADSHOT_BONUS;
    }
    run.add_score(bonus);
}

/// Hurt the player, after difficulty, cover and armor
pub fn damage_player(run: &mut StageRun, amount: f32) {
    let mut dealt = amount * run.difficulty_multiplier();
    if run.player.in_cover {
        dealt *= run.config().cover_damage_multiplier;
    }
    if run.player.effects.is_active(PowerupKind::Armor) {
        dealt *= run.config().armor_damage_multiplier;
    }
    run.player.health -= dealt;
    run.player.combo.reset();
    run.stats.damage_taken += dealt;
    run.events.push(StageEvent::PlayerDamaged {
        amount: dealt,
        health: run.player.health,
    });
}

/// Count down the player's own timers
pub fn update_player(run: &mut StageRun, dt: f32) {
    let timers = run.player.tick_timers(dt);
    if let Some(weapon) = timers.reloaded {
        run.events.push(StageEvent::ReloadFinished(weapon));
    }
    for kind in timers.expired {
        debug!("Powerup {} expired", kind.as_str());
        run.events.push(StageEvent::PowerupExpired(kind));
    }
}

/// Run every actor's behaviour and apply the attacks that come out of it
pub fn resolve_enemies(run: &mut StageRun, dt: f32) {
    let enemy_dt = if run.player.effects.is_active(PowerupKind::Slow) {
        dt * run.config().slow_time_scale
    } else {
        dt
    };
    let player_pos = run.player_world_pos();

    let mut attacks = Vec::new();
    for actor in run.registry.iter_alive_mut() {
        let mut expired = false;
        match &mut actor.kind {
            ActorKind::Enemy(enemy) => {
                enemy.update(&mut actor.pos, enemy_dt, player_pos, &mut attacks);
            }
            ActorKind::Boss(boss) => {
                if let Some(damage) = boss.update(enemy_dt) {
                    attacks.push(EnemyAttack::Strike(damage));
                }
            }
            ActorKind::Powerup(powerup) => {
                // Budget runs on real stage time, not slowed time
                powerup.remaining -= dt;
                expired = powerup.remaining <= 0.0;
            }
            ActorKind::Hostage(_) | ActorKind::Prop(_) => {}
        }
        if expired {
            actor.mark(DespawnReason::Expired);
        }
    }

    for attack in attacks {
        match attack {
            EnemyAttack::Strike(damage) => damage_player(run, damage),
            EnemyAttack::Bomb(pos) => {
                run.bombs.push(Bomb {
                    pos,
                    fuse: BOMB_FUSE,
                });
                run.events.push(StageEvent::BombThrown(pos));
            }
        }
    }

    let mut landed = Vec::new();
    run.bombs.retain_mut(|bomb| {
        bomb.fuse -= enemy_dt;
        if bomb.fuse <= 0.0 {
            landed.push(bomb.pos);
            false
        } else {
            true
        }
    });
    for pos in landed {
        let avoided = run.player.in_cover;
        run.events.push(StageEvent::BombLanded { pos, avoided });
        if !avoided {
            damage_player(run, BOMB_DAMAGE);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use proptest::prelude::*;

    use super::*;
    use crate::sim::actors::Actor;
    use crate::sim::boss::{BossWindow, boss_actor};
    use crate::sim::enemies::{EnemyRegistry, grunt, shield};
    use crate::sim::state::RunSetup;
    use crate::sim::weapons::WeaponKind;
    use crate::stage::StageDescriptor;

    fn run() -> StageRun {
        let json = r#"{"id": "combat", "duration": 30.0, "timeline": []}"#;
        let stage = StageDescriptor::from_json(json, &EnemyRegistry::default()).unwrap();
        let setup = RunSetup {
            unlocked: vec![WeaponKind::Smg, WeaponKind::Shotgun],
            ..RunSetup::default()
        };
        let mut run = StageRun::new(Arc::new(stage), setup);
        run.complete_intro();
        run
    }

    fn shoot_at(run: &mut StageRun, x: f32, y: f32) -> Result<(), IntentError> {
        run.player.shoot_cooldown = 0.0;
        apply_intent(run, Intent::Shoot { x, y })
    }

    #[test]
    fn test_shot_damages_and_scores() {
        let mut run = run();
        let id = run.spawn(grunt(Vec2::new(900.0, 620.0)));
        shoot_at(&mut run, 900.0, 600.0).unwrap();
        assert_eq!(run.registry.get(id).unwrap().health, 35.0);
        assert_eq!(run.player.ammo(), 11);
        assert_eq!(run.score, 120);
        assert_eq!(run.stats.hits, 1);
        assert_eq!(run.stats.shots_fired, 1);
    }

    #[test]
    fn test_headshot_doubles_and_kills() {
        let mut run = run();
        let id = run.spawn(grunt(Vec2::new(900.0, 620.0)));
        shoot_at(&mut run, 900.0, 565.0).unwrap();
        assert_eq!(run.registry.get(id).unwrap().health, 10.0);
        shoot_at(&mut run, 900.0, 565.0).unwrap();
        assert!(run.registry.get(id).is_none());
        assert_eq!(run.stats.kills, 1);
        assert_eq!(run.coins, KILL_COINS);
    }

    #[test]
    fn test_miss_resets_combo() {
        let mut run = run();
        run.spawn(grunt(Vec2::new(900.0, 620.0)));
        shoot_at(&mut run, 900.0, 600.0).unwrap();
        assert_eq!(run.player.combo.hits, 1);
        shoot_at(&mut run, 100.0, 100.0).unwrap();
        assert_eq!(run.player.combo.hits, 0);
        assert_eq!(run.stats.shots_fired, 2);
    }

    #[test]
    fn test_shots_blocked() {
        let mut run = run();
        let id = run.spawn(grunt(Vec2::new(900.0, 620.0)));

        apply_intent(&mut run, Intent::ToggleCover).unwrap();
        assert_eq!(shoot_at(&mut run, 900.0, 600.0), Err(IntentError::InCover));
        apply_intent(&mut run, Intent::ToggleCover).unwrap();

        shoot_at(&mut run, 900.0, 600.0).unwrap();
        assert_eq!(
            apply_intent(&mut run, Intent::Shoot { x: 900.0, y: 600.0 }),
            Err(IntentError::Cooldown)
        );
        assert_eq!(run.registry.get(id).unwrap().health, 35.0);
        assert_eq!(run.stats.shots_fired, 1);
    }

    #[test]
    fn test_empty_magazine_auto_reloads() {
        let mut run = run();
        run.player.loadout.active_mut().ammo = 1;
        shoot_at(&mut run, 100.0, 100.0).unwrap();
        assert_eq!(run.player.ammo(), 0);
        assert!(run.player.is_reloading());
        assert_eq!(shoot_at(&mut run, 100.0, 100.0), Err(IntentError::Reloading));
        update_player(&mut run, 1.0);
        assert_eq!(run.player.ammo(), 12);
    }

    #[test]
    fn test_burst_limited_by_ammo() {
        let mut run = run();
        apply_intent(&mut run, Intent::SelectWeapon(3)).unwrap();
        run.player.loadout.active_mut().ammo = 1;
        let id = run.spawn(grunt(Vec2::new(900.0, 620.0)));
        shoot_at(&mut run, 900.0, 600.0).unwrap();
        assert_eq!(run.player.ammo(), 0);
        assert_eq!(run.registry.get(id).unwrap().health, 60.0 - 6.0);
    }

    #[test]
    fn test_ammo_per_trigger_pull() {
        let mut run = run();
        apply_intent(&mut run, Intent::SelectWeapon(3)).unwrap();
        shoot_at(&mut run, 100.0, 100.0).unwrap();
        assert_eq!(run.player.ammo(), 6);

        apply_intent(&mut run, Intent::SelectWeapon(2)).unwrap();
        shoot_at(&mut run, 100.0, 100.0).unwrap();
        assert_eq!(run.player.ammo(), 31);
    }

    #[test]
    fn test_top_most_actor_takes_the_shot() {
        let mut run = run();
        let back = run.spawn(grunt(Vec2::new(900.0, 620.0)));
        let front = run.spawn(grunt(Vec2::new(910.0, 620.0)));
        shoot_at(&mut run, 905.0, 600.0).unwrap();
        assert_eq!(run.registry.get(back).unwrap().health, 60.0);
        assert_eq!(run.registry.get(front).unwrap().health, 35.0);
    }

    #[test]
    fn test_shotgun_hits_everything_in_spread() {
        let mut run = run();
        apply_intent(&mut run, Intent::SelectWeapon(3)).unwrap();
        let a = run.spawn(grunt(Vec2::new(900.0, 620.0)));
        let b = run.spawn(grunt(Vec2::new(960.0, 620.0)));
        let far = run.spawn(grunt(Vec2::new(1200.0, 620.0)));
        shoot_at(&mut run, 930.0, 600.0).unwrap();
        assert_eq!(run.registry.get(a).unwrap().health, 48.0);
        assert_eq!(run.registry.get(b).unwrap().health, 48.0);
        assert_eq!(run.registry.get(far).unwrap().health, 60.0);
        assert_eq!(run.stats.hits, 1);
    }

    #[test]
    fn test_shield_blocks_body_not_head() {
        let mut run = run();
        let id = run.spawn(shield(Vec2::new(900.0, 620.0)));
        shoot_at(&mut run, 900.0, 600.0).unwrap();
        assert_eq!(run.registry.get(id).unwrap().health, 80.0);
        shoot_at(&mut run, 900.0, 565.0).unwrap();
        assert_eq!(run.registry.get(id).unwrap().health, 30.0);
    }

    #[test]
    fn test_hostage_rescue_and_loss() {
        let mut run = run();
        run.player.health = 3.0;
        let saved = run.spawn(Actor::hostage(Vec2::new(900.0, 620.0)));
        shoot_at(&mut run, 900.0, 540.0).unwrap();
        assert!(run.registry.get(saved).is_none());
        assert_eq!(run.rescued, 1);
        assert_eq!(run.player.health, 4.0);
        assert_eq!(run.score, 250 + 120);

        let lost = run.spawn(Actor::hostage(Vec2::new(600.0, 620.0)));
        shoot_at(&mut run, 600.0, 600.0).unwrap();
        assert!(run.registry.get(lost).is_none());
        assert_eq!(run.stats.hostages_lost, 1);
        assert_eq!(run.score, 250 + 120 - 200);
        assert_eq!(run.player.combo.hits, 0);
    }

    #[test]
    fn test_barrel_explosion_chains() {
        let mut run = run();
        let a = run.spawn(grunt(Vec2::new(820.0, 620.0)));
        let b = run.spawn(grunt(Vec2::new(980.0, 620.0)));
        let safe = run.spawn(grunt(Vec2::new(1100.0, 620.0)));
        let barrel = run.spawn(Actor::barrel(Vec2::new(900.0, 620.0)));
        shoot_at(&mut run, 900.0, 600.0).unwrap();
        assert!(run.registry.get(barrel).is_some());
        shoot_at(&mut run, 900.0, 600.0).unwrap();
        assert!(run.registry.get(barrel).is_none());
        assert!(run.registry.get(a).is_none());
        assert!(run.registry.get(b).is_none());
        assert!(run.registry.get(safe).is_some());
        assert_eq!(run.stats.barrel_multi_kill, 2);
        assert_eq!(run.stats.kills, 2);
    }

    #[test]
    fn test_crate_pays_out() {
        let mut run = run();
        run.spawn(Actor::crate_box(Vec2::new(900.0, 620.0), 7));
        shoot_at(&mut run, 900.0, 600.0).unwrap();
        assert_eq!(run.coins, 7);
        assert_eq!(run.score, 70 + 120);
    }

    #[test]
    fn test_crate_coins_saturate() {
        let mut run = run();
        run.spawn(Actor::crate_box(Vec2::new(400.0, 620.0), u32::MAX));
        run.spawn(Actor::crate_box(Vec2::new(900.0, 620.0), 10));
        shoot_at(&mut run, 400.0, 600.0).unwrap();
        shoot_at(&mut run, 900.0, 600.0).unwrap();
        assert_eq!(run.coins, u32::MAX);
        assert_eq!(run.stats.hits, 2);
    }

    #[test]
    fn test_collected_powerup_inherits_budget() {
        let mut run = run();
        let id = run.spawn(Actor::powerup(PowerupKind::Rapid, Vec2::new(900.0, 560.0), 6.0));
        resolve_enemies(&mut run, 2.0);
        shoot_at(&mut run, 900.0, 540.0).unwrap();
        assert!(run.registry.get(id).is_none());
        assert_eq!(run.player.effects.rapid, 4.0);

        shoot_at(&mut run, 100.0, 100.0).unwrap();
        assert_eq!(run.player.shoot_cooldown, 0.1);
    }

    #[test]
    fn test_uncollected_powerup_expires() {
        let mut run = run();
        let id = run.spawn(Actor::powerup(PowerupKind::Armor, Vec2::new(900.0, 560.0), 1.0));
        resolve_enemies(&mut run, 0.5);
        assert!(run.registry.get(id).is_some());
        resolve_enemies(&mut run, 0.5);
        assert!(run.registry.get(id).is_none());
    }

    #[test]
    fn test_spread_powerup_splashes() {
        let mut run = run();
        run.player.effects.apply(PowerupKind::Spread, 5.0);
        let target = run.spawn(grunt(Vec2::new(900.0, 620.0)));
        let near = run.spawn(grunt(Vec2::new(1000.0, 620.0)));
        let far = run.spawn(grunt(Vec2::new(1200.0, 620.0)));
        shoot_at(&mut run, 900.0, 600.0).unwrap();
        assert_eq!(run.registry.get(target).unwrap().health, 35.0);
        assert!((run.registry.get(near).unwrap().health - 45.0).abs() < 1e-4);
        assert_eq!(run.registry.get(far).unwrap().health, 60.0);
    }

    #[test]
    fn test_damage_multipliers() {
        let mut run = run();
        damage_player(&mut run, 1.0);
        assert_eq!(run.player.health, 4.0);
        apply_intent(&mut run, Intent::ToggleCover).unwrap();
        damage_player(&mut run, 1.0);
        assert_eq!(run.player.health, 3.75);
        run.player.effects.apply(PowerupKind::Armor, 3.0);
        damage_player(&mut run, 2.0);
        assert_eq!(run.player.health, 3.5);
        assert_eq!(run.stats.damage_taken, 1.5);
    }

    #[test]
    fn test_bombs_avoided_in_cover() {
        let mut run = run();
        run.bombs.push(Bomb {
            pos: Vec2::new(700.0, 620.0),
            fuse: BOMB_FUSE,
        });
        apply_intent(&mut run, Intent::ToggleCover).unwrap();
        resolve_enemies(&mut run, 1.5);
        assert!(run.bombs.is_empty());
        assert_eq!(run.player.health, 5.0);
    }

    #[test]
    fn test_slow_powerup_scales_enemy_time() {
        let mut run = run();
        let id = run.spawn(grunt(Vec2::new(900.0, 620.0)));
        run.player.effects.apply(PowerupKind::Slow, 10.0);
        resolve_enemies(&mut run, 1.0);
        let ActorKind::Enemy(enemy) = &run.registry.get(id).unwrap().kind else {
            unreachable!()
        };
        assert!((enemy.attack_timer - 1.4).abs() < 1e-5);
    }

    #[test]
    fn test_boss_only_hurt_when_exposed() {
        let mut run = run();
        let id = run.spawn(boss_actor(Vec2::new(900.0, 620.0), 600.0));
        // Weak spot: x 860..900, y 460..500
        shoot_at(&mut run, 880.0, 480.0).unwrap();
        assert_eq!(run.registry.get(id).unwrap().health, 600.0);
        assert_eq!(run.stats.hits, 0);

        if let ActorKind::Boss(boss) = &mut run.registry.get_mut(id).unwrap().kind {
            boss.window = BossWindow::Exposed { remaining: 2.0 };
        }
        shoot_at(&mut run, 880.0, 480.0).unwrap();
        assert_eq!(run.registry.get(id).unwrap().health, 575.0);
        // Body shots glance off even while exposed
        shoot_at(&mut run, 980.0, 600.0).unwrap();
        assert_eq!(run.registry.get(id).unwrap().health, 575.0);
    }

    #[test]
    fn test_intent_errors_leave_state() {
        let mut run = run();
        let before = run.player.clone();
        assert_eq!(
            apply_intent(&mut run, Intent::SelectWeapon(4)),
            Err(IntentError::LockedWeapon(4))
        );
        assert_eq!(
            apply_intent(&mut run, Intent::SelectWeapon(1)),
            Err(IntentError::AlreadyActive(1))
        );
        assert_eq!(
            apply_intent(&mut run, Intent::Reload),
            Err(IntentError::MagazineFull)
        );
        assert_eq!(run.player, before);
    }

    proptest! {
        #[test]
        fn prop_cover_parity(n in 0usize..50) {
            let mut run = run();
            for _ in 0..n {
                apply_intent(&mut run, Intent::ToggleCover).unwrap();
            }
            prop_assert_eq!(run.player.in_cover, n % 2 == 1);
        }

        #[test]
        fn prop_empty_magazine_never_fires(
            shots in prop::collection::vec((0.0f32..1280.0, 0.0f32..720.0), 1..30),
        ) {
            let mut run = run();
            run.spawn(grunt(Vec2::new(640.0, 620.0)));
            run.player.loadout.active_mut().ammo = 0;
            for (x, y) in shots {
                run.player.shoot_cooldown = 0.0;
                prop_assert_eq!(
                    apply_intent(&mut run, Intent::Shoot { x, y }),
                    Err(IntentError::NoAmmo)
                );
            }
            prop_assert_eq!(run.player.ammo(), 0);
            prop_assert_eq!(run.stats.shots_fired, 0);
            prop_assert_eq!(run.stats.hits, 0);
            prop_assert_eq!(run.score, 0);
        }
    }
}
