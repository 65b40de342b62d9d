//! Fixed timestep simulation tick
//!
//! One call advances a run by one step, always in the same order: timeline,
//! camera, player timers, actor behaviour and enemy attacks, off-rail culling,
//! player intents, despawn sweep, and finally the stage state machine.

use glam::Vec2;
use log::debug;

use super::actors::{Actor, ActorKind};
use super::clock::FrameClock;
use super::combat::{Intent, apply_intent, resolve_enemies, update_player};
use super::director::fire_due;
use super::state::{StageEvent, StagePhase, StageRun};
use crate::consts::{SIM_DT, VIEW_WIDTH};
use crate::error::IntentError;
use crate::stage::EventAction;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Discrete intents, applied in order
    pub intents: Vec<Intent>,
    /// Intro presentation finished
    pub intro_complete: bool,
    /// Autopilot mode - a simple gunner plays the stage
    pub autopilot: bool,
}

/// Advance the run by one fixed timestep
pub fn tick(run: &mut StageRun, input: &TickInput, dt: f32) {
    run.events.clear();
    if run.phase.is_terminal() {
        return;
    }

    // Pause is honoured in every live phase, before anything else
    for intent in input.intents.iter().filter(|i| matches!(i, Intent::Pause)) {
        apply_logged(run, *intent);
    }
    if run.paused {
        return;
    }

    if run.phase == StagePhase::Intro {
        run.intro_elapsed += dt;
        if input.intro_complete || run.intro_elapsed >= run.config().intro_fallback {
            run.complete_intro();
        }
        return;
    }

    run.elapsed += f64::from(dt);
    fire_due(run);
    run.camera.update(dt);
    update_player(run, dt);
    resolve_enemies(run, dt);

    let left_limit = run.camera.x() - run.config().offrail_margin;
    let culled = run.registry.cull_offrail(left_limit);
    if !culled.is_empty() {
        debug!("{} actors left the rail", culled.len());
    }

    if !run.player.is_dead() {
        let mut intents: Vec<Intent> = input
            .intents
            .iter()
            .copied()
            .filter(|i| !matches!(i, Intent::Pause))
            .collect();
        if input.autopilot {
            intents.extend(autopilot(run));
        }
        for intent in intents {
            apply_logged(run, intent);
        }
    }

    for actor in run.registry.sweep() {
        if let Some(reason) = actor.despawn {
            run.events.push(StageEvent::ActorDespawned {
                id: actor.id,
                label: actor.label(),
                reason,
            });
        }
    }

    update_phase(run);
}

/// Run the fixed steps a real frame delta buys; returns how many ran.
///
/// One-shot input (intents and the intro signal) goes to the first step and
/// is cleared once consumed. A frame too short for a step keeps it for the
/// next frame. Afterwards the outbox holds the events of every step.
pub fn run_frame(
    run: &mut StageRun,
    clock: &mut FrameClock,
    input: &mut TickInput,
    real_dt: f32,
) -> u32 {
    let steps = clock.advance(real_dt);
    let mut events = Vec::new();
    for _ in 0..steps {
        tick(run, input, SIM_DT);
        events.append(&mut run.events);
        input.intents.clear();
        input.intro_complete = false;
    }
    run.events = events;
    steps
}

fn apply_logged(run: &mut StageRun, intent: Intent) {
    if let Err(e) = apply_intent(run, intent) {
        debug!("Ignored {intent:?}: {e}");
    }
}

fn update_phase(run: &mut StageRun) {
    if run.player.is_dead() {
        run.set_phase(StagePhase::Defeat);
        return;
    }

    match run.phase {
        StagePhase::Playing => {
            if !rescues_reachable(run) {
                debug!("Not enough hostages left to meet the rescue objective");
                run.set_phase(StagePhase::Defeat);
            } else if run.elapsed >= run.stage.duration
                && !run.boss_pending()
                && objectives_met(run)
            {
                run.set_phase(StagePhase::Victory);
            }
        }
        StagePhase::BossEncounter => {
            let boss_down = run
                .boss
                .is_none_or(|id| run.registry.get(id).is_none_or(|boss| boss.health <= 0.0));
            if boss_down {
                run.set_phase(StagePhase::Victory);
            }
        }
        _ => {}
    }
}

fn objectives_met(run: &StageRun) -> bool {
    let objectives = &run.stage.objectives;
    run.rescued >= objectives.min_rescues
        && (!objectives.clear_enemies || run.registry.count_where(|a| a.is_enemy()) == 0)
}

/// Whether rescued, waiting and still-scheduled hostages can cover the objective
fn rescues_reachable(run: &StageRun) -> bool {
    let needed = run.stage.objectives.min_rescues as usize;
    if needed == 0 {
        return true;
    }
    let waiting = run
        .registry
        .count_where(|a| matches!(a.kind, ActorKind::Hostage(_)));
    let scheduled = run
        .director
        .pending(&run.stage.timeline, EventAction::Hostage);
    run.rescued as usize + waiting + scheduled >= needed
}

/// Intents a simple gunner would issue this tick.
///
/// Stays out of cover, reloads an empty magazine and otherwise shoots the
/// most urgent thing on screen: hostage ropes, then enemy heads, then an
/// exposed boss weak spot, then pickups and props. Points that would clip a
/// hostage's body are skipped.
pub fn autopilot(run: &StageRun) -> Vec<Intent> {
    match run.player.fire_blocker() {
        Some(IntentError::InCover) => return vec![Intent::ToggleCover],
        Some(IntentError::NoAmmo) => return vec![Intent::Reload],
        Some(_) => return Vec::new(),
        None => {}
    }

    let target = run
        .registry
        .iter_alive()
        .filter_map(|actor| aim_point(actor).map(|(rank, point)| (rank, actor, point)))
        .filter(|(_, _, point)| {
            let screen_x = run.camera.world_to_screen(*point).x;
            (0.0..VIEW_WIDTH).contains(&screen_x)
        })
        .filter(|(_, actor, point)| !clips_hostage(run, actor, *point))
        .min_by_key(|(rank, _, _)| *rank);

    match target {
        Some((_, _, point)) => {
            let screen = run.camera.world_to_screen(point);
            vec![Intent::Shoot {
                x: screen.x,
                y: screen.y,
            }]
        }
        None => Vec::new(),
    }
}

/// Priority rank (lower first) and world aim point for an actor
fn aim_point(actor: &Actor) -> Option<(u8, Vec2)> {
    match &actor.kind {
        ActorKind::Hostage(_) => actor.rope().map(|rope| (0, rope.center())),
        ActorKind::Enemy(_) => actor.head().map(|head| (1, head.center())),
        ActorKind::Boss(boss) if boss.is_exposed() => {
            Some((2, boss.weak_spot(&actor.bounds()).center()))
        }
        ActorKind::Boss(_) => None,
        ActorKind::Powerup(_) => Some((3, actor.bounds().center())),
        ActorKind::Prop(_) => Some((4, actor.bounds().center())),
    }
}

fn clips_hostage(run: &StageRun, target: &Actor, point: Vec2) -> bool {
    run.registry.iter_alive().any(|other| {
        other.id != target.id
            && matches!(other.kind, ActorKind::Hostage(_))
            && other.bounds().contains_point(point)
    })
}
