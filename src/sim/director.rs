//! Spawn director
//!
//! Walks the sorted timeline with a single cursor. Each step fires every
//! event at or before the new stage time that has not fired yet, so a long
//! step crosses several triggers without skipping any and a short one never
//! fires anything twice. Events at time 0 fire on the first step.
//!
//! A bad event is skipped and recorded as a diagnostic; playback goes on.

use std::ops::Range;
use std::sync::Arc;

use glam::Vec2;
use log::{debug, warn};
use rand::Rng;

use super::actors::{Actor, ActorKind, PowerupKind};
use super::boss::boss_actor;
use super::state::{StageEvent, StagePhase, StageRun};
use crate::consts::{BOSS_SPAWN_OFFSET, DEFAULT_PAN_STEP, GROUND_Y};
use crate::error::{Diagnostic, EventError};
use crate::stage::params::{
    BossParams, CameraPanParams, CrateParams, PlacementParams, PowerupParams, SpawnParams,
    check_duration, decode,
};
use crate::stage::{EventAction, TimelineEvent};

/// Timeline cursor plus the log of fired indices
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpawnDirector {
    cursor: usize,
    fired: Vec<usize>,
}

impl SpawnDirector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim every unfired event with `time <= now`; returns their indices
    pub fn advance(&mut self, timeline: &[TimelineEvent], now: f64) -> Range<usize> {
        let start = self.cursor;
        while self.cursor < timeline.len() && timeline[self.cursor].time <= now {
            self.cursor += 1;
        }
        self.fired.extend(start..self.cursor);
        start..self.cursor
    }

    /// Timeline indices fired so far, in firing order
    pub fn fired(&self) -> &[usize] {
        &self.fired
    }

    pub fn is_finished(&self, timeline: &[TimelineEvent]) -> bool {
        self.cursor >= timeline.len()
    }

    pub fn boss_pending(&self, timeline: &[TimelineEvent]) -> bool {
        self.pending(timeline, EventAction::Boss) > 0
    }

    /// Unfired events of `action` still ahead of the cursor
    pub fn pending(&self, timeline: &[TimelineEvent], action: EventAction) -> usize {
        timeline
            .get(self.cursor..)
            .map_or(0, |rest| rest.iter().filter(|e| e.action == action).count())
    }
}

/// Fire everything due at the run's current elapsed time
pub fn fire_due(run: &mut StageRun) {
    let stage = Arc::clone(&run.stage);
    let due = run.director.advance(&stage.timeline, run.elapsed);
    for index in due {
        let event = &stage.timeline[index];
        run.events.push(StageEvent::EventFired {
            index,
            action: event.action,
        });
        if let Err(error) = apply_event(run, event) {
            warn!(
                "Stage {}: skipping {} at {:.2}s (event {index}): {error}",
                stage.id,
                event.action.as_str(),
                event.time
            );
            run.diagnostics.push(Diagnostic {
                event_index: index,
                time: event.time,
                error,
            });
        }
    }
}

fn apply_event(run: &mut StageRun, event: &TimelineEvent) -> Result<(), EventError> {
    let action = event.action;
    match action {
        EventAction::Spawn => {
            let p: SpawnParams = decode(action, &event.params)?;
            let mut actor = run
                .setup
                .enemies
                .build(&p.kind, Vec2::new(p.x, p.y))
                .ok_or_else(|| EventError::UnknownEnemyType(p.kind.clone()))?;
            let jitter = run.config().attack_jitter;
            if jitter > 0.0 {
                if let ActorKind::Enemy(enemy) = &mut actor.kind {
                    enemy.attack_timer += run.rng.random_range(0.0..jitter);
                }
            }
            run.spawn(actor);
        }
        EventAction::Hostage => {
            let p: PlacementParams = decode(action, &event.params)?;
            run.spawn(Actor::hostage(Vec2::new(p.x, p.y)));
        }
        EventAction::Powerup => {
            let p: PowerupParams = decode(action, &event.params)?;
            let kind =
                PowerupKind::parse(&p.kind).ok_or_else(|| EventError::UnknownPowerup(p.kind))?;
            let duration = check_duration(action, p.duration)?;
            run.spawn(Actor::powerup(kind, Vec2::new(p.x, p.y), duration));
        }
        EventAction::Barrel => {
            let p: PlacementParams = decode(action, &event.params)?;
            run.spawn(Actor::barrel(Vec2::new(p.x, p.y)));
        }
        EventAction::Crate => {
            let p: CrateParams = decode(action, &event.params)?;
            run.spawn(Actor::crate_box(Vec2::new(p.x, p.y), p.coins));
        }
        EventAction::Boss => {
            let p: BossParams = decode(action, &event.params)?;
            if !(p.health.is_finite() && p.health > 0.0) {
                return Err(EventError::MalformedParams {
                    action: action.as_str(),
                    reason: format!("boss health {} must be positive", p.health),
                });
            }
            if run.boss.is_some() {
                debug!("Boss already on the rail, ignoring second boss event");
                return Ok(());
            }
            let pos = Vec2::new(run.camera.x() + BOSS_SPAWN_OFFSET, GROUND_Y);
            let id = run.spawn(boss_actor(pos, p.health));
            run.boss = Some(id);
            if run.phase == StagePhase::Playing {
                run.set_phase(StagePhase::BossEncounter);
            }
        }
        EventAction::CameraPan => {
            let p: CameraPanParams = decode(action, &event.params)?;
            let target = p.target_x.unwrap_or(run.camera.x() + DEFAULT_PAN_STEP);
            let duration = check_duration(
                action,
                p.duration.unwrap_or(run.config().default_pan_duration),
            )?;
            if !target.is_finite() {
                return Err(EventError::MalformedParams {
                    action: action.as_str(),
                    reason: "target_x must be finite".to_string(),
                });
            }
            run.camera.start_pan(target, duration);
            run.events.push(StageEvent::CameraPan { target, duration });
        }
    }
    Ok(())
}
