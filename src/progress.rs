//! Save and achievement context
//!
//! [`Progress`] is the persistent player profile: coins, weapon unlocks,
//! per-stage bests and achievements. The engine never touches disk; it hands
//! a [`StageCompletion`] to a [`CompletionSink`] and the host decides what to
//! persist. `Progress` round-trips through JSON for that purpose.

use std::collections::BTreeMap;

use log::info;
use serde::{Deserialize, Serialize};

use crate::sim::state::StageStats;
use crate::sim::weapons::WeaponKind;

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Victory,
    Defeat,
}

/// Result of a finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageCompletion {
    pub stage_id: String,
    pub outcome: Outcome,
    pub score: i64,
    pub coins: u32,
    pub rescues: u32,
    /// 0 on defeat, 1-3 on victory
    pub stars: u8,
    /// Stage seconds played
    pub time: f64,
    pub stats: StageStats,
}

/// Receives stage completions
pub trait CompletionSink {
    fn stage_completed(&mut self, completion: &StageCompletion);
}

/// Collecting completions is handy for hosts that persist in batches
impl CompletionSink for Vec<StageCompletion> {
    fn stage_completed(&mut self, completion: &StageCompletion) {
        self.push(completion.clone());
    }
}

/// Star rating for a victory.
///
/// One for finishing, one for 70% accuracy without losing a hostage, one for
/// finishing inside 90% of the stage duration having taken at most 1 damage.
pub fn calculate_stars(stats: &StageStats, time: f64, duration: f64) -> u8 {
    let mut stars = 1;
    if stats.accuracy() >= 0.7 && stats.hostages_lost == 0 {
        stars += 1;
    }
    if time <= duration * 0.9 && stats.damage_taken <= 1.0 {
        stars += 1;
    }
    stars
}

pub struct Achievement {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub condition: fn(&StageStats) -> bool,
}

pub const ACHIEVEMENTS: [Achievement; 3] = [
    Achievement {
        id: "no_miss_50",
        name: "No-Miss 50",
        description: "Finish a stage with 50 consecutive hits.",
        condition: |s| s.best_combo >= 50,
    },
    Achievement {
        id: "pacifist_rescue",
        name: "Pacifist Rescue",
        description: "Save all civilians in a stage without shooting them.",
        condition: |s| s.hostages_saved > 0 && s.hostages_lost == 0,
    },
    Achievement {
        id: "explosive_expert",
        name: "Explosive Expert",
        description: "Defeat three enemies with barrels in one stage.",
        condition: |s| s.barrel_multi_kill >= 3,
    },
];

/// Best result recorded for a stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageRecord {
    pub stars: u8,
    pub score: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Progress {
    pub coins: u64,
    pub weapons: BTreeMap<String, bool>,
    pub completed_stages: BTreeMap<String, StageRecord>,
    pub achievements: BTreeMap<String, bool>,
}

impl Default for Progress {
    fn default() -> Self {
        let weapons = WeaponKind::ALL
            .iter()
            .map(|w| (w.as_str().to_string(), *w == WeaponKind::Pistol))
            .collect();
        Self {
            coins: 0,
            weapons,
            completed_stages: BTreeMap::new(),
            achievements: BTreeMap::new(),
        }
    }
}

impl Progress {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Unlocked weapons, pistol always included
    pub fn unlocked_weapons(&self) -> Vec<WeaponKind> {
        WeaponKind::ALL
            .into_iter()
            .filter(|w| {
                *w == WeaponKind::Pistol || self.weapons.get(w.as_str()).copied().unwrap_or(false)
            })
            .collect()
    }

    pub fn unlock_weapon(&mut self, weapon: WeaponKind) {
        self.weapons.insert(weapon.as_str().to_string(), true);
    }

    pub fn is_unlocked(&self, id: &str) -> bool {
        self.achievements.get(id).copied().unwrap_or(false)
    }

    /// Keep the better stars and score independently
    pub fn record_stage(&mut self, stage_id: &str, stars: u8, score: i64) {
        let record = self
            .completed_stages
            .entry(stage_id.to_string())
            .or_insert(StageRecord { stars, score });
        record.stars = record.stars.max(stars);
        record.score = record.score.max(score);
    }

    /// Unlock every achievement `stats` earns; returns the newly unlocked ids
    pub fn evaluate_achievements(&mut self, stats: &StageStats) -> Vec<&'static str> {
        let mut unlocked = Vec::new();
        for achievement in &ACHIEVEMENTS {
            if (achievement.condition)(stats) && !self.is_unlocked(achievement.id) {
                self.achievements.insert(achievement.id.to_string(), true);
                info!("Achievement unlocked: {}", achievement.name);
                unlocked.push(achievement.id);
            }
        }
        unlocked
    }
}

impl CompletionSink for Progress {
    /// Only victories are recorded and pay out
    fn stage_completed(&mut self, completion: &StageCompletion) {
        if completion.outcome != Outcome::Victory {
            return;
        }
        self.evaluate_achievements(&completion.stats);
        self.record_stage(&completion.stage_id, completion.stars, completion.score);
        self.coins = self.coins.saturating_add(u64::from(completion.coins));
    }
}
