//! Engine tuning and difficulty
//!
//! Loaded from JSON; every field has a default so partial files work.

use serde::{Deserialize, Serialize};

/// Difficulty levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "norm" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Multiplier used when a stage does not define its own table
    pub fn default_multiplier(&self) -> f32 {
        match self {
            Difficulty::Easy => 0.9,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 1.2,
        }
    }
}

/// How the loader treats skippable timeline errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LoadPolicy {
    /// Unknown actions or enemy types fail the load
    #[default]
    Strict,
    /// Unknown actions or enemy types are dropped with a warning
    Lenient,
}

/// Engine tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub difficulty: Difficulty,
    pub load_policy: LoadPolicy,

    // === Player ===
    pub player_max_health: f32,
    /// Incoming damage multiplier while in cover
    pub cover_damage_multiplier: f32,
    /// Incoming damage multiplier while the armor powerup runs
    pub armor_damage_multiplier: f32,
    /// Seconds without a hit before the combo resets
    pub combo_window: f32,

    // === Powerups ===
    /// Enemy time scale while the slow powerup runs
    pub slow_time_scale: f32,
    /// Fire-rate cooldown multiplier while the rapid powerup runs
    pub rapid_cooldown_multiplier: f32,
    /// Health restored by a health powerup
    pub health_pickup_amount: f32,

    // === Stage flow ===
    /// Intro falls through to Playing after this long if the presenter never signals
    pub intro_fallback: f32,
    /// Pan duration when a camera_pan event omits one
    pub default_pan_duration: f32,
    /// Actors whose right edge is this far behind the camera are dropped
    pub offrail_margin: f32,
    /// Max random jitter added to initial enemy attack cooldowns
    pub attack_jitter: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,
            load_policy: LoadPolicy::Strict,

            player_max_health: 5.0,
            cover_damage_multiplier: 0.25,
            armor_damage_multiplier: 0.5,
            combo_window: 2.0,

            slow_time_scale: 0.6,
            rapid_cooldown_multiplier: 0.5,
            health_pickup_amount: 2.0,

            intro_fallback: 3.0,
            default_pan_duration: 1.0,
            offrail_margin: 200.0,
            attack_jitter: 0.25,
        }
    }
}

impl EngineConfig {
    /// Parse a config from JSON, falling back to defaults for missing fields
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = EngineConfig::from_json(r#"{"difficulty": "Hard", "combo_window": 3.0}"#)
            .unwrap();
        assert_eq!(config.difficulty, Difficulty::Hard);
        assert_eq!(config.combo_window, 3.0);
        assert_eq!(config.player_max_health, 5.0);
        assert_eq!(config.load_policy, LoadPolicy::Strict);
    }

    #[test]
    fn test_difficulty_parse() {
        assert_eq!(Difficulty::parse("HARD"), Some(Difficulty::Hard));
        assert_eq!(Difficulty::parse("nightmare"), None);
        assert_eq!(Difficulty::Easy.as_str(), "Easy");
    }
}
