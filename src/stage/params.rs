//! Typed params for each timeline action
//!
//! Params are decoded when the event fires, not at load time, so a bad
//! position or duration only costs that one event.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::descriptor::EventAction;
use crate::consts::{
    DEFAULT_CRATE_COINS, DEFAULT_POWERUP_DURATION, DEFAULT_SPAWN_X, GROUND_Y, POWERUP_LIFT,
};
use crate::error::EventError;
use crate::sim::boss::BOSS_HEALTH;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpawnParams {
    #[serde(rename = "type")]
    pub kind: String,
    pub x: f32,
    pub y: f32,
}

impl Default for SpawnParams {
    fn default() -> Self {
        Self {
            kind: "grunt".to_string(),
            x: DEFAULT_SPAWN_X,
            y: GROUND_Y,
        }
    }
}

/// Position-only params (hostage, barrel)
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlacementParams {
    pub x: f32,
    pub y: f32,
}

impl Default for PlacementParams {
    fn default() -> Self {
        Self {
            x: DEFAULT_SPAWN_X,
            y: GROUND_Y,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PowerupParams {
    pub kind: String,
    pub duration: f32,
    pub x: f32,
    pub y: f32,
}

impl Default for PowerupParams {
    fn default() -> Self {
        Self {
            kind: "rapid".to_string(),
            duration: DEFAULT_POWERUP_DURATION,
            x: DEFAULT_SPAWN_X,
            y: GROUND_Y - POWERUP_LIFT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct CrateParams {
    pub coins: u32,
    pub x: f32,
    pub y: f32,
}

impl Default for CrateParams {
    fn default() -> Self {
        Self {
            coins: DEFAULT_CRATE_COINS,
            x: DEFAULT_SPAWN_X,
            y: GROUND_Y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct BossParams {
    pub health: f32,
}

impl Default for BossParams {
    fn default() -> Self {
        Self {
            health: BOSS_HEALTH,
        }
    }
}

/// Missing fields fall back to camera-relative defaults at fire time
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraPanParams {
    pub target_x: Option<f32>,
    pub duration: Option<f32>,
}

/// Decode `params` into the typed shape for `action`
pub fn decode<T: DeserializeOwned>(
    action: EventAction,
    params: &Map<String, Value>,
) -> Result<T, EventError> {
    serde_json::from_value(Value::Object(params.clone())).map_err(|e| {
        EventError::MalformedParams {
            action: action.as_str(),
            reason: e.to_string(),
        }
    })
}

/// Reject non-finite or negative durations
pub fn check_duration(action: EventAction, duration: f32) -> Result<f32, EventError> {
    if duration.is_finite() && duration >= 0.0 {
        Ok(duration)
    } else {
        Err(EventError::MalformedParams {
            action: action.as_str(),
            reason: format!("duration {duration} must be a non-negative number"),
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn test_defaults_fill_missing_fields() {
        let spawn: SpawnParams = decode(EventAction::Spawn, &Map::new()).unwrap();
        assert_eq!(spawn, SpawnParams::default());
        assert_eq!(spawn.kind, "grunt");

        let powerup: PowerupParams =
            decode(EventAction::Powerup, &map(json!({"kind": "spread"}))).unwrap();
        assert_eq!(powerup.kind, "spread");
        assert_eq!(powerup.duration, 6.0);
        assert_eq!(powerup.y, 560.0);
    }

    #[test]
    fn test_integer_positions_accepted() {
        let spawn: SpawnParams =
            decode(EventAction::Spawn, &map(json!({"type": "sniper", "x": 1200, "y": 600})))
                .unwrap();
        assert_eq!(spawn.x, 1200.0);
        assert_eq!(spawn.y, 600.0);
    }

    #[test]
    fn test_wrong_types_are_malformed() {
        let err = decode::<PlacementParams>(EventAction::Hostage, &map(json!({"x": "left"})))
            .unwrap_err();
        assert!(matches!(err, EventError::MalformedParams { action: "hostage", .. }));

        let err =
            decode::<CrateParams>(EventAction::Crate, &map(json!({"coins": -3}))).unwrap_err();
        assert!(matches!(err, EventError::MalformedParams { action: "crate", .. }));
    }

    #[test]
    fn test_duration_check() {
        assert_eq!(check_duration(EventAction::Powerup, 0.0), Ok(0.0));
        assert!(check_duration(EventAction::Powerup, -1.0).is_err());
        assert!(check_duration(EventAction::CameraPan, f32::NAN).is_err());
    }
}
