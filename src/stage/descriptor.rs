//! Stage descriptor loading
//!
//! Turns stage JSON into an immutable [`StageDescriptor`]. Loading is a pure
//! transform: either a complete descriptor comes back or an error does.
//!
//! The timeline is stably sorted by trigger time so the director can walk it
//! with a single cursor; events sharing a time keep their authored order.

use std::path::Path;

use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::StageLoadError;
use crate::settings::{Difficulty, LoadPolicy};
use crate::sim::enemies::EnemyRegistry;

/// Timeline actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    Spawn,
    Hostage,
    Powerup,
    Barrel,
    Crate,
    Boss,
    CameraPan,
}

impl EventAction {
    pub const ALL: [EventAction; 7] = [
        EventAction::Spawn,
        EventAction::Hostage,
        EventAction::Powerup,
        EventAction::Barrel,
        EventAction::Crate,
        EventAction::Boss,
        EventAction::CameraPan,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventAction::Spawn => "spawn",
            EventAction::Hostage => "hostage",
            EventAction::Powerup => "powerup",
            EventAction::Barrel => "barrel",
            EventAction::Crate => "crate",
            EventAction::Boss => "boss",
            EventAction::CameraPan => "camera_pan",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == s)
    }
}

/// One scripted event. Params stay raw until the event fires.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineEvent {
    /// Seconds from stage start
    pub time: f64,
    pub action: EventAction,
    pub params: Map<String, Value>,
}

/// Win conditions beyond reaching the end of the rail
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageObjectives {
    /// Hostages that must be rescued
    pub min_rescues: u32,
    /// Every enemy must be down
    pub clear_enemies: bool,
}

/// Incoming damage multipliers per difficulty
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyTable {
    #[serde(rename = "Easy")]
    pub easy: f32,
    #[serde(rename = "Normal")]
    pub normal: f32,
    #[serde(rename = "Hard")]
    pub hard: f32,
}

impl Default for DifficultyTable {
    fn default() -> Self {
        Self {
            easy: Difficulty::Easy.default_multiplier(),
            normal: Difficulty::Normal.default_multiplier(),
            hard: Difficulty::Hard.default_multiplier(),
        }
    }
}

impl DifficultyTable {
    pub fn multiplier(&self, difficulty: Difficulty) -> f32 {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Normal => self.normal,
            Difficulty::Hard => self.hard,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StageDescriptor {
    pub id: String,
    pub zone: String,
    pub background: String,
    pub music: String,
    /// Sorted by trigger time, ties in authored order
    pub timeline: Vec<TimelineEvent>,
    /// Seconds
    pub duration: f64,
    pub difficulty: DifficultyTable,
    pub objectives: StageObjectives,
}

/// Top-level shape; every field is type-checked by hand so a wrong type is
/// reported as `Malformed` rather than a JSON syntax error
#[derive(Deserialize)]
struct RawStage {
    id: Option<Value>,
    zone: Option<Value>,
    background: Option<Value>,
    music: Option<Value>,
    timeline: Option<Value>,
    duration: Option<Value>,
    difficulty: Option<Value>,
    objectives: Option<Value>,
}

fn malformed(msg: impl Into<String>) -> StageLoadError {
    StageLoadError::Malformed(msg.into())
}

/// Optional string field; null counts as absent
fn string_field(value: Option<Value>, name: &str) -> Result<Option<String>, StageLoadError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(malformed(format!("{name} must be a string"))),
    }
}

/// Optional nested table, defaulted when absent
fn table_field<T: DeserializeOwned + Default>(
    value: Option<Value>,
    name: &str,
) -> Result<T, StageLoadError> {
    match value {
        None | Some(Value::Null) => Ok(T::default()),
        Some(v) => serde_json::from_value(v).map_err(|e| malformed(format!("{name}: {e}"))),
    }
}

/// Check one authored timeline entry
fn parse_event(
    index: usize,
    entry: &Value,
    registry: &EnemyRegistry,
) -> Result<TimelineEvent, StageLoadError> {
    let obj = entry
        .as_object()
        .ok_or_else(|| malformed(format!("event {index} is not an object")))?;

    let time = obj
        .get("time")
        .and_then(Value::as_f64)
        .ok_or_else(|| malformed(format!("event {index} has no numeric time")))?;
    if !time.is_finite() || time < 0.0 {
        return Err(malformed(format!("event {index} has invalid time {time}")));
    }

    let action_name = obj
        .get("action")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed(format!("event {index} has no action")))?;
    let action = EventAction::parse(action_name).ok_or_else(|| StageLoadError::UnknownAction {
        index,
        action: action_name.to_string(),
    })?;

    let params = match obj.get("params") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(map)) => map.clone(),
        Some(_) => return Err(malformed(format!("event {index} params is not an object"))),
    };

    // Non-string types are left for the director to reject at fire time
    if action == EventAction::Spawn {
        if let Some(kind) = params.get("type").and_then(Value::as_str) {
            if !registry.contains(kind) {
                return Err(StageLoadError::UnknownEnemyType {
                    index,
                    kind: kind.to_string(),
                });
            }
        }
    }

    Ok(TimelineEvent {
        time,
        action,
        params,
    })
}

impl StageDescriptor {
    /// Parse and validate a stage, failing on the first bad event
    pub fn from_json(json: &str, registry: &EnemyRegistry) -> Result<Self, StageLoadError> {
        Self::load(json, registry, LoadPolicy::Strict).map(|(stage, _)| stage)
    }

    /// Parse a stage, dropping events with unknown actions or enemy types.
    ///
    /// Returns the descriptor plus one error per dropped event. Structural
    /// problems still fail the load.
    pub fn from_json_lenient(
        json: &str,
        registry: &EnemyRegistry,
    ) -> Result<(Self, Vec<StageLoadError>), StageLoadError> {
        Self::load(json, registry, LoadPolicy::Lenient)
    }

    /// Parse a stage under `policy`
    pub fn load(
        json: &str,
        registry: &EnemyRegistry,
        policy: LoadPolicy,
    ) -> Result<(Self, Vec<StageLoadError>), StageLoadError> {
        let root: Value = serde_json::from_str(json)?;
        if !root.is_object() {
            return Err(malformed("stage is not an object"));
        }
        let raw: RawStage =
            serde_json::from_value(root).map_err(|e| malformed(e.to_string()))?;

        let id = string_field(raw.id, "id")?.ok_or_else(|| malformed("missing id"))?;
        let entries = match raw.timeline {
            None | Some(Value::Null) => return Err(malformed("missing timeline")),
            Some(Value::Array(entries)) => entries,
            Some(_) => return Err(malformed("timeline must be an array")),
        };
        let duration = raw
            .duration
            .ok_or_else(|| malformed("missing duration"))?
            .as_f64()
            .filter(|d| d.is_finite() && *d >= 0.0)
            .ok_or_else(|| malformed("duration must be a non-negative number"))?;
        let zone = string_field(raw.zone, "zone")?;
        let background = string_field(raw.background, "background")?;
        let music = string_field(raw.music, "music")?;
        let difficulty: DifficultyTable = table_field(raw.difficulty, "difficulty")?;
        let objectives: StageObjectives = table_field(raw.objectives, "objectives")?;

        let mut timeline = Vec::with_capacity(entries.len());
        let mut skipped = Vec::new();
        for (index, entry) in entries.iter().enumerate() {
            match parse_event(index, entry, registry) {
                Ok(event) => timeline.push(event),
                Err(err) if err.is_skippable() && policy == LoadPolicy::Lenient => {
                    warn!("Stage {id}: skipping event: {err}");
                    skipped.push(err);
                }
                Err(err) => return Err(err),
            }
        }

        // Stable: ties keep authored order
        timeline.sort_by(|a, b| a.time.total_cmp(&b.time));

        let stage = StageDescriptor {
            id,
            zone: zone.unwrap_or_else(|| "City".to_string()),
            background: background.unwrap_or_else(|| "city".to_string()),
            music: music.unwrap_or_else(|| "city_theme.ogg".to_string()),
            timeline,
            duration,
            difficulty,
            objectives,
        };
        info!(
            "Loaded stage {} ({} events, {:.1}s)",
            stage.id,
            stage.timeline.len(),
            stage.duration
        );
        Ok((stage, skipped))
    }

    /// Whether the timeline contains a boss encounter
    pub fn has_boss(&self) -> bool {
        self.timeline.iter().any(|e| e.action == EventAction::Boss)
    }
}

/// Read and parse a stage file
pub fn load_stage_file(
    path: impl AsRef<Path>,
    registry: &EnemyRegistry,
    policy: LoadPolicy,
) -> Result<(StageDescriptor, Vec<StageLoadError>), StageLoadError> {
    let json = std::fs::read_to_string(path.as_ref())?;
    StageDescriptor::load(&json, registry, policy)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> EnemyRegistry {
        EnemyRegistry::default()
    }

    #[test]
    fn test_parses_and_defaults() {
        let json = r#"{
            "id": "city_1",
            "timeline": [
                {"time": 1.0, "action": "spawn", "params": {"type": "grunt"}},
                {"time": 3.0, "action": "powerup", "params": {"kind": "rapid"}}
            ],
            "duration": 20.0
        }"#;
        let stage = StageDescriptor::from_json(json, &registry()).unwrap();
        assert_eq!(stage.id, "city_1");
        assert_eq!(stage.zone, "City");
        assert_eq!(stage.background, "city");
        assert_eq!(stage.music, "city_theme.ogg");
        assert_eq!(stage.timeline.len(), 2);
        assert_eq!(stage.duration, 20.0);
        assert_eq!(stage.difficulty.multiplier(Difficulty::Hard), 1.2);
        assert_eq!(stage.objectives, StageObjectives::default());
        assert!(!stage.has_boss());
    }

    #[test]
    fn test_missing_required_fields() {
        let cases = [
            r#"{"timeline": [], "duration": 5.0}"#,
            r#"{"id": "a", "duration": 5.0}"#,
            r#"{"id": "a", "timeline": []}"#,
            r#"{"id": "a", "timeline": [], "duration": -1.0}"#,
            r#"{"id": "a", "timeline": [], "duration": "long"}"#,
            r#"{"id": "a", "timeline": [{"action": "spawn"}], "duration": 5.0}"#,
            r#"{"id": "a", "timeline": [{"time": -2.0, "action": "spawn"}], "duration": 5.0}"#,
            r#"{"id": 7, "timeline": [], "duration": 5.0}"#,
            r#"{"id": "a", "timeline": {}, "duration": 5.0}"#,
            r#"{"id": "a", "timeline": "none", "duration": 5.0}"#,
            r#"{"id": "a", "zone": 3, "timeline": [], "duration": 5.0}"#,
            r#"{"id": "a", "timeline": [], "duration": 5.0, "objectives": {"min_rescues": -1}}"#,
            r#"{"id": "a", "timeline": [], "duration": 5.0, "difficulty": "hard"}"#,
            "[]",
        ];
        for json in cases {
            let err = StageDescriptor::from_json(json, &registry()).unwrap_err();
            assert!(matches!(err, StageLoadError::Malformed(_)), "{json}: {err}");
        }
    }

    #[test]
    fn test_invalid_json() {
        let err = StageDescriptor::from_json("{not json", &registry()).unwrap_err();
        assert!(matches!(err, StageLoadError::Json(_)));
    }

    #[test]
    fn test_unknown_action_and_enemy() {
        let json = r#"{"id": "a", "duration": 5.0, "timeline": [
            {"time": 1.0, "action": "teleport"}
        ]}"#;
        match StageDescriptor::from_json(json, &registry()) {
            Err(StageLoadError::UnknownAction { index, action }) => {
                assert_eq!(index, 0);
                assert_eq!(action, "teleport");
            }
            other => panic!("unexpected {other:?}"),
        }

        let json = r#"{"id": "a", "duration": 5.0, "timeline": [
            {"time": 1.0, "action": "spawn", "params": {"type": "grunt"}},
            {"time": 2.0, "action": "spawn", "params": {"type": "dragon"}}
        ]}"#;
        match StageDescriptor::from_json(json, &registry()) {
            Err(StageLoadError::UnknownEnemyType { index, kind }) => {
                assert_eq!(index, 1);
                assert_eq!(kind, "dragon");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_lenient_skips_bad_events() {
        let json = r#"{"id": "a", "duration": 5.0, "timeline": [
            {"time": 1.0, "action": "teleport"},
            {"time": 2.0, "action": "spawn", "params": {"type": "dragon"}},
            {"time": 3.0, "action": "hostage"}
        ]}"#;
        let (stage, skipped) = StageDescriptor::from_json_lenient(json, &registry()).unwrap();
        assert_eq!(stage.timeline.len(), 1);
        assert_eq!(stage.timeline[0].action, EventAction::Hostage);
        assert_eq!(skipped.len(), 2);

        // Structural errors are still fatal
        let json = r#"{"id": "a", "timeline": []}"#;
        assert!(StageDescriptor::from_json_lenient(json, &registry()).is_err());
    }

    #[test]
    fn test_stable_sort_keeps_authored_ties() {
        let json = r#"{"id": "a", "duration": 10.0, "timeline": [
            {"time": 5.0, "action": "barrel", "params": {"x": 1}},
            {"time": 2.0, "action": "crate", "params": {"x": 2}},
            {"time": 5.0, "action": "barrel", "params": {"x": 3}},
            {"time": 0.0, "action": "camera_pan"}
        ]}"#;
        let stage = StageDescriptor::from_json(json, &registry()).unwrap();
        let order: Vec<_> = stage
            .timeline
            .iter()
            .map(|e| (e.time, e.params.get("x").and_then(Value::as_i64)))
            .collect();
        assert_eq!(
            order,
            vec![(0.0, None), (2.0, Some(2)), (5.0, Some(1)), (5.0, Some(3))]
        );
    }

    #[test]
    fn test_custom_difficulty_and_objectives() {
        let json = r#"{"id": "a", "duration": 5.0, "timeline": [{"time": 4.0, "action": "boss"}],
            "difficulty": {"Hard": 1.5},
            "objectives": {"min_rescues": 2}}"#;
        let stage = StageDescriptor::from_json(json, &registry()).unwrap();
        assert_eq!(stage.difficulty.multiplier(Difficulty::Hard), 1.5);
        assert_eq!(stage.difficulty.multiplier(Difficulty::Easy), 0.9);
        assert_eq!(stage.objectives.min_rescues, 2);
        assert!(!stage.objectives.clear_enemies);
        assert!(stage.has_boss());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_stage_file("does/not/exist.json", &registry(), LoadPolicy::Strict)
            .unwrap_err();
        assert!(matches!(err, StageLoadError::Io(_)));
    }
}
