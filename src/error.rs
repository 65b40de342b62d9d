//! Error types for stage loading, timeline playback and player intents.
//!
//! Load errors surface to the caller. Event and intent errors never abort a
//! run: they are logged and, for events, kept as diagnostics on the run.

use std::io;

/// Failure to turn stage data into a playable [`crate::stage::StageDescriptor`].
#[derive(thiserror::Error, Debug)]
pub enum StageLoadError {
    #[error("Malformed stage: {0}")]
    Malformed(String),

    #[error("Unknown timeline action '{action}' at event {index}")]
    UnknownAction { index: usize, action: String },

    #[error("Unknown enemy type '{kind}' at event {index}")]
    UnknownEnemyType { index: usize, kind: String },

    #[error("Stage JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl StageLoadError {
    /// Whether the offending event could be skipped instead of failing the load
    pub fn is_skippable(&self) -> bool {
        matches!(
            self,
            StageLoadError::UnknownAction { .. } | StageLoadError::UnknownEnemyType { .. }
        )
    }
}

/// A timeline event that could not be applied at fire time.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum EventError {
    #[error("Malformed params for '{action}': {reason}")]
    MalformedParams { action: &'static str, reason: String },

    #[error("Unknown enemy type '{0}'")]
    UnknownEnemyType(String),

    #[error("Unknown powerup kind '{0}'")]
    UnknownPowerup(String),
}

/// A player intent that was rejected without changing state.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentError {
    #[error("Weapon slot {0} does not exist")]
    NoSuchSlot(u8),

    #[error("Weapon slot {0} is locked")]
    LockedWeapon(u8),

    #[error("Weapon slot {0} is already active")]
    AlreadyActive(u8),

    #[error("Cannot fire from cover")]
    InCover,

    #[error("Magazine empty")]
    NoAmmo,

    #[error("Reload in progress")]
    Reloading,

    #[error("Weapon cooling down")]
    Cooldown,

    #[error("Magazine already full")]
    MagazineFull,
}

/// A swallowed runtime error, kept on the run for inspection.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// Timeline index of the offending event
    pub event_index: usize,
    /// Stage time at which it fired
    pub time: f64,
    pub error: EventError,
}
