//! Stage data
//!
//! Read-only inputs to a run: the per-stage timeline descriptor and the zone
//! catalog that lists stages in play order.

pub mod catalog;
pub mod descriptor;
pub mod params;

pub use catalog::{StageCatalog, StageEntry, stage_path};
pub use descriptor::{
    DifficultyTable, EventAction, StageDescriptor, StageObjectives, TimelineEvent,
    load_stage_file,
};
