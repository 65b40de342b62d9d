//! Zone catalog
//!
//! `stages.json` maps zone names to ordered stage lists:
//! `{ "City": [ {"name": "Downtown", "id": "city_1"} ] }`.
//! Zone order is the authored order.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::StageLoadError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageEntry {
    pub name: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    pub name: String,
    pub stages: Vec<StageEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageCatalog {
    zones: Vec<Zone>,
}

impl<'de> Deserialize<'de> for StageCatalog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ZonesVisitor;

        impl<'de> Visitor<'de> for ZonesVisitor {
            type Value = StageCatalog;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of zone names to stage lists")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<StageCatalog, A::Error> {
                let mut zones = Vec::new();
                while let Some((name, stages)) = map.next_entry::<String, Vec<StageEntry>>()? {
                    zones.push(Zone { name, stages });
                }
                Ok(StageCatalog { zones })
            }
        }

        deserializer.deserialize_map(ZonesVisitor)
    }
}

impl StageCatalog {
    pub fn from_json(json: &str) -> Result<Self, StageLoadError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, StageLoadError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&json)
    }

    pub fn zones(&self) -> impl Iterator<Item = &str> {
        self.zones.iter().map(|z| z.name.as_str())
    }

    /// Stages of `zone` in play order; empty for an unknown zone
    pub fn stages(&self, zone: &str) -> &[StageEntry] {
        self.zones
            .iter()
            .find(|z| z.name == zone)
            .map(|z| z.stages.as_slice())
            .unwrap_or(&[])
    }

    /// Zone name and entry for a stage id
    pub fn find(&self, id: &str) -> Option<(&str, &StageEntry)> {
        self.zones.iter().find_map(|z| {
            z.stages
                .iter()
                .find(|s| s.id == id)
                .map(|s| (z.name.as_str(), s))
        })
    }

    /// Stage after `id` within its zone
    pub fn next_after(&self, id: &str) -> Option<&StageEntry> {
        let (zone, _) = self.find(id)?;
        let stages = self.stages(zone);
        let pos = stages.iter().position(|s| s.id == id)?;
        stages.get(pos + 1)
    }
}

/// Stage data lives next to the catalog as `<id>.json`
pub fn stage_path(data_dir: impl AsRef<Path>, id: &str) -> PathBuf {
    data_dir.as_ref().join(format!("{id}.json"))
}
