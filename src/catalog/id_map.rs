//! Persistent source-id → destination-id cross reference, one table per entity kind.
//!
//! Tables are append-only: once a source id is mapped it keeps that destination id
//! for the life of the file. Loading a missing file yields an empty map, which is
//! what makes a first run and a resumed run look the same to the importer.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::kind::EntityKind;

pub type DestId = u64;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IdMap {
    pub tags: BTreeMap<String, DestId>,
    pub studios: BTreeMap<String, DestId>,
    pub actors: BTreeMap<String, DestId>,
    pub scenes: BTreeMap<String, DestId>,
    pub markers: BTreeMap<String, DestId>,
}

impl IdMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the map from `path`; a missing file is an empty map, not an error.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Self::new()),
            Err(err) => {
                return Err(err).with_context(|| format!("failed to read id map {}", path.display()))
            }
        };
        // `null` tables decode as empty through `Option`.
        let partial: PartialIdMap = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse id map {}", path.display()))?;
        Ok(partial.into())
    }

    /// Replace `path` with the pretty-printed map, written to a sibling `.tmp`
    /// file and renamed over `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut body = serde_json::to_string_pretty(self).context("failed to encode id map")?;
        body.push('\n');
        let tmp = staging_path(path);
        fs::write(&tmp, body)
            .with_context(|| format!("failed to write id map {}", tmp.display()))?;
        fs::rename(&tmp, path).with_context(|| {
            format!("failed to move {} into {}", tmp.display(), path.display())
        })
    }

    fn table(&self, kind: EntityKind) -> &BTreeMap<String, DestId> {
        match kind {
            EntityKind::Tag => &self.tags,
            EntityKind::Studio => &self.studios,
            EntityKind::Actor => &self.actors,
            EntityKind::Scene => &self.scenes,
            EntityKind::Marker => &self.markers,
        }
    }

    fn table_mut(&mut self, kind: EntityKind) -> &mut BTreeMap<String, DestId> {
        match kind {
            EntityKind::Tag => &mut self.tags,
            EntityKind::Studio => &mut self.studios,
            EntityKind::Actor => &mut self.actors,
            EntityKind::Scene => &mut self.scenes,
            EntityKind::Marker => &mut self.markers,
        }
    }

    pub fn get(&self, kind: EntityKind, source_id: &str) -> Option<DestId> {
        self.table(kind).get(source_id).copied()
    }

    pub fn contains(&self, kind: EntityKind, source_id: &str) -> bool {
        self.table(kind).contains_key(source_id)
    }

    /// Record `source_id → dest_id` unless the source id is already mapped.
    /// Zero is never a valid destination id and is refused.
    /// Returns whether a new entry was written.
    pub fn record(&mut self, kind: EntityKind, source_id: &str, dest_id: DestId) -> bool {
        if dest_id == 0 {
            return false;
        }
        let table = self.table_mut(kind);
        if table.contains_key(source_id) {
            return false;
        }
        table.insert(source_id.to_string(), dest_id);
        true
    }

    /// Resolve a list of source ids, silently dropping the ones not mapped.
    pub fn resolve_all<'a, I>(&self, kind: EntityKind, source_ids: I) -> Vec<DestId>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let table = self.table(kind);
        source_ids
            .into_iter()
            .filter_map(|id| table.get(id).copied())
            .collect()
    }

    pub fn len(&self, kind: EntityKind) -> usize {
        self.table(kind).len()
    }

    pub fn total(&self) -> usize {
        EntityKind::PHASE_ORDER.iter().map(|k| self.len(*k)).sum()
    }
}

#[derive(Debug, Default, Deserialize)]
struct PartialIdMap {
    #[serde(default)]
    tags: Option<BTreeMap<String, DestId>>,
    #[serde(default)]
    studios: Option<BTreeMap<String, DestId>>,
    #[serde(default)]
    actors: Option<BTreeMap<String, DestId>>,
    #[serde(default)]
    scenes: Option<BTreeMap<String, DestId>>,
    #[serde(default)]
    markers: Option<BTreeMap<String, DestId>>,
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

impl From<PartialIdMap> for IdMap {
    fn from(p: PartialIdMap) -> Self {
        Self {
            tags: p.tags.unwrap_or_default(),
            studios: p.studios.unwrap_or_default(),
            actors: p.actors.unwrap_or_default(),
            scenes: p.scenes.unwrap_or_default(),
            markers: p.markers.unwrap_or_default(),
        }
    }
}
