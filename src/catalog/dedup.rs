use std::collections::HashMap;

use anyhow::{Context, Result};
use tracing::info;

use super::id_map::DestId;
use super::kind::EntityKind;
use super::DestinationCatalog;

/// Case-insensitive name → destination id index over the destination's tags,
/// studios and actors. Built once per run, then kept current as entities are created.
#[derive(Debug, Clone, Default)]
pub struct DedupCache {
    tags: HashMap<String, DestId>,
    studios: HashMap<String, DestId>,
    actors: HashMap<String, DestId>,
}

fn fold(name: &str) -> String {
    name.to_lowercase()
}

impl DedupCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// List the destination's current tags, studios and actors and index them by name.
    pub async fn prefetch<D>(dest: &D) -> Result<Self>
    where
        D: DestinationCatalog + ?Sized,
    {
        let mut cache = Self::new();

        let tags = dest
            .list_tags()
            .await
            .context("failed to fetch existing tags")?;
        info!(count = tags.len(), "found existing destination tags");
        for t in &tags {
            cache.insert(EntityKind::Tag, &t.name, t.id);
        }

        let studios = dest
            .list_studios()
            .await
            .context("failed to fetch existing studios")?;
        info!(count = studios.len(), "found existing destination studios");
        for s in &studios {
            cache.insert(EntityKind::Studio, &s.name, s.id);
        }

        let actors = dest
            .list_actors()
            .await
            .context("failed to fetch existing actors")?;
        info!(count = actors.len(), "found existing destination actors");
        for a in &actors {
            cache.insert(EntityKind::Actor, &a.name, a.id);
        }

        Ok(cache)
    }

    fn index(&self, kind: EntityKind) -> Option<&HashMap<String, DestId>> {
        match kind {
            EntityKind::Tag => Some(&self.tags),
            EntityKind::Studio => Some(&self.studios),
            EntityKind::Actor => Some(&self.actors),
            EntityKind::Scene | EntityKind::Marker => None,
        }
    }

    fn index_mut(&mut self, kind: EntityKind) -> Option<&mut HashMap<String, DestId>> {
        match kind {
            EntityKind::Tag => Some(&mut self.tags),
            EntityKind::Studio => Some(&mut self.studios),
            EntityKind::Actor => Some(&mut self.actors),
            EntityKind::Scene | EntityKind::Marker => None,
        }
    }

    pub fn lookup(&self, kind: EntityKind, name: &str) -> Option<DestId> {
        self.index(kind)?.get(&fold(name)).copied()
    }

    /// Index `name` for `kind`. Scenes and markers have no name index, so the
    /// call is a no-op for them.
    pub fn insert(&mut self, kind: EntityKind, name: &str, id: DestId) {
        if let Some(index) = self.index_mut(kind) {
            index.insert(fold(name), id);
        }
    }
}
