//! Reconciliation engine.
//!
//! Runs the five phases in dependency order over a pre-fetched source
//! inventory. Every entity goes through the same decision ladder:
//!
//! 1. already in the id map: skipped
//! 2. (tags, studios, actors) name already present at the destination: mapped, skipped
//! 3. simulation: counted as created, nothing sent
//! 4. create; a conflict counts as skipped (mapped when the server names the
//!    existing id), any other failure counts as an error and the phase moves on
//!
//! The id map is checkpointed to disk after each phase.

mod actors;
mod markers;
mod scenes;
mod studios;
mod tags;

use std::fmt;
use std::future::Future;
use std::path::Path;

use tracing::{debug, error, info, warn};

use crate::catalog::payload::Identified;
use crate::catalog::{
    DedupCache, DestinationCatalog, DestinationError, EntityKind, ErrorClass, IdMap,
    PathMapper, SourceInventory,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
    /// Simulation mode: nothing is sent to the destination and the id map file
    /// is never written.
    pub dry_run: bool,
    pub skip_file_check: bool,
    /// Destination user that owns imported markers.
    pub marker_user_id: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseStats {
    pub created: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl PhaseStats {
    fn add(&mut self, other: PhaseStats) {
        self.created += other.created;
        self.skipped += other.skipped;
        self.errors += other.errors;
    }
}

/// Per-phase counters of one run, in phase order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    phases: Vec<(EntityKind, PhaseStats)>,
}

impl ImportSummary {
    fn record(&mut self, kind: EntityKind, stats: PhaseStats) {
        self.phases.push((kind, stats));
    }

    pub fn phase(&self, kind: EntityKind) -> PhaseStats {
        self.phases
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, s)| *s)
            .unwrap_or_default()
    }

    pub fn phases(&self) -> impl Iterator<Item = (EntityKind, PhaseStats)> + '_ {
        self.phases.iter().copied()
    }

    pub fn total(&self) -> PhaseStats {
        let mut total = PhaseStats::default();
        for (_, s) in &self.phases {
            total.add(*s);
        }
        total
    }
}

/// `[ 3/120]` style position marker for per-item log lines.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Progress {
    index: usize,
    total: usize,
}

impl Progress {
    pub(crate) fn new(zero_based: usize, total: usize) -> Self {
        Self {
            index: zero_based + 1,
            total,
        }
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.total.max(1).to_string().len();
        write!(f, "[{:>width$}/{}]", self.index, self.total, width = width)
    }
}

pub struct Importer<'a, D: DestinationCatalog + ?Sized> {
    dest: &'a D,
    paths: &'a PathMapper,
    id_map: IdMap,
    dedup: DedupCache,
    options: ImportOptions,
}

impl<'a, D: DestinationCatalog + ?Sized> Importer<'a, D> {
    pub fn new(
        dest: &'a D,
        paths: &'a PathMapper,
        id_map: IdMap,
        dedup: DedupCache,
        options: ImportOptions,
    ) -> Self {
        Self {
            dest,
            paths,
            id_map,
            dedup,
            options,
        }
    }

    pub fn id_map(&self) -> &IdMap {
        &self.id_map
    }

    /// Run every phase in order. Per-item failures are counted, never returned;
    /// a failed checkpoint is logged and the run continues.
    pub async fn run(
        &mut self,
        inventory: &SourceInventory,
        checkpoint: Option<&Path>,
    ) -> ImportSummary {
        let mut summary = ImportSummary::default();
        if self.options.dry_run {
            info!("simulation mode: no changes will be made");
        }

        for kind in EntityKind::PHASE_ORDER {
            let stats = match kind {
                EntityKind::Tag => self.import_tags(&inventory.tags).await,
                EntityKind::Studio => self.import_studios(&inventory.studios).await,
                EntityKind::Actor => self.import_actors(&inventory.performers).await,
                EntityKind::Scene => self.import_scenes(&inventory.scenes).await,
                EntityKind::Marker => self.import_markers(&inventory.scenes).await,
            };
            info!(
                phase = %kind,
                created = stats.created,
                skipped = stats.skipped,
                errors = stats.errors,
                "phase done"
            );
            summary.record(kind, stats);
            self.checkpoint(kind, checkpoint);
        }

        summary
    }

    fn checkpoint(&self, kind: EntityKind, path: Option<&Path>) {
        if self.options.dry_run {
            return;
        }
        let Some(path) = path else { return };
        match self.id_map.save(path) {
            Ok(()) => debug!(phase = %kind, path = %path.display(), "id map saved"),
            Err(err) => warn!(phase = %kind, error = %format!("{err:#}"), "failed to save id map"),
        }
    }

    /// Rules 1 and 2 of the decision ladder. Returns true when the entity needs
    /// no further work.
    fn already_resolved(
        &mut self,
        kind: EntityKind,
        stats: &mut PhaseStats,
        at: Progress,
        source_id: &str,
        name: &str,
    ) -> bool {
        if let Some(dest_id) = self.id_map.get(kind, source_id) {
            debug!(phase = %kind, source_id, dest_id, "{at} skipped (already mapped)");
            stats.skipped += 1;
            return true;
        }
        if !kind.is_named() {
            return false;
        }
        if let Some(dest_id) = self.dedup.lookup(kind, name) {
            self.id_map.record(kind, source_id, dest_id);
            info!(phase = %kind, source_id, dest_id, name, "{at} reused existing");
            stats.skipped += 1;
            return true;
        }
        false
    }

    /// Rules 3 and 4. Returns the create response only when this call created
    /// the entity, so callers know when to push associations.
    async fn create_or_adopt<T, F, Fut>(
        &mut self,
        kind: EntityKind,
        stats: &mut PhaseStats,
        at: Progress,
        source_id: &str,
        name: &str,
        create: F,
    ) -> Option<T>
    where
        T: Identified,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, DestinationError>>,
    {
        if self.options.dry_run {
            info!(phase = %kind, source_id, name, "{at} would create");
            stats.created += 1;
            return None;
        }

        match create().await {
            Ok(created) => {
                let dest_id = created.dest_id();
                self.id_map.record(kind, source_id, dest_id);
                self.dedup.insert(kind, name, dest_id);
                info!(phase = %kind, source_id, dest_id, name, "{at} created");
                stats.created += 1;
                Some(created)
            }
            Err(err) => {
                self.settle_failure(kind, stats, at, source_id, name, err);
                None
            }
        }
    }

    fn settle_failure(
        &mut self,
        kind: EntityKind,
        stats: &mut PhaseStats,
        at: Progress,
        source_id: &str,
        name: &str,
        err: DestinationError,
    ) {
        match err.class() {
            ErrorClass::Conflict => {
                match err.existing_id() {
                    Some(dest_id) => {
                        self.id_map.record(kind, source_id, dest_id);
                        info!(
                            phase = %kind,
                            source_id,
                            dest_id,
                            name,
                            "{at} skipped (conflict, already exists)"
                        );
                    }
                    None => {
                        info!(phase = %kind, source_id, name, "{at} skipped (conflict)");
                    }
                }
                stats.skipped += 1;
            }
            ErrorClass::Transient | ErrorClass::Permanent => {
                error!(phase = %kind, source_id, name, error = %err, "{at} failed");
                stats.errors += 1;
            }
        }
    }

    /// Fire-and-forget association call on an entity that already exists.
    async fn associate<Fut>(&self, kind: EntityKind, at: Progress, what: &str, call: Fut)
    where
        Fut: Future<Output = Result<(), DestinationError>>,
    {
        if let Err(err) = call.await {
            warn!(phase = %kind, error = %err, "{at} failed to set {what}");
        }
    }
}

#[cfg(test)]
pub(crate) mod testkit {
    use crate::catalog::model::{
        IdRef, SourceFile, SourceMarker, SourceScene, SourceStudio, SourceTag,
    };
    use crate::catalog::{PathMapper, PathRule};

    pub fn tag(id: &str, name: &str) -> SourceTag {
        SourceTag {
            id: id.into(),
            name: name.into(),
        }
    }

    pub fn studio(id: &str, name: &str, parent: Option<&str>) -> SourceStudio {
        SourceStudio {
            id: id.into(),
            name: name.into(),
            parent_studio: parent.map(IdRef::new),
            ..Default::default()
        }
    }

    pub fn scene(id: &str, path: &str) -> SourceScene {
        let basename = path.rsplit('/').next().unwrap_or(path).to_string();
        SourceScene {
            id: id.into(),
            files: vec![SourceFile {
                path: path.into(),
                basename,
                duration: 61.6,
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    pub fn marker(id: &str, title: &str, seconds: f64) -> SourceMarker {
        SourceMarker {
            id: id.into(),
            title: title.into(),
            seconds,
            ..Default::default()
        }
    }

    pub fn media_paths() -> PathMapper {
        PathMapper::new(vec![PathRule {
            source_prefix: "/mnt/media".into(),
            destination_prefix: "/data/videos".into(),
            storage_location_id: 3,
        }])
    }
}
