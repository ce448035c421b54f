use tracing::{debug, info};

use super::{Importer, PhaseStats, Progress};
use crate::catalog::model::{SourceMarker, SourceScene};
use crate::catalog::payload::MarkerImport;
use crate::catalog::{DestId, DestinationCatalog, EntityKind};

const MARKER_COLOR: &str = "#FFFFFF";

impl<D: DestinationCatalog + ?Sized> Importer<'_, D> {
    /// Markers are grouped under their scene. A scene that never made it into
    /// the id map has all of its markers skipped without a create attempt.
    pub(super) async fn import_markers(&mut self, scenes: &[SourceScene]) -> PhaseStats {
        let kind = EntityKind::Marker;
        let mut stats = PhaseStats::default();
        let total: usize = scenes.iter().map(|s| s.scene_markers.len()).sum();
        info!(phase = %kind, count = total, "importing markers");

        let mut position = 0;
        for scene in scenes {
            let Some(scene_id) = self.id_map.get(EntityKind::Scene, &scene.id) else {
                if !scene.scene_markers.is_empty() {
                    debug!(
                        phase = %kind,
                        scene_source_id = %scene.id,
                        count = scene.scene_markers.len(),
                        "scene not mapped; skipping its markers"
                    );
                }
                position += scene.scene_markers.len();
                stats.skipped += scene.scene_markers.len();
                continue;
            };

            for marker in &scene.scene_markers {
                let at = Progress::new(position, total);
                position += 1;
                if self.already_resolved(kind, &mut stats, at, &marker.id, &marker.title) {
                    continue;
                }

                let dest = self.dest;
                let req = self.marker_import(scene_id, marker);
                let Some(created) = self
                    .create_or_adopt(
                        kind,
                        &mut stats,
                        at,
                        &marker.id,
                        &marker.title,
                        move || async move { dest.import_marker(&req).await },
                    )
                    .await
                else {
                    continue;
                };

                let tag_ids = self.id_map.resolve_all(EntityKind::Tag, marker.tag_refs());
                if !tag_ids.is_empty() {
                    let call = self.dest.set_marker_tags(created.id, &tag_ids);
                    self.associate(kind, at, "marker tags", call).await;
                }
            }
        }

        stats
    }

    fn marker_import(&self, scene_id: DestId, marker: &SourceMarker) -> MarkerImport {
        MarkerImport {
            scene_id,
            user_id: self.options.marker_user_id,
            timestamp: marker.seconds.trunc() as i64,
            label: marker.title.clone(),
            color: MARKER_COLOR.to_string(),
        }
    }
}
