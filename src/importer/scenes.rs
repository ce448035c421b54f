use tracing::{debug, error, info};

use super::{Importer, PhaseStats, Progress};
use crate::catalog::model::{SourceFile, SourceScene};
use crate::catalog::payload::SceneImport;
use crate::catalog::{DestId, DestinationCatalog, EntityKind, MappedPath};

const ORIGIN: &str = "stash";

fn non_blank(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.trim().is_empty())
}

impl<D: DestinationCatalog + ?Sized> Importer<'_, D> {
    pub(super) async fn import_scenes(&mut self, scenes: &[SourceScene]) -> PhaseStats {
        let kind = EntityKind::Scene;
        let mut stats = PhaseStats::default();
        info!(phase = %kind, count = scenes.len(), "importing scenes");

        for (i, scene) in scenes.iter().enumerate() {
            let at = Progress::new(i, scenes.len());
            let title = scene.display_title();
            if self.already_resolved(kind, &mut stats, at, &scene.id, &title) {
                continue;
            }

            let Some(file) = scene.files.first() else {
                error!(phase = %kind, source_id = %scene.id, "{at} scene has no files; skipping");
                stats.errors += 1;
                continue;
            };

            let mapped = match self.paths.translate(&file.path) {
                Ok(mapped) => mapped,
                Err(err) => {
                    error!(
                        phase = %kind,
                        source_id = %scene.id,
                        error = %err,
                        "{at} skipping scene"
                    );
                    stats.errors += 1;
                    continue;
                }
            };

            let req = self.scene_import(scene, file, &mapped, &title);
            let requested_studio = req.studio_id;

            let dest = self.dest;
            let Some(imported) = self
                .create_or_adopt(
                    kind,
                    &mut stats,
                    at,
                    &scene.id,
                    &title,
                    move || async move { dest.import_scene(&req).await },
                )
                .await
            else {
                continue;
            };

            self.associate_scene(scene, imported.id, requested_studio, imported.studio_id, at)
                .await;
        }

        stats
    }

    fn scene_import(
        &self,
        scene: &SourceScene,
        file: &SourceFile,
        mapped: &MappedPath,
        title: &str,
    ) -> SceneImport {
        // A studio that was never resolved is simply left off.
        let studio_id = scene
            .studio
            .as_ref()
            .and_then(|s| self.id_map.get(EntityKind::Studio, &s.id));
        if studio_id.is_none() {
            if let Some(s) = &scene.studio {
                debug!(
                    source_id = %scene.id,
                    studio = %s.id,
                    "studio not mapped; importing without it"
                );
            }
        }

        SceneImport {
            title: title.to_string(),
            stored_path: mapped.destination_path.clone(),
            original_filename: file.basename.clone(),
            size: file.size,
            duration: file.duration.round() as i64,
            width: file.width,
            height: file.height,
            frame_rate: file.frame_rate,
            bit_rate: file.bit_rate,
            video_codec: file.video_codec.clone(),
            audio_codec: file.audio_codec.clone(),
            description: non_blank(&scene.details),
            release_date: non_blank(&scene.date),
            studio_id,
            storage_path_id: mapped.storage_location(),
            origin: ORIGIN.to_string(),
            skip_file_check: self.options.skip_file_check,
        }
    }

    async fn associate_scene(
        &self,
        scene: &SourceScene,
        scene_id: DestId,
        requested_studio: Option<DestId>,
        reported_studio: Option<DestId>,
        at: Progress,
    ) {
        let kind = EntityKind::Scene;

        let tag_ids = self
            .id_map
            .resolve_all(EntityKind::Tag, scene.tags.iter().map(|t| t.id.as_str()));
        if !tag_ids.is_empty() {
            self.associate(kind, at, "tags", self.dest.set_scene_tags(scene_id, &tag_ids))
                .await;
        }

        let actor_ids = self.id_map.resolve_all(
            EntityKind::Actor,
            scene.performers.iter().map(|p| p.id.as_str()),
        );
        if !actor_ids.is_empty() {
            let call = self.dest.set_scene_actors(scene_id, &actor_ids);
            self.associate(kind, at, "actors", call).await;
        }

        if let (Some(studio_id), None) = (requested_studio, reported_studio) {
            let call = self.dest.set_scene_studio(scene_id, studio_id);
            self.associate(kind, at, "studio", call).await;
        }
    }
}
