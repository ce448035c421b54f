use tracing::{info, warn};

use super::{Importer, PhaseStats, Progress};
use crate::catalog::model::SourceStudio;
use crate::catalog::payload::NewStudio;
use crate::catalog::{DestinationCatalog, EntityKind};
use crate::normalization::rating::studio_rating;

fn new_studio(studio: &SourceStudio) -> NewStudio {
    NewStudio {
        name: studio.name.clone(),
        url: studio.urls.first().cloned(),
        description: studio.details.clone().filter(|d| !d.trim().is_empty()),
        rating: studio_rating(studio.rating100),
    }
}

impl<D: DestinationCatalog + ?Sized> Importer<'_, D> {
    /// Two passes: create or map every studio, then link children to parents.
    pub(super) async fn import_studios(&mut self, studios: &[SourceStudio]) -> PhaseStats {
        let kind = EntityKind::Studio;
        let mut stats = PhaseStats::default();
        info!(phase = %kind, count = studios.len(), "importing studios");

        for (i, studio) in studios.iter().enumerate() {
            let at = Progress::new(i, studios.len());
            if self.already_resolved(kind, &mut stats, at, &studio.id, &studio.name) {
                continue;
            }

            let dest = self.dest;
            let req = new_studio(studio);
            self.create_or_adopt(
                kind,
                &mut stats,
                at,
                &studio.id,
                &studio.name,
                move || async move { dest.create_studio(&req).await },
            )
            .await;
        }

        let linked = self.link_parents(studios).await;
        if linked > 0 {
            if self.options.dry_run {
                info!(phase = %kind, count = linked, "would set parent relationships");
            } else {
                info!(phase = %kind, count = linked, "set parent relationships");
            }
        }

        stats
    }

    /// Parent links are associations: failures and unresolved parents are
    /// logged, never counted.
    async fn link_parents(&self, studios: &[SourceStudio]) -> usize {
        let kind = EntityKind::Studio;
        let mut linked = 0;

        for studio in studios {
            let Some(parent) = &studio.parent_studio else {
                continue;
            };
            let Some(child_id) = self.id_map.get(kind, &studio.id) else {
                continue;
            };
            let Some(parent_id) = self.id_map.get(kind, &parent.id) else {
                warn!(
                    phase = %kind,
                    source_id = %studio.id,
                    parent_source_id = %parent.id,
                    name = %studio.name,
                    "parent studio not mapped; skipping link"
                );
                continue;
            };

            if self.options.dry_run {
                linked += 1;
                continue;
            }

            match self.dest.update_studio_parent(child_id, parent_id).await {
                Ok(()) => linked += 1,
                Err(err) => warn!(
                    phase = %kind,
                    name = %studio.name,
                    error = %err,
                    "failed to set parent studio"
                ),
            }
        }

        linked
    }
}

#[cfg(test)]
mod tests {
    use super::super::testkit::*;
    use super::super::ImportOptions;
    use super::*;
    use crate::catalog::fake::FakeDestination;
    use crate::catalog::{DedupCache, IdMap};

    fn run_options(dry_run: bool) -> ImportOptions {
        ImportOptions {
            dry_run,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn child_is_linked_to_parent() {
        let dest = FakeDestination::new();
        let paths = media_paths();
        let mut imp = Importer::new(
            &dest,
            &paths,
            IdMap::new(),
            DedupCache::new(),
            run_options(false),
        );

        let stats = imp
            .import_studios(&[studio("1", "A", None), studio("2", "B", Some("1"))])
            .await;

        assert_eq!(stats, PhaseStats { created: 2, skipped: 0, errors: 0 });
        let a = imp.id_map().get(EntityKind::Studio, "1").unwrap();
        let b = imp.id_map().get(EntityKind::Studio, "2").unwrap();
        assert_eq!(dest.state.lock().unwrap().studio_parents.get(&b), Some(&a));
    }

    #[tokio::test]
    async fn parent_listed_after_child_is_still_linked() {
        let dest = FakeDestination::new();
        let paths = media_paths();
        let mut imp = Importer::new(
            &dest,
            &paths,
            IdMap::new(),
            DedupCache::new(),
            run_options(false),
        );

        imp.import_studios(&[studio("2", "B", Some("1")), studio("1", "A", None)])
            .await;

        let a = imp.id_map().get(EntityKind::Studio, "1").unwrap();
        let b = imp.id_map().get(EntityKind::Studio, "2").unwrap();
        assert_eq!(dest.state.lock().unwrap().studio_parents.get(&b), Some(&a));
    }

    #[tokio::test]
    async fn unresolved_parent_is_not_an_error() {
        let dest = FakeDestination::new();
        let paths = media_paths();
        let mut imp = Importer::new(
            &dest,
            &paths,
            IdMap::new(),
            DedupCache::new(),
            run_options(false),
        );

        let stats = imp.import_studios(&[studio("2", "B", Some("404"))]).await;

        assert_eq!(stats, PhaseStats { created: 1, skipped: 0, errors: 0 });
        assert_eq!(dest.mutation_count("update_studio_parent"), 0);
    }

    #[tokio::test]
    async fn failed_parent_link_is_only_a_warning() {
        let dest = FakeDestination::new().fail_associations();
        let paths = media_paths();
        let mut imp = Importer::new(
            &dest,
            &paths,
            IdMap::new(),
            DedupCache::new(),
            run_options(false),
        );

        let stats = imp
            .import_studios(&[studio("1", "A", None), studio("2", "B", Some("1"))])
            .await;

        assert_eq!(stats.errors, 0);
        assert_eq!(dest.mutation_count("update_studio_parent"), 1);
    }

    #[tokio::test]
    async fn studio_payload_carries_first_url_and_scaled_rating() {
        let dest = FakeDestination::new();
        let paths = media_paths();
        let mut imp = Importer::new(
            &dest,
            &paths,
            IdMap::new(),
            DedupCache::new(),
            run_options(false),
        );
        let mut s = studio("1", "A", None);
        s.urls = vec!["https://a.example".into(), "https://b.example".into()];
        s.rating100 = Some(60);
        s.details = Some("studio blurb".into());

        imp.import_studios(&[s]).await;

        let st = dest.state.lock().unwrap();
        let sent = &st.created_studios[0];
        assert_eq!(sent.url.as_deref(), Some("https://a.example"));
        assert_eq!(sent.rating, Some(3.0));
        assert_eq!(sent.description.as_deref(), Some("studio blurb"));
    }

    #[tokio::test]
    async fn existing_destination_studio_is_reused_as_parent() {
        let dest = FakeDestination::new().with_studio("acme", 40);
        let dedup = DedupCache::prefetch(&dest).await.unwrap();
        let paths = media_paths();
        let mut imp = Importer::new(&dest, &paths, IdMap::new(), dedup, run_options(false));

        let stats = imp
            .import_studios(&[studio("1", "Acme", None), studio("2", "Acme East", Some("1"))])
            .await;

        assert_eq!(stats, PhaseStats { created: 1, skipped: 1, errors: 0 });
        assert_eq!(imp.id_map().get(EntityKind::Studio, "1"), Some(40));
        assert_eq!(dest.mutation_count("create_studio"), 1);
        let b = imp.id_map().get(EntityKind::Studio, "2").unwrap();
        assert_eq!(dest.state.lock().unwrap().studio_parents.get(&b), Some(&40));
    }
}
