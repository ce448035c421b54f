use tracing::info;

use super::{Importer, PhaseStats, Progress};
use crate::catalog::model::SourceTag;
use crate::catalog::payload::NewTag;
use crate::catalog::{DestinationCatalog, EntityKind};

impl<D: DestinationCatalog + ?Sized> Importer<'_, D> {
    pub(super) async fn import_tags(&mut self, tags: &[SourceTag]) -> PhaseStats {
        let kind = EntityKind::Tag;
        let mut stats = PhaseStats::default();
        info!(phase = %kind, count = tags.len(), "importing tags");

        for (i, tag) in tags.iter().enumerate() {
            let at = Progress::new(i, tags.len());
            if self.already_resolved(kind, &mut stats, at, &tag.id, &tag.name) {
                continue;
            }

            let dest = self.dest;
            let req = NewTag {
                name: tag.name.clone(),
                color: None,
            };
            self.create_or_adopt(kind, &mut stats, at, &tag.id, &tag.name, move || async move {
                dest.create_tag(&req).await
            })
            .await;
        }

        stats
    }
}
