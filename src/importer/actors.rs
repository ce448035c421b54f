use tracing::info;

use super::{Importer, PhaseStats, Progress};
use crate::catalog::model::SourcePerformer;
use crate::catalog::{DestinationCatalog, EntityKind};
use crate::normalization::performer::new_actor;

impl<D: DestinationCatalog + ?Sized> Importer<'_, D> {
    pub(super) async fn import_actors(&mut self, performers: &[SourcePerformer]) -> PhaseStats {
        let kind = EntityKind::Actor;
        let mut stats = PhaseStats::default();
        info!(phase = %kind, count = performers.len(), "importing performers");

        for (i, performer) in performers.iter().enumerate() {
            let at = Progress::new(i, performers.len());
            if self.already_resolved(kind, &mut stats, at, &performer.id, &performer.name) {
                continue;
            }

            let dest = self.dest;
            let req = new_actor(performer);
            self.create_or_adopt(
                kind,
                &mut stats,
                at,
                &performer.id,
                &performer.name,
                move || async move { dest.create_actor(&req).await },
            )
            .await;
        }

        stats
    }
}
