pub mod dedup;
pub mod error;
pub mod id_map;
pub mod kind;
pub mod model;
pub mod page;
pub mod path_map;
pub mod payload;

#[cfg(test)]
pub(crate) mod fake;

pub use dedup::DedupCache;
pub use error::{DestinationError, ErrorClass};
pub use id_map::{DestId, IdMap};
pub use kind::EntityKind;
pub use model::SourceInventory;
pub use path_map::{MappedPath, NoPathMapping, PathMapper, PathRule};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::info;

use model::{SourcePerformer, SourceScene, SourceStudio, SourceTag};
use payload::{
    Created, ImportedScene, MarkerImport, NamedEntity, NewActor, NewStudio, NewTag, SceneImport,
};

/// Read-only source catalog. Each call returns a complete snapshot.
#[async_trait]
pub trait SourceCatalog: Send + Sync {
    async fn fetch_tags(&self) -> Result<Vec<SourceTag>>;
    async fn fetch_studios(&self) -> Result<Vec<SourceStudio>>;
    async fn fetch_performers(&self) -> Result<Vec<SourcePerformer>>;
    async fn fetch_scenes(&self) -> Result<Vec<SourceScene>>;
}

/// Mutable destination catalog.
#[async_trait]
pub trait DestinationCatalog: Send + Sync {
    async fn authenticate(&mut self, username: &str, password: &str) -> Result<()>;

    async fn list_tags(&self) -> Result<Vec<NamedEntity>>;
    async fn create_tag(&self, req: &NewTag) -> Result<Created, DestinationError>;

    async fn list_studios(&self) -> Result<Vec<NamedEntity>>;
    async fn create_studio(&self, req: &NewStudio) -> Result<Created, DestinationError>;
    async fn update_studio_parent(
        &self,
        studio_id: DestId,
        parent_id: DestId,
    ) -> Result<(), DestinationError>;

    async fn list_actors(&self) -> Result<Vec<NamedEntity>>;
    async fn create_actor(&self, req: &NewActor) -> Result<Created, DestinationError>;

    async fn import_scene(&self, req: &SceneImport) -> Result<ImportedScene, DestinationError>;
    async fn set_scene_tags(
        &self,
        scene_id: DestId,
        tag_ids: &[DestId],
    ) -> Result<(), DestinationError>;
    async fn set_scene_actors(
        &self,
        scene_id: DestId,
        actor_ids: &[DestId],
    ) -> Result<(), DestinationError>;
    async fn set_scene_studio(
        &self,
        scene_id: DestId,
        studio_id: DestId,
    ) -> Result<(), DestinationError>;

    async fn import_marker(&self, req: &MarkerImport) -> Result<Created, DestinationError>;
    async fn set_marker_tags(
        &self,
        marker_id: DestId,
        tag_ids: &[DestId],
    ) -> Result<(), DestinationError>;
}

/// Fetch the whole source inventory up front; any failure is fatal to the run.
pub async fn fetch_inventory<S>(source: &S) -> Result<SourceInventory>
where
    S: SourceCatalog + ?Sized,
{
    let tags = source
        .fetch_tags()
        .await
        .context("failed to fetch source tags")?;
    info!(count = tags.len(), "found source tags");

    let studios = source
        .fetch_studios()
        .await
        .context("failed to fetch source studios")?;
    info!(count = studios.len(), "found source studios");

    let performers = source
        .fetch_performers()
        .await
        .context("failed to fetch source performers")?;
    info!(count = performers.len(), "found source performers");

    let scenes = source
        .fetch_scenes()
        .await
        .context("failed to fetch source scenes")?;
    info!(count = scenes.len(), "found source scenes");

    Ok(SourceInventory {
        tags,
        studios,
        performers,
        scenes,
    })
}
