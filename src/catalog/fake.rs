//! In-memory catalogs for engine tests.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;

use super::error::DestinationError;
use super::id_map::DestId;
use super::model::{SourceInventory, SourcePerformer, SourceScene, SourceStudio, SourceTag};
use super::payload::{
    Created, ImportedScene, MarkerImport, NamedEntity, NewActor, NewStudio, NewTag, SceneImport,
};
use super::{DestinationCatalog, SourceCatalog};

/// Scripted failure for a create call, keyed by entity name (tag/studio/actor),
/// stored path (scene) or label (marker).
#[derive(Debug, Clone)]
pub enum Scripted {
    Conflict(Option<DestId>),
    Server,
    Client,
}

impl Scripted {
    fn to_error(&self) -> DestinationError {
        match self {
            Scripted::Conflict(existing_id) => DestinationError::Conflict {
                existing_id: *existing_id,
                message: "already exists".into(),
            },
            Scripted::Server => DestinationError::Server {
                status: 503,
                body: "unavailable".into(),
            },
            Scripted::Client => DestinationError::Client {
                status: 422,
                body: "invalid".into(),
            },
        }
    }
}

#[derive(Debug, Default)]
pub struct FakeState {
    next_id: DestId,
    pub tags: Vec<NamedEntity>,
    pub studios: Vec<NamedEntity>,
    pub actors: Vec<NamedEntity>,
    pub created_studios: Vec<NewStudio>,
    pub created_actors: Vec<NewActor>,
    pub scenes: Vec<(DestId, SceneImport)>,
    pub markers: Vec<(DestId, MarkerImport)>,
    pub studio_parents: HashMap<DestId, DestId>,
    pub scene_tags: HashMap<DestId, Vec<DestId>>,
    pub scene_actors: HashMap<DestId, Vec<DestId>>,
    pub scene_studios: HashMap<DestId, DestId>,
    pub marker_tags: HashMap<DestId, Vec<DestId>>,
    /// Every mutating call, in order, e.g. `create_tag:Anal`.
    pub mutations: Vec<String>,
    failures: HashMap<String, Scripted>,
    association_failures: bool,
    report_scene_studio: bool,
}

impl FakeState {
    fn next_id(&mut self) -> DestId {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Debug, Default)]
pub struct FakeDestination {
    pub state: Mutex<FakeState>,
}

impl FakeDestination {
    pub fn new() -> Self {
        let dest = Self::default();
        dest.state.lock().unwrap().next_id = 100;
        dest
    }

    pub fn with_tag(self, name: &str, id: DestId) -> Self {
        self.state.lock().unwrap().tags.push(NamedEntity {
            id,
            name: name.into(),
        });
        self
    }

    pub fn with_studio(self, name: &str, id: DestId) -> Self {
        self.state.lock().unwrap().studios.push(NamedEntity {
            id,
            name: name.into(),
        });
        self
    }

    pub fn with_actor(self, name: &str, id: DestId) -> Self {
        self.state.lock().unwrap().actors.push(NamedEntity {
            id,
            name: name.into(),
        });
        self
    }

    pub fn fail(self, key: &str, how: Scripted) -> Self {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert(key.into(), how);
        self
    }

    pub fn fail_associations(self) -> Self {
        self.state.lock().unwrap().association_failures = true;
        self
    }

    /// Echo the requested studio back in scene import responses.
    pub fn reporting_scene_studio(self) -> Self {
        self.state.lock().unwrap().report_scene_studio = true;
        self
    }

    pub fn mutations(&self) -> Vec<String> {
        self.state.lock().unwrap().mutations.clone()
    }

    pub fn mutation_count(&self, prefix: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .mutations
            .iter()
            .filter(|m| m.starts_with(prefix))
            .count()
    }

    fn create_named(
        &self,
        which: fn(&mut FakeState) -> &mut Vec<NamedEntity>,
        call: &str,
        name: &str,
    ) -> Result<Created, DestinationError> {
        let mut st = self.state.lock().unwrap();
        st.mutations.push(format!("{call}:{name}"));
        if let Some(how) = st.failures.get(name) {
            return Err(how.to_error());
        }
        let lower = name.to_lowercase();
        if which(&mut *st).iter().any(|e| e.name.to_lowercase() == lower) {
            return Err(DestinationError::Conflict {
                existing_id: None,
                message: format!("{name} already exists"),
            });
        }
        let id = st.next_id();
        which(&mut *st).push(NamedEntity {
            id,
            name: name.into(),
        });
        Ok(Created { id })
    }

    fn associate(&self, call: String) -> Result<(), DestinationError> {
        let mut st = self.state.lock().unwrap();
        st.mutations.push(call);
        if st.association_failures {
            return Err(DestinationError::Client {
                status: 400,
                body: "association rejected".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DestinationCatalog for FakeDestination {
    async fn authenticate(&mut self, _username: &str, _password: &str) -> Result<()> {
        Ok(())
    }

    async fn list_tags(&self) -> Result<Vec<NamedEntity>> {
        Ok(self.state.lock().unwrap().tags.clone())
    }

    async fn create_tag(&self, req: &NewTag) -> Result<Created, DestinationError> {
        self.create_named(|s| &mut s.tags, "create_tag", &req.name)
    }

    async fn list_studios(&self) -> Result<Vec<NamedEntity>> {
        Ok(self.state.lock().unwrap().studios.clone())
    }

    async fn create_studio(&self, req: &NewStudio) -> Result<Created, DestinationError> {
        let created = self.create_named(|s| &mut s.studios, "create_studio", &req.name)?;
        self.state.lock().unwrap().created_studios.push(req.clone());
        Ok(created)
    }

    async fn update_studio_parent(
        &self,
        studio_id: DestId,
        parent_id: DestId,
    ) -> Result<(), DestinationError> {
        self.associate(format!("update_studio_parent:{studio_id}"))?;
        self.state
            .lock()
            .unwrap()
            .studio_parents
            .insert(studio_id, parent_id);
        Ok(())
    }

    async fn list_actors(&self) -> Result<Vec<NamedEntity>> {
        Ok(self.state.lock().unwrap().actors.clone())
    }

    async fn create_actor(&self, req: &NewActor) -> Result<Created, DestinationError> {
        let created = self.create_named(|s| &mut s.actors, "create_actor", &req.name)?;
        self.state.lock().unwrap().created_actors.push(req.clone());
        Ok(created)
    }

    async fn import_scene(&self, req: &SceneImport) -> Result<ImportedScene, DestinationError> {
        let mut st = self.state.lock().unwrap();
        st.mutations.push(format!("import_scene:{}", req.stored_path));
        if let Some(how) = st.failures.get(&req.stored_path) {
            return Err(how.to_error());
        }
        let id = st.next_id();
        st.scenes.push((id, req.clone()));
        let studio_id = if st.report_scene_studio {
            req.studio_id
        } else {
            None
        };
        Ok(ImportedScene { id, studio_id })
    }

    async fn set_scene_tags(
        &self,
        scene_id: DestId,
        tag_ids: &[DestId],
    ) -> Result<(), DestinationError> {
        self.associate(format!("set_scene_tags:{scene_id}"))?;
        self.state
            .lock()
            .unwrap()
            .scene_tags
            .insert(scene_id, tag_ids.to_vec());
        Ok(())
    }

    async fn set_scene_actors(
        &self,
        scene_id: DestId,
        actor_ids: &[DestId],
    ) -> Result<(), DestinationError> {
        self.associate(format!("set_scene_actors:{scene_id}"))?;
        self.state
            .lock()
            .unwrap()
            .scene_actors
            .insert(scene_id, actor_ids.to_vec());
        Ok(())
    }

    async fn set_scene_studio(
        &self,
        scene_id: DestId,
        studio_id: DestId,
    ) -> Result<(), DestinationError> {
        self.associate(format!("set_scene_studio:{scene_id}"))?;
        self.state
            .lock()
            .unwrap()
            .scene_studios
            .insert(scene_id, studio_id);
        Ok(())
    }

    async fn import_marker(&self, req: &MarkerImport) -> Result<Created, DestinationError> {
        let mut st = self.state.lock().unwrap();
        st.mutations.push(format!("import_marker:{}", req.label));
        if let Some(how) = st.failures.get(&req.label) {
            return Err(how.to_error());
        }
        let id = st.next_id();
        st.markers.push((id, req.clone()));
        Ok(Created { id })
    }

    async fn set_marker_tags(
        &self,
        marker_id: DestId,
        tag_ids: &[DestId],
    ) -> Result<(), DestinationError> {
        self.associate(format!("set_marker_tags:{marker_id}"))?;
        self.state
            .lock()
            .unwrap()
            .marker_tags
            .insert(marker_id, tag_ids.to_vec());
        Ok(())
    }
}

/// Source catalog serving a fixed inventory.
#[derive(Debug, Default)]
pub struct FakeSource {
    pub inventory: SourceInventory,
    pub fail_scenes: bool,
}

#[async_trait]
impl SourceCatalog for FakeSource {
    async fn fetch_tags(&self) -> Result<Vec<SourceTag>> {
        Ok(self.inventory.tags.clone())
    }

    async fn fetch_studios(&self) -> Result<Vec<SourceStudio>> {
        Ok(self.inventory.studios.clone())
    }

    async fn fetch_performers(&self) -> Result<Vec<SourcePerformer>> {
        Ok(self.inventory.performers.clone())
    }

    async fn fetch_scenes(&self) -> Result<Vec<SourceScene>> {
        if self.fail_scenes {
            anyhow::bail!("graphql errors: scenes unavailable");
        }
        Ok(self.inventory.scenes.clone())
    }
}
