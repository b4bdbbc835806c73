use scenedit_core::abstract_editor::Editable;

use crate::cloner::{Cloner, DeepCloner};
use crate::component::Component;
use crate::components::register_std_components;
use crate::entity::EntityId;
use crate::error::SceneError;
use crate::scheme::{ClonePolicy, EntityScheme, IdentityPolicy};
use crate::selection::Selection;
use crate::world::World;

/// The editable document: entity world, cloner and selection.
///
/// This is the target type of every undoable scene action. Rebuilding an
/// entity through [`rebuild`](Scene::rebuild) reloads the selection, so
/// selected entities stay selected across undo/redo.
#[derive(Debug)]
pub struct Scene {
    world: World,
    cloner: Box<dyn Cloner>,
    selection: Selection,
}

impl Editable for Scene {}

impl Scene {
    /// Creates an empty scene with the standard components registered.
    pub fn new() -> Self {
        let mut world = World::new();
        register_std_components(&mut world);
        Self::with_world(world, Box::new(DeepCloner::new()))
    }

    pub fn with_world(world: World, cloner: Box<dyn Cloner>) -> Self {
        Self {
            world,
            cloner,
            selection: Selection::new(),
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable world access.
    ///
    /// Deleting or rebuilding entities through this reference leaves the
    /// selection stale; call [`reload_selection`](Scene::reload_selection).
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn cloner(&self) -> &dyn Cloner {
        self.cloner.as_ref()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Creates an entity with a fresh id.
    pub fn spawn(&mut self, components: Vec<Box<dyn Component>>) -> Result<EntityId, SceneError> {
        let id = self.world.spawn(components)?;
        self.world.refresh_indices();
        Ok(id)
    }

    /// Deletes an entity and drops it from the selection.
    pub fn despawn(&mut self, id: EntityId) -> bool {
        let removed = self.world.delete_entity(id).is_some();
        if removed {
            self.selection.deselect(id);
            self.world.refresh_indices();
        }
        removed
    }

    pub fn select(&mut self, id: EntityId) -> Result<bool, SceneError> {
        self.selection.select(&self.world, id)
    }

    pub fn deselect(&mut self, id: EntityId) -> bool {
        self.selection.deselect(id)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Replaces the selection. Unknown ids are skipped.
    pub fn set_selection(&mut self, ids: impl IntoIterator<Item = EntityId>) {
        self.selection.clear();
        for id in ids {
            if let Err(err) = self.selection.select(&self.world, id) {
                log::warn!("Cannot select entity: {err}");
            }
        }
    }

    /// Selected ids in selection order.
    pub fn selected_ids(&self) -> Vec<EntityId> {
        self.selection.ids().collect()
    }

    pub fn reload_selection(&mut self) -> usize {
        self.selection.reload_all(&self.world)
    }

    /// Captures one entity.
    pub fn capture(&self, id: EntityId, policy: ClonePolicy) -> Result<EntityScheme, SceneError> {
        let entity = self.world.entity(id).ok_or(SceneError::EntityNotFound(id))?;
        Ok(EntityScheme::cloned_of(entity, self.cloner.as_ref(), policy))
    }

    /// Captures every selected entity, in selection order.
    pub fn capture_selection(&self, policy: ClonePolicy) -> Vec<EntityScheme> {
        self.selection
            .proxies()
            .iter()
            .filter_map(|proxy| match proxy.entity(&self.world) {
                Ok(entity) => Some(EntityScheme::cloned_of(entity, self.cloner.as_ref(), policy)),
                Err(err) => {
                    log::warn!("Skipping selected entity: {err}");
                    None
                }
            })
            .collect()
    }

    /// Rebuilds an entity from a scheme and reloads the selection.
    pub fn rebuild(
        &mut self,
        scheme: &EntityScheme,
        identity: IdentityPolicy,
    ) -> Result<EntityId, SceneError> {
        let result = scheme.build(&mut self.world, self.cloner.as_ref(), identity);
        self.selection.reload_all(&self.world);
        result
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
