use crate::entity::{Entity, EntityId};
use crate::error::SceneError;
use crate::world::{EntityLocation, World};

/// Handle onto a live entity: its id plus the location it was resolved to.
///
/// Rebuilding an entity from a snapshot moves it to a new location. A proxy
/// resolved before the rebuild is stale: reads fail with
/// [`SceneError::StaleProxy`] until [`reload`](EntityProxy::reload) is
/// called, instead of silently reading whatever now occupies the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityProxy {
    id: EntityId,
    location: EntityLocation,
}

impl EntityProxy {
    /// Resolves a proxy for an existing entity.
    pub fn new(world: &World, id: EntityId) -> Result<Self, SceneError> {
        let location = world.resolve(id).ok_or(SceneError::EntityNotFound(id))?;
        Ok(Self { id, location })
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn location(&self) -> EntityLocation {
        self.location
    }

    /// Re-resolves the proxy after its entity was rebuilt.
    ///
    /// Fails with [`SceneError::EntityNotFound`] if the entity no longer
    /// exists; the proxy is left unchanged.
    pub fn reload(&mut self, world: &World) -> Result<(), SceneError> {
        self.location = world
            .resolve(self.id)
            .ok_or(SceneError::EntityNotFound(self.id))?;
        Ok(())
    }

    /// Returns `true` if the resolved location no longer holds this entity.
    pub fn is_stale(&self, world: &World) -> bool {
        world
            .get(self.location)
            .is_none_or(|entity| entity.id() != self.id)
    }

    pub fn entity<'w>(&self, world: &'w World) -> Result<&'w Entity, SceneError> {
        match world.get(self.location) {
            Some(entity) if entity.id() == self.id => Ok(entity),
            _ => Err(SceneError::StaleProxy(self.id)),
        }
    }

    pub fn entity_mut<'w>(&self, world: &'w mut World) -> Result<&'w mut Entity, SceneError> {
        match world.get_mut(self.location) {
            Some(entity) if entity.id() == self.id => Ok(entity),
            _ => Err(SceneError::StaleProxy(self.id)),
        }
    }
}
