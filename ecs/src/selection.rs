use crate::entity::EntityId;
use crate::error::SceneError;
use crate::proxy::EntityProxy;
use crate::world::World;

/// Ordered set of selected entities, held as proxies.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    proxies: Vec<EntityProxy>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entity at the end of the selection.
    ///
    /// Returns `false` if it was already selected.
    pub fn select(&mut self, world: &World, id: EntityId) -> Result<bool, SceneError> {
        if self.contains(id) {
            return Ok(false);
        }
        self.proxies.push(EntityProxy::new(world, id)?);
        Ok(true)
    }

    /// Removes an entity from the selection.
    pub fn deselect(&mut self, id: EntityId) -> bool {
        let len = self.proxies.len();
        self.proxies.retain(|p| p.id() != id);
        self.proxies.len() != len
    }

    pub fn clear(&mut self) {
        self.proxies.clear();
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.proxies.iter().any(|p| p.id() == id)
    }

    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }

    pub fn proxies(&self) -> &[EntityProxy] {
        &self.proxies
    }

    /// Selected ids in selection order.
    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.proxies.iter().map(EntityProxy::id)
    }

    /// Reloads every proxy, dropping entities that no longer exist.
    ///
    /// Returns the number of dropped entities.
    pub fn reload_all(&mut self, world: &World) -> usize {
        let len = self.proxies.len();
        self.proxies.retain_mut(|proxy| match proxy.reload(world) {
            Ok(()) => true,
            Err(err) => {
                log::debug!("Dropping entity from selection: {err}");
                false
            }
        });
        len - self.proxies.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_keeps_order_and_uniqueness() {
        let mut world = World::new();
        let a = world.spawn(Vec::new()).unwrap();
        let b = world.spawn(Vec::new()).unwrap();

        let mut selection = Selection::new();
        assert!(selection.select(&world, b).unwrap());
        assert!(selection.select(&world, a).unwrap());
        assert!(!selection.select(&world, b).unwrap());
        assert_eq!(selection.ids().collect::<Vec<_>>(), vec![b, a]);

        assert!(selection.deselect(b));
        assert!(!selection.deselect(b));
        assert_eq!(selection.len(), 1);

        let ghost = EntityId::new();
        assert!(selection.select(&world, ghost).is_err());
    }

    #[test]
    fn reload_all_drops_deleted_entities() {
        let mut world = World::new();
        let a = world.spawn(Vec::new()).unwrap();
        let b = world.spawn(Vec::new()).unwrap();
        let mut selection = Selection::new();
        selection.select(&world, a).unwrap();
        selection.select(&world, b).unwrap();

        world.delete_entity(a);
        assert_eq!(selection.reload_all(&world), 1);
        assert_eq!(selection.ids().collect::<Vec<_>>(), vec![b]);
        assert!(!selection.proxies()[0].is_stale(&world));
    }
}
