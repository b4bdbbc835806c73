use std::fmt;

use uuid::Uuid;

use crate::component::{Component, ComponentType};

/// Stable identity token of an entity.
///
/// Ids are random UUID v4 values minted by [`EntityId::new`]. They survive
/// snapshot rebuilds with [`IdentityPolicy::Preserve`](crate::IdentityPolicy),
/// which is what keeps selections and other references valid across
/// undo/redo.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(Uuid);

impl EntityId {
    /// Mints a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.simple(), f)
    }
}

/// A live entity: an id and its components, at most one per name.
///
/// Entities are owned by the [`World`](crate::World). Components are kept in
/// insertion order.
#[derive(Debug, Clone)]
pub struct Entity {
    id: EntityId,
    components: Vec<Box<dyn Component>>,
}

impl Entity {
    pub(crate) fn new(id: EntityId, components: Vec<Box<dyn Component>>) -> Self {
        Self { id, components }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Iterates over the components in insertion order.
    pub fn components(&self) -> impl Iterator<Item = &dyn Component> + '_ {
        self.components.iter().map(|c| c.as_ref())
    }

    /// Returns the names of all components.
    pub fn component_names(&self) -> Vec<&'static str> {
        self.components.iter().map(|c| c.component_name()).collect()
    }

    /// Returns the number of components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Returns `true` if a component with this name is attached.
    pub fn has(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Looks a component up by name.
    pub fn component(&self, name: &str) -> Option<&dyn Component> {
        self.position(name).map(|i| self.components[i].as_ref())
    }

    pub fn component_mut(&mut self, name: &str) -> Option<&mut dyn Component> {
        match self.position(name) {
            Some(i) => Some(self.components[i].as_mut()),
            None => None,
        }
    }

    /// Looks a component up by type.
    pub fn get<T: ComponentType>(&self) -> Option<&T> {
        self.component(T::NAME).and_then(|c| c.downcast_ref::<T>())
    }

    /// Looks a component up by type, mutably.
    ///
    /// Edits made through this reference are invisible to the undo history
    /// unless they happen inside an open
    /// [`SnapshotSession`](crate::SnapshotSession).
    pub fn get_mut<T: ComponentType>(&mut self) -> Option<&mut T> {
        self.component_mut(T::NAME)
            .and_then(|c| c.downcast_mut::<T>())
    }

    /// Attaches a component, returning the one it replaced.
    pub fn insert(&mut self, component: Box<dyn Component>) -> Option<Box<dyn Component>> {
        match self.position(component.component_name()) {
            Some(i) => Some(std::mem::replace(&mut self.components[i], component)),
            None => {
                self.components.push(component);
                None
            }
        }
    }

    /// Detaches the component with this name.
    pub fn remove(&mut self, name: &str) -> Option<Box<dyn Component>> {
        self.position(name).map(|i| self.components.remove(i))
    }

    #[cfg(test)]
    pub(crate) fn into_components(self) -> Vec<Box<dyn Component>> {
        self.components
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.components
            .iter()
            .position(|c| c.component_name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Flip, Name, Transform};

    fn entity() -> Entity {
        Entity::new(
            EntityId::new(),
            vec![Box::new(Transform::default()), Box::new(Name("a".into()))],
        )
    }

    #[test]
    fn ids_are_unique() {
        let a = EntityId::new();
        let b = EntityId::new();
        assert_ne!(a, b);
        assert_eq!(a, EntityId::from_uuid(*a.as_uuid()));
        assert_eq!(a.to_string().len(), 32);
    }

    #[test]
    fn lookup_by_name_and_type() {
        let mut e = entity();
        assert!(e.has("Transform"));
        assert!(!e.has("Flip"));
        assert_eq!(e.component_names(), vec!["Transform", "Name"]);

        e.get_mut::<Name>().unwrap().0 = "b".into();
        assert_eq!(e.get::<Name>().unwrap().0, "b");
        assert!(e.get::<Flip>().is_none());
    }

    #[test]
    fn insert_replaces_same_name() {
        let mut e = entity();
        assert!(e.insert(Box::new(Flip { x: true, y: false })).is_none());
        let old = e.insert(Box::new(Name("c".into()))).unwrap();
        assert_eq!(old.downcast_ref::<Name>().unwrap().0, "a");
        assert_eq!(e.len(), 3);

        let removed = e.remove("Flip").unwrap();
        assert!(removed.downcast_ref::<Flip>().unwrap().x);
        assert!(e.remove("Flip").is_none());
        assert_eq!(e.len(), 2);
    }
}
