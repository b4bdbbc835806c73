use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use crate::component::{Component, ComponentType};
use crate::entity::{Entity, EntityId};
use crate::error::SceneError;

/// Validation hook run before a component is attached.
type Validator = Box<dyn Fn(&dyn Component) -> Result<(), String>>;

/// Registry entry for one component type, keyed by name.
struct Registration {
    /// Creates a default instance.
    create: fn() -> Box<dyn Component>,
    /// Rejects component data that violates the type's invariants.
    validator: Option<Validator>,
}

fn create_default<T: ComponentType + Default>() -> Box<dyn Component> {
    Box::new(T::default())
}

/// Where an entity currently lives: slot index plus slot generation.
///
/// A location goes stale when its entity is deleted, even if the slot is
/// later reused. Rebuilding an entity from a snapshot always invalidates
/// its location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityLocation {
    slot: u32,
    generation: u32,
}

impl EntityLocation {
    pub fn slot(&self) -> u32 {
        self.slot
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

#[derive(Default)]
struct Slot {
    generation: u32,
    entity: Option<Entity>,
}

/// Arena-of-slots entity engine.
///
/// Entities are addressed by their stable [`EntityId`]; the id resolves to
/// a slot. Deleting an entity bumps its slot's generation and pushes the
/// slot on a LIFO free list, so a delete immediately followed by a create
/// lands in the same slot with a new generation.
///
/// Only registered component types can be attached. Registration also
/// provides default construction by name ([`instantiate`](World::instantiate)).
///
/// # Example
///
/// ```
/// use scenedit_ecs::World;
/// use scenedit_ecs::components::{Name, Transform};
///
/// let mut world = World::new();
/// world.register_component::<Transform>();
/// world.register_component::<Name>();
///
/// let id = world
///     .spawn(vec![Box::new(Transform::default()), Box::new(Name("player".into()))])
///     .unwrap();
/// world.refresh_indices();
///
/// assert_eq!(world.entities_with("Name"), &[id]);
/// assert_eq!(world.entity(id).unwrap().get::<Name>().unwrap().0, "player");
/// ```
pub struct World {
    slots: Vec<Slot>,
    free: Vec<u32>,
    by_id: HashMap<EntityId, u32>,
    /// Derived index: component name → entities carrying it, in slot order.
    by_component: HashMap<&'static str, Vec<EntityId>>,
    indices_dirty: bool,
    registry: BTreeMap<&'static str, Registration>,
}

impl World {
    /// Creates an empty world with no registered components.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            by_id: HashMap::new(),
            by_component: HashMap::new(),
            indices_dirty: false,
            registry: BTreeMap::new(),
        }
    }

    // ---- Component registry ----

    /// Registers a component type. Re-registering keeps the existing entry.
    pub fn register_component<T: ComponentType + Default>(&mut self) {
        self.registry.entry(T::NAME).or_insert(Registration {
            create: create_default::<T>,
            validator: None,
        });
    }

    /// Installs a validator for a registered component type.
    ///
    /// Returns `false` if the type is not registered.
    pub fn register_validator<T: ComponentType>(
        &mut self,
        validator: impl Fn(&T) -> Result<(), String> + 'static,
    ) -> bool {
        let Some(registration) = self.registry.get_mut(T::NAME) else {
            return false;
        };
        registration.validator = Some(Box::new(move |component: &dyn Component| {
            match component.downcast_ref::<T>() {
                Some(component) => validator(component),
                None => Err(format!("expected a `{}`", T::NAME)),
            }
        }));
        true
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.registry.contains_key(name)
    }

    /// Registered component names in sorted order.
    pub fn registered_components(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.registry.keys().copied()
    }

    /// Creates a default instance of a registered component.
    pub fn instantiate(&self, name: &str) -> Result<Box<dyn Component>, SceneError> {
        let registration = self
            .registry
            .get(name)
            .ok_or_else(|| SceneError::construction(name, "component type is not registered"))?;
        let component = (registration.create)();
        self.validate_one(component.as_ref())?;
        Ok(component)
    }

    /// Checks that `components` can be attached to one entity: every type is
    /// registered, no name repeats, and every validator accepts its data.
    ///
    /// Never mutates the world.
    pub fn validate(&self, components: &[Box<dyn Component>]) -> Result<(), SceneError> {
        let mut seen = HashSet::with_capacity(components.len());
        for component in components {
            let name = component.component_name();
            if !seen.insert(name) {
                return Err(SceneError::construction(name, "component appears more than once"));
            }
            self.validate_one(component.as_ref())?;
        }
        Ok(())
    }

    fn validate_one(&self, component: &dyn Component) -> Result<(), SceneError> {
        let name = component.component_name();
        let registration = self
            .registry
            .get(name)
            .ok_or_else(|| SceneError::construction(name, "component type is not registered"))?;
        if let Some(validator) = &registration.validator {
            validator(component).map_err(|reason| SceneError::construction(name, reason))?;
        }
        Ok(())
    }

    // ---- Entity management ----

    /// Creates an entity with a fresh id.
    pub fn spawn(&mut self, components: Vec<Box<dyn Component>>) -> Result<EntityId, SceneError> {
        let id = EntityId::new();
        self.create_entity(components, id)?;
        Ok(id)
    }

    /// Creates an entity with the given id.
    ///
    /// Fails without touching the world if the id is taken or a component
    /// does not pass [`validate`](World::validate).
    pub fn create_entity(
        &mut self,
        components: Vec<Box<dyn Component>>,
        id: EntityId,
    ) -> Result<EntityLocation, SceneError> {
        if self.by_id.contains_key(&id) {
            return Err(SceneError::DuplicateIdentity(id));
        }
        self.validate(&components)?;
        Ok(self.place(Entity::new(id, components)))
    }

    /// Puts a previously deleted entity back, bypassing validation.
    pub(crate) fn reinstate(&mut self, entity: Entity) -> EntityLocation {
        debug_assert!(!self.by_id.contains_key(&entity.id()));
        self.place(entity)
    }

    fn place(&mut self, entity: Entity) -> EntityLocation {
        let id = entity.id();
        let slot = match self.free.pop() {
            Some(slot) => slot,
            None => {
                self.slots.push(Slot::default());
                (self.slots.len() - 1) as u32
            }
        };
        let entry = &mut self.slots[slot as usize];
        entry.entity = Some(entity);
        let location = EntityLocation {
            slot,
            generation: entry.generation,
        };
        self.by_id.insert(id, slot);
        self.indices_dirty = true;
        log::trace!("Placed entity {id} in slot {slot} (generation {})", location.generation);
        location
    }

    /// Deletes an entity, returning it.
    ///
    /// Returns `None` if no entity has this id.
    pub fn delete_entity(&mut self, id: EntityId) -> Option<Entity> {
        let slot = self.by_id.remove(&id)?;
        let entry = &mut self.slots[slot as usize];
        let entity = entry.entity.take();
        entry.generation = entry.generation.wrapping_add(1);
        self.free.push(slot);
        self.indices_dirty = true;
        entity
    }

    /// Returns whether an entity with this id exists.
    pub fn contains(&self, id: EntityId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Returns the number of live entities.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Resolves an id to its current location.
    pub fn resolve(&self, id: EntityId) -> Option<EntityLocation> {
        let slot = *self.by_id.get(&id)?;
        Some(EntityLocation {
            slot,
            generation: self.slots[slot as usize].generation,
        })
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        let slot = *self.by_id.get(&id)?;
        self.slots[slot as usize].entity.as_ref()
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        let slot = *self.by_id.get(&id)?;
        self.slots[slot as usize].entity.as_mut()
    }

    /// Returns the entity at `location` if the location is still current.
    pub fn get(&self, location: EntityLocation) -> Option<&Entity> {
        let entry = self.slots.get(location.slot as usize)?;
        if entry.generation != location.generation {
            return None;
        }
        entry.entity.as_ref()
    }

    /// Returns the entity at `location` mutably if the location is still current.
    pub fn get_mut(&mut self, location: EntityLocation) -> Option<&mut Entity> {
        let entry = self.slots.get_mut(location.slot as usize)?;
        if entry.generation != location.generation {
            return None;
        }
        entry.entity.as_mut()
    }

    /// Iterates over live entities in slot order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.slots.iter().filter_map(|s| s.entity.as_ref())
    }

    /// Iterates over live entity ids in slot order.
    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities().map(Entity::id)
    }

    // ---- Per-component edits ----

    /// Attaches a component to an existing entity.
    pub fn add_component(
        &mut self,
        id: EntityId,
        component: Box<dyn Component>,
    ) -> Result<(), SceneError> {
        let name = component.component_name();
        let has = self
            .entity(id)
            .ok_or(SceneError::EntityNotFound(id))?
            .has(name);
        if has {
            return Err(SceneError::DuplicateComponent {
                entity: id,
                component: name.to_string(),
            });
        }
        self.validate_one(component.as_ref())?;
        if let Some(entity) = self.entity_mut(id) {
            entity.insert(component);
        }
        self.indices_dirty = true;
        Ok(())
    }

    /// Detaches a component from an existing entity, returning it.
    pub fn remove_component(
        &mut self,
        id: EntityId,
        name: &str,
    ) -> Result<Box<dyn Component>, SceneError> {
        let entity = self.entity_mut(id).ok_or(SceneError::EntityNotFound(id))?;
        let removed = entity
            .remove(name)
            .ok_or_else(|| SceneError::MissingComponent {
                entity: id,
                component: name.to_string(),
            })?;
        self.indices_dirty = true;
        Ok(removed)
    }

    // ---- Derived indices ----

    /// Rebuilds the component index from the live entities.
    pub fn refresh_indices(&mut self) {
        self.by_component.clear();
        for slot in &self.slots {
            let Some(entity) = &slot.entity else {
                continue;
            };
            for component in entity.components() {
                self.by_component
                    .entry(component.component_name())
                    .or_default()
                    .push(entity.id());
            }
        }
        self.indices_dirty = false;
    }

    /// Returns `true` if entities changed since the last
    /// [`refresh_indices`](World::refresh_indices).
    pub fn indices_dirty(&self) -> bool {
        self.indices_dirty
    }

    /// Entities carrying `component` as of the last
    /// [`refresh_indices`](World::refresh_indices), in slot order.
    pub fn entities_with(&self, component: &str) -> &[EntityId] {
        self.by_component
            .get(component)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("entities", &self.len())
            .field("slots", &self.slots.len())
            .field("registered", &self.registry.keys().collect::<Vec<_>>())
            .finish()
    }
}
