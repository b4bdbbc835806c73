//! Entity schemes: deep-cloned snapshots of one entity that can rebuild it.

use serde::Deserialize;

use crate::cloner::Cloner;
use crate::component::Component;
use crate::entity::{Entity, EntityId};
use crate::error::SceneError;
use crate::world::World;

/// Which components a snapshot captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClonePolicy {
    /// Every component.
    #[default]
    Full,
    /// Every component except invisible ones (render state and other
    /// derived data). Rebuilds keep the live entity's invisible components.
    SkipInvisible,
}

impl ClonePolicy {
    /// Returns `true` if `component` belongs in a snapshot under this policy.
    pub fn includes(self, component: &dyn Component) -> bool {
        match self {
            Self::Full => true,
            Self::SkipInvisible => !component.is_invisible(),
        }
    }
}

/// Whether a rebuilt entity keeps the scheme's id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityPolicy {
    /// Replace the live entity in place, keeping its id.
    Preserve,
    /// Create a copy under a fresh id and leave the source alone.
    Regenerate,
}

/// Immutable snapshot of one entity's components at a point in time.
///
/// A scheme owns deep clones and never shares storage with the live entity,
/// so later edits to the entity do not leak into it.
#[derive(Debug, Clone)]
pub struct EntityScheme {
    id: EntityId,
    policy: ClonePolicy,
    components: Vec<Box<dyn Component>>,
}

impl EntityScheme {
    /// Captures `entity` under `policy`. Read-only on the entity.
    pub fn cloned_of(entity: &Entity, cloner: &dyn Cloner, policy: ClonePolicy) -> Self {
        let components = entity
            .components()
            .filter(|c| policy.includes(*c))
            .map(|c| cloner.clone_component(c))
            .collect();
        Self {
            id: entity.id(),
            policy,
            components,
        }
    }

    /// Id of the captured entity.
    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn policy(&self) -> ClonePolicy {
        self.policy
    }

    pub fn components(&self) -> impl Iterator<Item = &dyn Component> + '_ {
        self.components.iter().map(|c| c.as_ref())
    }

    pub fn component(&self, name: &str) -> Option<&dyn Component> {
        self.components()
            .find(|c| c.component_name() == name)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Deep structural comparison of the captured component sets.
    ///
    /// Component order does not matter. A component whose comparison cannot
    /// be made counts as changed.
    pub fn structural_eq(&self, other: &EntityScheme) -> bool {
        self.components.len() == other.components.len()
            && self.components().all(|mine| {
                other
                    .component(mine.component_name())
                    .is_some_and(|theirs| mine.structural_eq(theirs) == Some(true))
            })
    }

    /// Rebuilds the entity from this scheme.
    ///
    /// Fresh clones of the captured components are validated against the
    /// world before anything is mutated. With [`IdentityPolicy::Preserve`]
    /// the live entity with this id (if any) is deleted and recreated under
    /// the same id; for [`ClonePolicy::SkipInvisible`] schemes its invisible
    /// components are carried over. If recreation fails the deleted entity
    /// is put back and the error returned.
    ///
    /// Proxies onto the entity are stale afterwards and must be reloaded.
    pub fn build(
        &self,
        world: &mut World,
        cloner: &dyn Cloner,
        identity: IdentityPolicy,
    ) -> Result<EntityId, SceneError> {
        let mut components: Vec<Box<dyn Component>> = self
            .components()
            .map(|c| cloner.clone_component(c))
            .collect();
        world.validate(&components)?;

        let id = match identity {
            IdentityPolicy::Regenerate => {
                let id = EntityId::new();
                world.create_entity(components, id)?;
                id
            }
            IdentityPolicy::Preserve => {
                let replaced = world.delete_entity(self.id);
                if self.policy == ClonePolicy::SkipInvisible
                    && let Some(replaced) = &replaced
                {
                    for carried in replaced.components().filter(|c| c.is_invisible()) {
                        if !components
                            .iter()
                            .any(|c| c.component_name() == carried.component_name())
                        {
                            components.push(cloner.clone_component(carried));
                        }
                    }
                }

                if let Err(err) = world.create_entity(components, self.id) {
                    if let Some(replaced) = replaced {
                        log::warn!("Rebuild of entity {} failed, reinstating it: {err}", self.id);
                        world.reinstate(replaced);
                    }
                    world.refresh_indices();
                    return Err(err);
                }
                self.id
            }
        };

        world.refresh_indices();
        log::debug!(
            "Rebuilt entity {id} from scheme of {} ({} components, {:?})",
            self.id,
            self.components.len(),
            identity
        );
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::DeepCloner;
    use crate::components::{Name, SpriteRenderState, Tags, Transform, register_std_components};

    fn world_with_entity() -> (World, EntityId) {
        let mut world = World::new();
        register_std_components(&mut world);
        let id = world
            .spawn(vec![
                Box::new(Transform::default()),
                Box::new(Tags(vec!["enemy".into()])),
                Box::new(SpriteRenderState {
                    texture: Some("enemy.png".into()),
                    vertices: vec![1.0, 2.0],
                }),
            ])
            .unwrap();
        (world, id)
    }

    fn capture(world: &World, id: EntityId, policy: ClonePolicy) -> EntityScheme {
        EntityScheme::cloned_of(world.entity(id).unwrap(), &DeepCloner::new(), policy)
    }

    #[test]
    fn policy_selects_components() {
        let (world, id) = world_with_entity();
        assert_eq!(capture(&world, id, ClonePolicy::Full).len(), 3);
        let partial = capture(&world, id, ClonePolicy::SkipInvisible);
        assert_eq!(partial.len(), 2);
        assert!(partial.component("SpriteRenderState").is_none());
        assert_eq!(partial.id(), id);
    }

    #[test]
    fn scheme_is_isolated_from_live_edits() {
        let (mut world, id) = world_with_entity();
        let scheme = capture(&world, id, ClonePolicy::Full);
        let entity = world.entity_mut(id).unwrap();
        entity.get_mut::<Tags>().unwrap().0.push("boss".into());

        let tags = scheme.component("Tags").unwrap().downcast_ref::<Tags>().unwrap();
        assert_eq!(tags.0, vec!["enemy".to_string()]);
    }

    #[test]
    fn structural_eq_detects_changes() {
        let (mut world, id) = world_with_entity();
        let before = capture(&world, id, ClonePolicy::Full);
        assert!(before.structural_eq(&capture(&world, id, ClonePolicy::Full)));

        world.entity_mut(id).unwrap().get_mut::<Transform>().unwrap().rotation = 0.5;
        assert!(!before.structural_eq(&capture(&world, id, ClonePolicy::Full)));
    }

    #[test]
    fn structural_eq_detects_added_component() {
        let (mut world, id) = world_with_entity();
        let before = capture(&world, id, ClonePolicy::Full);
        world.add_component(id, Box::new(Name("x".into()))).unwrap();
        assert!(!before.structural_eq(&capture(&world, id, ClonePolicy::Full)));
    }

    #[test]
    fn preserve_rebuild_keeps_id_and_restores_data() {
        let (mut world, id) = world_with_entity();
        let scheme = capture(&world, id, ClonePolicy::Full);
        let old_location = world.resolve(id).unwrap();

        world.entity_mut(id).unwrap().get_mut::<Transform>().unwrap().position = Vec2::new(9.0, 9.0);
        let rebuilt = scheme
            .build(&mut world, &DeepCloner::new(), IdentityPolicy::Preserve)
            .unwrap();

        assert_eq!(rebuilt, id);
        assert_eq!(world.len(), 1);
        assert_ne!(world.resolve(id).unwrap(), old_location);
        assert!(scheme.structural_eq(&capture(&world, id, ClonePolicy::Full)));
        assert!(!world.indices_dirty());
    }

    #[test]
    fn skip_invisible_rebuild_carries_live_render_state() {
        let (mut world, id) = world_with_entity();
        let scheme = capture(&world, id, ClonePolicy::SkipInvisible);
        world
            .entity_mut(id)
            .unwrap()
            .get_mut::<SpriteRenderState>()
            .unwrap()
            .vertices = vec![7.0];

        scheme
            .build(&mut world, &DeepCloner::new(), IdentityPolicy::Preserve)
            .unwrap();

        let entity = world.entity(id).unwrap();
        assert_eq!(entity.len(), 3);
        assert_eq!(entity.get::<SpriteRenderState>().unwrap().vertices, vec![7.0]);
    }

    #[test]
    fn regenerate_leaves_source_alone() {
        let (mut world, id) = world_with_entity();
        let scheme = capture(&world, id, ClonePolicy::Full);
        let copy = scheme
            .build(&mut world, &DeepCloner::new(), IdentityPolicy::Regenerate)
            .unwrap();

        assert_ne!(copy, id);
        assert_eq!(world.len(), 2);
        assert!(scheme.structural_eq(&capture(&world, id, ClonePolicy::Full)));
    }

    #[test]
    fn failed_validation_mutates_nothing() {
        let (world, id) = world_with_entity();
        let scheme = capture(&world, id, ClonePolicy::Full);
        let location = world.resolve(id).unwrap();

        let mut strict = World::new();
        strict.register_component::<Transform>();
        let err = scheme
            .build(&mut strict, &DeepCloner::new(), IdentityPolicy::Preserve)
            .unwrap_err();
        assert!(matches!(err, SceneError::Construction { .. }));
        assert!(strict.is_empty());

        assert_eq!(world.resolve(id), Some(location));
    }

    #[test]
    fn failed_create_reinstates_replaced_entity() {
        let (mut world, id) = world_with_entity();
        let scheme = capture(&world, id, ClonePolicy::SkipInvisible);

        // The carried-over render state fails validation only after deletion.
        world.register_validator::<SpriteRenderState>(|state| {
            if state.vertices.is_empty() {
                Ok(())
            } else {
                Err("stale vertices".into())
            }
        });

        let err = scheme
            .build(&mut world, &DeepCloner::new(), IdentityPolicy::Preserve)
            .unwrap_err();
        assert!(matches!(err, SceneError::Construction { .. }));

        let entity = world.entity(id).unwrap();
        assert_eq!(entity.len(), 3);
        assert_eq!(entity.get::<Tags>().unwrap().0, vec!["enemy".to_string()]);
    }

    #[test]
    fn preserve_recreates_missing_entity() {
        let (mut world, id) = world_with_entity();
        let scheme = capture(&world, id, ClonePolicy::Full);
        world.delete_entity(id);

        scheme
            .build(&mut world, &DeepCloner::new(), IdentityPolicy::Preserve)
            .unwrap();
        assert!(world.contains(id));
    }

    #[test]
    fn clone_policy_from_config_names() {
        use serde::de::IntoDeserializer;
        use serde::de::value::Error;

        let parse = |name: &str| -> Result<ClonePolicy, Error> {
            ClonePolicy::deserialize(name.into_deserializer())
        };
        assert_eq!(parse("skip_invisible").unwrap(), ClonePolicy::SkipInvisible);
        assert_eq!(parse("full").unwrap(), ClonePolicy::Full);
        assert!(parse("partial").is_err());
    }
}
