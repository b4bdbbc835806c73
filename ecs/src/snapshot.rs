//! Snapshot-backed undo actions.

use scenedit_core::abstract_editor::{ActionGroup, EditAction, EditActionResult};

use crate::scene::Scene;
use crate::scheme::{EntityScheme, IdentityPolicy};
use crate::entity::EntityId;

/// Undo entry for one entity, stored as whole before/after schemes.
///
/// Recorded after the edit already happened, so it goes into the history
/// with `add`. Redo rebuilds from `after`, undo from `before`, both keeping
/// the entity's id.
#[derive(Debug)]
pub struct EntitySnapshot {
    before: EntityScheme,
    after: EntityScheme,
}

impl EntitySnapshot {
    pub fn new(before: EntityScheme, after: EntityScheme) -> Self {
        debug_assert_eq!(before.id(), after.id());
        Self { before, after }
    }

    pub fn id(&self) -> EntityId {
        self.before.id()
    }

    pub fn before(&self) -> &EntityScheme {
        &self.before
    }

    pub fn after(&self) -> &EntityScheme {
        &self.after
    }

    /// Returns `true` if the edit left the entity structurally unchanged.
    pub fn is_unchanged(&self) -> bool {
        self.before.structural_eq(&self.after)
    }
}

impl EditAction<Scene> for EntitySnapshot {
    fn apply(&mut self, target: &mut Scene) -> EditActionResult {
        target.rebuild(&self.after, IdentityPolicy::Preserve)?;
        Ok(())
    }

    fn undo(&mut self, target: &mut Scene) -> EditActionResult {
        target.rebuild(&self.before, IdentityPolicy::Preserve)?;
        Ok(())
    }

    fn description(&self) -> &str {
        "Change Entity Property"
    }
}

/// All entity snapshots of one committed session, undone as a unit.
pub type SnapshotGroup = ActionGroup<Scene, EntitySnapshot>;

/// Creates an empty snapshot group with its display names.
pub fn snapshot_group() -> SnapshotGroup {
    ActionGroup::new("Change Entity Properties", "Change Entities Properties")
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::ClonePolicy;
    use crate::components::Transform;

    fn moved_entity() -> (Scene, EntitySnapshot) {
        let mut scene = Scene::new();
        let id = scene.spawn(vec![Box::new(Transform::default())]).unwrap();
        let before = scene.capture(id, ClonePolicy::Full).unwrap();
        scene
            .world_mut()
            .entity_mut(id)
            .unwrap()
            .get_mut::<Transform>()
            .unwrap()
            .position = Vec2::new(3.0, 4.0);
        let after = scene.capture(id, ClonePolicy::Full).unwrap();
        (scene, EntitySnapshot::new(before, after))
    }

    fn position(scene: &Scene, id: EntityId) -> Vec2 {
        scene.world().entity(id).unwrap().get::<Transform>().unwrap().position
    }

    #[test]
    fn undo_and_redo_rebuild_from_schemes() {
        let (mut scene, mut snapshot) = moved_entity();
        let id = snapshot.id();
        assert!(!snapshot.is_unchanged());

        snapshot.undo(&mut scene).unwrap();
        assert_eq!(position(&scene, id), Vec2::ZERO);
        snapshot.redo(&mut scene).unwrap();
        assert_eq!(position(&scene, id), Vec2::new(3.0, 4.0));
        assert_eq!(snapshot.description(), "Change Entity Property");
    }

    #[test]
    fn group_names() {
        let (_, snapshot) = moved_entity();
        let mut group = snapshot_group();
        assert_eq!(group.description(), "Change Entities Properties");
        group.push(snapshot);
        assert_eq!(group.description(), "Change Entity Properties");
    }
}
