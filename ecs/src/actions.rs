//! Leaf actions that attach or detach a single component.

use scenedit_core::abstract_editor::{
    ActionGroup, EditAction, EditActionError, EditActionResult,
};

use crate::component::Component;
use crate::entity::EntityId;
use crate::scene::Scene;

/// Attaches a default-constructed component, looked up by name.
#[derive(Debug)]
pub struct AddComponentAction {
    entity: EntityId,
    component: String,
}

impl AddComponentAction {
    pub fn new(entity: EntityId, component: impl Into<String>) -> Self {
        Self {
            entity,
            component: component.into(),
        }
    }

    pub fn entity(&self) -> EntityId {
        self.entity
    }

    pub fn component(&self) -> &str {
        &self.component
    }
}

impl EditAction<Scene> for AddComponentAction {
    fn apply(&mut self, target: &mut Scene) -> EditActionResult {
        let component = target.world().instantiate(&self.component)?;
        target.world_mut().add_component(self.entity, component)?;
        target.world_mut().refresh_indices();
        Ok(())
    }

    fn undo(&mut self, target: &mut Scene) -> EditActionResult {
        target
            .world_mut()
            .remove_component(self.entity, &self.component)?;
        target.world_mut().refresh_indices();
        Ok(())
    }

    fn description(&self) -> &str {
        "Add Component"
    }
}

/// Attaching one component to every selected entity.
pub type AddComponentGroup = ActionGroup<Scene, AddComponentAction>;

/// Creates an empty add-component group with its display names.
pub fn add_component_group() -> AddComponentGroup {
    ActionGroup::new("Add Component", "Add Components")
}

/// Detaches a component, keeping the removed value for undo.
#[derive(Debug)]
pub struct RemoveComponentAction {
    entity: EntityId,
    component: String,
    removed: Option<Box<dyn Component>>,
}

impl RemoveComponentAction {
    pub fn new(entity: EntityId, component: impl Into<String>) -> Self {
        Self {
            entity,
            component: component.into(),
            removed: None,
        }
    }

    pub fn entity(&self) -> EntityId {
        self.entity
    }
}

impl EditAction<Scene> for RemoveComponentAction {
    fn apply(&mut self, target: &mut Scene) -> EditActionResult {
        let removed = target
            .world_mut()
            .remove_component(self.entity, &self.component)?;
        target.world_mut().refresh_indices();
        self.removed = Some(removed);
        Ok(())
    }

    fn undo(&mut self, target: &mut Scene) -> EditActionResult {
        let Some(removed) = self.removed.take() else {
            return Err(EditActionError::InvalidState(format!(
                "component `{}` was never removed",
                self.component
            )));
        };
        // Keep a copy so a failed re-attach can be retried.
        let copy = target.cloner().clone_component(removed.as_ref());
        if let Err(err) = target.world_mut().add_component(self.entity, removed) {
            self.removed = Some(copy);
            return Err(err.into());
        }
        target.world_mut().refresh_indices();
        Ok(())
    }

    fn description(&self) -> &str {
        "Remove Component"
    }
}
