use scenedit_core::abstract_editor::EditActionError;

use crate::EntityId;

/// Errors raised by the [`World`](crate::World) and the snapshot engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    #[error("entity {0} not found")]
    EntityNotFound(EntityId),
    #[error("entity {0} already exists")]
    DuplicateIdentity(EntityId),
    #[error("failed to construct component `{component}`: {reason}")]
    Construction { component: String, reason: String },
    #[error("entity {entity} already has component `{component}`")]
    DuplicateComponent { entity: EntityId, component: String },
    #[error("entity {entity} has no component `{component}`")]
    MissingComponent { entity: EntityId, component: String },
    #[error("proxy for entity {0} points at a replaced slot; reload it")]
    StaleProxy(EntityId),
}

impl SceneError {
    pub(crate) fn construction(component: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Construction {
            component: component.into(),
            reason: reason.into(),
        }
    }
}

impl From<SceneError> for EditActionError {
    fn from(err: SceneError) -> Self {
        match err {
            SceneError::EntityNotFound(_) | SceneError::StaleProxy(_) => {
                EditActionError::TargetNotFound(err.to_string())
            }
            SceneError::Construction { component, reason } => EditActionError::ConstructionFailed {
                what: format!("component `{component}`"),
                detail: reason,
            },
            SceneError::DuplicateIdentity(_)
            | SceneError::DuplicateComponent { .. }
            | SceneError::MissingComponent { .. } => EditActionError::InvalidState(err.to_string()),
        }
    }
}
