use std::collections::HashMap;
use std::fmt;

use crate::component::{Component, ComponentType};

/// Deep-copy capability used by snapshots.
///
/// A clone must never alias its source: mutating either afterwards leaves
/// the other untouched. Cloners are stateless from the caller's point of
/// view; the same input always yields an equal copy.
pub trait Cloner: fmt::Debug {
    fn clone_component(&self, component: &dyn Component) -> Box<dyn Component>;
}

type CloneOverride = Box<dyn Fn(&dyn Component) -> Option<Box<dyn Component>>>;

/// Default cloner: [`Component::clone_component`] plus optional per-type
/// overrides.
///
/// # Example
///
/// ```
/// use scenedit_ecs::{Cloner, DeepCloner};
/// use scenedit_ecs::components::SpriteRenderState;
///
/// // Render caches are rebuilt on demand; snapshots only need the texture.
/// let cloner = DeepCloner::new().with_override(|state: &SpriteRenderState| SpriteRenderState {
///     texture: state.texture.clone(),
///     vertices: Vec::new(),
/// });
///
/// let state = SpriteRenderState {
///     texture: Some("hero.png".into()),
///     vertices: vec![0.0; 16],
/// };
/// let copy = cloner.clone_component(&state);
/// let copy = copy.downcast_ref::<SpriteRenderState>().unwrap();
/// assert!(copy.vertices.is_empty());
/// ```
#[derive(Default)]
pub struct DeepCloner {
    overrides: HashMap<&'static str, CloneOverride>,
}

impl DeepCloner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the clone routine for component type `T`.
    pub fn with_override<T: ComponentType>(
        mut self,
        clone: impl Fn(&T) -> T + 'static,
    ) -> Self {
        self.overrides.insert(
            T::NAME,
            Box::new(move |component: &dyn Component| {
                component
                    .downcast_ref::<T>()
                    .map(|c| Box::new(clone(c)) as Box<dyn Component>)
            }),
        );
        self
    }
}

impl Cloner for DeepCloner {
    fn clone_component(&self, component: &dyn Component) -> Box<dyn Component> {
        self.overrides
            .get(component.component_name())
            .and_then(|clone| clone(component))
            .unwrap_or_else(|| component.clone_component())
    }
}

impl fmt::Debug for DeepCloner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeepCloner")
            .field("overrides", &self.overrides.keys().collect::<Vec<_>>())
            .finish()
    }
}
