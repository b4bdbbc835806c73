//! Type-erased scene components.
//!
//! Entities hold their components as `Box<dyn Component>`, keyed by
//! [`component_name`](Component::component_name). The trait carries exactly
//! what the snapshot engine needs: deep cloning, structural comparison and
//! downcasting.
//!
//! Use `#[derive(Component)]` from [`ecs_macro`] to implement it.

use std::any::Any;
use std::fmt;

/// Static name of a concrete component type.
///
/// Implemented by `#[derive(Component)]` next to [`Component`]; used to look
/// components up by type and to register them in the [`World`](crate::World).
pub trait ComponentType: Component + Sized {
    /// The struct name as a static string (e.g. `"Transform"`).
    const NAME: &'static str;
}

/// A data record attached to an entity.
///
/// # Deriving
///
/// ```ignore
/// #[derive(Debug, Clone, Default, Component)]
/// struct Tint {
///     r: f32,
///     g: f32,
///     b: f32,
///     a: f32,
/// }
/// ```
///
/// # Manual implementation
///
/// A manual `structural_eq` may return `None` when it cannot decide; the
/// snapshot engine then treats the component as changed.
pub trait Component: fmt::Debug + 'static {
    /// Returns the component name, unique per entity.
    fn component_name(&self) -> &'static str;

    /// Invisible components hold derived state (render caches and the like)
    /// and are left out of [`ClonePolicy::SkipInvisible`](crate::ClonePolicy)
    /// snapshots.
    fn is_invisible(&self) -> bool {
        false
    }

    /// Returns an independent deep copy.
    fn clone_component(&self) -> Box<dyn Component>;

    /// Compares with another component of possibly different type.
    ///
    /// `Some(false)` for a different type, `None` if the comparison could
    /// not be made.
    fn structural_eq(&self, other: &dyn Component) -> Option<bool>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl dyn Component {
    /// Downcasts to a concrete component type.
    pub fn downcast_ref<T: ComponentType>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Downcasts mutably to a concrete component type.
    pub fn downcast_mut<T: ComponentType>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    /// Returns `true` if both components are known to be structurally equal.
    pub fn same_as(&self, other: &dyn Component) -> bool {
        self.structural_eq(other) == Some(true)
    }
}

impl Clone for Box<dyn Component> {
    fn clone(&self) -> Self {
        self.as_ref().clone_component()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Component;

    #[derive(Debug, Clone, Default, Component)]
    struct Health {
        current: f32,
        max: f32,
    }

    #[derive(Debug, Clone, Default, Component)]
    #[component(invisible)]
    struct Cache {
        bytes: Vec<u8>,
    }

    #[derive(Debug, Clone, Default, Component)]
    struct Counter {
        value: u32,
        #[structural(skip)]
        reads: u32,
    }

    #[test]
    fn derive_sets_name_and_visibility() {
        assert_eq!(Health::NAME, "Health");
        assert_eq!(Health::default().component_name(), "Health");
        assert!(!Health::default().is_invisible());
        assert!(Cache::default().is_invisible());
    }

    #[test]
    fn clone_component_is_independent() {
        let original: Box<dyn Component> = Box::new(Cache { bytes: vec![1, 2] });
        let mut copy = original.clone();
        copy.downcast_mut::<Cache>().unwrap().bytes.push(3);

        assert_eq!(original.downcast_ref::<Cache>().unwrap().bytes, vec![1, 2]);
        assert_eq!(copy.downcast_ref::<Cache>().unwrap().bytes, vec![1, 2, 3]);
    }

    #[test]
    fn structural_eq_across_types() {
        let a = Health {
            current: 5.0,
            max: 10.0,
        };
        let b = a.clone();
        let c = Health {
            current: 7.0,
            max: 10.0,
        };
        let cache = Cache::default();

        assert_eq!(Component::structural_eq(&a, &b), Some(true));
        assert_eq!(Component::structural_eq(&a, &c), Some(false));
        assert_eq!(Component::structural_eq(&a, &cache), Some(false));
    }

    #[test]
    fn skipped_fields_do_not_count() {
        let a = Counter { value: 1, reads: 0 };
        let b = Counter { value: 1, reads: 9 };
        assert!((&a as &dyn Component).same_as(&b));
    }
}
