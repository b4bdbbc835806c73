//! Homogeneous action groups.
//!
//! [`ActionGroup`] bundles same-kind actions into one undo entry. Members are
//! applied forward in insertion order and undone backward in reverse order.
//! A member failure rolls back the members already processed in that call,
//! so the group is either fully applied or not applied at all.

use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;

use super::action::{EditAction, EditActionResult, Editable};

/// A named collection of same-kind actions executed as a single unit.
///
/// The display name depends on cardinality: `singular` for exactly one
/// member, `plural` otherwise.
///
/// # Example
///
/// ```ignore
/// let mut group = ActionGroup::new("Add Component", "Add Components");
/// for entity in selection {
///     group.push(AddComponentAction::new(entity, "Tint"));
/// }
/// history.execute(Box::new(group), &mut scene)?;
/// ```
pub struct ActionGroup<T: Editable, A: EditAction<T>> {
    singular: Cow<'static, str>,
    plural: Cow<'static, str>,
    actions: Vec<A>,
    _target: PhantomData<fn(&mut T)>,
}

impl<T: Editable, A: EditAction<T>> ActionGroup<T, A> {
    /// Creates an empty group with singular and plural display names.
    pub fn new(
        singular: impl Into<Cow<'static, str>>,
        plural: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            singular: singular.into(),
            plural: plural.into(),
            actions: Vec::new(),
            _target: PhantomData,
        }
    }

    /// Appends a member action.
    pub fn push(&mut self, action: A) {
        self.actions.push(action);
    }

    /// Keeps only the members for which `keep` returns `true`.
    pub fn retain(&mut self, keep: impl FnMut(&A) -> bool) {
        self.actions.retain(keep);
    }

    /// Returns the number of member actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns `true` if the group has no members.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Iterates over the members in execution order.
    pub fn iter(&self) -> std::slice::Iter<'_, A> {
        self.actions.iter()
    }

    /// Iterates mutably over the members in execution order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, A> {
        self.actions.iter_mut()
    }

    fn run_forward(
        &mut self,
        target: &mut T,
        step: fn(&mut A, &mut T) -> EditActionResult,
    ) -> EditActionResult {
        for i in 0..self.actions.len() {
            if let Err(e) = step(&mut self.actions[i], target) {
                for j in (0..i).rev() {
                    if let Err(rollback) = self.actions[j].undo(target) {
                        log::error!("Rollback of group member {j} failed: {rollback}");
                    }
                }
                return Err(e);
            }
        }
        Ok(())
    }
}

impl<T: Editable, A: EditAction<T>> EditAction<T> for ActionGroup<T, A> {
    fn apply(&mut self, target: &mut T) -> EditActionResult {
        self.run_forward(target, A::apply)
    }

    fn undo(&mut self, target: &mut T) -> EditActionResult {
        let count = self.actions.len();
        for i in (0..count).rev() {
            if let Err(e) = self.actions[i].undo(target) {
                for j in i + 1..count {
                    if let Err(rollback) = self.actions[j].redo(target) {
                        log::error!("Rollback of group member {j} failed: {rollback}");
                    }
                }
                return Err(e);
            }
        }
        Ok(())
    }

    fn redo(&mut self, target: &mut T) -> EditActionResult {
        self.run_forward(target, A::redo)
    }

    fn description(&self) -> &str {
        if self.actions.len() == 1 {
            self.singular.as_ref()
        } else {
            self.plural.as_ref()
        }
    }
}

impl<T: Editable, A: EditAction<T>> fmt::Debug for ActionGroup<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionGroup")
            .field("name", &self.description())
            .field("actions", &self.actions)
            .finish()
    }
}
