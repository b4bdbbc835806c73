//! Editable targets and reversible editor actions.
//!
//! This module defines the core abstractions for an undo/redo editor system:
//!
//! - [`Editable`]: marker trait for types that can be edited
//! - [`EditAction`]: a reversible edit operation (Command pattern)
//! - [`EditActionError`] / [`EditActionResult`]: error handling for actions
//!
//! Actions are self-contained: each implementation stores whatever it needs
//! to go forward and backward (target identifiers, old/new values, whole
//! entity snapshots, etc.).

use std::any::Any;
use std::fmt;

/// Helper trait for downcasting trait objects to concrete types.
///
/// Automatically implemented for all `'static` types.
pub trait AsAny: 'static {
    /// Returns a reference to `self` as `&dyn Any` for downcasting.
    fn as_any(&self) -> &dyn Any;
}

impl<T: 'static> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Marker trait for types that serve as editing targets.
///
/// ```ignore
/// struct MyScene { /* ... */ }
/// impl Editable for MyScene {}
/// ```
pub trait Editable: 'static {}

/// Error type for action execution failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditActionError {
    /// The target object was not found.
    TargetNotFound(String),
    /// The target is in an invalid state for this action.
    InvalidState(String),
    /// Rebuilding or instantiating part of the target failed.
    ///
    /// Carries the name of what could not be built and a diagnostic detail
    /// suitable for a user-facing error notification.
    ConstructionFailed { what: String, detail: String },
    /// A custom error with a description.
    Custom(String),
}

impl EditActionError {
    /// Returns `true` for [`ConstructionFailed`](Self::ConstructionFailed).
    pub fn is_construction_failure(&self) -> bool {
        matches!(self, Self::ConstructionFailed { .. })
    }
}

impl fmt::Display for EditActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TargetNotFound(msg) => write!(f, "target not found: {msg}"),
            Self::InvalidState(msg) => write!(f, "invalid state: {msg}"),
            Self::ConstructionFailed { what, detail } => {
                write!(f, "failed to construct {what}: {detail}")
            }
            Self::Custom(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for EditActionError {}

/// Result type for action operations.
pub type EditActionResult<T = ()> = Result<T, EditActionError>;

/// A reversible editor action (Command pattern).
///
/// Actions encapsulate a single logical edit and capture enough state to
/// undo the change and redo it.
///
/// Two ways exist to get an action into an
/// [`EditActionHistory`](super::EditActionHistory):
///
/// - [`execute`](super::EditActionHistory::execute) for edits that have not
///   happened yet; the history calls [`apply`](Self::apply) first.
/// - [`add`](super::EditActionHistory::add) for edits that already mutated
///   the target (snapshot capture); `apply` is not called again.
///
/// # Object Safety
///
/// This trait is dyn-compatible so that different action types can be stored
/// in a single undo/redo stack as `Box<dyn EditAction<T>>`.
///
/// # Example
///
/// ```ignore
/// #[derive(Debug)]
/// struct SetCounter {
///     old: i32,
///     new: i32,
/// }
///
/// impl EditAction<Counter> for SetCounter {
///     fn apply(&mut self, target: &mut Counter) -> EditActionResult {
///         target.value = self.new;
///         Ok(())
///     }
///
///     fn undo(&mut self, target: &mut Counter) -> EditActionResult {
///         target.value = self.old;
///         Ok(())
///     }
///
///     fn description(&self) -> &str {
///         "Set counter"
///     }
/// }
/// ```
pub trait EditAction<T: Editable>: fmt::Debug + AsAny {
    /// Applies the action to the target (forward direction).
    fn apply(&mut self, target: &mut T) -> EditActionResult;

    /// Reverses the action.
    ///
    /// Must restore the target to the state before [`apply`](Self::apply)
    /// was called (or before the already-applied edit happened, for actions
    /// recorded with `add`).
    fn undo(&mut self, target: &mut T) -> EditActionResult;

    /// Re-applies the action after an undo.
    ///
    /// Defaults to [`apply`](Self::apply).
    fn redo(&mut self, target: &mut T) -> EditActionResult {
        self.apply(target)
    }

    /// A short, human-readable description for display in the edit menu.
    fn description(&self) -> &str;
}
