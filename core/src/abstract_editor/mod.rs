//! Abstract editor framework for reversible editing operations.
//!
//! This module provides the foundational traits and types for building
//! an undo/redo-capable editor system. It is decoupled from specific
//! editable types (scenes, entity worlds) so that higher-level crates can
//! implement concrete editors.
//!
//! - [`Editable`]: marker trait for types that can be edited
//! - [`EditAction`]: an edit operation (Command pattern)
//! - [`ActionGroup`]: same-kind actions recorded as one undo entry
//! - [`EditActionHistory`]: undo/redo stack managing action sequences
//! - [`DeferredRefresh`] / [`TickSlot`]: re-entrancy guard for UI refresh
//!
//! # Executed vs added actions
//!
//! [`EditActionHistory::execute`] applies an action and records it.
//! [`EditActionHistory::add`] records an action whose effect already
//! happened (for example an edit captured by before/after snapshots while
//! the user typed into a field). Both clear the redo stack.

mod action;
mod group;
mod history;
mod refresh;

pub use action::{AsAny, EditAction, EditActionError, EditActionResult, Editable};
pub use group::ActionGroup;
pub use history::{DEFAULT_MAX_UNDO, EditActionHistory, HistoryListener, HistoryStatus};
pub use refresh::{DeferredRefresh, TickSlot};
