//! Undo/redo action history.
//!
//! [`EditActionHistory`] manages a linear undo/redo stack of [`EditAction`]
//! trait objects. When a new action is executed or added after undoing, the
//! redo stack is cleared (standard editor behavior).

use std::collections::VecDeque;
use std::fmt;

use super::action::{EditAction, EditActionResult, Editable};

/// Default maximum number of undo steps.
pub const DEFAULT_MAX_UNDO: usize = 100;

/// Snapshot of the history's observable state, passed to listeners.
///
/// UI bindings use this to enable or disable undo/redo controls and to show
/// the document's dirty marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HistoryStatus {
    pub can_undo: bool,
    pub can_redo: bool,
    pub undo_count: usize,
    pub redo_count: usize,
    pub unsaved: bool,
}

/// Callback invoked after every stack mutation.
pub type HistoryListener = Box<dyn FnMut(&HistoryStatus)>;

/// Manages an undo/redo stack of editor actions.
///
/// The undo stack is a bounded [`VecDeque`]; when it exceeds `max_undo`,
/// the oldest action is dropped from the front. The redo stack is an
/// unbounded [`Vec`] (it can never grow larger than the undo stack was).
///
/// A failed `undo`/`redo` puts the action back where it came from, so the
/// stacks are never left holding a half-applied entry.
///
/// # Example
///
/// ```ignore
/// let mut history = EditActionHistory::new(50);
/// let mut target = MyScene::new();
///
/// // Execute and record an action
/// history.execute(Box::new(my_action), &mut target)?;
///
/// // Record an edit that already happened
/// history.add(Box::new(snapshot_action));
///
/// history.undo(&mut target)?;
/// history.redo(&mut target)?;
/// ```
pub struct EditActionHistory<T: Editable> {
    undo_stack: VecDeque<Box<dyn EditAction<T>>>,
    redo_stack: Vec<Box<dyn EditAction<T>>>,
    max_undo: usize,
    /// Tracks distance from the saved state.
    ///
    /// - `Some(0)`: the current state matches the last save.
    /// - `Some(n)` where `n > 0`: `n` undos needed to reach the saved state.
    /// - `Some(n)` where `n < 0`: `|n|` redos needed to reach the saved state.
    /// - `None`: the save point is permanently unreachable (evicted by the
    ///   depth limit, or the redo branch holding it was discarded).
    save_distance: Option<i64>,
    listeners: Vec<HistoryListener>,
}

impl<T: Editable> EditActionHistory<T> {
    /// Creates a new empty action history with the given maximum undo depth.
    ///
    /// A depth of zero is bumped to one so that the latest action can
    /// always be undone.
    pub fn new(max_undo: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_undo: max_undo.max(1),
            save_distance: Some(0),
            listeners: Vec::new(),
        }
    }

    /// Applies a not-yet-applied action and records it.
    ///
    /// If the action fails, nothing is recorded and both stacks are left
    /// untouched.
    pub fn execute(
        &mut self,
        mut action: Box<dyn EditAction<T>>,
        target: &mut T,
    ) -> EditActionResult {
        action.apply(target)?;
        log::debug!("Executed \"{}\"", action.description());
        self.record(action);
        Ok(())
    }

    /// Records an action whose effect has already happened on the target.
    ///
    /// [`EditAction::apply`] is not called. Clears the redo stack.
    pub fn add(&mut self, action: Box<dyn EditAction<T>>) {
        log::debug!("Recorded \"{}\"", action.description());
        self.record(action);
    }

    fn record(&mut self, action: Box<dyn EditAction<T>>) {
        // Clearing the redo stack invalidates a save point that was in redo.
        self.redo_stack.clear();
        if let Some(d) = self.save_distance
            && d < 0
        {
            self.save_distance = None;
        }

        if let Some(d) = &mut self.save_distance {
            *d += 1;
        }

        self.undo_stack.push_back(action);
        self.enforce_limit();
        self.notify();
    }

    /// Undoes the most recent action.
    ///
    /// Returns `Ok(false)` without doing anything when the undo stack is
    /// empty. If the action's undo fails, the action stays on the undo
    /// stack and the error is returned.
    pub fn undo(&mut self, target: &mut T) -> EditActionResult<bool> {
        let Some(mut action) = self.undo_stack.pop_back() else {
            return Ok(false);
        };
        if let Err(e) = action.undo(target) {
            log::warn!("Undo of \"{}\" failed: {e}", action.description());
            self.undo_stack.push_back(action);
            return Err(e);
        }
        log::debug!("Undid \"{}\"", action.description());
        self.redo_stack.push(action);
        if let Some(d) = &mut self.save_distance {
            *d -= 1;
        }
        self.notify();
        Ok(true)
    }

    /// Redoes the most recently undone action.
    ///
    /// Returns `Ok(false)` without doing anything when the redo stack is
    /// empty. If the action's redo fails, the action stays on the redo
    /// stack and the error is returned.
    pub fn redo(&mut self, target: &mut T) -> EditActionResult<bool> {
        let Some(mut action) = self.redo_stack.pop() else {
            return Ok(false);
        };
        if let Err(e) = action.redo(target) {
            log::warn!("Redo of \"{}\" failed: {e}", action.description());
            self.redo_stack.push(action);
            return Err(e);
        }
        log::debug!("Redid \"{}\"", action.description());
        self.undo_stack.push_back(action);
        if let Some(d) = &mut self.save_distance {
            *d += 1;
        }
        self.enforce_limit();
        self.notify();
        Ok(true)
    }

    fn enforce_limit(&mut self) {
        while self.undo_stack.len() > self.max_undo {
            self.undo_stack.pop_front();
            // If the save point was beyond the oldest surviving entry, it's gone.
            if let Some(d) = self.save_distance
                && d > self.undo_stack.len() as i64
            {
                self.save_distance = None;
            }
        }
    }

    /// Returns `true` if there are actions that can be undone.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Returns `true` if there are actions that can be redone.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Returns an iterator over undo action descriptions, most recent first.
    pub fn undo_descriptions(&self) -> impl Iterator<Item = &str> {
        self.undo_stack.iter().rev().map(|a| a.description())
    }

    /// Returns an iterator over redo action descriptions, most recent first.
    pub fn redo_descriptions(&self) -> impl Iterator<Item = &str> {
        self.redo_stack.iter().rev().map(|a| a.description())
    }

    /// Returns the most recent undoable action, if any.
    pub fn peek_undo(&self) -> Option<&dyn EditAction<T>> {
        self.undo_stack.back().map(|a| a.as_ref())
    }

    /// Returns the most recent redoable action, if any.
    pub fn peek_redo(&self) -> Option<&dyn EditAction<T>> {
        self.redo_stack.last().map(|a| a.as_ref())
    }

    /// Returns the number of actions in the undo stack.
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Returns the number of actions in the redo stack.
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Returns the maximum undo depth.
    pub fn max_undo(&self) -> usize {
        self.max_undo
    }

    /// Records the current state as the saved state.
    pub fn mark_saved(&mut self) {
        self.save_distance = Some(0);
        self.notify();
    }

    /// Returns `true` if the current state differs from the last saved state.
    pub fn has_unsaved_changes(&self) -> bool {
        self.save_distance != Some(0)
    }

    /// Clears both undo and redo stacks (e.g. on document reload).
    ///
    /// If the current state was the saved state, it remains so. Otherwise
    /// the save point is permanently lost.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        if self.save_distance != Some(0) {
            self.save_distance = None;
        }
        self.notify();
    }

    /// Returns the current observable state.
    pub fn status(&self) -> HistoryStatus {
        HistoryStatus {
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            undo_count: self.undo_stack.len(),
            redo_count: self.redo_stack.len(),
            unsaved: self.has_unsaved_changes(),
        }
    }

    /// Registers a listener called after every stack mutation.
    pub fn subscribe(&mut self, listener: impl FnMut(&HistoryStatus) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn notify(&mut self) {
        if self.listeners.is_empty() {
            return;
        }
        let status = self.status();
        for listener in &mut self.listeners {
            listener(&status);
        }
    }
}

impl<T: Editable> fmt::Debug for EditActionHistory<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditActionHistory")
            .field("undo_count", &self.undo_stack.len())
            .field("redo_count", &self.redo_stack.len())
            .field("max_undo", &self.max_undo)
            .field("save_distance", &self.save_distance)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
