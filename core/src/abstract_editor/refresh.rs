//! Deferred, coalescing UI refresh for a single-threaded editor tick.
//!
//! A refresh routine that mutates what it displays can request itself again
//! while running. [`DeferredRefresh`] never runs such a request recursively:
//! it is coalesced into one follow-up that waits in a [`TickSlot`] until the
//! next [`tick`](DeferredRefresh::tick).

use std::cell::{Cell, RefCell};
use std::fmt;

/// A single-slot pending-task queue drained once per scheduler tick.
///
/// Posting while a task is already pending replaces it, so several requests
/// between two ticks collapse into the last one.
pub struct TickSlot<T> {
    slot: RefCell<Option<T>>,
}

impl<T> TickSlot<T> {
    /// Creates an empty slot.
    pub fn new() -> Self {
        Self {
            slot: RefCell::new(None),
        }
    }

    /// Posts a task, replacing any task still pending.
    ///
    /// Returns `true` if an earlier task was replaced.
    pub fn post(&self, task: T) -> bool {
        self.slot.replace(Some(task)).is_some()
    }

    /// Takes the pending task, leaving the slot empty.
    pub fn take(&self) -> Option<T> {
        self.slot.take()
    }

    /// Returns `true` if a task is waiting.
    pub fn is_pending(&self) -> bool {
        self.slot.borrow().is_some()
    }
}

impl<T> Default for TickSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for TickSlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TickSlot")
            .field("pending", &self.is_pending())
            .finish()
    }
}

/// Re-entrancy guard for a refresh routine.
///
/// All methods take `&self` so the routine itself (or anything it calls)
/// can request another refresh through a shared reference.
///
/// # Example
///
/// ```ignore
/// let refresh = DeferredRefresh::new();
/// refresh.run(|| {
///     update_fields();
///     // A field normalised its value: ask for another pass.
///     refresh.run(|| update_fields()); // deferred, returns false
/// });
/// // Next frame:
/// refresh.tick(|| update_fields());
/// ```
#[derive(Debug, Default)]
pub struct DeferredRefresh {
    in_progress: Cell<bool>,
    requested_again: Cell<bool>,
    follow_up: TickSlot<()>,
}

impl DeferredRefresh {
    /// Creates an idle guard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `refresh` now unless a refresh is already in progress.
    ///
    /// A call made during a refresh only flags a follow-up and returns
    /// `false`; the follow-up is posted once the outer refresh completes.
    pub fn run(&self, refresh: impl FnOnce()) -> bool {
        if self.in_progress.get() {
            self.requested_again.set(true);
            return false;
        }

        self.in_progress.set(true);
        refresh();
        self.in_progress.set(false);

        if self.requested_again.replace(false) {
            log::trace!("Refresh requested during refresh; deferring to next tick");
            self.follow_up.post(());
        }
        true
    }

    /// Runs the deferred follow-up, if one is pending.
    ///
    /// Call once per scheduler tick. Returns `true` if a refresh ran.
    pub fn tick(&self, refresh: impl FnOnce()) -> bool {
        if self.follow_up.take().is_some() {
            self.run(refresh)
        } else {
            false
        }
    }

    /// Returns `true` while a refresh is running.
    pub fn in_progress(&self) -> bool {
        self.in_progress.get()
    }

    /// Returns `true` if a follow-up refresh waits for the next tick.
    pub fn has_pending(&self) -> bool {
        self.follow_up.is_pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_coalesces_to_last_post() {
        let slot = TickSlot::new();
        assert!(!slot.post(1));
        assert!(slot.post(2));
        assert!(slot.post(3));
        assert_eq!(slot.take(), Some(3));
        assert_eq!(slot.take(), None);
        assert!(!slot.is_pending());
    }

    #[test]
    fn run_executes_immediately_when_idle() {
        let refresh = DeferredRefresh::new();
        let runs = Cell::new(0);
        assert!(refresh.run(|| runs.set(runs.get() + 1)));
        assert_eq!(runs.get(), 1);
        assert!(!refresh.has_pending());
    }

    #[test]
    fn nested_requests_are_deferred_and_coalesced() {
        let refresh = DeferredRefresh::new();
        let runs = Cell::new(0);

        refresh.run(|| {
            runs.set(runs.get() + 1);
            assert!(refresh.in_progress());
            assert!(!refresh.run(|| runs.set(runs.get() + 100)));
            assert!(!refresh.run(|| runs.set(runs.get() + 100)));
        });

        // Nested calls never ran synchronously.
        assert_eq!(runs.get(), 1);
        assert!(refresh.has_pending());

        assert!(refresh.tick(|| runs.set(runs.get() + 1)));
        assert_eq!(runs.get(), 2);
        assert!(!refresh.has_pending());
        assert!(!refresh.tick(|| runs.set(runs.get() + 1)));
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn follow_up_may_defer_again() {
        let refresh = DeferredRefresh::new();
        refresh.run(|| {
            refresh.run(|| {});
        });
        refresh.tick(|| {
            refresh.run(|| {});
        });
        assert!(refresh.has_pending());
    }
}
