//! Transaction sessions: the begin/end window around one undoable gesture.
//!
//! [`SnapshotSession::begin`] captures a before-scheme of every selected
//! entity. The edit then mutates the live entities directly. On
//! [`end`](SnapshotSession::end) the session captures after-schemes, drops
//! entities that did not change and records the rest as one
//! [`SnapshotGroup`](crate::SnapshotGroup) with
//! [`EditActionHistory::add`], so nothing is applied twice.
//!
//! # Re-entrancy
//!
//! Recording notifies history listeners. A listener that wants to open or
//! close a session cannot reach the session directly; it pushes a
//! [`SessionRequest`] through a [`SessionRequests`] handle instead. Requests
//! are run in order once the current commit is finished, never interleaved
//! with it.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use scenedit_core::abstract_editor::{EditAction, EditActionHistory};

use crate::entity::EntityId;
use crate::scene::Scene;
use crate::scheme::{ClonePolicy, EntityScheme};
use crate::snapshot::{EntitySnapshot, snapshot_group};

/// Lifecycle of a [`SnapshotSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Closed,
    Open,
    /// `end` is handing the recorded group to the history.
    Committing,
}

/// A deferred session command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionRequest {
    Begin,
    End,
}

/// Shared FIFO of session commands.
///
/// Cloning yields another handle onto the same queue.
#[derive(Debug, Clone, Default)]
pub struct SessionRequests {
    queue: Rc<RefCell<VecDeque<SessionRequest>>>,
}

impl SessionRequests {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_begin(&self) {
        self.push(SessionRequest::Begin);
    }

    pub fn request_end(&self) {
        self.push(SessionRequest::End);
    }

    pub fn push(&self, request: SessionRequest) {
        self.queue.borrow_mut().push_back(request);
    }

    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }

    fn pop(&self) -> Option<SessionRequest> {
        self.queue.borrow_mut().pop_front()
    }
}

/// Result of closing a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// No session was open.
    NotOpen,
    /// The session closed without observable changes; nothing was recorded.
    Unchanged,
    /// One group was added to the history.
    Recorded { entities: usize },
}

/// Captures before/after snapshots around a burst of edits.
///
/// # Example
///
/// ```
/// use scenedit_core::abstract_editor::EditActionHistory;
/// use scenedit_ecs::components::Transform;
/// use scenedit_ecs::{ClonePolicy, CommitOutcome, Scene, SnapshotSession};
///
/// let mut scene = Scene::new();
/// let mut history = EditActionHistory::new(100);
/// let mut session = SnapshotSession::new(ClonePolicy::SkipInvisible);
///
/// let id = scene.spawn(vec![Box::new(Transform::default())]).unwrap();
/// scene.select(id).unwrap();
///
/// session.begin(&scene, &mut history);
/// let entity = scene.world_mut().entity_mut(id).unwrap();
/// entity.get_mut::<Transform>().unwrap().rotation = 1.5;
/// assert_eq!(
///     session.end(&scene, &mut history),
///     CommitOutcome::Recorded { entities: 1 }
/// );
///
/// history.undo(&mut scene).unwrap();
/// let entity = scene.world().entity(id).unwrap();
/// assert_eq!(entity.get::<Transform>().unwrap().rotation, 0.0);
/// ```
#[derive(Debug)]
pub struct SnapshotSession {
    state: SessionState,
    policy: ClonePolicy,
    before: Vec<EntityScheme>,
    requests: SessionRequests,
}

impl SnapshotSession {
    pub fn new(policy: ClonePolicy) -> Self {
        Self {
            state: SessionState::Closed,
            policy,
            before: Vec::new(),
            requests: SessionRequests::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == SessionState::Open
    }

    pub fn policy(&self) -> ClonePolicy {
        self.policy
    }

    /// Sets the policy for the next [`begin`](SnapshotSession::begin).
    pub fn set_policy(&mut self, policy: ClonePolicy) {
        self.policy = policy;
    }

    /// Returns a handle for deferred begin/end requests.
    pub fn requests(&self) -> SessionRequests {
        self.requests.clone()
    }

    /// Ids of the entities captured by the open session.
    pub fn tracked(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.before.iter().map(EntityScheme::id)
    }

    /// Opens a session over the current selection.
    ///
    /// An already open session is committed first; its outcome is returned
    /// ([`CommitOutcome::NotOpen`] if none was open).
    pub fn begin(
        &mut self,
        scene: &Scene,
        history: &mut EditActionHistory<Scene>,
    ) -> CommitOutcome {
        let outcome = self.commit(scene, history);
        self.open(scene);
        self.drain(scene, history);
        outcome
    }

    /// Closes the session, recording one group if anything changed.
    pub fn end(&mut self, scene: &Scene, history: &mut EditActionHistory<Scene>) -> CommitOutcome {
        let outcome = self.commit(scene, history);
        self.drain(scene, history);
        outcome
    }

    /// Runs requests queued outside a commit. Returns how many ran.
    pub fn pump(&mut self, scene: &Scene, history: &mut EditActionHistory<Scene>) -> usize {
        self.drain(scene, history)
    }

    fn open(&mut self, scene: &Scene) {
        self.before = scene.capture_selection(self.policy);
        self.state = SessionState::Open;
        log::debug!(
            "Snapshot session opened for {} entities ({:?})",
            self.before.len(),
            self.policy
        );
    }

    fn commit(&mut self, scene: &Scene, history: &mut EditActionHistory<Scene>) -> CommitOutcome {
        if self.state != SessionState::Open {
            return CommitOutcome::NotOpen;
        }
        self.state = SessionState::Committing;

        let mut group = snapshot_group();
        for before in std::mem::take(&mut self.before) {
            let Some(entity) = scene.world().entity(before.id()) else {
                log::warn!(
                    "Entity {} was deleted during the edit; dropping it from the snapshot",
                    before.id()
                );
                continue;
            };
            let after = EntityScheme::cloned_of(entity, scene.cloner(), before.policy());
            let snapshot = EntitySnapshot::new(before, after);
            if snapshot.is_unchanged() {
                log::trace!("Entity {} unchanged", snapshot.id());
            } else {
                group.push(snapshot);
            }
        }

        let outcome = if group.is_empty() {
            log::debug!("Snapshot session closed without changes");
            CommitOutcome::Unchanged
        } else {
            let entities = group.len();
            log::info!("Recorded '{}' for {entities} entities", group.description());
            history.add(Box::new(group));
            CommitOutcome::Recorded { entities }
        };

        self.state = SessionState::Closed;
        outcome
    }

    fn drain(&mut self, scene: &Scene, history: &mut EditActionHistory<Scene>) -> usize {
        let mut ran = 0;
        while let Some(request) = self.requests.pop() {
            log::trace!("Running deferred session request {request:?}");
            match request {
                SessionRequest::Begin => {
                    self.commit(scene, history);
                    self.open(scene);
                }
                SessionRequest::End => {
                    self.commit(scene, history);
                }
            }
            ran += 1;
        }
        ran
    }
}

impl Default for SnapshotSession {
    fn default() -> Self {
        Self::new(ClonePolicy::SkipInvisible)
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::components::Transform;

    fn scene_with(count: usize) -> (Scene, Vec<EntityId>) {
        let mut scene = Scene::new();
        let ids: Vec<_> = (0..count)
            .map(|_| scene.spawn(vec![Box::new(Transform::default())]).unwrap())
            .collect();
        scene.set_selection(ids.iter().copied());
        (scene, ids)
    }

    fn set_position(scene: &mut Scene, id: EntityId, position: Vec2) {
        let entity = scene.world_mut().entity_mut(id).unwrap();
        entity.get_mut::<Transform>().unwrap().position = position;
    }

    #[test]
    fn end_on_closed_session_is_noop() {
        let (scene, _) = scene_with(1);
        let mut history = EditActionHistory::new(10);
        let mut session = SnapshotSession::default();
        assert_eq!(session.end(&scene, &mut history), CommitOutcome::NotOpen);
        assert_eq!(history.undo_count(), 0);
    }

    #[test]
    fn unchanged_edit_records_nothing() {
        let (scene, _) = scene_with(2);
        let mut history = EditActionHistory::new(10);
        let mut session = SnapshotSession::default();
        assert_eq!(session.begin(&scene, &mut history), CommitOutcome::NotOpen);
        assert!(session.is_open());
        assert_eq!(session.tracked().count(), 2);
        assert_eq!(session.end(&scene, &mut history), CommitOutcome::Unchanged);
        assert!(!session.is_open());
        assert_eq!(history.undo_count(), 0);
    }

    #[test]
    fn only_changed_entities_are_recorded() {
        let (mut scene, ids) = scene_with(3);
        let mut history = EditActionHistory::new(10);
        let mut session = SnapshotSession::default();

        session.begin(&scene, &mut history);
        set_position(&mut scene, ids[1], Vec2::ONE);
        assert_eq!(
            session.end(&scene, &mut history),
            CommitOutcome::Recorded { entities: 1 }
        );

        let group = history
            .peek_undo()
            .and_then(|a| a.as_any().downcast_ref::<crate::SnapshotGroup>())
            .unwrap();
        assert_eq!(group.iter().map(EntitySnapshot::id).collect::<Vec<_>>(), vec![ids[1]]);
        assert_eq!(history.undo_descriptions().next(), Some("Change Entity Properties"));
    }

    #[test]
    fn deleted_entity_is_dropped() {
        let (mut scene, ids) = scene_with(2);
        let mut history = EditActionHistory::new(10);
        let mut session = SnapshotSession::default();

        session.begin(&scene, &mut history);
        set_position(&mut scene, ids[0], Vec2::ONE);
        set_position(&mut scene, ids[1], Vec2::ONE);
        scene.despawn(ids[0]);

        assert_eq!(
            session.end(&scene, &mut history),
            CommitOutcome::Recorded { entities: 1 }
        );
    }

    #[test]
    fn begin_while_open_commits_first() {
        let (mut scene, ids) = scene_with(1);
        let mut history = EditActionHistory::new(10);
        let mut session = SnapshotSession::default();

        session.begin(&scene, &mut history);
        set_position(&mut scene, ids[0], Vec2::ONE);
        assert_eq!(
            session.begin(&scene, &mut history),
            CommitOutcome::Recorded { entities: 1 }
        );
        assert!(session.is_open());
        assert_eq!(history.undo_count(), 1);
    }

    #[test]
    fn requests_raised_during_commit_run_afterwards() {
        let (mut scene, ids) = scene_with(1);
        let mut history = EditActionHistory::new(10);
        let mut session = SnapshotSession::default();

        let requests = session.requests();
        let fired = Rc::new(RefCell::new(false));
        let fired_in_listener = fired.clone();
        history.subscribe(move |status| {
            if status.undo_count == 1 && !*fired_in_listener.borrow() {
                *fired_in_listener.borrow_mut() = true;
                requests.request_begin();
            }
        });

        session.begin(&scene, &mut history);
        set_position(&mut scene, ids[0], Vec2::ONE);
        session.end(&scene, &mut history);

        // The listener reopened the session after the commit completed.
        assert!(*fired.borrow());
        assert!(session.is_open());
        assert!(session.requests().is_empty());
        assert_eq!(history.undo_count(), 1);
    }

    #[test]
    fn pump_runs_queued_requests() {
        let (scene, _) = scene_with(1);
        let mut history = EditActionHistory::new(10);
        let mut session = SnapshotSession::default();

        let requests = session.requests();
        requests.request_begin();
        requests.request_end();
        assert_eq!(requests.len(), 2);

        assert_eq!(session.pump(&scene, &mut history), 2);
        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(session.pump(&scene, &mut history), 0);
    }
}
