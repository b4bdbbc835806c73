use scenedit_core::abstract_editor::{EditAction, EditActionError, EditActionHistory};
use scenedit_ecs::{AddComponentAction, EntityId, Scene, SnapshotSession, add_component_group};

use crate::config::EditorConfig;
use crate::notifications::Notifications;
use crate::properties::{EntityProperties, FieldEdit, PanelTarget};

/// Owns the open document and everything that edits it.
///
/// There are no globals: the scene, its undo history, the snapshot session
/// and the properties panel all live here and are passed down explicitly.
#[derive(Debug)]
pub struct EditorContext {
    scene: Scene,
    history: EditActionHistory<Scene>,
    session: SnapshotSession,
    properties: EntityProperties,
    notifications: Notifications,
}

impl EditorContext {
    pub fn new(config: &EditorConfig) -> Self {
        Self::with_scene(Scene::new(), config)
    }

    pub fn with_scene(scene: Scene, config: &EditorConfig) -> Self {
        let mut context = Self {
            scene,
            history: EditActionHistory::new(config.history.max_undo),
            session: SnapshotSession::new(config.properties.clone_policy),
            properties: EntityProperties::new(),
            notifications: Notifications::new(),
        };
        context.properties.refresh(&context.scene);
        context
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Direct scene access for edits that bypass the properties panel.
    ///
    /// Such edits are only undoable between [`begin_edit`](Self::begin_edit)
    /// and [`end_edit`](Self::end_edit).
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn history(&self) -> &EditActionHistory<Scene> {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut EditActionHistory<Scene> {
        &mut self.history
    }

    pub fn session(&self) -> &SnapshotSession {
        &self.session
    }

    pub fn properties(&self) -> &EntityProperties {
        &self.properties
    }

    pub fn notifications_mut(&mut self) -> &mut Notifications {
        &mut self.notifications
    }

    /// Replaces the selection and refreshes the panel.
    pub fn select(&mut self, ids: impl IntoIterator<Item = EntityId>) {
        self.scene.set_selection(ids);
        self.properties.refresh(&self.scene);
    }

    // ---- Snapshot sessions ----

    /// Opens a snapshot session over the selection (gizmo drag start etc.).
    pub fn begin_edit(&mut self) {
        self.session.begin(&self.scene, &mut self.history);
    }

    /// Closes the snapshot session, recording the edit if anything changed.
    pub fn end_edit(&mut self) {
        self.session.end(&self.scene, &mut self.history);
        self.properties.refresh(&self.scene);
    }

    // ---- Properties panel events ----

    fn panel(&mut self) -> (&mut EntityProperties, PanelTarget<'_>) {
        (
            &mut self.properties,
            PanelTarget {
                scene: &mut self.scene,
                history: &mut self.history,
                session: &mut self.session,
            },
        )
    }

    pub fn focus_gained(&mut self) {
        let (panel, target) = self.panel();
        panel.focus_gained(target);
    }

    pub fn focus_lost(&mut self) {
        let (panel, target) = self.panel();
        panel.focus_lost(target);
    }

    pub fn value_changed(&mut self, edit: FieldEdit) {
        let (panel, target) = self.panel();
        panel.value_changed(target, edit);
    }

    pub fn enter_pressed(&mut self, edit: FieldEdit) {
        let (panel, target) = self.panel();
        panel.enter_pressed(target, edit);
    }

    pub fn checkbox_changed(&mut self, edit: FieldEdit) {
        let (panel, target) = self.panel();
        panel.checkbox_changed(target, edit);
    }

    // ---- History ----

    /// Undoes the last action. An open session is committed first.
    ///
    /// Returns `true` if an action was undone.
    pub fn undo(&mut self) -> bool {
        self.session.end(&self.scene, &mut self.history);
        let undone = match self.history.undo(&mut self.scene) {
            Ok(undone) => undone,
            Err(e) => {
                log::warn!("Undo failed: {e}");
                self.report("Undo failed!", &e);
                false
            }
        };
        self.properties.refresh(&self.scene);
        undone
    }

    /// Redoes the last undone action. An open session is committed first.
    ///
    /// Returns `true` if an action was redone.
    pub fn redo(&mut self) -> bool {
        self.session.end(&self.scene, &mut self.history);
        let redone = match self.history.redo(&mut self.scene) {
            Ok(redone) => redone,
            Err(e) => {
                log::warn!("Redo failed: {e}");
                self.report("Redo failed!", &e);
                false
            }
        };
        self.properties.refresh(&self.scene);
        redone
    }

    fn report(&mut self, title: &str, error: &EditActionError) {
        match error {
            EditActionError::ConstructionFailed { what, detail } => {
                self.notifications
                    .error(title, format!("Could not rebuild {what}: {detail}"));
            }
            other => self.notifications.error(title, other.to_string()),
        }
    }

    /// Attaches a default `component` to every selected entity as one undo
    /// step.
    ///
    /// Does nothing for an empty selection. Returns `true` if the action
    /// was recorded.
    pub fn add_component(&mut self, component: &str) -> bool {
        let selected = self.scene.selected_ids();
        if selected.is_empty() {
            log::debug!("No entities selected; not adding `{component}`");
            return false;
        }

        self.session.end(&self.scene, &mut self.history);
        let mut group = add_component_group();
        for id in selected {
            group.push(AddComponentAction::new(id, component));
        }
        let description = group.description().to_string();

        let recorded = match self.history.execute(Box::new(group), &mut self.scene) {
            Ok(()) => {
                log::info!("{description}: `{component}`");
                true
            }
            Err(EditActionError::ConstructionFailed { what, detail }) => {
                self.notifications.error(
                    "Component creation failed!",
                    format!("Could not create {what}: {detail}"),
                );
                false
            }
            Err(e) => {
                self.notifications.error("Component creation failed!", e.to_string());
                false
            }
        };
        self.properties.refresh(&self.scene);
        recorded
    }

    // ---- Document lifecycle ----

    /// Runs once per UI frame: queued session requests, then any deferred
    /// panel refresh.
    pub fn tick(&mut self) {
        self.session.pump(&self.scene, &mut self.history);
        self.properties.tick(&self.scene);
    }

    /// Replaces the document. Undo history does not survive a reload.
    pub fn reload_document(&mut self, scene: Scene) {
        self.session.end(&self.scene, &mut self.history);
        self.scene = scene;
        self.history.clear();
        self.history.mark_saved();
        self.properties.clear_dirty();
        self.properties.refresh(&self.scene);
        log::info!("Document reloaded ({} entities)", self.scene.world().len());
    }

    pub fn mark_saved(&mut self) {
        self.history.mark_saved();
        self.properties.clear_dirty();
    }

    /// Returns `true` if the document differs from its last save.
    pub fn is_dirty(&self) -> bool {
        self.history.has_unsaved_changes()
    }
}

#[cfg(test)]
mod tests {
    use scenedit_ecs::components::{Tint, Transform};

    use super::*;

    fn context_with(count: usize) -> (EditorContext, Vec<EntityId>) {
        let mut context = EditorContext::new(&EditorConfig::default());
        let ids: Vec<_> = (0..count)
            .map(|_| {
                context
                    .scene_mut()
                    .spawn(vec![Box::new(Transform::default())])
                    .unwrap()
            })
            .collect();
        context.select(ids.iter().copied());
        (context, ids)
    }

    #[test]
    fn add_component_to_selection() {
        let (mut context, ids) = context_with(2);
        assert!(context.add_component("Tint"));
        assert_eq!(context.history().undo_descriptions().next(), Some("Add Components"));
        assert_eq!(context.scene().world().entities_with("Tint"), ids.as_slice());

        assert!(context.undo());
        assert!(context.scene().world().entities_with("Tint").is_empty());
    }

    #[test]
    fn add_component_with_empty_selection_is_noop() {
        let (mut context, _) = context_with(1);
        context.select(Vec::<EntityId>::new());
        assert!(!context.add_component("Tint"));
        assert!(!context.history().can_undo());
    }

    #[test]
    fn add_unknown_component_notifies() {
        let (mut context, _) = context_with(1);
        assert!(!context.add_component("Rigidbody"));
        let notifications = context.notifications_mut().take();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].title, "Component creation failed!");
        assert!(notifications[0].detail.contains("Rigidbody"));
        assert!(!context.history().can_undo());
    }

    #[test]
    fn undo_commits_open_session_first() {
        let (mut context, ids) = context_with(1);
        context.focus_gained();
        context.value_changed(FieldEdit::Rotation(15.0));
        assert!(context.session().is_open());

        assert!(context.undo());
        assert!(!context.session().is_open());
        let entity = context.scene().world().entity(ids[0]).unwrap();
        assert_eq!(entity.get::<Transform>().unwrap().rotation, 0.0);
        assert!(context.redo());
    }

    #[test]
    fn undo_on_empty_history_is_noop() {
        let (mut context, _) = context_with(1);
        assert!(!context.undo());
        assert!(!context.redo());
        assert!(context.notifications_mut().take().is_empty());
    }

    #[test]
    fn failed_redo_is_reported() {
        let (mut context, ids) = context_with(1);
        context.add_component("Tint");
        context.checkbox_changed(FieldEdit::Tint {
            r: 1.0,
            g: 1.0,
            b: 1.0,
            a: 3.0,
        });
        assert!(context.undo());

        context
            .scene_mut()
            .world_mut()
            .register_validator::<Tint>(|tint| {
                if tint.a <= 1.0 {
                    Ok(())
                } else {
                    Err("alpha above 1".into())
                }
            });
        assert!(!context.redo());

        let notifications = context.notifications_mut().take();
        assert_eq!(notifications[0].title, "Redo failed!");
        assert!(notifications[0].detail.contains("alpha above 1"));
        assert_eq!(context.history().redo_count(), 1);
        let entity = context.scene().world().entity(ids[0]).unwrap();
        assert_eq!(entity.get::<Tint>().unwrap().a, 1.0);
    }

    #[test]
    fn reload_clears_history() {
        let (mut context, _) = context_with(1);
        context.enter_pressed(FieldEdit::PositionX(2.0));
        assert!(context.is_dirty());
        assert!(context.properties().is_dirty());

        context.reload_document(Scene::new());
        assert!(!context.history().can_undo());
        assert!(!context.is_dirty());
        assert!(!context.properties().values().visible);
    }

    #[test]
    fn save_tracking_follows_undo() {
        let (mut context, _) = context_with(1);
        context.enter_pressed(FieldEdit::PositionX(2.0));
        context.mark_saved();
        assert!(!context.is_dirty());
        context.undo();
        assert!(context.is_dirty());
        context.redo();
        assert!(!context.is_dirty());
    }
}
