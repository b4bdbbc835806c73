//! Entity properties panel controller.
//!
//! Maps widget events of the properties panel onto snapshot sessions:
//!
//! | Event                   | Session effect                    |
//! |-------------------------|-----------------------------------|
//! | field focus gained      | `begin`                           |
//! | field focus lost        | `end`                             |
//! | enter pressed           | `begin` if closed, apply, `end`   |
//! | checkbox / select toggle| `begin`, apply, `end`             |
//! | value typed             | apply (inside the open session)   |
//!
//! The controller is toolkit-agnostic: it keeps the displayed values as
//! plain strings and check states that a UI layer renders.

use glam::Vec2;
use scenedit_core::abstract_editor::{DeferredRefresh, EditActionHistory};
use scenedit_ecs::components::{Flip, Tint, Transform};
use scenedit_ecs::{ComponentType, Entity, Scene, SnapshotSession};

/// Displayed value when selected entities disagree.
pub const MIXED_VALUE: &str = "?";

/// Tri-state checkbox display for a multi-selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckState {
    #[default]
    Unchecked,
    Checked,
    /// Selected entities disagree.
    Indeterminate,
}

/// Formats the value shared by all `values`, or [`MIXED_VALUE`].
///
/// Returns an empty string for no values.
pub fn common_float_value(values: impl IntoIterator<Item = f32>) -> String {
    let mut values = values.into_iter();
    let Some(first) = values.next() else {
        return String::new();
    };
    if values.all(|v| v == first) {
        first.to_string()
    } else {
        MIXED_VALUE.to_string()
    }
}

/// Check state shared by all `values`.
pub fn common_check_state(values: impl IntoIterator<Item = bool>) -> CheckState {
    let mut values = values.into_iter();
    let Some(first) = values.next() else {
        return CheckState::Unchecked;
    };
    if values.all(|v| v == first) {
        if first {
            CheckState::Checked
        } else {
            CheckState::Unchecked
        }
    } else {
        CheckState::Indeterminate
    }
}

/// A single field write coming from the panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldEdit {
    PositionX(f32),
    PositionY(f32),
    ScaleX(f32),
    ScaleY(f32),
    OriginX(f32),
    OriginY(f32),
    Rotation(f32),
    Tint { r: f32, g: f32, b: f32, a: f32 },
    FlipX(bool),
    FlipY(bool),
}

impl FieldEdit {
    /// Writes the value into `entity`. Returns `false` if the entity lacks
    /// the component the field belongs to.
    pub fn write(&self, entity: &mut Entity) -> bool {
        match *self {
            Self::PositionX(x) => with_transform(entity, |t| t.position.x = x),
            Self::PositionY(y) => with_transform(entity, |t| t.position.y = y),
            Self::ScaleX(x) => with_transform(entity, |t| t.scale.x = x),
            Self::ScaleY(y) => with_transform(entity, |t| t.scale.y = y),
            Self::OriginX(x) => with_transform(entity, |t| t.origin.x = x),
            Self::OriginY(y) => with_transform(entity, |t| t.origin.y = y),
            Self::Rotation(r) => with_transform(entity, |t| t.rotation = r),
            Self::Tint { r, g, b, a } => match entity.get_mut::<Tint>() {
                Some(tint) => {
                    *tint = Tint { r, g, b, a };
                    true
                }
                None => false,
            },
            Self::FlipX(x) => with_flip(entity, |f| f.x = x),
            Self::FlipY(y) => with_flip(entity, |f| f.y = y),
        }
    }
}

fn with_transform(entity: &mut Entity, edit: impl FnOnce(&mut Transform)) -> bool {
    entity.get_mut::<Transform>().map(edit).is_some()
}

fn with_flip(entity: &mut Entity, edit: impl FnOnce(&mut Flip)) -> bool {
    entity.get_mut::<Flip>().map(edit).is_some()
}

/// Values shown by the basic (transform and flip) part of the panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BasicValues {
    /// Hidden when nothing is selected.
    pub visible: bool,
    pub id: String,
    pub position_x: String,
    pub position_y: String,
    pub scale_x: String,
    pub scale_y: String,
    pub origin_x: String,
    pub origin_y: String,
    pub rotation: String,
    pub flip_x: CheckState,
    pub flip_y: CheckState,
}

impl BasicValues {
    fn read(scene: &Scene) -> Self {
        let entities = selected_entities(scene);
        if entities.is_empty() {
            return Self::default();
        }

        let transforms: Vec<&Transform> = entities
            .iter()
            .filter_map(|e| e.get::<Transform>())
            .collect();
        let flips: Vec<&Flip> = entities.iter().filter_map(|e| e.get::<Flip>()).collect();
        let field =
            |get: fn(&Transform) -> f32| common_float_value(transforms.iter().map(|t| get(t)));

        Self {
            visible: true,
            id: match entities.as_slice() {
                [single] => single.id().to_string(),
                _ => MIXED_VALUE.to_string(),
            },
            position_x: field(|t| t.position.x),
            position_y: field(|t| t.position.y),
            scale_x: field(|t| t.scale.x),
            scale_y: field(|t| t.scale.y),
            origin_x: field(|t| t.origin.x),
            origin_y: field(|t| t.origin.y),
            rotation: field(|t| t.rotation),
            flip_x: common_check_state(flips.iter().map(|f| f.x)),
            flip_y: common_check_state(flips.iter().map(|f| f.y)),
        }
    }
}

fn selected_entities(scene: &Scene) -> Vec<&Entity> {
    scene
        .selection()
        .proxies()
        .iter()
        .filter_map(|proxy| proxy.entity(scene.world()).ok())
        .collect()
}

/// A per-component section of the panel.
pub trait ComponentTable {
    /// Name of the component this table edits.
    fn component_name(&self) -> &'static str;

    /// Refreshes displayed values from the selection.
    ///
    /// Returns `true` if the refresh changed what it displays in a way that
    /// needs another pass (for instance a value was normalised).
    fn update_values(&mut self, scene: &Scene) -> bool;

    /// Returns `true` if every selected entity has the component.
    fn is_supported(&self, scene: &Scene) -> bool {
        let entities = selected_entities(scene);
        !entities.is_empty() && entities.iter().all(|e| e.has(self.component_name()))
    }
}

/// Tint channels of the selection.
#[derive(Debug, Default)]
pub struct TintTable {
    pub r: String,
    pub g: String,
    pub b: String,
    pub a: String,
    pub visible: bool,
}

impl ComponentTable for TintTable {
    fn component_name(&self) -> &'static str {
        Tint::NAME
    }

    fn update_values(&mut self, scene: &Scene) -> bool {
        self.visible = self.is_supported(scene);
        let entities = selected_entities(scene);
        let tints: Vec<&Tint> = entities.iter().filter_map(|e| e.get::<Tint>()).collect();
        self.r = common_float_value(tints.iter().map(|t| t.r));
        self.g = common_float_value(tints.iter().map(|t| t.g));
        self.b = common_float_value(tints.iter().map(|t| t.b));
        self.a = common_float_value(tints.iter().map(|t| t.a));
        false
    }
}

/// Borrowed editor state a panel event acts on.
pub struct PanelTarget<'a> {
    pub scene: &'a mut Scene,
    pub history: &'a mut EditActionHistory<Scene>,
    pub session: &'a mut SnapshotSession,
}

/// Properties panel controller for the current selection.
#[derive(Default)]
pub struct EntityProperties {
    basic: BasicValues,
    tables: Vec<Box<dyn ComponentTable>>,
    refresh: DeferredRefresh,
    dirty: bool,
}

impl EntityProperties {
    /// Creates a controller with the built-in [`TintTable`].
    pub fn new() -> Self {
        let mut properties = Self::default();
        properties.add_table(Box::new(TintTable::default()));
        properties
    }

    pub fn add_table(&mut self, table: Box<dyn ComponentTable>) {
        self.tables.push(table);
    }

    pub fn values(&self) -> &BasicValues {
        &self.basic
    }

    pub fn tables(&self) -> impl Iterator<Item = &dyn ComponentTable> + '_ {
        self.tables.iter().map(|t| t.as_ref())
    }

    /// Returns `true` if a panel edit changed the document since
    /// [`clear_dirty`](EntityProperties::clear_dirty).
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// A field of the panel gained keyboard focus.
    pub fn focus_gained(&mut self, target: PanelTarget<'_>) {
        target.session.begin(target.scene, target.history);
    }

    /// A field of the panel lost keyboard focus.
    pub fn focus_lost(&mut self, target: PanelTarget<'_>) {
        target.session.end(target.scene, target.history);
        self.refresh(target.scene);
    }

    /// Enter was pressed in a field.
    pub fn enter_pressed(&mut self, target: PanelTarget<'_>, edit: FieldEdit) {
        if !target.session.is_open() {
            target.session.begin(target.scene, target.history);
        }
        self.apply(target.scene, edit);
        target.session.end(target.scene, target.history);
        self.refresh(target.scene);
    }

    /// A checkbox or select box changed.
    pub fn checkbox_changed(&mut self, target: PanelTarget<'_>, edit: FieldEdit) {
        target.session.begin(target.scene, target.history);
        self.apply(target.scene, edit);
        target.session.end(target.scene, target.history);
        self.refresh(target.scene);
    }

    /// A field's text changed while it has focus.
    ///
    /// Normally runs inside the session opened by
    /// [`focus_gained`](EntityProperties::focus_gained). Without an open
    /// session the write is wrapped in its own begin/end so it stays
    /// undoable.
    pub fn value_changed(&mut self, target: PanelTarget<'_>, edit: FieldEdit) {
        if target.session.is_open() {
            self.apply(target.scene, edit);
            self.refresh(target.scene);
        } else {
            log::debug!("Value changed outside a snapshot session; committing it on its own");
            self.enter_pressed(target, edit);
        }
    }

    /// Writes `edit` into every selected entity.
    fn apply(&mut self, scene: &mut Scene, edit: FieldEdit) {
        let mut written = 0;
        for id in scene.selected_ids() {
            if let Some(entity) = scene.world_mut().entity_mut(id)
                && edit.write(entity)
            {
                written += 1;
            }
        }
        if written > 0 {
            self.dirty = true;
        }
        log::trace!("Applied {edit:?} to {written} entities");
    }

    /// Re-reads the displayed values from the selection.
    ///
    /// A refresh requested while one is running is deferred to the next
    /// [`tick`](EntityProperties::tick).
    pub fn refresh(&mut self, scene: &Scene) {
        let Self {
            basic,
            tables,
            refresh,
            ..
        } = self;
        let refresh = &*refresh;
        refresh.run(|| {
            Self::update_values(basic, tables, scene, refresh);
        });
    }

    /// Runs a deferred refresh, if one is pending.
    pub fn tick(&mut self, scene: &Scene) -> bool {
        let Self {
            basic,
            tables,
            refresh,
            ..
        } = self;
        let refresh = &*refresh;
        refresh.tick(|| {
            Self::update_values(basic, tables, scene, refresh);
        })
    }

    pub fn has_pending_refresh(&self) -> bool {
        self.refresh.has_pending()
    }

    fn update_values(
        basic: &mut BasicValues,
        tables: &mut [Box<dyn ComponentTable>],
        scene: &Scene,
        refresh: &DeferredRefresh,
    ) {
        *basic = BasicValues::read(scene);
        if !basic.visible {
            return;
        }
        for table in tables.iter_mut() {
            if table.update_values(scene) {
                // Runs on the next tick, not recursively.
                refresh.run(|| {});
            }
        }
    }
}

impl std::fmt::Debug for EntityProperties {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityProperties")
            .field("basic", &self.basic)
            .field("tables", &self.tables.len())
            .field("dirty", &self.dirty)
            .finish()
    }
}

/// Moves the selection's position by `delta`, as a drag gizmo would.
///
/// Must run inside an open session to be undoable.
pub fn translate_selection(scene: &mut Scene, delta: Vec2) {
    for id in scene.selected_ids() {
        if let Some(entity) = scene.world_mut().entity_mut(id)
            && let Some(transform) = entity.get_mut::<Transform>()
        {
            transform.position += delta;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use scenedit_ecs::ClonePolicy;

    use super::*;

    struct Fixture {
        scene: Scene,
        history: EditActionHistory<Scene>,
        session: SnapshotSession,
        panel: EntityProperties,
    }

    impl Fixture {
        fn new(count: usize) -> Self {
            let mut scene = Scene::new();
            let ids: Vec<_> = (0..count)
                .map(|_| {
                    scene
                        .spawn(vec![
                            Box::new(Transform::default()),
                            Box::new(Flip::default()),
                            Box::new(Tint::default()),
                        ])
                        .unwrap()
                })
                .collect();
            scene.set_selection(ids);
            Self {
                scene,
                history: EditActionHistory::new(100),
                session: SnapshotSession::new(ClonePolicy::SkipInvisible),
                panel: EntityProperties::new(),
            }
        }

        fn target(&mut self) -> (&mut EntityProperties, PanelTarget<'_>) {
            (
                &mut self.panel,
                PanelTarget {
                    scene: &mut self.scene,
                    history: &mut self.history,
                    session: &mut self.session,
                },
            )
        }
    }

    #[test]
    fn common_values() {
        assert_eq!(common_float_value([5.0, 5.0]), "5");
        assert_eq!(common_float_value([1.5]), "1.5");
        assert_eq!(common_float_value([5.0, 7.0]), "?");
        assert_eq!(common_float_value([]), "");
        assert_eq!(common_check_state([true, true]), CheckState::Checked);
        assert_eq!(common_check_state([false]), CheckState::Unchecked);
        assert_eq!(common_check_state([true, false]), CheckState::Indeterminate);
    }

    #[test]
    fn focus_edit_blur_records_one_entry() {
        let mut f = Fixture::new(2);
        let (panel, target) = f.target();
        panel.focus_gained(target);
        let (panel, target) = f.target();
        panel.value_changed(target, FieldEdit::PositionX(3.0));
        let (panel, target) = f.target();
        panel.value_changed(target, FieldEdit::PositionX(4.0));
        let (panel, target) = f.target();
        panel.focus_lost(target);

        assert_eq!(f.history.undo_count(), 1);
        assert_eq!(f.panel.values().position_x, "4");
        assert!(f.panel.is_dirty());

        f.history.undo(&mut f.scene).unwrap();
        f.panel.refresh(&f.scene);
        assert_eq!(f.panel.values().position_x, "0");
    }

    #[test]
    fn checkbox_commits_immediately() {
        let mut f = Fixture::new(1);
        let (panel, target) = f.target();
        panel.checkbox_changed(target, FieldEdit::FlipX(true));
        assert_eq!(f.history.undo_count(), 1);
        assert!(!f.session.is_open());
        assert_eq!(f.panel.values().flip_x, CheckState::Checked);
    }

    #[test]
    fn enter_without_focus_opens_its_own_session() {
        let mut f = Fixture::new(1);
        let (panel, target) = f.target();
        panel.enter_pressed(target, FieldEdit::Rotation(30.0));
        assert_eq!(f.history.undo_count(), 1);
        assert_eq!(f.panel.values().rotation, "30");
    }

    #[test]
    fn mixed_selection_displays_question_mark() {
        let mut f = Fixture::new(2);
        let first = f.scene.selected_ids()[0];
        let entity = f.scene.world_mut().entity_mut(first).unwrap();
        entity.get_mut::<Transform>().unwrap().rotation = 10.0;
        entity.get_mut::<Flip>().unwrap().y = true;

        f.panel.refresh(&f.scene);
        let values = f.panel.values();
        assert!(values.visible);
        assert_eq!(values.id, MIXED_VALUE);
        assert_eq!(values.rotation, MIXED_VALUE);
        assert_eq!(values.position_x, "0");
        assert_eq!(values.flip_y, CheckState::Indeterminate);
    }

    #[test]
    fn empty_selection_hides_panel() {
        let mut f = Fixture::new(1);
        f.scene.clear_selection();
        f.panel.refresh(&f.scene);
        assert!(!f.panel.values().visible);
    }

    #[test]
    fn tint_table_tracks_selection() {
        let mut f = Fixture::new(1);
        let (panel, target) = f.target();
        panel.checkbox_changed(
            target,
            FieldEdit::Tint {
                r: 0.5,
                g: 1.0,
                b: 1.0,
                a: 1.0,
            },
        );
        let table = f.panel.tables().next().unwrap();
        assert_eq!(table.component_name(), "Tint");
        assert!(table.is_supported(&f.scene));
    }

    struct Normalising {
        passes: Rc<Cell<u32>>,
    }

    impl ComponentTable for Normalising {
        fn component_name(&self) -> &'static str {
            "Transform"
        }

        fn update_values(&mut self, _scene: &Scene) -> bool {
            self.passes.set(self.passes.get() + 1);
            self.passes.get() == 1
        }
    }

    #[test]
    fn table_requests_are_deferred_to_tick() {
        let mut f = Fixture::new(1);
        let passes = Rc::new(Cell::new(0));
        f.panel.add_table(Box::new(Normalising {
            passes: passes.clone(),
        }));

        f.panel.refresh(&f.scene);
        assert_eq!(passes.get(), 1);
        assert!(f.panel.has_pending_refresh());

        assert!(f.panel.tick(&f.scene));
        assert_eq!(passes.get(), 2);
        assert!(!f.panel.has_pending_refresh());
        assert!(!f.panel.tick(&f.scene));
    }

    #[test]
    fn translate_inside_session_is_undoable() {
        let mut f = Fixture::new(2);
        f.session.begin(&f.scene, &mut f.history);
        translate_selection(&mut f.scene, Vec2::new(1.0, 2.0));
        f.session.end(&f.scene, &mut f.history);

        assert_eq!(f.history.undo_descriptions().next(), Some("Change Entities Properties"));
        f.history.undo(&mut f.scene).unwrap();
        f.panel.refresh(&f.scene);
        assert_eq!(f.panel.values().position_y, "0");
    }
}
