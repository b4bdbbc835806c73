//! Headless scripted session: edits a small scene through the properties
//! panel and walks the undo history back and forth.

use std::path::PathBuf;

use clap::Parser;
use glam::Vec2;
use scenedit_ecs::Scene;
use scenedit_ecs::components::{Flip, Name, SpriteRenderState, Transform};
use scenedit_editor::properties::translate_selection;
use scenedit_editor::{EditorContext, FieldEdit, load_or_default};

/// Scenedit entity editor.
#[derive(Parser, Debug)]
#[command(
    name = "scenedit-editor",
    about = "Snapshot-based entity undo/redo editor",
    version
)]
struct Args {
    /// Path to the editor configuration file.
    #[arg(long, default_value = "editor.toml")]
    config: PathBuf,

    /// Override the maximum number of undo steps.
    #[arg(long)]
    max_undo: Option<usize>,

    /// Number of sprites in the demo scene.
    #[arg(long, default_value = "3")]
    sprites: usize,
}

fn demo_scene(sprites: usize) -> Scene {
    let mut scene = Scene::new();
    for i in 0..sprites {
        let spawned = scene.spawn(vec![
            Box::new(Transform {
                position: Vec2::new(i as f32 * 32.0, 0.0),
                ..Transform::default()
            }),
            Box::new(Flip::default()),
            Box::new(Name(format!("sprite_{i}"))),
            Box::new(SpriteRenderState::default()),
        ]);
        if let Err(e) = spawned {
            log::error!("Failed to spawn sprite {i}: {e}");
        }
    }
    scene
}

fn log_history(context: &EditorContext) {
    let history = context.history();
    log::info!(
        "History: {} undo / {} redo, dirty = {}",
        history.undo_count(),
        history.redo_count(),
        context.is_dirty()
    );
    for (i, description) in history.undo_descriptions().enumerate() {
        log::info!("  undo[{i}] {description}");
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut config = load_or_default(&args.config);
    if let Some(max_undo) = args.max_undo {
        config.history.max_undo = max_undo;
    }

    let mut context = EditorContext::with_scene(demo_scene(args.sprites), &config);
    let ids: Vec<_> = context.scene().world().ids().collect();
    context.select(ids.iter().copied());

    // Type into the rotation field, then leave it.
    context.focus_gained();
    context.value_changed(FieldEdit::Rotation(45.0));
    context.value_changed(FieldEdit::Rotation(90.0));
    context.focus_lost();

    // Toggle a checkbox and drag with a gizmo.
    context.checkbox_changed(FieldEdit::FlipX(true));
    context.begin_edit();
    translate_selection(context.scene_mut(), Vec2::new(8.0, -4.0));
    context.end_edit();

    // Focus and blur without typing records nothing.
    context.focus_gained();
    context.focus_lost();

    context.add_component("Tint");
    context.add_component("Rigidbody");
    context.tick();
    log_history(&context);

    while context.undo() {}
    log::info!("Rotation after undoing everything: {}", context.properties().values().rotation);
    while context.redo() {}
    log::info!("Rotation after redoing everything: {}", context.properties().values().rotation);
    log_history(&context);

    for notification in context.notifications_mut().take() {
        log::warn!("Notification: {} ({})", notification.title, notification.detail);
    }
}
