//! Editor wiring for scenedit.
//!
//! Connects the entity properties panel to snapshot sessions and the undo
//! history. [`EditorContext`] owns one open document; everything else is
//! reached through it.

pub mod config;
mod context;
pub mod notifications;
pub mod properties;

pub use config::{ConfigError, EditorConfig, load_config, load_or_default};
pub use context::EditorContext;
pub use notifications::{Notification, Notifications};
pub use properties::{CheckState, EntityProperties, FieldEdit, MIXED_VALUE};
