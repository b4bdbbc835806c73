//! # scenedit core
//!
//! Editor-agnostic undo/redo machinery: reversible actions, action groups,
//! the undo/redo history and the deferred refresh guard used by the UI tick.

pub mod abstract_editor;

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
