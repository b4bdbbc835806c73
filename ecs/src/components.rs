//! Standard 2D scene components.

use glam::Vec2;

use crate::{Component, World};

/// Placement of an entity in the scene.
#[derive(Debug, Clone, Component)]
pub struct Transform {
    pub position: Vec2,
    pub scale: Vec2,
    pub origin: Vec2,
    /// Rotation in degrees.
    pub rotation: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            scale: Vec2::ONE,
            origin: Vec2::ZERO,
            rotation: 0.0,
        }
    }
}

/// RGBA color multiplier, channels in `0.0..=1.0`.
#[derive(Debug, Clone, Component)]
pub struct Tint {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Default for Tint {
    fn default() -> Self {
        Self {
            r: 1.0,
            g: 1.0,
            b: 1.0,
            a: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default, Component)]
pub struct Flip {
    pub x: bool,
    pub y: bool,
}

#[derive(Debug, Clone, Default, Component)]
pub struct Name(pub String);

#[derive(Debug, Clone, Default, Component)]
pub struct Tags(pub Vec<String>);

/// Cached render data derived from the other components.
#[derive(Debug, Clone, Default, Component)]
#[component(invisible)]
pub struct SpriteRenderState {
    pub texture: Option<String>,
    pub vertices: Vec<f32>,
}

/// Registers every component in this module.
pub fn register_std_components(world: &mut World) {
    world.register_component::<Transform>();
    world.register_component::<Tint>();
    world.register_component::<Flip>();
    world.register_component::<Name>();
    world.register_component::<Tags>();
    world.register_component::<SpriteRenderState>();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_registered() {
        let mut world = World::new();
        register_std_components(&mut world);
        for name in ["Transform", "Tint", "Flip", "Name", "Tags", "SpriteRenderState"] {
            assert!(world.is_registered(name), "{name}");
        }
    }

    #[test]
    fn defaults() {
        assert_eq!(Transform::default().scale, Vec2::ONE);
        assert_eq!(Tint::default().a, 1.0);
        assert!(SpriteRenderState::default().is_invisible());
    }
}
