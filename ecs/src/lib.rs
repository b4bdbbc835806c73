//! # scenedit ECS
//!
//! Entity world and the snapshot-based undo engine built on top of it.
//!
//! ## Core Types
//!
//! - [`EntityId`]: Stable identity token of an entity (UUID v4)
//! - [`Entity`]: Live entity: an id plus at most one component per name
//! - [`World`]: Arena-of-slots entity engine with a component registry
//! - [`EntityProxy`] / [`Selection`]: Reloadable handles onto live entities
//! - [`Scene`]: The editable target: world, cloner and selection
//!
//! ## Snapshots
//!
//! - [`EntityScheme`]: Deep-cloned snapshot of one entity, rebuildable in place
//! - [`Cloner`] / [`DeepCloner`]: Deep-copy protocol for components
//! - [`StructuralEq`]: Exact structural equality over component data
//! - [`SnapshotSession`]: Begin/end capture window producing [`SnapshotGroup`]s
//!
//! ## Actions
//!
//! - [`EntitySnapshot`]: Rebuilds an entity from its before/after schemes
//! - [`AddComponentAction`] / [`RemoveComponentAction`]: Leaf component edits
//!
//! Use `#[derive(Component)]` to declare components:
//!
//! ```ignore
//! use scenedit_ecs::Component;
//!
//! #[derive(Debug, Clone, Default, Component)]
//! struct Health {
//!     current: f32,
//!     max: f32,
//! }
//! ```

extern crate self as scenedit_ecs;

pub mod actions;
mod cloner;
mod component;
pub mod components;
mod entity;
mod error;
mod proxy;
mod scene;
mod scheme;
mod selection;
pub mod session;
mod snapshot;
mod structural;
mod world;

pub use actions::{
    AddComponentAction, AddComponentGroup, RemoveComponentAction, add_component_group,
};
pub use cloner::{Cloner, DeepCloner};
pub use component::{Component, ComponentType};
pub use ecs_macro::{Component, StructuralEq};
pub use entity::{Entity, EntityId};
pub use error::SceneError;
pub use proxy::EntityProxy;
pub use scene::Scene;
pub use scheme::{ClonePolicy, EntityScheme, IdentityPolicy};
pub use selection::Selection;
pub use session::{CommitOutcome, SessionRequest, SessionRequests, SessionState, SnapshotSession};
pub use snapshot::{EntitySnapshot, SnapshotGroup, snapshot_group};
pub use structural::StructuralEq;
pub use world::{EntityLocation, World};
