//! # A Small Entity Component Store
//!
//! Game objects are entities identified by generational handles; their data
//! lives in per-entity component maps; systems are plain functions run in a
//! fixed order each frame.
//!
//! ## Module Overview
//!
//! - [`entity`] — Generational entity handles
//! - [`component`] — Per-entity typed component maps and spawn bundles
//! - [`query`] — Extract/restore borrowing of several components at once
//! - [`group`] — The entities of one level, with deferred pruning
//! - [`system`] — System trait and schedule runner

pub mod component;
pub mod entity;
pub mod group;
pub mod query;
pub mod system;

pub use component::{Components, SpawnBundle};
pub use entity::Entity;
pub use group::{DetachedEntity, EntityGroup, Pruned};
pub use query::{QueryParam, With, Without};
pub use system::{Schedule, System};
