//! # Collisions
//!
//! - [`layer`] — Collision layers, transparency and solidity
//! - [`collider`] — The per-entity AABB and its collision list
//! - [`detector`] — The per-frame detection pass

pub mod collider;
pub mod detector;
pub mod layer;

pub use collider::{Collider, Collision};
#[cfg(feature = "diagnostics")]
pub use detector::DetectorStats;
pub use detector::CollisionDetector;
pub use layer::{Layer, LayerMask, layers_collide};
