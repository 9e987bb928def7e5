//! # Levels
//!
//! A level reaches the simulation as a [`TileGrid`] plus the
//! [`LevelSetInfo`] describing its enemies. [`LevelLoader`] turns the pair
//! into a populated [`World`](crate::world::World).

pub mod grid;
pub mod levelset;
pub mod loader;

pub use grid::{TileGrid, TileKind};
pub use levelset::LevelSetInfo;
pub use loader::{LevelLoader, LevelSummary};
