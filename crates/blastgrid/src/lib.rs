//! # Blastgrid — Tile-Based Arcade Simulation Core
//!
//! The frame-stepped heart of a bomb-laying maze game: players, enemies and
//! bosses moving on a tile grid, colliders filtered by layer, and the
//! bombs, bullets, explosions and boss attacks that run on those collisions.
//! Nothing here draws, reads input or plays audio; a front end drives a
//! [`World`](world::World) one `update(dt)` at a time and reads it back.
//!
//! Start with `use blastgrid::prelude::*`, load a level with
//! [`LevelLoader`](level::LevelLoader) and step it.

pub mod ai;
pub mod asset;
pub mod boss;
pub mod collision;
pub mod combat;
pub mod components;
pub mod config;
pub mod context;
pub mod direction;
pub mod ecs;
pub mod entities;
pub mod error;
pub mod level;
pub mod math;
pub mod nav;
pub mod phase;
pub mod prelude;
pub mod rng;
pub mod systems;
pub mod time;
pub mod world;

pub use error::{Result, SimError};
pub use world::World;
