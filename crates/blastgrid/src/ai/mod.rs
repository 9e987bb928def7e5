//! # Enemy Minds
//!
//! - [`sight`] — What each enemy or boss can see
//! - [`shooting`] — Attacks, recharge and bullets
//! - [`behavior`] — Where enemies decide to walk
//! - [`circle`] — Rings and spirals of boss bullets

pub mod behavior;
pub mod circle;
pub mod shooting;
pub mod sight;

pub use behavior::{Ai, AiKind, update_ai};
pub use circle::{CircleShooting, circle_shooting};
pub use shooting::{Attack, AttackKind, Shooting, shooting};
pub use sight::{AxisSighted, FreeSighted, Seen, update_sight};
