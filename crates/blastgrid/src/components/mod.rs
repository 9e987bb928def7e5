//! Components shared by many kinds of entities.
//!
//! Entity-specific state (a bomb's fuse, a teleport's link) lives next to the
//! factory that builds that entity, under [`crate::entities`].

pub mod bonusable;
pub mod lifecycle;
pub mod lifed;
pub mod moving;

pub use bonusable::Bonusable;
pub use lifecycle::{Fixed, Lifetime, Position, Temporary, is_expired};
pub use lifed::{Killable, Lifed, Scored};
pub use moving::{AxisMoving, FreeMoving};
