//! # Bosses
//!
//! Bosses are multi-tile enemies on the `Bosses` layer. They don't bump into
//! walls (the occupancy map steers them around instead), explosions hurt them
//! once per tile of overlap, and players can't walk through them.
//!
//! Boss behavior is a component like any other: [`rex::Rex`] holds Rex's
//! whole state machine and [`rex::update_rex`] drives it. The stationary
//! [`mainframe::Mainframe`] works the same way through
//! [`mainframe::update_mainframe`], with its beam swept by
//! [`mainframe::surges`].

pub mod mainframe;
pub mod rex;

pub use mainframe::{
    Mainframe, MainframeAttack, MainframeState, Surge, spawn_mainframe, surges, update_mainframe,
};
pub use rex::{Rex, RexAttack, RexState, spawn_rex, update_rex};

use crate::components::Killable;
use crate::world::World;

/// Marks a boss.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Boss;

/// Bosses still alive in the level.
pub fn bosses_left(world: &World) -> usize {
    world
        .entities
        .iter::<Boss>()
        .filter(|&(e, _)| {
            !world
                .entities
                .get::<Killable>(e)
                .is_some_and(Killable::is_killed)
        })
        .count()
}
