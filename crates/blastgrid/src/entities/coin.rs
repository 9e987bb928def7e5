//! # Coins
//!
//! Coins are placed by the level and never move. A live player walking over
//! one grabs it and scores `coin_points`; explosions pass over them. Unlike
//! bonuses they don't expire.
//!
//! The collider is not `Fixed`, so a coin looks for players itself and is
//! found whichever way the player is walking.

use crate::collision::{Collider, Layer};
use crate::components::{Killable, Position, Temporary};
use crate::ecs::{Components, Entity};
use crate::math::{IVec2, tile_origin};
use crate::world::World;

use super::player::Player;

#[derive(Debug, Clone, Copy, Default)]
pub struct Coin {
    grabbed_by: Option<Entity>,
}

impl Coin {
    pub fn grabbed_by(&self) -> Option<Entity> {
        self.grabbed_by
    }

    pub fn is_grabbed(&self) -> bool {
        self.grabbed_by.is_some()
    }
}

pub fn coin(tile: IVec2) -> Components {
    Components::new()
        .with(Position(tile_origin(tile)))
        .with(Collider::tile(Layer::Grabbable))
        .with(Coin::default())
        .with(Temporary::new(|c| c.get::<Coin>().is_none_or(Coin::is_grabbed)))
}

/// Coins not grabbed yet.
pub fn coins_left(world: &World) -> usize {
    world
        .entities
        .iter::<Coin>()
        .filter(|(_, c)| !c.is_grabbed())
        .count()
}

/// Hand touched coins to the first live player touching them.
pub fn grab_coins(world: &mut World) {
    let mut touched = Vec::new();
    world
        .entities
        .query::<(&Coin, &Collider)>(|entity, (coin, collider)| {
            if coin.is_grabbed() {
                return;
            }
            let players: Vec<Entity> = collider
                .colliding()
                .iter()
                .filter(|c| c.layer == Layer::Players)
                .map(|c| c.entity)
                .collect();
            if !players.is_empty() {
                touched.push((entity, players));
            }
        });

    let points = world.ctx.config.coin_points;
    for (entity, players) in touched {
        let grabber = players.into_iter().find(|&p| {
            world.entities.has::<Player>(p)
                && !world
                    .entities
                    .get::<Killable>(p)
                    .is_some_and(Killable::is_killed)
        });
        let Some(player) = grabber else {
            continue;
        };
        if let Some(c) = world.entities.get_mut::<Coin>(entity) {
            c.grabbed_by = Some(player);
        }
        if let Some(p) = world.entities.get_mut::<Player>(player) {
            p.add_score(points);
        }
        world.ctx.play_sound("coin");
        log::debug!("{player} grabs a coin, {} left", coins_left(world));
    }
}
