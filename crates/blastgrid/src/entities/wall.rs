//! Walls.
//!
//! Unbreakable and transparent walls never change. Breakable walls take one
//! hit, play their crumbling animation, and may leave a bonus behind.

use crate::collision::{Collider, Layer};
use crate::components::{Fixed, Killable, Lifed, Position, Scored};
use crate::config::SimConfig;
use crate::ecs::Components;
use crate::error::Result;
use crate::math::{IVec2, tile_origin};
use crate::world::World;

use super::bonus::{BonusKind, bonus};

/// Marks a breakable wall. `dropped` is set once its bonus roll is done.
#[derive(Debug, Clone, Copy, Default)]
pub struct BreakableWall {
    dropped: bool,
}

pub fn unbreakable(tile: IVec2) -> Components {
    fixed_tile(tile, Layer::Unbreakables)
}

/// Stops walkers, but bullets and sight go through.
pub fn transparent_wall(tile: IVec2) -> Components {
    fixed_tile(tile, Layer::TransparentWalls)
}

pub fn breakable(tile: IVec2, config: &SimConfig) -> Result<Components> {
    Ok(fixed_tile(tile, Layer::Breakables)
        .with(Lifed::new(1)?)
        .with(Killable::new(config.death_time()))
        .with(Scored::new(config.breakable_wall_points))
        .with(BreakableWall::default()))
}

fn fixed_tile(tile: IVec2, layer: Layer) -> Components {
    Components::new()
        .with(Position(tile_origin(tile)))
        .with(Collider::tile(layer))
        .with(Fixed)
}

/// Roll for a bonus under every wall that just finished crumbling.
pub fn breakable_walls(world: &mut World) {
    let mut crumbled = Vec::new();
    world
        .entities
        .query::<(&mut BreakableWall, &Killable, &Position)>(|_, (wall, killable, pos)| {
            if killable.kill_complete() && !wall.dropped {
                wall.dropped = true;
                crumbled.push(pos.tile());
            }
        });

    let chance = world.ctx.config.bonus_drop_chance;
    let expire = world.ctx.config.bonus_expire_time();
    for t in crumbled {
        if !world.ctx.rng.chance(chance) {
            continue;
        }
        let kind = BonusKind::random(&mut world.ctx.rng);
        log::debug!("wall at {t} drops {kind:?}");
        world.spawn_deferred(bonus(t, kind, expire));
    }
}
