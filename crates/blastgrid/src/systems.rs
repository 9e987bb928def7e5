//! # Systems — The Frame, In Order
//!
//! [`default_schedule`] lists every system a running level needs. The order
//! is the contract the rest of the crate relies on:
//!
//! ```text
//!  1  tick_clocks          lifetimes, deaths, bonuses, blocks
//!  2  refresh_occupancy    tile map for can_go and sight
//!  3  player_control       input → direction, bombs
//!  4  update_explosions    phases, arm colliders
//!     update_rex           boss state machines
//!     update_mainframe
//!  5  movement             every mover, frame time clamped
//!  6  detect_collisions    fresh collision lists
//!  7  explosion_damage     reactions to this frame's collisions
//!     hazards
//!     surges               boss beams hurt, then sweep
//!     update_bullets
//!     grab_bonuses
//!     grab_coins
//!     teleports
//!     contact_damage
//!  8  update_sight         AI input for the next step
//!     update_ai
//!     shooting
//!     circle_shooting      boss bullet rings
//!  9  update_bombs         fuses → explosions
//!     breakable_walls      dead walls → bonus drops
//!     player_deaths        respawn or release
//!     award_points
//! ```
//!
//! Entities spawned by any of these appear after the last one ran, and
//! expired entities are pruned after that (see [`World::update`]).

use std::collections::HashSet;

use crate::ai::{circle_shooting, shooting, update_ai, update_sight};
use crate::boss::{surges, update_mainframe, update_rex};
use crate::collision::Collider;
use crate::components::{AxisMoving, Bonusable, FreeMoving, Killable, Lifetime, Position};
use crate::ecs::{Entity, Schedule};
use crate::entities::{
    award_points, breakable_walls, contact_damage, explosion_damage, grab_bonuses, grab_coins,
    hazards, player_control, player_deaths, teleports, update_bombs, update_bullets,
    update_explosions,
};
use crate::math::is_aligned;
use crate::world::World;

/// The frame every level runs.
pub fn default_schedule() -> Schedule {
    let mut schedule = Schedule::new();
    schedule
        .add_system(tick_clocks)
        .add_system(refresh_occupancy)
        .add_system(player_control)
        .add_system(update_explosions)
        .add_system(update_rex)
        .add_system(update_mainframe)
        .add_system(movement)
        .add_system(detect_collisions)
        .add_system(explosion_damage)
        .add_system(hazards)
        .add_system(surges)
        .add_system(update_bullets)
        .add_system(grab_bonuses)
        .add_system(grab_coins)
        .add_system(teleports)
        .add_system(contact_damage)
        .add_system(update_sight)
        .add_system(update_ai)
        .add_system(shooting)
        .add_system(circle_shooting)
        .add_system(update_bombs)
        .add_system(breakable_walls)
        .add_system(player_deaths)
        .add_system(award_points);
    schedule
}

/// Advance the timers that aren't owned by a specific system.
pub fn tick_clocks(world: &mut World) {
    let dt = world.time.delta();
    let group = &mut world.entities;
    group.query::<&mut Lifetime>(|_, lifetime| lifetime.0.tick(dt));
    group.query::<&mut Killable>(|_, killable| killable.tick(dt));
    group.query::<&mut Bonusable>(|_, bonusable| bonusable.tick(dt));
    group.query::<&mut AxisMoving>(|_, moving| moving.tick(dt));
    group.query::<&mut FreeMoving>(|_, moving| moving.tick(dt));
}

pub fn refresh_occupancy(world: &mut World) {
    world.refresh_occupancy();
}

pub fn detect_collisions(world: &mut World) {
    world.detect_collisions();
}

/// Move everything that moves.
///
/// An axis mover sitting on a tile is obstructed when last frame's
/// collisions put a solid ahead of it, when it is at the level limit, or
/// when the occupancy map says the next tile is closed. Between tiles it
/// always finishes its step: the detector looks one pixel ahead, and walls
/// and level edges sit on grid lines, so the step never enters them.
/// Dead movers stay put.
pub fn movement(world: &mut World) {
    let frame_time = world.time.delta().min(world.ctx.config.max_frame_time());

    let mut aligned = Vec::new();
    world
        .entities
        .query::<(&AxisMoving, &Position, &Collider)>(|entity, (moving, pos, collider)| {
            if moving.is_moving()
                && is_aligned(pos.0 + collider.offset())
                && !collider.layer().walk_blockers().is_empty()
            {
                aligned.push((entity, moving.direction()));
            }
        });
    let walled: HashSet<Entity> = aligned
        .into_iter()
        .filter(|&(entity, dir)| !world.can_go(entity, dir))
        .map(|(entity, _)| entity)
        .collect();

    world.entities.query::<(
        &mut AxisMoving,
        &mut Position,
        Option<&Collider>,
        Option<&Killable>,
    )>(|entity, (moving, pos, collider, killable)| {
        let contact = collider.is_some_and(|c| c.is_at_limit() || c.collides_with_solid());
        let obstructed = walled.contains(&entity)
            || killable.is_some_and(Killable::is_killed)
            || (contact && is_aligned(pos.0));
        moving.update(&mut pos.0, frame_time, obstructed);
    });

    world
        .entities
        .query::<(&mut FreeMoving, &mut Position, Option<&Collider>)>(|_, (moving, pos, collider)| {
            let obstructed = collider.is_some_and(Collider::is_at_limit);
            moving.update(&mut pos.0, frame_time, obstructed);
        });
}
