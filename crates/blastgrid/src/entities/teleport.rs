//! # Teleports
//!
//! The teleports of a level form a ring in the order the loader found them:
//!
//! ```text
//!   T0 ──▶ T1 ──▶ T2 ──▶ T3
//!   ▲                     │
//!   └─────────────────────┘
//! ```
//!
//! An entity standing *exactly* on a teleport is sent to the next teleport in
//! the ring that is enabled and nobody stands on. Both ends then stay disabled
//! for `teleport_cooldown_ms`, and after that until nothing collides with
//! them any more, so whoever arrives can walk off without bouncing back.
//!
//! The ring holds entity handles, not links between teleports, so removing a
//! teleport can't leave a dangling link: a stale handle is simply skipped.

use std::collections::HashSet;
use std::time::Duration;

use crate::collision::{Collider, Layer};
use crate::components::{AxisMoving, Fixed, Position};
use crate::ecs::{Components, Entity};
use crate::math::{IVec2, is_aligned, tile_origin};
use crate::time::Timer;
use crate::world::World;

use super::flash::flash;

#[derive(Debug, Clone, Default)]
pub struct Teleport {
    cooldown: Option<Timer>,
}

impl Teleport {
    pub fn is_enabled(&self) -> bool {
        self.cooldown.is_none()
    }

    fn disable(&mut self, cooldown: Duration) {
        self.cooldown = Some(Timer::new(cooldown));
    }
}

/// The teleports of the level, in ring order.
#[derive(Debug, Clone, Default)]
pub struct TeleportRing {
    members: Vec<Entity>,
}

impl TeleportRing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, teleport: Entity) {
        self.members.push(teleport);
    }

    pub fn members(&self) -> &[Entity] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// The first member after `from` accepted by `usable`, going around the
    /// ring once. Never returns `from` itself.
    pub fn next(&self, from: Entity, mut usable: impl FnMut(Entity) -> bool) -> Option<Entity> {
        let start = self.members.iter().position(|&e| e == from)?;
        let n = self.members.len();
        (1..n)
            .map(|k| self.members[(start + k) % n])
            .find(|&e| e != from && usable(e))
    }
}

pub fn teleport(tile: IVec2) -> Components {
    Components::new()
        .with(Position(tile_origin(tile)))
        .with(Collider::tile(Layer::Teleports))
        .with(Fixed)
        .with(Teleport::default())
}

fn is_traveller(layer: Layer) -> bool {
    matches!(
        layer,
        Layer::Players | Layer::Enemies | Layer::EnemiesIgnoreBreakables
    )
}

/// Re-enable cooled-down teleports and warp whoever stands on an enabled one.
pub fn teleports(world: &mut World) {
    let dt = world.time.delta();
    let mut candidates: Vec<(Entity, IVec2, Vec<Entity>)> = Vec::new();
    let mut free = HashSet::new();
    world
        .entities
        .query::<(&mut Teleport, &Collider, &Position)>(|entity, (tp, collider, pos)| {
            let occupied = collider.colliding().iter().any(|c| is_traveller(c.layer));
            if let Some(t) = tp.cooldown.as_mut() {
                t.tick(dt);
                if t.finished() && !occupied {
                    tp.cooldown = None;
                }
            }
            if !tp.is_enabled() {
                return;
            }
            if !occupied {
                free.insert(entity);
                return;
            }
            let travellers = collider
                .colliding()
                .iter()
                .filter(|c| is_traveller(c.layer))
                .map(|c| c.entity)
                .collect();
            candidates.push((entity, pos.tile(), travellers));
        });
    if candidates.is_empty() {
        return;
    }
    let Some(ring) = world.get_resource::<TeleportRing>().cloned() else {
        return;
    };

    let cooldown = world.ctx.config.teleport_cooldown();
    let flash_time = world.ctx.config.flash_time();
    let mut warped = HashSet::new();
    for (source, source_tile, travellers) in candidates {
        let enabled = world.entities.get::<Teleport>(source).is_some_and(Teleport::is_enabled);
        if !enabled {
            continue;
        }
        let traveller = travellers.into_iter().find(|&e| {
            !warped.contains(&e)
                && world
                    .entities
                    .get::<Position>(e)
                    .is_some_and(|p| is_aligned(p.0) && p.tile() == source_tile)
        });
        let Some(traveller) = traveller else {
            continue;
        };
        let dest = ring.next(source, |e| {
            free.contains(&e) && world.entities.get::<Teleport>(e).is_some_and(Teleport::is_enabled)
        });
        let Some(dest) = dest else {
            continue;
        };
        let Some(dest_tile) = world.entities.get::<Position>(dest).map(Position::tile) else {
            continue;
        };

        let to = tile_origin(dest_tile);
        if let Some(pos) = world.entities.get_mut::<Position>(traveller) {
            pos.0 = to;
        }
        if let Some(m) = world.entities.get_mut::<AxisMoving>(traveller) {
            m.set_prev_align(dest_tile);
        }
        for end in [source, dest] {
            if let Some(tp) = world.entities.get_mut::<Teleport>(end) {
                tp.disable(cooldown);
            }
        }
        free.remove(&dest);
        warped.insert(traveller);
        world.spawn_deferred(flash(tile_origin(source_tile), flash_time));
        world.spawn_deferred(flash(to, flash_time));
        world.ctx.play_sound("teleport");
        log::debug!("{traveller} teleports from {source_tile} to {dest_tile}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::flash::Flash;
    use crate::entities::player::player;

    fn level(tiles: &[IVec2]) -> (World, Vec<Entity>) {
        let mut world = World::empty();
        let mut ring = TeleportRing::new();
        let tps: Vec<Entity> = tiles.iter().map(|&t| world.spawn(teleport(t))).collect();
        for &t in &tps {
            ring.push(t);
        }
        world.insert_resource(ring);
        (world, tps)
    }

    fn frame(world: &mut World, dt: Duration) {
        world.time.advance(dt);
        world.detect_collisions();
        teleports(world);
        world.flush_deferred();
    }

    #[test]
    fn ring_skips_unusable_members() {
        let mut group = crate::ecs::EntityGroup::new();
        let e: Vec<Entity> = (0..4).map(|_| group.spawn((0u8,))).collect();
        let mut ring = TeleportRing::new();
        for &x in &e {
            ring.push(x);
        }
        assert_eq!(ring.next(e[3], |_| true), Some(e[0]));
        assert_eq!(ring.next(e[0], |x| x == e[2]), Some(e[2]));
        assert_eq!(ring.next(e[0], |x| x == e[0]), None);
    }

    #[test]
    fn aligned_player_is_warped_and_both_ends_cool_down() {
        let (mut world, tps) = level(&[IVec2::new(1, 1), IVec2::new(5, 5)]);
        let cfg = world.ctx.config.clone();
        let p = world.entities.spawn_unowned(player(1, IVec2::new(1, 1), &cfg).unwrap());

        frame(&mut world, Duration::from_millis(16));
        assert_eq!(world.entities.get::<Position>(p).unwrap().tile(), IVec2::new(5, 5));
        assert_eq!(world.entities.get::<AxisMoving>(p).unwrap().prev_align(), IVec2::new(5, 5));
        assert!(tps.iter().all(|&t| !world.entities.get::<Teleport>(t).unwrap().is_enabled()));
        assert_eq!(world.entities.iter::<Flash>().count(), 2);

        // Cooldown over: the free source comes back, the occupied end waits.
        frame(&mut world, cfg.teleport_cooldown());
        assert!(world.entities.get::<Teleport>(tps[0]).unwrap().is_enabled());
        assert!(!world.entities.get::<Teleport>(tps[1]).unwrap().is_enabled());
        assert_eq!(world.entities.get::<Position>(p).unwrap().tile(), IVec2::new(5, 5));
    }

    #[test]
    fn unaligned_entity_is_not_warped() {
        let (mut world, _) = level(&[IVec2::new(1, 1), IVec2::new(5, 5)]);
        let cfg = world.ctx.config.clone();
        let p = world.entities.spawn_unowned(player(1, IVec2::new(1, 1), &cfg).unwrap());
        world.entities.get_mut::<Position>(p).unwrap().0.x += 10.0;
        frame(&mut world, Duration::from_millis(16));
        assert_eq!(world.entities.get::<Position>(p).unwrap().tile(), IVec2::new(1, 1));
    }

    #[test]
    fn occupied_destination_is_skipped() {
        let (mut world, _) = level(&[IVec2::new(1, 1), IVec2::new(5, 5), IVec2::new(9, 1)]);
        let cfg = world.ctx.config.clone();
        let p1 = world.entities.spawn_unowned(player(1, IVec2::new(1, 1), &cfg).unwrap());
        let p2 = world.entities.spawn_unowned(player(2, IVec2::new(5, 5), &cfg).unwrap());
        // Keep p2 from being warped itself.
        world.entities.get_mut::<Position>(p2).unwrap().0.y += 4.0;
        frame(&mut world, Duration::from_millis(16));
        assert_eq!(world.entities.get::<Position>(p1).unwrap().tile(), IVec2::new(9, 1));
    }
}
