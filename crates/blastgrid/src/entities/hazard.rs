//! Damaging areas other than explosions: Rex's flames, the shockwave of his
//! stomp, and acid ponds. A hazard hurts each player it touches once;
//! whatever turns the collider on and off (a lifetime, a boss phase) decides
//! when. A lingering hazard (acid) keeps hurting whoever stands in it, as
//! often as the post-hurt shield allows.

use std::collections::HashSet;
use std::time::Duration;

use crate::collision::{Collider, Layer};
use crate::combat::deal_damage;
use crate::components::{Lifetime, Position, Temporary};
use crate::ecs::{Components, Entity};
use crate::math::{IVec2, Vec2, tile_origin};
use crate::world::World;

#[derive(Debug, Clone)]
pub struct Hazard {
    pub damage: i32,
    /// Credited as killer.
    pub source: Option<Entity>,
    damaged: HashSet<Entity>,
    lingering: bool,
}

impl Hazard {
    pub fn new(damage: i32, source: Option<Entity>) -> Self {
        Self {
            damage,
            source,
            damaged: HashSet::new(),
            lingering: false,
        }
    }

    /// Hurts on every contact instead of once per player.
    pub fn lingering(damage: i32) -> Self {
        Self {
            lingering: true,
            ..Self::new(damage, None)
        }
    }

    /// Allow everyone to be hit again (a new stomp).
    pub fn rearm(&mut self) {
        self.damaged.clear();
    }

    pub fn has_damaged(&self, target: Entity) -> bool {
        self.damaged.contains(&target)
    }
}

/// A hazard covering `size` pixels from `pos`, gone after `duration`.
pub fn timed_hazard(
    pos: Vec2,
    size: Vec2,
    damage: i32,
    source: Option<Entity>,
    duration: Duration,
) -> Components {
    Components::new()
        .with(Position(pos))
        .with(Collider::new(Layer::Hazards, size))
        .with(Hazard::new(damage, source))
        .with(Lifetime::new(duration))
        .with(Temporary::after_lifetime())
}

/// Marks an acid pond.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcidPond;

/// A pond of acid on `tile`. Walkable, never goes away.
///
/// Not `Fixed`: a player walking across must be found whatever its
/// direction, and only a collider that looks for collisions itself does that.
pub fn acid_pond(tile: IVec2, damage: i32) -> Components {
    Components::new()
        .with(Position(tile_origin(tile)))
        .with(Collider::tile(Layer::Hazards))
        .with(Hazard::lingering(damage))
        .with(AcidPond)
}

pub fn hazards(world: &mut World) {
    let mut hits = Vec::new();
    world
        .entities
        .query::<(&mut Hazard, &Collider)>(|entity, (hazard, collider)| {
            if !collider.active {
                return;
            }
            for c in collider.colliding() {
                if c.layer != Layer::Players {
                    continue;
                }
                if hazard.lingering || hazard.damaged.insert(c.entity) {
                    hits.push((entity, c.entity, hazard.damage, hazard.source));
                }
            }
        });

    let shield = world.ctx.config.damage_shield_time();
    for (hazard, target, damage, source) in hits {
        let outcome = deal_damage(&mut world.entities, target, damage, source, shield);
        log::trace!("hazard {hazard} hits {target}: {outcome:?}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{AxisMoving, Lifed};
    use crate::direction::Direction;
    use crate::entities::player::player;
    use crate::math::TILE_SIZE;

    #[test]
    fn hurts_each_player_once() {
        let mut world = World::empty();
        let cfg = world.ctx.config.clone();
        let p = world.entities.spawn_unowned(player(1, IVec2::new(2, 2), &cfg).unwrap());
        world.spawn(timed_hazard(
            tile_origin(IVec2::new(1, 1)),
            Vec2::splat(3.0 * TILE_SIZE),
            3,
            None,
            Duration::from_secs(1),
        ));
        for _ in 0..3 {
            world.detect_collisions();
            hazards(&mut world);
            // Drop the post-hit shield so only the damaged set protects.
            world.entities.insert(p, crate::components::Bonusable::new());
        }
        let life = world.entities.get::<Lifed>(p).unwrap().life();
        assert_eq!(life, cfg.player_max_life - 3);
    }

    #[test]
    fn inactive_hazard_is_harmless() {
        let mut world = World::empty();
        let cfg = world.ctx.config.clone();
        let p = world.entities.spawn_unowned(player(1, IVec2::new(2, 2), &cfg).unwrap());
        let size = Vec2::splat(TILE_SIZE);
        let at = tile_origin(IVec2::new(2, 2));
        let mut c = timed_hazard(at, size, 3, None, Duration::from_secs(1));
        c.get_mut::<Collider>().unwrap().active = false;
        world.spawn(c);
        world.detect_collisions();
        hazards(&mut world);
        assert_eq!(world.entities.get::<Lifed>(p).unwrap().life(), cfg.player_max_life);
    }

    #[test]
    fn acid_keeps_hurting_between_shields() {
        let mut world = World::empty();
        let cfg = world.ctx.config.clone();
        let p = world.entities.spawn_unowned(player(1, IVec2::new(2, 2), &cfg).unwrap());
        let pond = world.spawn(acid_pond(IVec2::new(2, 2), 1));
        let life = |w: &World| w.entities.get::<Lifed>(p).unwrap().life();

        world.detect_collisions();
        hazards(&mut world);
        assert_eq!(life(&world), cfg.player_max_life - 1);
        // Shielded right after the hit.
        hazards(&mut world);
        assert_eq!(life(&world), cfg.player_max_life - 1);

        world.entities.insert(p, crate::components::Bonusable::new());
        hazards(&mut world);
        assert_eq!(life(&world), cfg.player_max_life - 2);
        assert!(!world.entities.get::<Hazard>(pond).unwrap().has_damaged(p));
    }

    #[test]
    fn acid_finds_a_player_walking_off() {
        let mut world = World::empty();
        let cfg = world.ctx.config.clone();
        let p = world.entities.spawn_unowned(player(1, IVec2::new(2, 2), &cfg).unwrap());
        // Half a tile into the pond, heading away from it.
        let half_in = tile_origin(IVec2::new(1, 2)) + Vec2::X * 16.0;
        world.entities.get_mut::<Position>(p).unwrap().0 = half_in;
        world.entities.get_mut::<AxisMoving>(p).unwrap().move_in(Direction::Left);
        let pond = world.spawn(acid_pond(IVec2::new(2, 2), 1));
        world.detect_collisions();
        assert!(world.entities.get::<Collider>(pond).unwrap().is_colliding_with(p));
    }
}
