//! # Bombs
//!
//! A bomb sits on a tile until its fuse burns out or an explosion reaches
//! it, then turns into an [`Explosion`](super::explosion::Explosion) credited
//! to whoever dropped it.
//!
//! The dropper stands on the bomb when it appears, so the bomb's collider
//! ignores the dropper until the two stop overlapping. After that the bomb is
//! as solid for its owner as for everyone else.

use std::time::Duration;

use crate::collision::{Collider, Layer};
use crate::components::{Fixed, Position, Temporary};
use crate::ecs::{Components, Entity};
use crate::math::{IVec2, aligned, tile, tile_origin};
use crate::time::Timer;
use crate::world::World;

use super::explosion::explode;
use super::player::Player;

#[derive(Debug, Clone)]
pub struct Bomb {
    fuse: Timer,
    radius: u32,
    source: Option<Entity>,
    ignited: bool,
    exploded: bool,
}

impl Bomb {
    pub fn new(fuse: Duration, radius: u32, source: Option<Entity>) -> Self {
        Self {
            fuse: Timer::new(fuse),
            radius,
            source,
            ignited: false,
            exploded: false,
        }
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    /// The player who dropped it.
    pub fn source(&self) -> Option<Entity> {
        self.source
    }

    /// Make it explode during the next bomb update, fuse or not.
    pub fn ignite(&mut self) {
        self.ignited = true;
    }

    pub fn is_ignited(&self) -> bool {
        self.ignited
    }

    pub fn has_exploded(&self) -> bool {
        self.exploded
    }

    pub fn fuse_remaining(&self) -> Duration {
        self.fuse.remaining()
    }

    fn ready(&self) -> bool {
        !self.exploded && (self.ignited || self.fuse.finished())
    }
}

pub fn bomb(tile: IVec2, fuse: Duration, radius: u32, source: Option<Entity>) -> Components {
    let mut collider = Collider::tile(Layer::Bombs);
    collider.ignore = source;
    Components::new()
        .with(Position(tile_origin(tile)))
        .with(collider)
        .with(Fixed)
        .with(Bomb::new(fuse, radius, source))
        .with(Temporary::new(|c| c.get::<Bomb>().is_none_or(Bomb::has_exploded)))
}

/// Bombs dropped this frame that haven't entered the group yet.
#[derive(Debug, Default)]
struct PendingDrops {
    frame: u64,
    drops: Vec<(IVec2, Entity)>,
}

/// Drop a bomb under `player`. Returns `false` if the player already has
/// all its bombs on the field, is dead, or a bomb already sits there.
///
/// Bombs dropped earlier in the same frame count as sitting on their tile.
pub fn drop_bomb(world: &mut World, player: Entity) -> bool {
    let Some(pos) = world.entities.get::<Position>(player).copied() else {
        return false;
    };
    let Some(info) = world.entities.get::<Player>(player) else {
        return false;
    };
    let t = tile(aligned(pos.0));
    let fuse = info.fuse(world.ctx.config.bomb_fuse());
    let (max, radius) = (info.max_bombs(), info.bomb_radius());

    let frame = world.time.frame_count();
    if !world.has_resource::<PendingDrops>() {
        world.insert_resource(PendingDrops::default());
    }
    let pending = world.resource_mut::<PendingDrops>();
    if pending.frame != frame {
        pending.frame = frame;
        pending.drops.clear();
    }
    let pending = world.resource::<PendingDrops>();
    if pending.drops.iter().any(|&(at, _)| at == t) {
        return false;
    }
    let mut active = pending.drops.iter().filter(|&&(_, src)| src == player).count();

    for (e, b) in world.entities.iter::<Bomb>() {
        if b.has_exploded() {
            continue;
        }
        if b.source() == Some(player) {
            active += 1;
        }
        if world.entities.get::<Position>(e).is_some_and(|p| p.tile() == t) {
            return false;
        }
    }
    if active >= max as usize {
        return false;
    }

    world.resource_mut::<PendingDrops>().drops.push((t, player));
    world.spawn_deferred(bomb(t, fuse, radius, Some(player)));
    world.ctx.play_sound("drop_bomb");
    log::debug!("{player} drops a bomb at {t}");
    true
}

/// Burn fuses, explode bombs, and stop ignoring droppers who walked off.
pub fn update_bombs(world: &mut World) {
    let dt = world.time.delta();
    let mut ready = Vec::new();
    let mut ignoring = Vec::new();
    world
        .entities
        .query::<(&mut Bomb, &Position, &Collider)>(|entity, (bomb, pos, collider)| {
            bomb.fuse.tick(dt);
            if bomb.ready() {
                bomb.exploded = true;
                ready.push((pos.tile(), bomb.radius, bomb.source));
            }
            if let Some(dropper) = collider.ignore {
                ignoring.push((entity, dropper, collider.rect(pos.0)));
            }
        });

    for (bomb, dropper, rect) in ignoring {
        let still_on = world
            .entities
            .get::<Position>(dropper)
            .zip(world.entities.get::<Collider>(dropper))
            .is_some_and(|(p, c)| c.rect(p.0).intersects(&rect));
        if !still_on {
            if let Some(c) = world.entities.get_mut::<Collider>(bomb) {
                c.ignore = None;
            }
        }
    }

    let damage = world.ctx.config.explosion_damage;
    for (t, radius, source) in ready {
        explode(world, t, radius, damage, source);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::is_expired;
    use crate::entities::explosion::Explosion;
    use crate::entities::player::player;

    const FRAME: Duration = Duration::from_millis(16);

    fn world_with_player() -> (World, Entity) {
        let mut world = World::empty();
        let cfg = world.ctx.config.clone();
        let p = world.entities.spawn_unowned(player(1, IVec2::new(2, 2), &cfg).unwrap());
        (world, p)
    }

    #[test]
    fn one_bomb_per_tile_and_per_allowance() {
        let (mut world, p) = world_with_player();
        assert!(drop_bomb(&mut world, p));
        world.flush_deferred();
        // Same tile.
        assert!(!drop_bomb(&mut world, p));
        // Elsewhere, but the player only has one bomb.
        world.entities.get_mut::<Position>(p).unwrap().0 = tile_origin(IVec2::new(4, 2));
        assert!(!drop_bomb(&mut world, p));
        assert_eq!(world.entities.iter::<Bomb>().count(), 1);
    }

    #[test]
    fn two_players_on_one_tile_drop_one_bomb() {
        let (mut world, p1) = world_with_player();
        let cfg = world.ctx.config.clone();
        let p2 = world.entities.spawn_unowned(player(2, IVec2::new(2, 2), &cfg).unwrap());
        assert!(drop_bomb(&mut world, p1));
        assert!(!drop_bomb(&mut world, p2));
        world.flush_deferred();
        let bombs: Vec<_> = world.entities.iter::<Bomb>().map(|(_, b)| b.source()).collect();
        assert_eq!(bombs, vec![Some(p1)]);

        // Next frame p2 may drop elsewhere.
        world.update(FRAME);
        world.entities.get_mut::<Position>(p2).unwrap().0 = tile_origin(IVec2::new(4, 2));
        assert!(drop_bomb(&mut world, p2));
    }

    #[test]
    fn pending_drops_count_against_the_allowance() {
        let (mut world, p) = world_with_player();
        assert!(drop_bomb(&mut world, p));
        world.entities.get_mut::<Position>(p).unwrap().0 = tile_origin(IVec2::new(4, 2));
        assert!(!drop_bomb(&mut world, p));
        world.flush_deferred();
        assert_eq!(world.entities.iter::<Bomb>().count(), 1);
    }

    #[test]
    fn bomb_ignores_dropper_until_it_leaves() {
        let (mut world, p) = world_with_player();
        drop_bomb(&mut world, p);
        world.flush_deferred();
        let b = world.entities.entities_with::<Bomb>()[0];
        update_bombs(&mut world);
        assert_eq!(world.entities.get::<Collider>(b).unwrap().ignore, Some(p));

        world.entities.get_mut::<Position>(p).unwrap().0 = tile_origin(IVec2::new(3, 2));
        update_bombs(&mut world);
        assert_eq!(world.entities.get::<Collider>(b).unwrap().ignore, None);
    }

    #[test]
    fn fuse_end_spawns_explosion_and_removes_bomb() {
        let mut world = World::empty();
        let b = world.spawn(bomb(IVec2::new(3, 3), Duration::from_millis(100), 2, None));
        world.time.advance(Duration::from_millis(99));
        update_bombs(&mut world);
        assert!(!world.entities.get::<Bomb>(b).unwrap().has_exploded());

        world.time.advance(Duration::from_millis(1));
        update_bombs(&mut world);
        assert!(is_expired(world.entities.components(b).unwrap()));
        world.update(FRAME);
        assert!(!world.entities.is_alive(b));
        assert_eq!(world.entities.iter::<Explosion>().count(), 1);
    }

    #[test]
    fn ignited_bomb_explodes_early() {
        let mut world = World::empty();
        let b = world.spawn(bomb(IVec2::new(3, 3), Duration::from_secs(5), 2, None));
        world.entities.get_mut::<Bomb>(b).unwrap().ignite();
        world.time.advance(FRAME);
        update_bombs(&mut world);
        assert!(world.entities.get::<Bomb>(b).unwrap().has_exploded());
    }
}
