//! # Bullets
//!
//! Every bullet in the game is described by a [`BulletInfo`] looked up by id:
//!
//! ```text
//!  id   kind   damage  speed   range        layer
//!   1   axis     1     1.3     ∞            enemy bullets   shot
//!   2   axis     2     0.9     ∞            enemy bullets   fireball
//!   3   axis     2     1.3     ∞            enemy bullets   MG shot
//!   4   axis     3     0.9     ∞            enemy bullets   lightbolt
//!   5   axis     3     0.66    4 tiles      enemy bullets   flame
//!   6   axis     3     1.3     ∞            enemy bullets   plasma
//!   7   axis     4     1.3     ∞            enemy bullets   magma
//! 101   free     4     1.1     ∞            boss bullets    star
//! 102   free     4     1.0     ∞            boss bullets    spirit
//! 103   free     4     1.5     its target   boss bullets    missile
//! 104   free     3     1.6     ∞            boss bullets    lightning
//! ```
//!
//! Speeds are multiples of `bullet_base_speed`. A bullet is gone once it has
//! hit something, reached the level edge, or flown past its range. It never
//! hits whoever shot it.

use crate::collision::{Collider, Layer};
use crate::combat::deal_damage;
use crate::components::{AxisMoving, FreeMoving, Position, Temporary};
use crate::config::SimConfig;
use crate::direction::Direction;
use crate::ecs::{Components, Entity};
use crate::error::{Result, SimError};
use crate::math::Vec2;
use crate::world::World;

/// Side of a bullet's square collider, in pixels.
pub const BULLET_SIZE: f32 = 8.0;

/// Range meaning "until it hits something".
pub const INFINITE_RANGE: f32 = -1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BulletInfo {
    pub id: u32,
    pub damage: i32,
    /// Multiple of the base bullet speed.
    pub speed: f32,
    /// Pixels; negative means infinite.
    pub range: f32,
    pub layer: Layer,
    /// Flies at any angle rather than along the axes.
    pub free: bool,
}

impl BulletInfo {
    const fn axis(id: u32, damage: i32, speed: f32, range: f32) -> Self {
        Self {
            id,
            damage,
            speed,
            range,
            layer: Layer::EnemyBullets,
            free: false,
        }
    }

    const fn free(id: u32, damage: i32, speed: f32) -> Self {
        Self {
            id,
            damage,
            speed,
            range: INFINITE_RANGE,
            layer: Layer::BossBullets,
            free: true,
        }
    }

    pub fn has_range(&self) -> bool {
        self.range >= 0.0
    }
}

const BULLETS: [BulletInfo; 11] = [
    BulletInfo::axis(1, 1, 1.3, INFINITE_RANGE),
    BulletInfo::axis(2, 2, 0.9, INFINITE_RANGE),
    BulletInfo::axis(3, 2, 1.3, INFINITE_RANGE),
    BulletInfo::axis(4, 3, 0.9, INFINITE_RANGE),
    BulletInfo::axis(5, 3, 0.66, 4.0 * crate::math::TILE_SIZE),
    BulletInfo::axis(6, 3, 1.3, INFINITE_RANGE),
    BulletInfo::axis(7, 4, 1.3, INFINITE_RANGE),
    BulletInfo::free(101, 4, 1.1),
    BulletInfo::free(102, 4, 1.0),
    BulletInfo::free(103, 4, 1.5),
    BulletInfo::free(104, 3, 1.6),
];

/// Look up a bullet by id.
pub fn bullet_info(id: u32) -> Result<BulletInfo> {
    BULLETS
        .iter()
        .find(|b| b.id == id)
        .copied()
        .ok_or(SimError::UnknownDescriptor { kind: "bullet", id })
}

#[derive(Debug, Clone)]
pub struct Bullet {
    info: BulletInfo,
    source: Option<Entity>,
    spent: bool,
}

impl Bullet {
    pub fn info(&self) -> &BulletInfo {
        &self.info
    }

    pub fn source(&self) -> Option<Entity> {
        self.source
    }

    /// Hit something or left the level.
    pub fn is_spent(&self) -> bool {
        self.spent
    }
}

fn travelled(c: &Components) -> f32 {
    c.get::<AxisMoving>()
        .map(AxisMoving::dist_travelled)
        .or_else(|| c.get::<FreeMoving>().map(FreeMoving::dist_travelled))
        .unwrap_or(0.0)
}

fn bullet_expired(c: &Components) -> bool {
    let Some(b) = c.get::<Bullet>() else {
        return true;
    };
    b.spent || (b.info.has_range() && travelled(c) > b.info.range)
}

fn bullet_base(info: BulletInfo, center: Vec2, source: Option<Entity>) -> Components {
    let mut collider = Collider::new(info.layer, Vec2::splat(BULLET_SIZE))
        .with_offset(Vec2::splat(-BULLET_SIZE / 2.0))
        .with_force_ack();
    collider.ignore = source;
    Components::new()
        .with(Position(center))
        .with(collider)
        .with(Bullet {
            info,
            source,
            spent: false,
        })
        .with(Temporary::new(bullet_expired))
}

/// A bullet flying along `dir` from `center`.
pub fn axis_bullet(
    id: u32,
    center: Vec2,
    dir: Direction,
    source: Option<Entity>,
    config: &SimConfig,
) -> Result<Components> {
    let info = bullet_info(id)?;
    if info.free {
        return Err(SimError::UnknownDescriptor { kind: "axis bullet", id });
    }
    let mut moving = AxisMoving::new(info.speed * config.bullet_base_speed, dir);
    moving.set_auto_realign(false);
    Ok(bullet_base(info, center, source).with(moving))
}

/// A bullet flying from `center` at `angle` radians.
pub fn free_bullet(
    id: u32,
    center: Vec2,
    angle: f32,
    source: Option<Entity>,
    config: &SimConfig,
) -> Result<Components> {
    let info = bullet_info(id)?;
    if !info.free {
        return Err(SimError::UnknownDescriptor { kind: "free bullet", id });
    }
    let speed = info.speed * config.bullet_base_speed;
    Ok(bullet_base(info, center, source).with(FreeMoving::new(speed, angle)))
}

/// A free bullet aimed at `target` that falls there: its range is the
/// distance to the target.
pub fn free_bullet_to(
    id: u32,
    center: Vec2,
    target: Vec2,
    source: Option<Entity>,
    config: &SimConfig,
) -> Result<Components> {
    let mut info = bullet_info(id)?;
    if !info.free {
        return Err(SimError::UnknownDescriptor { kind: "free bullet", id });
    }
    info.range = center.distance(target);
    let speed = info.speed * config.bullet_base_speed;
    Ok(bullet_base(info, center, source).with(FreeMoving::toward(speed, center, target)))
}

/// Resolve bullet hits: players take damage, walls and the level edge stop
/// the bullet. A bullet deals damage at most once.
pub fn update_bullets(world: &mut World) {
    let mut hits = Vec::new();
    world
        .entities
        .query::<(&mut Bullet, &Collider)>(|_, (bullet, collider)| {
            if bullet.spent {
                return;
            }
            if collider.is_at_limit() {
                bullet.spent = true;
                return;
            }
            for c in collider.colliding() {
                match c.layer {
                    Layer::Players => {
                        hits.push((c.entity, bullet.info.damage, bullet.source));
                        bullet.spent = true;
                        return;
                    }
                    Layer::Breakables | Layer::Unbreakables => {
                        bullet.spent = true;
                        return;
                    }
                    _ => {}
                }
            }
        });

    let shield = world.ctx.config.damage_shield_time();
    for (target, damage, source) in hits {
        deal_damage(&mut world.entities, target, damage, source, shield);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Fixed, Lifed, is_expired};
    use crate::entities::player::player;
    use crate::math::{IVec2, TILE_SIZE, tile_origin};

    fn center(t: IVec2) -> Vec2 {
        tile_origin(t) + Vec2::splat(TILE_SIZE / 2.0)
    }

    #[test]
    fn unknown_ids_are_rejected() {
        let cfg = SimConfig::default();
        assert!(matches!(
            bullet_info(42),
            Err(SimError::UnknownDescriptor { id: 42, .. })
        ));
        assert!(axis_bullet(101, Vec2::ZERO, Direction::Up, None, &cfg).is_err());
        assert!(free_bullet(1, Vec2::ZERO, 0.0, None, &cfg).is_err());
    }

    #[test]
    fn infinite_range_never_expires_by_distance() {
        let cfg = SimConfig::default();
        let mut c = axis_bullet(1, Vec2::ZERO, Direction::Right, None, &cfg).unwrap();
        c.get_mut::<AxisMoving>().unwrap().set_dist_travelled(1.0e6);
        assert!(!is_expired(&c));
    }

    #[test]
    fn ranged_bullet_expires_past_its_range() {
        let cfg = SimConfig::default();
        let mut c = axis_bullet(5, Vec2::ZERO, Direction::Right, None, &cfg).unwrap();
        c.get_mut::<AxisMoving>().unwrap().set_dist_travelled(4.0 * TILE_SIZE);
        assert!(!is_expired(&c));
        c.get_mut::<AxisMoving>().unwrap().set_dist_travelled(4.0 * TILE_SIZE + 0.5);
        assert!(is_expired(&c));
    }

    #[test]
    fn missile_range_is_distance_to_target() {
        let cfg = SimConfig::default();
        let c = free_bullet_to(103, Vec2::ZERO, Vec2::new(30.0, 40.0), None, &cfg).unwrap();
        assert_eq!(c.get::<Bullet>().unwrap().info().range, 50.0);
        let v = c.get::<FreeMoving>().unwrap().velocity();
        assert!((v.normalize() - Vec2::new(0.6, 0.8)).length() < 1e-5);
    }

    #[test]
    fn bullet_hurts_player_once_and_is_spent() {
        let mut world = World::empty();
        let cfg = world.ctx.config.clone();
        let p = world.entities.spawn_unowned(player(1, IVec2::new(3, 1), &cfg).unwrap());
        // Just left of the player, flying right.
        let from = center(IVec2::new(2, 1)) + Vec2::X * 11.5;
        let b = world.spawn(axis_bullet(2, from, Direction::Right, None, &cfg).unwrap());
        world.detect_collisions();
        update_bullets(&mut world);
        update_bullets(&mut world);
        assert_eq!(world.entities.get::<Lifed>(p).unwrap().life(), cfg.player_max_life - 2);
        assert!(world.entities.get::<Bullet>(b).unwrap().is_spent());
        world.prune();
        assert!(!world.entities.is_alive(b));
    }

    #[test]
    fn shooter_is_immune_to_its_bullet() {
        let mut world = World::empty();
        let cfg = world.ctx.config.clone();
        let p = world.entities.spawn_unowned(player(1, IVec2::new(3, 1), &cfg).unwrap());
        let own = axis_bullet(1, center(IVec2::new(3, 1)), Direction::Right, Some(p), &cfg);
        world.spawn(own.unwrap());
        world.detect_collisions();
        update_bullets(&mut world);
        assert_eq!(world.entities.get::<Lifed>(p).unwrap().life(), cfg.player_max_life);
    }

    #[test]
    fn walls_and_edges_stop_bullets() {
        let mut world = World::empty();
        let cfg = world.ctx.config.clone();
        world.spawn((
            Position(tile_origin(IVec2::new(4, 4))),
            Collider::tile(Layer::Unbreakables),
            Fixed,
        ));
        let from = center(IVec2::new(3, 4)) + Vec2::X * 11.5;
        let into_wall = world.spawn(axis_bullet(1, from, Direction::Right, None, &cfg).unwrap());
        let edge = Vec2::new(4.0, 100.0);
        let off_edge = world.spawn(axis_bullet(1, edge, Direction::Left, None, &cfg).unwrap());
        world.detect_collisions();
        update_bullets(&mut world);
        assert!(world.entities.get::<Bullet>(into_wall).unwrap().is_spent());
        assert!(world.entities.get::<Bullet>(off_edge).unwrap().is_spent());
    }
}
