//! # Explosions
//!
//! When a bomb goes off, the flames spread from its tile along the four axes:
//!
//! ```text
//!              ┃
//!              ┃ up
//!   ━━━━━━━━━━ ✹ ━━━━━━━━   ← root entity: horizontal collider
//!       left   ┃   right
//!              ┃ down        ← arm entity: vertical collider
//! ```
//!
//! [`propagate`] computes how far each arm reaches, once, when the bomb
//! explodes. An arm stops *before* an unbreakable or transparent wall and at
//! the level edge; it stops *on* a breakable wall (which it then destroys).
//! Bombs in the way are ignited and the flames go on.
//!
//! The root carries the [`Explosion`] and its set of entities already
//! damaged; the arm points back to the root and shares that set, so a target
//! touched by both arms, or on several frames, is hit exactly once.
//!
//! Damage runs on a [`TimedPhase`]: the colliders are active only while the
//! phase is `Damage`, then the explosion expires.

use std::collections::HashSet;

use crate::collision::{Collider, Layer};
use crate::combat::{DamageOutcome, deal_damage};
use crate::components::{Position, Temporary};
use crate::direction::Direction;
use crate::ecs::{Components, Entity};
use crate::math::{IVec2, Rect, TILE_SIZE, Vec2, tile_origin};
use crate::nav::TileOccupancy;
use crate::phase::{PhaseDurations, TimedPhase};
use crate::world::World;

use super::bomb::Bomb;
use super::bonus::Bonus;

#[derive(Debug, Clone)]
pub struct Explosion {
    center: IVec2,
    radius: u32,
    damage: i32,
    /// The player credited for kills.
    source: Option<Entity>,
    /// Reach of each arm, in tiles, indexed like [`Direction::index`].
    reach: [u32; 4],
    phase: TimedPhase,
    damaged: HashSet<Entity>,
}

impl Explosion {
    pub fn new(
        center: IVec2,
        radius: u32,
        damage: i32,
        source: Option<Entity>,
        reach: [u32; 4],
        durations: PhaseDurations,
    ) -> Self {
        Self {
            center,
            radius,
            damage,
            source,
            reach,
            phase: TimedPhase::new(durations),
            damaged: HashSet::new(),
        }
    }

    pub fn center(&self) -> IVec2 {
        self.center
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    pub fn damage(&self) -> i32 {
        self.damage
    }

    pub fn source(&self) -> Option<Entity> {
        self.source
    }

    pub fn reach(&self, dir: Direction) -> u32 {
        dir.index().map_or(0, |i| self.reach[i])
    }

    pub fn phase(&self) -> &TimedPhase {
        &self.phase
    }

    /// Has `target` been hit already?
    pub fn has_damaged(&self, target: Entity) -> bool {
        self.damaged.contains(&target)
    }

    /// Every tile covered by the flames.
    pub fn tiles(&self) -> Vec<IVec2> {
        let mut tiles = vec![self.center];
        for dir in Direction::ALL {
            for step in 1..=self.reach(dir) as i32 {
                tiles.push(self.center + dir.unit() * step);
            }
        }
        tiles
    }

    /// Rectangles of the horizontal and vertical arms.
    pub fn rects(&self) -> [Rect; 2] {
        let (h, v) = arm_colliders(self.reach);
        let origin = tile_origin(self.center);
        [h.rect(origin), v.rect(origin)]
    }

    /// Number of flame tiles overlapping `rect`.
    pub fn tiles_overlapping(&self, rect: &Rect) -> u32 {
        self.tiles()
            .into_iter()
            .filter(|&t| Rect::from_tiles(t, IVec2::ONE).intersects(rect))
            .count() as u32
    }
}

/// The vertical arm of an explosion.
#[derive(Debug, Clone, Copy)]
pub struct ExplosionArm {
    pub root: Entity,
    done: bool,
}

/// How far the flames go from `center` in each direction.
pub fn propagate(center: IVec2, radius: u32, occupancy: &TileOccupancy) -> [u32; 4] {
    let mut reach = [0; 4];
    for (i, dir) in Direction::ALL.into_iter().enumerate() {
        for step in 1..=radius as i32 {
            let t = center + dir.unit() * step;
            if !occupancy.in_bounds(t) {
                break;
            }
            let here = occupancy.fixed_at(t);
            if here
                .iter()
                .any(|&(_, l)| matches!(l, Layer::Unbreakables | Layer::TransparentWalls))
            {
                break;
            }
            reach[i] = step as u32;
            if here.iter().any(|&(_, l)| l == Layer::Breakables) {
                break;
            }
        }
    }
    reach
}

fn arm_colliders(reach: [u32; 4]) -> (Collider, Collider) {
    let [up, right, down, left] = reach.map(|r| r as f32 * TILE_SIZE);
    let width = left + right + TILE_SIZE;
    let horizontal = Collider::new(Layer::Explosions, Vec2::new(width, TILE_SIZE))
        .with_offset(Vec2::new(-left, 0.0))
        .inactive();
    let height = up + down + TILE_SIZE;
    let vertical = Collider::new(Layer::Explosions, Vec2::new(TILE_SIZE, height))
        .with_offset(Vec2::new(0.0, -up))
        .inactive();
    (horizontal, vertical)
}

/// The root entity of an explosion with the given reach.
pub fn explosion(explosion: Explosion) -> Components {
    let (horizontal, _) = arm_colliders(explosion.reach);
    Components::new()
        .with(Position(tile_origin(explosion.center)))
        .with(horizontal)
        .with(explosion)
        .with(Temporary::new(|c| {
            c.get::<Explosion>().is_none_or(|x| x.phase.is_over())
        }))
}

fn explosion_arm(root: Entity, center: IVec2, reach: [u32; 4]) -> Components {
    let (_, vertical) = arm_colliders(reach);
    Components::new()
        .with(Position(tile_origin(center)))
        .with(vertical)
        .with(ExplosionArm { root, done: false })
        .with(Temporary::new(|c| c.get::<ExplosionArm>().is_none_or(|a| a.done)))
}

/// Blow up `center`. The explosion appears once the current frame is over.
pub fn explode(world: &mut World, center: IVec2, radius: u32, damage: i32, source: Option<Entity>) {
    let reach = match world.get_resource::<TileOccupancy>() {
        Some(occ) if occ.size() == world.level_size() => propagate(center, radius, occ),
        _ => {
            let mut occ = TileOccupancy::new(world.level_size());
            occ.rebuild(&world.entities);
            propagate(center, radius, &occ)
        }
    };
    let durations = PhaseDurations {
        damage: world.ctx.config.explosion_time(),
        ..PhaseDurations::default()
    };
    let x = Explosion::new(center, radius, damage, source, reach, durations);
    world.defer(move |w| {
        let root = w.spawn(explosion(x));
        w.spawn(explosion_arm(root, center, reach));
    });
    world.ctx.play_sound("explosion");
    log::debug!("explosion at {center}, reach {reach:?}");
}

/// Advance explosion phases and switch their colliders on while they burn.
pub fn update_explosions(world: &mut World) {
    let dt = world.time.delta();
    world
        .entities
        .query::<(&mut Explosion, &mut Collider)>(|_, (x, collider)| {
            x.phase.update(dt);
            collider.active = x.phase.is_damaging();
        });

    let arms: Vec<(Entity, Option<(bool, bool)>)> = world
        .entities
        .iter::<ExplosionArm>()
        .map(|(e, arm)| {
            let root = world
                .entities
                .get::<Explosion>(arm.root)
                .map(|x| (x.phase.is_damaging(), x.phase.is_over()));
            (e, root)
        })
        .collect();
    for (e, root) in arms {
        let (damaging, over) = root.unwrap_or((false, true));
        world.entities.query_one::<(&mut ExplosionArm, &mut Collider), _>(e, |(arm, collider)| {
            arm.done = over;
            collider.active = damaging;
        });
    }
}

/// Hit everything the flames touch, once per explosion.
pub fn explosion_damage(world: &mut World) {
    let mut hits: Vec<(Entity, Entity, Layer)> = Vec::new();
    for (e, collider) in world.entities.iter::<Collider>() {
        if !collider.active || collider.layer() != Layer::Explosions {
            continue;
        }
        let root = match world.entities.get::<ExplosionArm>(e) {
            Some(arm) => arm.root,
            None => e,
        };
        for c in collider.colliding() {
            hits.push((root, c.entity, c.layer));
        }
    }

    let shield = world.ctx.config.damage_shield_time();
    for (root, target, layer) in hits {
        let Some(x) = world.entities.get_mut::<Explosion>(root) else {
            continue;
        };
        if !x.damaged.insert(target) {
            continue;
        }
        let (damage, source) = (x.damage, x.source);
        match layer {
            Layer::Players
            | Layer::Enemies
            | Layer::EnemiesIgnoreBreakables
            | Layer::Breakables => {
                let outcome = deal_damage(&mut world.entities, target, damage, source, shield);
                if outcome == DamageOutcome::Killed {
                    log::trace!("{target} ({layer}) killed by explosion");
                }
            }
            Layer::Bosses => {
                let overlap = {
                    let Some(x) = world.entities.get::<Explosion>(root) else {
                        continue;
                    };
                    let rect = world
                        .entities
                        .get::<Position>(target)
                        .zip(world.entities.get::<Collider>(target))
                        .map(|(p, c)| c.rect(p.0));
                    rect.map_or(0, |r| x.tiles_overlapping(&r))
                };
                if overlap > 0 {
                    let amount = damage * overlap as i32;
                    let outcome = deal_damage(&mut world.entities, target, amount, source, shield);
                    if outcome.landed() {
                        world.ctx.play_sound("boss_hurt");
                    }
                }
            }
            Layer::Bombs => {
                if let Some(b) = world.entities.get_mut::<Bomb>(target) {
                    b.ignite();
                }
            }
            Layer::Grabbable => {
                if let Some(b) = world.entities.get_mut::<Bonus>(target) {
                    b.destroy();
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Fixed, Killable, Lifed};
    use std::time::Duration;

    const FRAME: Duration = Duration::from_millis(16);

    fn wall(world: &mut World, t: IVec2, layer: Layer) -> Entity {
        world.spawn((Position(tile_origin(t)), Collider::tile(layer), Fixed))
    }

    fn occupancy(world: &World) -> TileOccupancy {
        let mut occ = TileOccupancy::new(world.level_size());
        occ.rebuild(&world.entities);
        occ
    }

    /// Run the explosion systems the way the frame schedule orders them.
    fn frame(world: &mut World) {
        world.time.advance(FRAME);
        update_explosions(world);
        world.detect_collisions();
        explosion_damage(world);
        world.flush_deferred();
        world.prune();
    }

    #[test]
    fn propagation_stops_at_walls_and_edges() {
        let mut world = World::empty();
        let c = IVec2::new(5, 5);
        wall(&mut world, c + IVec2::new(2, 0), Layer::Unbreakables);
        wall(&mut world, c + IVec2::new(0, 1), Layer::Breakables);
        wall(&mut world, c + IVec2::new(-1, 0), Layer::TransparentWalls);
        let reach = propagate(c, 3, &occupancy(&world));
        // up, right, down, left
        assert_eq!(reach, [3, 1, 1, 0]);

        let corner = propagate(IVec2::ZERO, 3, &occupancy(&world));
        assert_eq!(corner[Direction::Up.index().unwrap()], 0);
        assert_eq!(corner[Direction::Left.index().unwrap()], 0);
        assert_eq!(corner[Direction::Right.index().unwrap()], 3);
    }

    #[test]
    fn explosion_covers_its_tiles() {
        let x = Explosion::new(
            IVec2::new(3, 3),
            2,
            1,
            None,
            [1, 2, 0, 0],
            PhaseDurations::default(),
        );
        let mut tiles = x.tiles();
        tiles.sort_by_key(|t| (t.x, t.y));
        assert_eq!(
            tiles,
            vec![IVec2::new(3, 2), IVec2::new(3, 3), IVec2::new(4, 3), IVec2::new(5, 3)]
        );
        let [h, v] = x.rects();
        assert_eq!(h, Rect::from_tiles(IVec2::new(3, 3), IVec2::new(3, 1)));
        assert_eq!(v, Rect::from_tiles(IVec2::new(3, 2), IVec2::new(1, 2)));
    }

    #[test]
    fn target_is_damaged_once_across_arms_and_frames() {
        let mut world = World::empty();
        let target = world.spawn((
            Position(tile_origin(IVec2::new(5, 5))),
            Collider::tile(Layer::Enemies),
            Lifed::new(10).unwrap(),
            Killable::new(Duration::from_secs(1)),
        ));
        // Both arms cover (5,5).
        explode(&mut world, IVec2::new(5, 5), 2, 1, None);
        world.flush_deferred();
        for _ in 0..5 {
            frame(&mut world);
        }
        assert_eq!(world.entities.get::<Lifed>(target).unwrap().life(), 9);
    }

    #[test]
    fn breakable_wall_dies_with_killer_recorded() {
        let mut world = World::empty();
        let bomber = world.spawn((0u8,));
        let w = world.spawn((
            Position(tile_origin(IVec2::new(6, 5))),
            Collider::tile(Layer::Breakables),
            Fixed,
            Lifed::new(1).unwrap(),
            Killable::new(Duration::from_secs(1)),
        ));
        explode(&mut world, IVec2::new(5, 5), 2, 1, Some(bomber));
        world.flush_deferred();
        frame(&mut world);
        let k = world.entities.get::<Killable>(w).unwrap();
        assert!(k.is_killed());
        assert_eq!(k.killer(), Some(bomber));
    }

    #[test]
    fn explosion_ignites_bombs_and_fades() {
        let mut world = World::empty();
        let fuse = Duration::from_secs(5);
        let b = world.spawn(super::super::bomb::bomb(IVec2::new(5, 6), fuse, 1, None));
        explode(&mut world, IVec2::new(5, 5), 2, 1, None);
        world.flush_deferred();
        frame(&mut world);
        assert!(world.entities.get::<Bomb>(b).unwrap().is_ignited());

        let explosion_time = world.ctx.config.explosion_time();
        let frames = explosion_time.as_millis() / FRAME.as_millis() + 2;
        for _ in 0..frames {
            frame(&mut world);
        }
        assert_eq!(world.entities.iter::<Explosion>().count(), 0);
        assert_eq!(world.entities.iter::<ExplosionArm>().count(), 0);
    }

    #[test]
    fn bosses_take_damage_per_overlapped_tile() {
        let mut world = World::empty();
        let boss = world.spawn((
            Position(tile_origin(IVec2::new(6, 4))),
            Collider::new(Layer::Bosses, Vec2::splat(2.0 * TILE_SIZE)),
            Lifed::new(20).unwrap(),
            Killable::new(Duration::from_secs(1)),
        ));
        // Horizontal arm covers (6,5) and (7,5), both under the boss.
        explode(&mut world, IVec2::new(5, 5), 2, 1, None);
        world.flush_deferred();
        frame(&mut world);
        assert_eq!(world.entities.get::<Lifed>(boss).unwrap().life(), 18);
    }
}
