//! # Sight — Who Can See Which Player
//!
//! Enemies look along the four axes from their tile:
//!
//! ```text
//!           ·
//!           ·            the look stops at the first opaque tile
//!   ·  ·  · E  ·  ·  P   (breakable or unbreakable wall), at the
//!           ·            level edge, or after `vision` tiles
//!           #
//! ```
//!
//! Only the nearest live player per direction is kept. Transparent walls
//! stop walkers but not eyes.
//!
//! Bosses use [`FreeSighted`] instead: every live player within a radius,
//! nearest first, whatever is in between.

use crate::collision::Collider;
use crate::components::{Killable, Position};
use crate::ecs::Entity;
use crate::entities::player::Player;
use crate::math::{IVec2, Rect, aligned, tile};
use crate::nav::TileOccupancy;
use crate::world::World;

/// A player seen along one axis, `distance` tiles away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seen {
    pub entity: Entity,
    pub distance: u32,
}

#[derive(Debug, Clone, Default)]
pub struct AxisSighted {
    /// Tiles; `None` sees up to the first wall.
    vision: Option<u32>,
    seen: [Option<Seen>; 4],
}

impl AxisSighted {
    pub fn new(vision: Option<u32>) -> Self {
        Self {
            vision,
            seen: [None; 4],
        }
    }

    /// Nearest player seen per direction, indexed like
    /// [`Direction::index`](crate::direction::Direction::index).
    pub fn seen(&self) -> &[Option<Seen>; 4] {
        &self.seen
    }

    /// The nearest player seen in any direction, with its direction index.
    pub fn nearest(&self) -> Option<(usize, Seen)> {
        self.seen
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.map(|s| (i, s)))
            .min_by_key(|(_, s)| s.distance)
    }
}

#[derive(Debug, Clone, Default)]
pub struct FreeSighted {
    /// Pixels; `None` sees the whole level.
    vision: Option<f32>,
    seen: Vec<(Entity, f32)>,
}

impl FreeSighted {
    pub fn new(vision: Option<f32>) -> Self {
        Self {
            vision,
            seen: Vec::new(),
        }
    }

    /// Players in sight with their distance in pixels, nearest first.
    pub fn seen(&self) -> &[(Entity, f32)] {
        &self.seen
    }
}

fn live_players(world: &World) -> Vec<(Entity, Rect)> {
    world
        .entities
        .iter::<Player>()
        .filter(|&(e, _)| {
            !world
                .entities
                .get::<Killable>(e)
                .is_some_and(Killable::is_killed)
        })
        .filter_map(|(e, _)| {
            let pos = world.entities.get::<Position>(e)?;
            let rect = world
                .entities
                .get::<Collider>(e)
                .map_or(Rect::from_tiles(tile(pos.0), IVec2::ONE), |c| c.rect(pos.0));
            Some((e, rect))
        })
        .collect()
}

fn look(
    from: IVec2,
    step: IVec2,
    vision: Option<u32>,
    occ: &TileOccupancy,
    players: &[(Entity, Rect)],
) -> Option<Seen> {
    let mut distance = 0;
    loop {
        distance += 1;
        if vision.is_some_and(|v| distance > v) {
            return None;
        }
        let t = from + step * distance as i32;
        if !occ.in_bounds(t) || occ.is_opaque(t) {
            return None;
        }
        let cell = Rect::from_tiles(t, IVec2::ONE);
        if let Some(&(entity, _)) = players.iter().find(|(_, r)| r.intersects(&cell)) {
            return Some(Seen { entity, distance });
        }
    }
}

/// Refresh what every sighted entity sees.
pub fn update_sight(world: &mut World) {
    let players = live_players(world);
    let Some(occ) = world.resource_remove::<TileOccupancy>() else {
        return;
    };

    world
        .entities
        .query::<(&mut AxisSighted, &Position)>(|_, (sighted, pos)| {
            let from = tile(aligned(pos.0));
            for (i, dir) in crate::direction::Direction::ALL.into_iter().enumerate() {
                sighted.seen[i] = look(from, dir.unit(), sighted.vision, &occ, &players);
            }
        });

    world
        .entities
        .query::<(&mut FreeSighted, &Position, Option<&Collider>)>(|_, (sighted, pos, collider)| {
            let center = collider.map_or(pos.0, |c| c.rect(pos.0).center());
            sighted.seen = players
                .iter()
                .map(|&(e, r)| (e, center.distance(r.center())))
                .filter(|&(_, d)| sighted.vision.is_none_or(|v| d <= v))
                .collect();
            sighted.seen.sort_by(|a, b| a.1.total_cmp(&b.1));
        });

    world.insert_resource(occ);
}
