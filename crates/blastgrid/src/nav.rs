//! # Navigation — What Sits on Each Tile
//!
//! Movers ask one question before leaving a tile: "can I go that way?".
//! Answering it from the collider lists alone would be too late (those only
//! report what we already bumped into), so once per frame the
//! [`TileOccupancy`] map is rebuilt from the fixed colliders and the active
//! bosses, and [`TileOccupancy::can_go`] reads it.
//!
//! ```text
//!   tiles: Vec<Vec<(Entity, Layer)>>   one slot per level tile,
//!                                      fixed colliders only
//!   bosses: Vec<(Entity, Rect)>        bosses span several tiles and move,
//!                                      so they're kept as rectangles
//! ```
//!
//! `can_go` is a pure query: it never mutates anything and asking twice
//! gives the same answer.

use crate::collision::{Collider, Layer};
use crate::components::{Fixed, Position};
use crate::direction::Direction;
use crate::ecs::{Entity, EntityGroup};
use crate::math::{IVec2, Rect, Vec2, aligned, tile, tiles_spanned};

/// Per-tile map of fixed colliders plus the rectangles of active bosses.
#[derive(Debug, Clone, Default)]
pub struct TileOccupancy {
    size: IVec2,
    tiles: Vec<Vec<(Entity, Layer)>>,
    bosses: Vec<(Entity, Rect)>,
}

impl TileOccupancy {
    pub fn new(size: IVec2) -> Self {
        let n = (size.x.max(0) * size.y.max(0)) as usize;
        Self {
            size,
            tiles: vec![Vec::new(); n],
            bosses: Vec::new(),
        }
    }

    pub fn size(&self) -> IVec2 {
        self.size
    }

    pub fn in_bounds(&self, t: IVec2) -> bool {
        t.x >= 0 && t.y >= 0 && t.x < self.size.x && t.y < self.size.y
    }

    fn index(&self, t: IVec2) -> Option<usize> {
        self.in_bounds(t).then(|| (t.y * self.size.x + t.x) as usize)
    }

    /// Rebuild from the group's active colliders.
    pub fn rebuild(&mut self, group: &EntityGroup) {
        for slot in &mut self.tiles {
            slot.clear();
        }
        self.bosses.clear();

        for (entity, collider) in group.iter::<Collider>() {
            if !collider.active {
                continue;
            }
            let Some(pos) = group.get::<Position>(entity) else {
                continue;
            };
            if collider.layer() == Layer::Bosses {
                self.bosses.push((entity, collider.rect(pos.0)));
            } else if group.has::<Fixed>(entity) {
                let origin = tile(aligned(pos.0 + collider.offset()));
                let span = tiles_spanned(collider.size());
                for dy in 0..span.y {
                    for dx in 0..span.x {
                        if let Some(i) = self.index(origin + IVec2::new(dx, dy)) {
                            self.tiles[i].push((entity, collider.layer()));
                        }
                    }
                }
            }
        }
    }

    /// Fixed colliders on tile `t`. Empty outside the level.
    pub fn fixed_at(&self, t: IVec2) -> &[(Entity, Layer)] {
        match self.index(t) {
            Some(i) => &self.tiles[i],
            None => &[],
        }
    }

    /// True if something on `t` blocks line of sight.
    pub fn is_opaque(&self, t: IVec2) -> bool {
        self.fixed_at(t).iter().any(|&(_, l)| l.is_opaque())
    }

    /// True if tile `t` holds no fixed collider at all.
    pub fn is_free(&self, t: IVec2) -> bool {
        self.in_bounds(t) && self.fixed_at(t).is_empty()
    }

    pub fn bosses(&self) -> &[(Entity, Rect)] {
        &self.bosses
    }

    /// Can `mover`, with a `size`-pixel footprint on `layer` and sitting at
    /// `pos`, step one tile toward `dir`?
    ///
    /// False if the destination footprint leaves the level, holds a fixed
    /// collider `layer` won't walk onto, or overlaps a boss other than `mover`.
    pub fn can_go(
        &self,
        mover: Entity,
        pos: Vec2,
        size: Vec2,
        layer: Layer,
        dir: Direction,
    ) -> bool {
        if dir == Direction::None {
            return true;
        }
        let span = tiles_spanned(size);
        let dest = tile(aligned(pos)) + dir.unit();
        let solid = layer.walk_blockers();

        for dy in 0..span.y {
            for dx in 0..span.x {
                let t = dest + IVec2::new(dx, dy);
                if !self.in_bounds(t) {
                    return false;
                }
                if self
                    .fixed_at(t)
                    .iter()
                    .any(|&(e, l)| e != mover && solid.contains(l))
                {
                    return false;
                }
            }
        }

        let dest_rect = Rect::from_tiles(dest, span);
        !self
            .bosses
            .iter()
            .any(|&(e, r)| e != mover && dest_rect.intersects(&r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{TILE_SIZE, tile_origin};

    fn wall(group: &mut EntityGroup, t: IVec2, layer: Layer) -> Entity {
        group.spawn((Position(tile_origin(t)), Collider::tile(layer), Fixed))
    }

    fn occupancy(group: &EntityGroup) -> TileOccupancy {
        let mut occ = TileOccupancy::new(IVec2::new(5, 5));
        occ.rebuild(group);
        occ
    }

    #[test]
    fn solid_fixed_entity_blocks() {
        let mut group = EntityGroup::new();
        wall(&mut group, IVec2::new(2, 1), Layer::Unbreakables);
        let me = group.spawn((0u8,));
        let occ = occupancy(&group);
        let pos = tile_origin(IVec2::new(1, 1));
        let size = Vec2::splat(TILE_SIZE);
        assert!(!occ.can_go(me, pos, size, Layer::Players, Direction::Right));
        assert!(occ.can_go(me, pos, size, Layer::Players, Direction::Down));
        // Asking again changes nothing.
        assert!(!occ.can_go(me, pos, size, Layer::Players, Direction::Right));
    }

    #[test]
    fn level_edge_blocks() {
        let mut group = EntityGroup::new();
        let me = group.spawn((0u8,));
        let occ = occupancy(&group);
        let size = Vec2::splat(TILE_SIZE);
        assert!(!occ.can_go(me, Vec2::ZERO, size, Layer::Players, Direction::Left));
        assert!(!occ.can_go(me, Vec2::ZERO, size, Layer::Players, Direction::Up));
        assert!(occ.can_go(me, Vec2::ZERO, size, Layer::Players, Direction::Right));
    }

    #[test]
    fn breakables_only_block_layers_that_care() {
        let mut group = EntityGroup::new();
        wall(&mut group, IVec2::new(1, 0), Layer::Breakables);
        let me = group.spawn((0u8,));
        let occ = occupancy(&group);
        let size = Vec2::splat(TILE_SIZE);
        assert!(!occ.can_go(me, Vec2::ZERO, size, Layer::Enemies, Direction::Right));
        assert!(occ.can_go(me, Vec2::ZERO, size, Layer::EnemiesIgnoreBreakables, Direction::Right));
    }

    #[test]
    fn multi_tile_mover_checks_whole_footprint() {
        let mut group = EntityGroup::new();
        wall(&mut group, IVec2::new(3, 1), Layer::Unbreakables);
        let me = group.spawn((0u8,));
        let occ = occupancy(&group);
        let size = Vec2::splat(2.0 * TILE_SIZE);
        // A 2x2 mover at (1,0) moving right covers (2..=3, 0..=1).
        let right = |tile: IVec2| {
            occ.can_go(me, tile_origin(tile), size, Layer::Players, Direction::Right)
        };
        assert!(!right(IVec2::new(1, 0)));
        assert!(right(IVec2::new(1, 2)));
    }

    #[test]
    fn bosses_block_others_but_not_themselves() {
        let mut group = EntityGroup::new();
        let boss = group.spawn((
            Position(tile_origin(IVec2::new(2, 0))),
            Collider::new(Layer::Bosses, Vec2::splat(2.0 * TILE_SIZE)),
        ));
        let other = group.spawn((0u8,));
        let occ = occupancy(&group);
        let size = Vec2::splat(TILE_SIZE);
        let from = tile_origin(IVec2::new(1, 1));
        assert!(!occ.can_go(other, from, size, Layer::Players, Direction::Right));
        assert!(occ.can_go(
            boss,
            tile_origin(IVec2::new(2, 0)),
            Vec2::splat(2.0 * TILE_SIZE),
            Layer::Bosses,
            Direction::Right
        ));
    }

    #[test]
    fn opacity() {
        let mut group = EntityGroup::new();
        wall(&mut group, IVec2::new(0, 1), Layer::Breakables);
        wall(&mut group, IVec2::new(1, 1), Layer::TransparentWalls);
        let occ = occupancy(&group);
        assert!(occ.is_opaque(IVec2::new(0, 1)));
        assert!(!occ.is_opaque(IVec2::new(1, 1)));
        assert!(!occ.is_free(IVec2::new(1, 1)));
        assert!(occ.is_free(IVec2::new(2, 2)));
    }
}
