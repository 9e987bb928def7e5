//! Math types, glam re-exports and tile-grid helpers.
//!
//! We re-export [glam](https://docs.rs/glam) types so users don't need to
//! depend on it directly. Positions are in pixels, with the origin at the
//! top-left corner of the level and Y growing downward. An entity's position
//! is the top-left corner of its sprite.

pub use glam::{IVec2, Vec2};

/// Side length of one level tile, in pixels.
pub const TILE_SIZE: f32 = 32.0;

/// Tolerance used when deciding whether a coordinate sits on a grid line.
const ALIGN_EPSILON: f32 = 1e-3;

/// An axis-aligned rectangle in pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Top-left corner.
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub const fn new(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    /// Build from raw coordinates.
    pub fn from_xywh(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self::new(Vec2::new(x, y), Vec2::new(w, h))
    }

    /// The rectangle covering the tile at `tile`, possibly several tiles wide.
    pub fn from_tiles(tile: IVec2, tiles: IVec2) -> Self {
        Self::new(tile_origin(tile), tiles.as_vec2() * TILE_SIZE)
    }

    pub fn left(&self) -> f32 {
        self.pos.x
    }

    pub fn top(&self) -> f32 {
        self.pos.y
    }

    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Strict overlap test: rectangles that merely touch do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    /// The overlapping region, if any.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.intersects(other) {
            return None;
        }
        let min = self.pos.max(other.pos);
        let max = Vec2::new(
            self.right().min(other.right()),
            self.bottom().min(other.bottom()),
        );
        Some(Rect::new(min, max - min))
    }

    /// True if `other` lies entirely inside this rectangle (edges inclusive).
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.left() >= self.left()
            && other.top() >= self.top()
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// A copy moved by `delta`.
    pub fn shifted(&self, delta: Vec2) -> Rect {
        Rect::new(self.pos + delta, self.size)
    }

    /// A copy grown by `amount` on every side.
    pub fn inflated(&self, amount: f32) -> Rect {
        Rect::new(
            self.pos - Vec2::splat(amount),
            self.size + Vec2::splat(2.0 * amount),
        )
    }

    pub fn area(&self) -> f32 {
        self.size.x * self.size.y
    }
}

// ── Tile helpers ─────────────────────────────────────────────────────────

/// The tile containing `pos`.
pub fn tile(pos: Vec2) -> IVec2 {
    (pos / TILE_SIZE).floor().as_ivec2()
}

/// Pixel position of a tile's top-left corner.
pub fn tile_origin(tile: IVec2) -> Vec2 {
    tile.as_vec2() * TILE_SIZE
}

/// True if `v` lies on a grid line.
pub fn is_on_grid(v: f32) -> bool {
    let r = v.rem_euclid(TILE_SIZE);
    r < ALIGN_EPSILON || TILE_SIZE - r < ALIGN_EPSILON
}

/// True if both coordinates lie on grid lines.
pub fn is_aligned(pos: Vec2) -> bool {
    is_on_grid(pos.x) && is_on_grid(pos.y)
}

/// `pos` snapped to the nearest tile corner.
pub fn aligned(pos: Vec2) -> Vec2 {
    (pos / TILE_SIZE).round() * TILE_SIZE
}

/// Number of tiles covered by a size, rounding partial tiles up.
pub fn tiles_spanned(size: Vec2) -> IVec2 {
    (size / TILE_SIZE - Vec2::splat(ALIGN_EPSILON)).ceil().max(Vec2::ONE).as_ivec2()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_rects_do_not_intersect() {
        let a = Rect::from_xywh(0.0, 0.0, 32.0, 32.0);
        let b = Rect::from_xywh(32.0, 0.0, 32.0, 32.0);
        assert!(!a.intersects(&b));
        assert!(a.shifted(Vec2::X).intersects(&b));
    }

    #[test]
    fn intersection_area() {
        let a = Rect::from_xywh(0.0, 0.0, 64.0, 64.0);
        let b = Rect::from_xywh(32.0, 32.0, 64.0, 64.0);
        let i = a.intersection(&b).unwrap();
        assert_eq!(i.area(), 32.0 * 32.0);
    }

    #[test]
    fn tile_floors_negative_positions() {
        assert_eq!(tile(Vec2::new(-1.0, 33.0)), IVec2::new(-1, 1));
    }

    #[test]
    fn alignment_tolerates_float_noise() {
        assert!(is_aligned(Vec2::new(64.0, 31.9999)));
        assert!(!is_aligned(Vec2::new(64.5, 32.0)));
        assert_eq!(aligned(Vec2::new(47.0, 50.0)), Vec2::new(32.0, 64.0));
    }

    #[test]
    fn spanned_tiles_round_up() {
        assert_eq!(tiles_spanned(Vec2::splat(TILE_SIZE)), IVec2::ONE);
        assert_eq!(tiles_spanned(Vec2::new(128.0, 40.0)), IVec2::new(4, 2));
        assert_eq!(tiles_spanned(Vec2::splat(8.0)), IVec2::ONE);
    }
}
