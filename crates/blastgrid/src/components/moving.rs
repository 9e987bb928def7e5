//! # Moving — Grid-Bound and Free Movement
//!
//! Almost everything that moves in a tile game moves along the grid axes:
//! players, enemies, Rex, most bullets. [`AxisMoving`] is that state machine.
//! Bullets shot at an angle and boss missiles use [`FreeMoving`].
//!
//! ## Per-Frame Step
//!
//! ```text
//! speed_eff = speed × (2 if speedy) + dash × original_speed
//!
//! blocked?  (timed block, solid collision, at level limit,
//!            or aligned and the next tile is not walkable)
//!   yes → direction still updates, position doesn't
//!   no  → pos += unit(direction) × speed_eff × min(dt, max_frame_time)
//!         then never skip past the next grid line
//! ```
//!
//! ## Never Skipping a Tile
//!
//! AI decisions, teleports and Rex's step counter all happen when an entity
//! sits exactly on a tile. At low frame rates a fast mover could jump over a
//! grid line between two frames, so after each step the position is clamped
//! to the first grid line beyond where the frame started. Every tile crossed
//! is therefore visited aligned for at least one frame.

use std::time::Duration;

use crate::direction::Direction;
use crate::math::{IVec2, TILE_SIZE, Vec2, is_aligned, tile};
use crate::time::Timer;

/// Tolerance when deciding on which side of a grid line a coordinate sits.
const GRID_EPSILON: f32 = 1e-3;

/// Grid-bound movement.
#[derive(Debug, Clone)]
pub struct AxisMoving {
    direction: Direction,
    /// Direction at the previous update.
    prev_direction: Direction,
    speed: f32,
    original_speed: f32,
    dash: f32,
    moving: bool,
    block: Option<Timer>,
    speedy: Option<Timer>,
    /// Snap the cross axis back onto the grid when turning.
    auto_realign: bool,
    dist_travelled: f32,
    /// Last tile this entity was aligned on.
    prev_align: IVec2,
    entered_new_tile: bool,
}

impl AxisMoving {
    /// `speed` is in pixels per second. The entity starts moving if
    /// `direction` is not `None`.
    pub fn new(speed: f32, direction: Direction) -> Self {
        Self {
            direction,
            prev_direction: Direction::None,
            speed,
            original_speed: speed,
            dash: 0.0,
            moving: direction != Direction::None,
            block: None,
            speedy: None,
            auto_realign: true,
            dist_travelled: 0.0,
            prev_align: IVec2::ZERO,
            entered_new_tile: false,
        }
    }

    /// Like [`new`](Self::new), but anchored to the tile at `pos`.
    pub fn at(pos: Vec2, speed: f32, direction: Direction) -> Self {
        let mut m = Self::new(speed, direction);
        m.prev_align = tile(pos);
        m
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn prev_direction(&self) -> Direction {
        self.prev_direction
    }

    pub fn is_moving(&self) -> bool {
        self.moving && self.direction != Direction::None
    }

    /// Start moving toward `direction`.
    pub fn move_in(&mut self, direction: Direction) {
        self.direction = direction;
        self.moving = direction != Direction::None;
    }

    /// Change facing without changing whether we're moving.
    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    /// Stop, forget the direction and snap to the nearest tile.
    pub fn stop(&mut self, pos: &mut Vec2) {
        self.moving = false;
        self.direction = Direction::None;
        self.prev_direction = Direction::None;
        self.realign(pos);
    }

    // ── Speed ────────────────────────────────────────────────────────

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn original_speed(&self) -> f32 {
        self.original_speed
    }

    /// Set the base speed, either absolute or as a multiple of the original.
    pub fn set_speed(&mut self, speed: f32, relative_to_original: bool) {
        self.speed = if relative_to_original {
            speed * self.original_speed
        } else {
            speed
        };
    }

    pub fn set_dashing(&mut self, multiplier: f32) {
        self.dash = multiplier;
    }

    pub fn dash(&self) -> f32 {
        self.dash
    }

    pub fn give_speedy(&mut self, duration: Duration) {
        self.speedy = Some(Timer::new(duration));
    }

    pub fn is_speedy(&self) -> bool {
        self.speedy.is_some_and(|t| !t.finished())
    }

    pub fn effective_speed(&self) -> f32 {
        let base = if self.is_speedy() { self.speed * 2.0 } else { self.speed };
        base + self.dash * self.original_speed
    }

    // ── Blocking ─────────────────────────────────────────────────────

    /// Block for `duration`. A zero duration unblocks immediately.
    pub fn block(&mut self, duration: Duration) {
        self.block = if duration.is_zero() {
            None
        } else {
            Some(Timer::new(duration))
        };
    }

    pub fn is_blocked(&self) -> bool {
        self.block.is_some_and(|t| !t.finished())
    }

    // ── Alignment ────────────────────────────────────────────────────

    pub fn set_auto_realign(&mut self, on: bool) {
        self.auto_realign = on;
    }

    pub fn prev_align(&self) -> IVec2 {
        self.prev_align
    }

    /// Used after a teleport moves the entity.
    pub fn set_prev_align(&mut self, tile: IVec2) {
        self.prev_align = tile;
    }

    /// True during the frame this entity became aligned on a tile it wasn't
    /// aligned on before.
    pub fn entered_new_tile(&self) -> bool {
        self.entered_new_tile
    }

    pub fn dist_travelled(&self) -> f32 {
        self.dist_travelled
    }

    pub fn set_dist_travelled(&mut self, d: f32) {
        self.dist_travelled = d;
    }

    /// Snap onto the grid: `Down`/`Right` round down along the axis of
    /// motion, `Up`/`Left` round up, `None` rounds both axes to the nearest
    /// tile.
    pub fn realign(&self, pos: &mut Vec2) {
        realign_for(self.direction, pos);
    }

    // ── Per-frame update ─────────────────────────────────────────────

    /// Advance the timers. Call with the real frame delta.
    pub fn tick(&mut self, dt: Duration) {
        if let Some(t) = self.block.as_mut() {
            t.tick(dt);
            if t.finished() {
                self.block = None;
            }
        }
        if let Some(t) = self.speedy.as_mut() {
            t.tick(dt);
            if t.finished() {
                self.speedy = None;
            }
        }
    }

    /// Move `pos` for one frame. `frame_time` must already be clamped to the
    /// maximum frame time; `obstructed` reports solid collisions, the level
    /// limit and unwalkable tiles ahead. Returns the distance covered.
    pub fn update(&mut self, pos: &mut Vec2, frame_time: Duration, obstructed: bool) -> f32 {
        self.entered_new_tile = false;

        if self.auto_realign
            && self.direction != self.prev_direction
            && self.prev_direction != Direction::None
            && self.direction != Direction::None
            && self.direction.is_vertical() != self.prev_direction.is_vertical()
        {
            // Turning: finish the step on the old axis first.
            realign_for(self.prev_direction, pos);
        }
        self.prev_direction = self.direction;

        let mut covered = 0.0;
        if self.is_moving() && !self.is_blocked() && !obstructed {
            let start = *pos;
            *pos += self.direction.unit_vec() * self.effective_speed() * frame_time.as_secs_f32();
            ensure_align(self.direction, start, pos);
            covered = start.distance(*pos);
            self.dist_travelled += covered;
        }

        if is_aligned(*pos) {
            let t = tile(*pos);
            if t != self.prev_align {
                self.entered_new_tile = true;
                self.prev_align = t;
            }
        }
        covered
    }
}

fn realign_for(direction: Direction, pos: &mut Vec2) {
    let floor = |v: f32| ((v + GRID_EPSILON) / TILE_SIZE).floor() * TILE_SIZE;
    let ceil = |v: f32| ((v - GRID_EPSILON) / TILE_SIZE).ceil() * TILE_SIZE;
    match direction {
        Direction::Down => pos.y = floor(pos.y),
        Direction::Right => pos.x = floor(pos.x),
        Direction::Up => pos.y = ceil(pos.y),
        Direction::Left => pos.x = ceil(pos.x),
        Direction::None => *pos = crate::math::aligned(*pos),
    }
}

/// First grid line strictly beyond `v` going in `sign`'s direction.
fn next_grid_line(v: f32, sign: f32) -> f32 {
    if sign > 0.0 {
        ((v + GRID_EPSILON) / TILE_SIZE).floor() * TILE_SIZE + TILE_SIZE
    } else {
        ((v - GRID_EPSILON) / TILE_SIZE).ceil() * TILE_SIZE - TILE_SIZE
    }
}

/// Clamp a step that started at `start` so it doesn't cross more than one
/// grid line.
fn ensure_align(direction: Direction, start: Vec2, pos: &mut Vec2) {
    match direction {
        Direction::Right => pos.x = pos.x.min(next_grid_line(start.x, 1.0)),
        Direction::Left => pos.x = pos.x.max(next_grid_line(start.x, -1.0)),
        Direction::Down => pos.y = pos.y.min(next_grid_line(start.y, 1.0)),
        Direction::Up => pos.y = pos.y.max(next_grid_line(start.y, -1.0)),
        Direction::None => {}
    }
}

/// Movement along an arbitrary angle.
#[derive(Debug, Clone)]
pub struct FreeMoving {
    velocity: Vec2,
    speed: f32,
    dist_travelled: f32,
    block: Option<Timer>,
}

impl FreeMoving {
    /// `angle` in radians, 0 pointing right, growing clockwise (Y down).
    pub fn new(speed: f32, angle: f32) -> Self {
        Self {
            velocity: Vec2::from_angle(angle) * speed,
            speed,
            dist_travelled: 0.0,
            block: None,
        }
    }

    /// Aim from `from` toward `to`. Points that coincide aim right.
    pub fn toward(speed: f32, from: Vec2, to: Vec2) -> Self {
        let d = to - from;
        let angle = if d.length_squared() > 0.0 { d.y.atan2(d.x) } else { 0.0 };
        Self::new(speed, angle)
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn dist_travelled(&self) -> f32 {
        self.dist_travelled
    }

    pub fn block(&mut self, duration: Duration) {
        self.block = if duration.is_zero() {
            None
        } else {
            Some(Timer::new(duration))
        };
    }

    pub fn is_blocked(&self) -> bool {
        self.block.is_some_and(|t| !t.finished())
    }

    pub fn tick(&mut self, dt: Duration) {
        if let Some(t) = self.block.as_mut() {
            t.tick(dt);
        }
    }

    pub fn update(&mut self, pos: &mut Vec2, frame_time: Duration, obstructed: bool) -> f32 {
        if self.is_blocked() || obstructed {
            return 0.0;
        }
        let step = self.velocity * frame_time.as_secs_f32();
        *pos += step;
        let covered = step.length();
        self.dist_travelled += covered;
        covered
    }
}
