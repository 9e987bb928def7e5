//! The four grid directions plus `None`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::math::{IVec2, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
    #[default]
    None,
}

impl Direction {
    /// The four real directions, clockwise from `Up`.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::None => Direction::None,
        }
    }

    /// Rotate clockwise by `times` quarter turns (negative turns left).
    pub fn turn_right(self, times: i32) -> Direction {
        let Some(i) = Self::ALL.iter().position(|&d| d == self) else {
            return Direction::None;
        };
        Self::ALL[(i as i32 + times).rem_euclid(4) as usize]
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    /// Unit step in tile coordinates.
    pub fn unit(self) -> IVec2 {
        match self {
            Direction::Up => IVec2::new(0, -1),
            Direction::Down => IVec2::new(0, 1),
            Direction::Left => IVec2::new(-1, 0),
            Direction::Right => IVec2::new(1, 0),
            Direction::None => IVec2::ZERO,
        }
    }

    /// Unit step in pixel space.
    pub fn unit_vec(self) -> Vec2 {
        self.unit().as_vec2()
    }

    /// Index into per-direction arrays (`[up, right, down, left]`).
    pub fn index(self) -> Option<usize> {
        Self::ALL.iter().position(|&d| d == self)
    }

    /// Direction of the straight line going from tile `from` to tile `to`.
    ///
    /// Returns `None` if the tiles are equal or not on the same row/column.
    pub fn between(from: IVec2, to: IVec2) -> Direction {
        if from.x == to.x {
            match from.y.cmp(&to.y) {
                std::cmp::Ordering::Less => Direction::Down,
                std::cmp::Ordering::Greater => Direction::Up,
                std::cmp::Ordering::Equal => Direction::None,
            }
        } else if from.y == to.y {
            if from.x < to.x { Direction::Right } else { Direction::Left }
        } else {
            Direction::None
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::Up => "UP",
            Direction::Right => "RIGHT",
            Direction::Down => "DOWN",
            Direction::Left => "LEFT",
            Direction::None => "NONE",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turn_right_wraps_both_ways() {
        assert_eq!(Direction::Up.turn_right(1), Direction::Right);
        assert_eq!(Direction::Left.turn_right(1), Direction::Up);
        assert_eq!(Direction::Up.turn_right(-1), Direction::Left);
        assert_eq!(Direction::Down.turn_right(6), Direction::Up);
        assert_eq!(Direction::None.turn_right(1), Direction::None);
    }

    #[test]
    fn opposite_is_involutive() {
        for d in Direction::ALL {
            assert_eq!(d.opposite().opposite(), d);
            assert_eq!(d.unit() + d.opposite().unit(), IVec2::ZERO);
        }
    }

    #[test]
    fn between_tiles() {
        let a = IVec2::new(2, 2);
        assert_eq!(Direction::between(a, IVec2::new(2, 5)), Direction::Down);
        assert_eq!(Direction::between(a, IVec2::new(0, 2)), Direction::Left);
        assert_eq!(Direction::between(a, IVec2::new(3, 3)), Direction::None);
        assert_eq!(Direction::between(a, a), Direction::None);
    }
}
