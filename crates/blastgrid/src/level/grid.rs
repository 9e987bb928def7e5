//! The finalized tile grid a level is built from.
//!
//! Parsing level files is somebody else's job; what reaches the loader is a
//! rectangle of single-character tiles:
//!
//! ```text
//! .  empty            T  teleport
//! #  unbreakable      X  player 1
//! +  breakable        Y  player 2
//! =  transparent      a..j  enemy 1..10
//! C  coin             R  Rex (top-left tile of his body)
//! A  acid pond        M  Mainframe (top-left tile)
//! ```

use std::fmt;

use crate::error::{Result, SimError};
use crate::math::IVec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileKind {
    Empty,
    Unbreakable,
    Breakable,
    TransparentWall,
    Teleport,
    Coin,
    AcidPond,
    /// 1-based player number.
    Player(u8),
    /// Enemy id, 1 to 10.
    Enemy(u32),
    Rex,
    Mainframe,
    /// Kept so the loader can report it.
    Invalid(char),
}

impl TileKind {
    pub fn from_char(c: char) -> Self {
        match c {
            '.' => TileKind::Empty,
            '#' => TileKind::Unbreakable,
            '+' => TileKind::Breakable,
            '=' => TileKind::TransparentWall,
            'T' => TileKind::Teleport,
            'C' => TileKind::Coin,
            'A' => TileKind::AcidPond,
            'X' => TileKind::Player(1),
            'Y' => TileKind::Player(2),
            'a'..='j' => TileKind::Enemy(c as u32 - 'a' as u32 + 1),
            'R' => TileKind::Rex,
            'M' => TileKind::Mainframe,
            other => TileKind::Invalid(other),
        }
    }

    pub fn to_char(self) -> char {
        match self {
            TileKind::Empty => '.',
            TileKind::Unbreakable => '#',
            TileKind::Breakable => '+',
            TileKind::TransparentWall => '=',
            TileKind::Teleport => 'T',
            TileKind::Coin => 'C',
            TileKind::AcidPond => 'A',
            TileKind::Player(2) => 'Y',
            TileKind::Player(_) => 'X',
            TileKind::Enemy(id) => {
                char::from_u32('a' as u32 + id.saturating_sub(1)).unwrap_or('?')
            }
            TileKind::Rex => 'R',
            TileKind::Mainframe => 'M',
            TileKind::Invalid(c) => c,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    size: IVec2,
    tiles: Vec<TileKind>,
}

impl TileGrid {
    /// A grid from equally long rows, top row first.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self> {
        let width = rows.first().map_or(0, |r| r.as_ref().chars().count());
        if width == 0 {
            return Err(SimError::InvalidParameter("empty tile grid".to_owned()));
        }
        let mut tiles = Vec::with_capacity(width * rows.len());
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let n = row.chars().count();
            if n != width {
                return Err(SimError::InvalidParameter(format!(
                    "row {y} has {n} tiles, expected {width}"
                )));
            }
            tiles.extend(row.chars().map(TileKind::from_char));
        }
        Ok(Self {
            size: IVec2::new(width as i32, rows.len() as i32),
            tiles,
        })
    }

    /// Like [`from_rows`](Self::from_rows), one row per non-blank line.
    pub fn from_text(text: &str) -> Result<Self> {
        let rows: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
        Self::from_rows(rows.as_slice())
    }

    /// Size in tiles.
    pub fn size(&self) -> IVec2 {
        self.size
    }

    pub fn get(&self, t: IVec2) -> Option<TileKind> {
        if t.x < 0 || t.y < 0 || t.x >= self.size.x || t.y >= self.size.y {
            return None;
        }
        self.tiles.get((t.y * self.size.x + t.x) as usize).copied()
    }

    /// Every tile, row by row from the top left.
    pub fn iter(&self) -> impl Iterator<Item = (IVec2, TileKind)> + '_ {
        let w = self.size.x;
        self.tiles
            .iter()
            .enumerate()
            .map(move |(i, &k)| (IVec2::new(i as i32 % w, i as i32 / w), k))
    }
}

impl fmt::Display for TileGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.tiles.chunks(self.size.x as usize) {
            let line: String = row.iter().map(|k| k.to_char()).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
