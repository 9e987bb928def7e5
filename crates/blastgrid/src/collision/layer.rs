//! # Collision Layers
//!
//! Every collider belongs to one [`Layer`]. Two colliders interact only if
//! *neither* is transparent to the other's layer, so the relation is
//! symmetric by construction. On top of that, some layers are *solid* for
//! others: touching them stops movement instead of merely being reported.
//!
//! ```text
//!                    hits (when the other side agrees)
//! PLAYERS      ── walls, enemies, bosses, bombs, bonuses, teleports,
//!                 explosions, bullets, hazards
//! ENEMIES      ── walls, players, bombs, teleports, explosions
//! BOSSES       ── players, explosions
//! EXPLOSIONS   ── players, enemies, bosses, breakables, bombs, bonuses
//! ENEMY_BULLETS── players, walls (not transparent walls)
//! BOSS_BULLETS ── players only (they fly over walls)
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layer {
    /// Collides with everything.
    Default,
    Players,
    Enemies,
    /// Enemies that walk through breakable walls.
    EnemiesIgnoreBreakables,
    Bosses,
    Breakables,
    Unbreakables,
    /// Walls that stop walkers but let bullets and sight through.
    TransparentWalls,
    Teleports,
    Grabbable,
    Bombs,
    Explosions,
    EnemyBullets,
    BossBullets,
    /// Damaging areas that are not explosions (flames, stomps).
    Hazards,
}

impl Layer {
    pub const ALL: [Layer; 15] = [
        Layer::Default,
        Layer::Players,
        Layer::Enemies,
        Layer::EnemiesIgnoreBreakables,
        Layer::Bosses,
        Layer::Breakables,
        Layer::Unbreakables,
        Layer::TransparentWalls,
        Layer::Teleports,
        Layer::Grabbable,
        Layer::Bombs,
        Layer::Explosions,
        Layer::EnemyBullets,
        Layer::BossBullets,
        Layer::Hazards,
    ];

    pub const fn bit(self) -> u32 {
        1 << (self as u32)
    }

    /// Layers this layer is willing to collide with.
    pub fn hits(self) -> LayerMask {
        use Layer::*;
        let list: &[Layer] = match self {
            Default => return LayerMask::ALL,
            Players => &[
                Enemies,
                EnemiesIgnoreBreakables,
                Bosses,
                Breakables,
                Unbreakables,
                TransparentWalls,
                Teleports,
                Grabbable,
                Bombs,
                Explosions,
                EnemyBullets,
                BossBullets,
                Hazards,
            ],
            Enemies => &[
                Players,
                Breakables,
                Unbreakables,
                TransparentWalls,
                Teleports,
                Bombs,
                Explosions,
            ],
            EnemiesIgnoreBreakables => &[
                Players,
                Unbreakables,
                TransparentWalls,
                Teleports,
                Bombs,
                Explosions,
            ],
            Bosses => &[Players, Explosions],
            Breakables => &[Players, Enemies, Explosions, EnemyBullets],
            Unbreakables => &[Players, Enemies, EnemiesIgnoreBreakables, EnemyBullets],
            TransparentWalls => &[Players, Enemies, EnemiesIgnoreBreakables],
            Teleports => &[Players, Enemies, EnemiesIgnoreBreakables],
            Grabbable => &[Players, Explosions],
            Bombs => &[Players, Enemies, EnemiesIgnoreBreakables, Explosions],
            Explosions => &[
                Players,
                Enemies,
                EnemiesIgnoreBreakables,
                Bosses,
                Breakables,
                Grabbable,
                Bombs,
            ],
            EnemyBullets => &[Players, Breakables, Unbreakables],
            BossBullets => &[Players],
            Hazards => &[Players],
        };
        LayerMask::from_layers(list).with(Default)
    }

    /// The default transparency of a collider on this layer.
    pub fn default_transparency(self) -> LayerMask {
        self.hits().complement()
    }

    /// Layers that stop an entity of this layer from moving.
    pub fn solid_to(self) -> LayerMask {
        use Layer::*;
        match self {
            Players => LayerMask::from_layers(&[
                Breakables,
                Unbreakables,
                TransparentWalls,
                Bombs,
                Bosses,
            ]),
            Enemies => LayerMask::from_layers(&[Breakables, Unbreakables, TransparentWalls, Bombs]),
            EnemiesIgnoreBreakables => {
                LayerMask::from_layers(&[Unbreakables, TransparentWalls, Bombs])
            }
            _ => LayerMask::NONE,
        }
    }

    /// Layers whose fixed tiles a mover on this layer won't step onto.
    ///
    /// Same as [`solid_to`](Self::solid_to), except that bosses, which don't
    /// collide with walls at all, still walk around them.
    pub fn walk_blockers(self) -> LayerMask {
        use Layer::*;
        match self {
            Bosses => LayerMask::from_layers(&[Breakables, Unbreakables, TransparentWalls, Bombs]),
            other => other.solid_to(),
        }
    }

    /// Layers that block line of sight.
    pub fn is_opaque(self) -> bool {
        matches!(self, Layer::Breakables | Layer::Unbreakables)
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A set of layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: LayerMask = LayerMask(0);
    pub const ALL: LayerMask = LayerMask((1 << Layer::ALL.len()) - 1);

    pub fn from_layers(layers: &[Layer]) -> Self {
        Self(layers.iter().fold(0, |acc, l| acc | l.bit()))
    }

    pub fn contains(self, layer: Layer) -> bool {
        self.0 & layer.bit() != 0
    }

    pub fn with(self, layer: Layer) -> Self {
        Self(self.0 | layer.bit())
    }

    pub fn without(self, layer: Layer) -> Self {
        Self(self.0 & !layer.bit())
    }

    pub fn complement(self) -> Self {
        Self(!self.0 & Self::ALL.0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// True if colliders on `a` and `b` (with default transparency) interact.
pub fn layers_collide(a: Layer, b: Layer) -> bool {
    !a.default_transparency().contains(b) && !b.default_transparency().contains(a)
}
