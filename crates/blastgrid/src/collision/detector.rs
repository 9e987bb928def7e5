//! # Collision Detection
//!
//! Once per frame, after everything has moved, the [`CollisionDetector`]
//! recomputes which colliders touch and writes the result into each
//! [`Collider`]. Nothing persists between frames: a collision seen last
//! frame and not this one is simply gone.
//!
//! ## Algorithm
//!
//! ```text
//! 1. reset every collider (clear list, clear at-limit)
//! 2. snapshot active colliders: rect, layer, how the owner moves
//! 3. for each non-fixed collider i:
//!      axis mover heading out of the level?  → at_limit, skip i
//!      for each j ≠ i, layers compatible:
//!        axis mover:  j must be ahead of i, and i's rect shifted
//!                     1px toward its direction must overlap j
//!        otherwise:   plain overlap
//!        record j on i;
//!        record i on j when j can't see i on its own turn:
//!          i is not an axis mover, j doesn't move,
//!          or either side forces acknowledgment
//! 4. write the results back
//! ```
//!
//! Fixed colliders (walls, teleports, bombs) never look for collisions; they
//! are found by the movers bumping into them. An axis mover only "sees" what
//! is ahead of it, so a player walking away from a bomb isn't stuck on it.
//!
//! ## Why the 1px Shift
//!
//! Rectangles that merely touch do not intersect. A player standing right
//! next to a wall therefore doesn't overlap it; shifting the mover's rect by
//! one pixel in its direction reveals the wall it is about to walk into.
//!
//! ## Comparison
//!
//! A broad phase (grid buckets, sweep and prune) would cut the pairwise
//! checks, but a level holds a few hundred colliders at most and the simple
//! double loop keeps the direction-aware rules easy to follow.

use crate::components::{AxisMoving, Fixed, FreeMoving, Position};
use crate::direction::Direction;
use crate::ecs::{Entity, EntityGroup};
use crate::math::{Rect, Vec2};

use super::collider::{Collider, Collision};
use super::layer::{Layer, LayerMask};

#[derive(Clone, Copy)]
enum Motion {
    Still,
    Axis(Direction),
    Free(Vec2),
}

struct Snapshot {
    entity: Entity,
    rect: Rect,
    layer: Layer,
    transparent_to: LayerMask,
    fixed: bool,
    motion: Motion,
    force_ack: bool,
    ignore: Option<Entity>,
}

impl Snapshot {
    fn moves(&self) -> bool {
        !matches!(self.motion, Motion::Still)
    }

    fn compatible(&self, other: &Snapshot) -> bool {
        !self.transparent_to.contains(other.layer)
            && !other.transparent_to.contains(self.layer)
            && self.ignore != Some(other.entity)
            && other.ignore != Some(self.entity)
    }
}

/// Is `other` on the side `dir` points to, relative to `rect`?
fn is_ahead(dir: Direction, rect: &Rect, other: &Rect) -> bool {
    match dir {
        Direction::Up => other.top() <= rect.top(),
        Direction::Down => other.top() >= rect.top(),
        Direction::Left => other.left() <= rect.left(),
        Direction::Right => other.left() >= rect.left(),
        Direction::None => true,
    }
}

/// Per-frame statistics.
#[cfg(feature = "diagnostics")]
#[derive(Debug, Clone, Copy, Default)]
pub struct DetectorStats {
    /// Colliders taking part in detection.
    pub colliders: usize,
    /// Narrow-phase rectangle tests.
    pub checks: usize,
    pub elapsed_us: f64,
}

#[derive(Default)]
pub struct CollisionDetector {
    #[cfg(feature = "diagnostics")]
    stats: DetectorStats,
}

impl CollisionDetector {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(feature = "diagnostics")]
    pub fn stats(&self) -> DetectorStats {
        self.stats
    }

    /// Recompute all collisions among `group`'s colliders. `limit` is the
    /// level rectangle axis movers may not leave.
    pub fn update(&mut self, group: &mut EntityGroup, limit: Rect) {
        #[cfg(feature = "diagnostics")]
        let start = std::time::Instant::now();
        #[cfg(feature = "diagnostics")]
        let mut checks = 0usize;

        let snaps = snapshot(group);
        let n = snaps.len();
        let mut found: Vec<Vec<Collision>> = vec![Vec::new(); n];
        let mut at_limit = vec![false; n];

        for i in 0..n {
            let a = &snaps[i];
            if a.fixed {
                continue;
            }

            let heading_out = match a.motion {
                Motion::Axis(dir) if dir != Direction::None => {
                    !limit.contains_rect(&a.rect.shifted(dir.unit_vec()))
                }
                Motion::Free(v) if v != Vec2::ZERO => {
                    !limit.contains_rect(&a.rect.shifted(v.normalize()))
                }
                _ => false,
            };
            if heading_out {
                at_limit[i] = true;
                continue;
            }

            for j in 0..n {
                if i == j {
                    continue;
                }
                let b = &snaps[j];
                if !a.compatible(b) {
                    continue;
                }
                #[cfg(feature = "diagnostics")]
                {
                    checks += 1;
                }
                let (hit, acknowledge) = match a.motion {
                    Motion::Axis(dir) => (
                        is_ahead(dir, &a.rect, &b.rect)
                            && a.rect.shifted(dir.unit_vec()).intersects(&b.rect),
                        a.force_ack || b.force_ack || !b.moves(),
                    ),
                    _ => (a.rect.intersects(&b.rect), true),
                };
                if !hit {
                    continue;
                }
                found[i].push(Collision {
                    entity: b.entity,
                    layer: b.layer,
                });
                if acknowledge {
                    found[j].push(Collision {
                        entity: a.entity,
                        layer: a.layer,
                    });
                }
            }
        }

        for (k, snap) in snaps.iter().enumerate() {
            let Some(collider) = group.get_mut::<Collider>(snap.entity) else {
                continue;
            };
            if at_limit[k] {
                collider.set_at_limit();
            }
            for &c in &found[k] {
                collider.add_collision(c);
            }
        }

        #[cfg(feature = "diagnostics")]
        {
            self.stats = DetectorStats {
                colliders: n,
                checks,
                elapsed_us: start.elapsed().as_secs_f64() * 1_000_000.0,
            };
        }
    }
}

/// Reset every collider and capture the active ones.
fn snapshot(group: &mut EntityGroup) -> Vec<Snapshot> {
    let mut snaps = Vec::new();
    group.query::<(
        &Position,
        &mut Collider,
        Option<&AxisMoving>,
        Option<&FreeMoving>,
        Option<&Fixed>,
    )>(|entity, (pos, collider, axis, free, fixed)| {
        collider.reset();
        if !collider.active {
            return;
        }
        let motion = match (axis, free) {
            (Some(m), _) => Motion::Axis(m.direction()),
            (None, Some(f)) => Motion::Free(f.velocity()),
            (None, None) => Motion::Still,
        };
        snaps.push(Snapshot {
            entity,
            rect: collider.rect(pos.0),
            layer: collider.layer(),
            transparent_to: collider.transparent_to(),
            fixed: fixed.is_some(),
            motion,
            force_ack: collider.force_ack,
            ignore: collider.ignore,
        });
    });
    snaps
}
