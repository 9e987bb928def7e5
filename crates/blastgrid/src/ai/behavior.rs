//! # Enemy Behavior
//!
//! Enemies only decide where to go while they sit exactly on a tile, and
//! only when there's something to decide:
//!
//! ```text
//! aligned?  no → keep going
//!   yes and (just entered this tile
//!            or standing still
//!            or the way ahead is closed)  → pick a direction
//! ```
//!
//! The exception is bumping into something solid the occupancy map didn't
//! show while the way ahead looked open (a bomb dropped right in front of
//! it): the enemy turns around on the spot, aligned or not.
//!
//! | kind            | picks                                              |
//! |-----------------|----------------------------------------------------|
//! | `random`        | any open direction                                 |
//! | `random_forward`| straight on while open, else an open side          |
//! | `follow`        | toward the nearest player in sight, else as above  |
//! | `follow_dash`   | same as `follow`; the dash comes from its attack   |

use serde::{Deserialize, Serialize};

use crate::collision::Collider;
use crate::components::{AxisMoving, Killable, Position};
use crate::direction::Direction;
use crate::ecs::Entity;
use crate::math::is_aligned;
use crate::rng::DeterministicRng;
use crate::world::World;

use super::sight::AxisSighted;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiKind {
    Random,
    #[default]
    RandomForward,
    Follow,
    FollowDash,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Ai {
    pub kind: AiKind,
}

impl Ai {
    pub fn new(kind: AiKind) -> Self {
        Self { kind }
    }
}

struct Mind {
    entity: Entity,
    kind: AiKind,
    current: Direction,
    moving: bool,
    aligned: bool,
    entered_new_tile: bool,
    bumped: bool,
    /// Direction index of the nearest player in sight.
    target: Option<usize>,
}

/// A random open direction, avoiding `avoid` unless it's the only way.
pub(crate) fn random_open(
    viable: &[bool; 4],
    avoid: Direction,
    rng: &mut DeterministicRng,
) -> Direction {
    let open: Vec<Direction> = Direction::ALL
        .into_iter()
        .filter(|d| viable[d.index().unwrap_or(0)] && *d != avoid)
        .collect();
    match rng.pick(&open) {
        Some(&d) => d,
        None if avoid.index().is_some_and(|i| viable[i]) => avoid,
        None => Direction::None,
    }
}

fn decide(mind: &Mind, viable: &[bool; 4], rng: &mut DeterministicRng) -> Direction {
    let forward_open = mind.current.index().is_some_and(|i| viable[i]);
    let back = mind.current.opposite();
    match mind.kind {
        AiKind::Random => random_open(viable, Direction::None, rng),
        AiKind::RandomForward => {
            if forward_open && mind.moving {
                mind.current
            } else {
                random_open(viable, back, rng)
            }
        }
        AiKind::Follow | AiKind::FollowDash => match mind.target {
            Some(i) if viable[i] => Direction::ALL[i],
            _ if forward_open && mind.moving => mind.current,
            _ => random_open(viable, back, rng),
        },
    }
}

/// Steer every AI-driven enemy.
pub fn update_ai(world: &mut World) {
    let mut minds = Vec::new();
    world.entities.query::<(
        &Ai,
        &AxisMoving,
        &Position,
        &Collider,
        Option<&Killable>,
        Option<&AxisSighted>,
    )>(|entity, (ai, moving, pos, collider, killable, sighted)| {
        if killable.is_some_and(Killable::is_killed) || moving.is_blocked() {
            return;
        }
        minds.push(Mind {
            entity,
            kind: ai.kind,
            current: moving.direction(),
            moving: moving.is_moving(),
            aligned: is_aligned(pos.0),
            entered_new_tile: moving.entered_new_tile(),
            bumped: collider.collides_with_solid(),
            target: sighted.and_then(AxisSighted::nearest).map(|(i, _)| i),
        });
    });

    for mind in minds {
        let viable = Direction::ALL.map(|d| world.can_go(mind.entity, d));
        let forward_open = mind.current.index().is_some_and(|i| viable[i]);

        let new_dir = if mind.bumped && forward_open {
            if let Some(c) = world.entities.get_mut::<Collider>(mind.entity) {
                c.reset();
            }
            Some(mind.current.opposite())
        } else if mind.aligned && (mind.entered_new_tile || !mind.moving || !forward_open) {
            Some(decide(&mind, &viable, &mut world.ctx.rng))
        } else {
            None
        };

        let Some(dir) = new_dir else {
            continue;
        };
        world
            .entities
            .query_one::<(&mut AxisMoving, &mut Position), _>(mind.entity, |(moving, pos)| {
                if dir == Direction::None {
                    moving.stop(&mut pos.0);
                } else {
                    moving.move_in(dir);
                }
            });
    }
}
