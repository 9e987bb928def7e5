//! # Players
//!
//! Players are driven from outside the simulation: whatever reads the
//! keyboard (or a replay, or a test) writes the wanted direction and the
//! bomb request into [`PlayerControl`], and [`player_control`] turns that into
//! movement and bombs during the next frame.
//!
//! Players are spawned *unowned*, so when a level is torn down they're handed
//! back with their score, lives and bonuses intact and the next level adopts
//! them.
//!
//! ```text
//! hurt        → life -= damage, shielded for damage_shield_ms
//! life == 0   → killed, death animation
//! death over  → lives left? respawn on the start tile : released
//! ```

use std::time::Duration;

use crate::collision::{Collider, Layer};
use crate::components::{AxisMoving, Bonusable, Killable, Lifed, Position, Scored};
use crate::config::SimConfig;
use crate::direction::Direction;
use crate::ecs::{Components, Entity};
use crate::error::Result;
use crate::math::{IVec2, is_aligned, tile_origin};
use crate::world::World;

use super::bomb::drop_bomb;

/// Per-player state that outlives a level.
#[derive(Debug, Clone)]
pub struct Player {
    id: u8,
    lives: u32,
    score: u32,
    max_bombs: u32,
    bomb_radius: u32,
    quick_fuse: bool,
    /// Where the player respawns.
    start_tile: IVec2,
}

impl Player {
    pub fn new(id: u8, config: &SimConfig) -> Self {
        Self {
            id,
            lives: config.player_lives,
            score: 0,
            max_bombs: config.initial_max_bombs,
            bomb_radius: config.initial_bomb_radius,
            quick_fuse: false,
            start_tile: IVec2::ZERO,
        }
    }

    /// 1-based player number.
    pub fn id(&self) -> u8 {
        self.id
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn add_score(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }

    pub fn max_bombs(&self) -> u32 {
        self.max_bombs
    }

    pub fn bomb_radius(&self) -> u32 {
        self.bomb_radius
    }

    pub fn has_quick_fuse(&self) -> bool {
        self.quick_fuse
    }

    pub fn start_tile(&self) -> IVec2 {
        self.start_tile
    }

    pub fn set_start_tile(&mut self, tile: IVec2) {
        self.start_tile = tile;
    }

    pub fn add_max_bombs(&mut self, cap: u32) {
        self.max_bombs = (self.max_bombs + 1).min(cap);
    }

    pub fn add_bomb_radius(&mut self, cap: u32) {
        self.bomb_radius = (self.bomb_radius + 1).min(cap);
    }

    pub fn give_quick_fuse(&mut self) {
        self.quick_fuse = true;
    }

    /// Bomb fuse for this player's bombs.
    pub fn fuse(&self, base: Duration) -> Duration {
        if self.quick_fuse { base / 2 } else { base }
    }
}

/// Input for one player, written by whoever drives it.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlayerControl {
    /// Direction held this frame, `None` if no direction key is pressed.
    pub direction: Direction,
    /// Drop a bomb during the next frame. Cleared once handled.
    pub drop_bomb: bool,
}

/// A player standing on `tile`.
pub fn player(id: u8, tile: IVec2, config: &SimConfig) -> Result<Components> {
    let pos = tile_origin(tile);
    let mut info = Player::new(id, config);
    info.set_start_tile(tile);
    Ok(Components::new()
        .with(Position(pos))
        .with(Collider::tile(Layer::Players))
        .with(AxisMoving::at(pos, config.player_speed, Direction::None))
        .with(Lifed::new(config.player_max_life)?)
        .with(Killable::new(config.death_time()))
        .with(Bonusable::new())
        .with(info)
        .with(PlayerControl::default()))
}

/// Find the live player with number `id`.
pub fn find_player(world: &World, id: u8) -> Option<Entity> {
    world
        .entities
        .iter::<Player>()
        .find(|(_, p)| p.id() == id)
        .map(|(e, _)| e)
}

/// Apply every player's [`PlayerControl`].
///
/// Holding a direction moves that way. Releasing it lets the player finish
/// the current tile and stop there.
pub fn player_control(world: &mut World) {
    let mut drops = Vec::new();
    world
        .entities
        .query::<(&mut PlayerControl, &mut AxisMoving, &mut Position, &Killable)>(
            |entity, (control, moving, pos, killable)| {
                if killable.is_killed() {
                    control.drop_bomb = false;
                    return;
                }
                if control.direction != Direction::None {
                    moving.move_in(control.direction);
                } else if moving.is_moving() && is_aligned(pos.0) {
                    moving.stop(&mut pos.0);
                }
                if std::mem::take(&mut control.drop_bomb) {
                    drops.push(entity);
                }
            },
        );
    for entity in drops {
        drop_bomb(world, entity);
    }
}

/// Respawn dead players with lives left.
pub fn player_deaths(world: &mut World) {
    let shield = world.ctx.config.damage_shield_time();
    let mut respawned = Vec::new();
    world.entities.query::<(
        &mut Player,
        &mut Killable,
        &mut Lifed,
        &mut Position,
        &mut AxisMoving,
        Option<&mut Bonusable>,
    )>(|_, (player, killable, lifed, pos, moving, bonusable)| {
        if !killable.kill_complete() {
            return;
        }
        player.lives = player.lives.saturating_sub(1);
        if player.lives == 0 {
            log::info!("player {} is out of lives", player.id);
            return;
        }
        killable.resurrect();
        lifed.refill();
        pos.0 = tile_origin(player.start_tile);
        moving.stop(&mut pos.0);
        moving.set_prev_align(player.start_tile);
        if let Some(b) = bonusable {
            b.give_shield(shield);
        }
        respawned.push(pos.0);
        log::info!("player {} respawns, {} lives left", player.id, player.lives);
    });
    let flash_time = world.ctx.config.flash_time();
    for pos in respawned {
        world.spawn_deferred(super::flash::flash(pos, flash_time));
    }
}

/// Give each killer player the points of what it killed.
pub fn award_points(world: &mut World) {
    let mut awards: Vec<(Entity, u32)> = Vec::new();
    world
        .entities
        .query::<(&Killable, &mut Scored)>(|_, (killable, scored)| {
            if !killable.is_killed() {
                return;
            }
            if let Some(killer) = killable.killer() {
                let points = scored.take_points();
                if points > 0 {
                    awards.push((killer, points));
                }
            }
        });
    for (killer, points) in awards {
        if let Some(p) = world.entities.get_mut::<Player>(killer) {
            p.add_score(points);
            log::debug!("player {} scores {points}", p.id());
        }
    }
}
