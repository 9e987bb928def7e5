//! # Level Loader — From Tile Grid to Populated World
//!
//! ```text
//! TileGrid ──┐
//! LevelSet ──┼──► LevelLoader::load(world) ──► walls, teleports, coins,
//! carried  ──┘                                  acid, enemies, bosses,
//! players                                      players + flashes
//!                                              TeleportRing, LevelSetInfo
//! ```
//!
//! Tiles are visited row by row from the top left, so the teleport ring
//! links teleports in reading order. Players carried over from the previous
//! level are adopted with their score and upgrades; a player number with no
//! carried entity gets a fresh player, and one whose carried entity has no
//! lives left stays out of the game.

use crate::boss::{spawn_mainframe, spawn_rex};
use crate::components::{AxisMoving, Killable, Lifed, Position};
use crate::config::SimConfig;
use crate::ecs::DetachedEntity;
use crate::entities::{
    Player, TeleportRing, acid_pond, breakable, coin, enemy, flash, player, teleport,
    transparent_wall, unbreakable,
};
use crate::error::Result;
use crate::math::{IVec2, tile_origin};
use crate::world::World;

use super::grid::{TileGrid, TileKind};
use super::levelset::LevelSetInfo;

/// What a load put in the world.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LevelSummary {
    pub walls: usize,
    pub teleports: usize,
    pub coins: usize,
    pub acid_ponds: usize,
    pub enemies: usize,
    pub bosses: usize,
    pub players: usize,
    /// Tiles with an unknown character, skipped.
    pub invalid_tiles: usize,
}

pub struct LevelLoader {
    levelset: LevelSetInfo,
    carried: Vec<DetachedEntity>,
}

impl LevelLoader {
    pub fn new(levelset: LevelSetInfo) -> Self {
        Self {
            levelset,
            carried: Vec::new(),
        }
    }

    /// Players handed back by the previous level's teardown.
    pub fn with_players(mut self, players: Vec<DetachedEntity>) -> Self {
        self.carried = players;
        self
    }

    /// Populate `world` from `grid`. The world should be empty.
    ///
    /// Fails on an enemy id the level set doesn't describe, or on a
    /// descriptor that can't build an enemy.
    pub fn load(mut self, world: &mut World, grid: &TileGrid) -> Result<LevelSummary> {
        world.set_level_size(grid.size());
        let config = world.ctx.config.clone();
        let flash_time = config.flash_time();
        let mut ring = TeleportRing::new();
        let mut summary = LevelSummary::default();

        for (tile, kind) in grid.iter() {
            match kind {
                TileKind::Empty => {}
                TileKind::Unbreakable => {
                    world.spawn(unbreakable(tile));
                    summary.walls += 1;
                }
                TileKind::Breakable => {
                    world.spawn(breakable(tile, &config)?);
                    summary.walls += 1;
                }
                TileKind::TransparentWall => {
                    world.spawn(transparent_wall(tile));
                    summary.walls += 1;
                }
                TileKind::Teleport => {
                    ring.push(world.spawn(teleport(tile)));
                    summary.teleports += 1;
                }
                TileKind::Coin => {
                    world.spawn(coin(tile));
                    summary.coins += 1;
                }
                TileKind::AcidPond => {
                    world.spawn(acid_pond(tile, config.acid_damage));
                    summary.acid_ponds += 1;
                }
                TileKind::Player(id) => {
                    if self.place_player(world, id, tile, &config)? {
                        world.spawn(flash(tile_origin(tile), flash_time));
                        summary.players += 1;
                    }
                }
                TileKind::Enemy(id) => {
                    let info = self.levelset.enemy_info(id)?;
                    world.spawn(enemy(id, tile, info, &config)?);
                    summary.enemies += 1;
                }
                TileKind::Rex => {
                    spawn_rex(world, tile)?;
                    summary.bosses += 1;
                }
                TileKind::Mainframe => {
                    spawn_mainframe(world, tile)?;
                    summary.bosses += 1;
                }
                TileKind::Invalid(c) => {
                    log::warn!("invalid tile {c:?} at {tile}, skipped");
                    summary.invalid_tiles += 1;
                }
            }
        }

        for left in &self.carried {
            if let Some(p) = left.components.get::<Player>() {
                log::debug!("player {} has no start tile in this level", p.id());
            }
        }

        world.insert_resource(ring);
        world.insert_resource(self.levelset);
        world.refresh_occupancy();
        log::info!(
            "level {}x{} loaded: {} walls, {} teleports, {} coins, {} enemies, {} bosses, \
             {} players",
            grid.size().x,
            grid.size().y,
            summary.walls,
            summary.teleports,
            summary.coins,
            summary.enemies,
            summary.bosses,
            summary.players
        );
        Ok(summary)
    }

    /// Put player `id` on `tile`. Returns false when that player is out of
    /// the game.
    fn place_player(
        &mut self,
        world: &mut World,
        id: u8,
        tile: IVec2,
        config: &SimConfig,
    ) -> Result<bool> {
        let carried = self
            .carried
            .iter()
            .position(|d| d.components.get::<Player>().is_some_and(|p| p.id() == id));
        let Some(idx) = carried else {
            world.entities.spawn_unowned(player(id, tile, config)?);
            return Ok(true);
        };
        let mut detached = self.carried.swap_remove(idx);
        let c = &mut detached.components;
        let Some(p) = c.get_mut::<Player>() else {
            return Ok(false);
        };
        if p.lives() == 0 {
            log::info!("player {id} is out of lives, not placed");
            return Ok(false);
        }
        p.set_start_tile(tile);

        let mut pos = tile_origin(tile);
        if let Some(moving) = c.get_mut::<AxisMoving>() {
            moving.stop(&mut pos);
            moving.set_prev_align(tile);
        }
        c.insert(Position(pos));
        if let Some(k) = c.get_mut::<Killable>() {
            if k.is_killed() {
                k.resurrect();
            }
        }
        if let Some(l) = c.get_mut::<Lifed>() {
            l.refill();
        }
        world.entities.adopt(detached);
        Ok(true)
    }
}
