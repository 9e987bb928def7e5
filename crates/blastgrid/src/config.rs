//! Tunable game constants, loadable from JSON.
//!
//! Every field has a default, so a config file only needs to list the values
//! it overrides:
//!
//! ```json
//! { "bomb_fuse_ms": 3000, "rex": { "life": 60 }, "mainframe": { "idle_ms": 1500 } }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Simulation-wide configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Playable level width, in tiles.
    pub level_width: i32,
    /// Playable level height, in tiles.
    pub level_height: i32,
    /// Frame deltas longer than this are clamped before moving anything.
    pub max_frame_time_secs: f32,
    /// Players' base speed, in pixels per second.
    pub player_speed: f32,
    /// Enemies' base speed; per-enemy speeds are multipliers of this.
    pub enemy_base_speed: f32,
    /// Bullets' base speed; per-bullet speeds are multipliers of this.
    pub bullet_base_speed: f32,
    pub player_lives: u32,
    pub player_max_life: i32,
    /// Bombs a player can have on the field at once when starting a level.
    pub initial_max_bombs: u32,
    pub max_bombs_cap: u32,
    pub initial_bomb_radius: u32,
    pub max_bomb_radius: u32,
    pub bomb_fuse_ms: u64,
    pub explosion_ms: u64,
    pub explosion_damage: i32,
    pub teleport_cooldown_ms: u64,
    pub bonus_expire_ms: u64,
    pub death_ms: u64,
    /// Invulnerability granted to a player after taking damage.
    pub damage_shield_ms: u64,
    pub shield_bonus_ms: u64,
    pub speedy_bonus_ms: u64,
    pub flash_ms: u64,
    /// Probability that a destroyed breakable wall drops a bonus.
    pub bonus_drop_chance: f64,
    /// Points awarded for destroying a breakable wall.
    pub breakable_wall_points: u32,
    pub bonus_points: u32,
    /// Points for grabbing a coin.
    pub coin_points: u32,
    /// Damage an acid pond deals each time a player's shield is down.
    pub acid_damage: i32,
    pub rex: RexConfig,
    pub mainframe: MainframeConfig,
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            level_width: 15,
            level_height: 13,
            max_frame_time_secs: 1.0 / 60.0,
            player_speed: 150.0,
            enemy_base_speed: 75.0,
            bullet_base_speed: 200.0,
            player_lives: 3,
            player_max_life: 16,
            initial_max_bombs: 1,
            max_bombs_cap: 10,
            initial_bomb_radius: 2,
            max_bomb_radius: 8,
            bomb_fuse_ms: 5000,
            explosion_ms: 200,
            explosion_damage: 1,
            teleport_cooldown_ms: 1000,
            bonus_expire_ms: 10_000,
            death_ms: 2000,
            damage_shield_ms: 1000,
            shield_bonus_ms: 20_000,
            speedy_bonus_ms: 20_000,
            flash_ms: 300,
            bonus_drop_chance: 0.1,
            breakable_wall_points: 10,
            bonus_points: 100,
            coin_points: 150,
            acid_damage: 1,
            rex: RexConfig::default(),
            mainframe: MainframeConfig::default(),
            seed: 0x5eed,
        }
    }
}

impl SimConfig {
    /// Parse a config from a JSON string. Missing fields use their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a config from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn max_frame_time(&self) -> Duration {
        Duration::from_secs_f32(self.max_frame_time_secs)
    }

    pub fn bomb_fuse(&self) -> Duration {
        Duration::from_millis(self.bomb_fuse_ms)
    }

    pub fn explosion_time(&self) -> Duration {
        Duration::from_millis(self.explosion_ms)
    }

    pub fn teleport_cooldown(&self) -> Duration {
        Duration::from_millis(self.teleport_cooldown_ms)
    }

    pub fn bonus_expire_time(&self) -> Duration {
        Duration::from_millis(self.bonus_expire_ms)
    }

    pub fn death_time(&self) -> Duration {
        Duration::from_millis(self.death_ms)
    }

    pub fn damage_shield_time(&self) -> Duration {
        Duration::from_millis(self.damage_shield_ms)
    }

    pub fn shield_bonus_time(&self) -> Duration {
        Duration::from_millis(self.shield_bonus_ms)
    }

    pub fn speedy_bonus_time(&self) -> Duration {
        Duration::from_millis(self.speedy_bonus_ms)
    }

    pub fn flash_time(&self) -> Duration {
        Duration::from_millis(self.flash_ms)
    }
}

/// Constants of the Rex boss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RexConfig {
    pub life: i32,
    pub value: u32,
    /// Walking speed, as a multiplier of `enemy_base_speed`.
    pub speed: f32,
    pub start_ms: u64,
    /// Tiles walked in a straight line before the walk AI turns.
    pub min_steps: u32,
    pub min_steps_before_attack: u32,
    pub max_steps_before_attack: u32,
    pub stomp_windup_ms: u64,
    pub stomp_damage_ms: u64,
    pub stomp_recover_ms: u64,
    pub stomp_damage: i32,
    pub stomp_tile_radius: u32,
    pub flame_windup_ms: u64,
    pub flame_damage_ms: u64,
    pub flame_recover_ms: u64,
    pub flame_damage: i32,
    /// Length of the flame along the boss' facing direction, in tiles.
    pub flame_tile_width: u32,
    /// Thickness of the flame, in tiles.
    pub flame_tile_height: u32,
    pub missiles_windup_ms: u64,
    pub missiles_damage_ms: u64,
    pub missiles_recover_ms: u64,
    pub n_missiles: u32,
    /// Bullet id used for missiles.
    pub missile_bullet: u32,
}

impl Default for RexConfig {
    fn default() -> Self {
        Self {
            life: 48,
            value: 5000,
            speed: 0.5,
            start_ms: 2000,
            min_steps: 4,
            min_steps_before_attack: 2,
            max_steps_before_attack: 4,
            stomp_windup_ms: 600,
            stomp_damage_ms: 200,
            stomp_recover_ms: 800,
            stomp_damage: 4,
            stomp_tile_radius: 1,
            flame_windup_ms: 800,
            flame_damage_ms: 1500,
            flame_recover_ms: 600,
            flame_damage: 3,
            flame_tile_width: 4,
            flame_tile_height: 2,
            missiles_windup_ms: 700,
            missiles_damage_ms: 2000,
            missiles_recover_ms: 800,
            n_missiles: 8,
            missile_bullet: 103,
        }
    }
}

/// Constants of the Mainframe boss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MainframeConfig {
    pub life: i32,
    pub value: u32,
    /// Pause between two attacks.
    pub idle_ms: u64,
    pub surge_windup_ms: u64,
    /// How long the surge sweeps.
    pub surge_damage_ms: u64,
    pub surge_recover_ms: u64,
    pub surge_damage: i32,
    /// Width of the surge's sector, in degrees.
    pub surge_spanned_deg: f32,
    pub surge_deg_per_sec: f32,
    pub lightning_windup_ms: u64,
    pub lightning_recover_ms: u64,
    pub lightning_shots: u32,
    /// Delay before each lightning bolt.
    pub lightning_shot_ms: u64,
    pub lightning_bullet: u32,
    pub ring_windup_ms: u64,
    pub ring_recover_ms: u64,
    /// Bullet of the star rings.
    pub star_bullet: u32,
    /// Bullet of the spirit spiral.
    pub spirit_bullet: u32,
}

impl Default for MainframeConfig {
    fn default() -> Self {
        Self {
            life: 64,
            value: 10_000,
            idle_ms: 2000,
            surge_windup_ms: 1500,
            surge_damage_ms: 3000,
            surge_recover_ms: 1000,
            surge_damage: 4,
            surge_spanned_deg: 30.0,
            surge_deg_per_sec: 60.0,
            lightning_windup_ms: 1000,
            lightning_recover_ms: 1000,
            lightning_shots: 10,
            lightning_shot_ms: 200,
            lightning_bullet: 104,
            ring_windup_ms: 600,
            ring_recover_ms: 800,
            star_bullet: 101,
            spirit_bullet: 102,
        }
    }
}
