//! # Entities — What Lives in a Level
//!
//! Each submodule owns one kind of game object: the component holding its
//! own state, a factory returning the full component bundle, and the
//! system(s) that drive it during a frame.
//!
//! ```text
//! walls       unbreakable, transparent, breakable (may drop a bonus)
//! player      input, respawn, points
//! bomb        fuse → explosion
//! explosion   arms along the axes, damage, chain reactions
//! bonus       grabbable upgrades
//! coin        grabbable points
//! teleport    warp to the next free teleport of the ring
//! enemy       regular enemies built from level-set descriptors
//! bullet      axis and free bullets
//! hazard      damaging areas (boss attacks, acid ponds)
//! flash       a purely visual marker
//! ```

pub mod bomb;
pub mod bonus;
pub mod bullet;
pub mod coin;
pub mod enemy;
pub mod explosion;
pub mod flash;
pub mod hazard;
pub mod player;
pub mod teleport;
pub mod wall;

pub use bomb::{Bomb, bomb, drop_bomb, update_bombs};
pub use bonus::{Bonus, BonusKind, apply_bonus, bonus, grab_bonuses};
pub use bullet::{
    Bullet, BulletInfo, axis_bullet, bullet_info, free_bullet, free_bullet_to, update_bullets,
};
pub use coin::{Coin, coin, coins_left, grab_coins};
pub use enemy::{Enemy, EnemyInfo, contact_damage, enemy};
pub use explosion::{Explosion, explode, explosion_damage, update_explosions};
pub use flash::{Flash, flash};
pub use hazard::{AcidPond, Hazard, acid_pond, hazards, timed_hazard};
pub use player::{
    Player, PlayerControl, award_points, find_player, player, player_control, player_deaths,
};
pub use teleport::{Teleport, TeleportRing, teleport, teleports};
pub use wall::{BreakableWall, breakable, breakable_walls, transparent_wall, unbreakable};
