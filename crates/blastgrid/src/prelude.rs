//! Convenience re-exports. `use blastgrid::prelude::*` for the common items.

// Core
pub use crate::config::{MainframeConfig, RexConfig, SimConfig};
pub use crate::context::GameContext;
pub use crate::direction::Direction;
pub use crate::ecs::{Components, DetachedEntity, Entity, EntityGroup, Schedule, System};
pub use crate::error::{Result, SimError};
pub use crate::math::{IVec2, Rect, TILE_SIZE, Vec2};
pub use crate::time::{Clock, Time, Timer};
pub use crate::world::World;

// Components
pub use crate::collision::{Collider, Layer, LayerMask};
pub use crate::components::{AxisMoving, Bonusable, FreeMoving, Killable, Lifed, Position, Scored};
pub use crate::phase::{Phase, PhaseDurations, TimedPhase};

// Game objects
pub use crate::ai::{
    Ai, AiKind, Attack, AttackKind, AxisSighted, CircleShooting, FreeSighted, Shooting,
};
pub use crate::boss::{
    Boss, Mainframe, MainframeAttack, MainframeState, Rex, RexAttack, RexState, Surge,
};
pub use crate::entities::{
    AcidPond, Bomb, Bonus, BonusKind, Bullet, Coin, Enemy, EnemyInfo, Explosion, Flash, Hazard,
    Player, PlayerControl, Teleport, TeleportRing,
};

// Levels
pub use crate::level::{LevelLoader, LevelSetInfo, LevelSummary, TileGrid, TileKind};
