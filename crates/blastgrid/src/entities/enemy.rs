//! # Enemies
//!
//! Every regular enemy is the same bundle of components, parameterized by
//! the [`EnemyInfo`] its level set gives for its id (1 to 10):
//!
//! ```text
//! Position  Collider(Enemies | EnemiesIgnoreBreakables)
//! AxisMoving           speed × enemy_base_speed
//! Lifed  Killable  Scored(value)
//! AxisSighted(vision)  Shooting(attack)  Ai(kind)
//! ```
//!
//! Contact and dash attacks land when an enemy and a player touch; ranged
//! ones go through [`crate::ai::shooting`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::ai::{Ai, AiKind, Attack, AttackKind, AxisSighted, Shooting};
use crate::collision::{Collider, Layer};
use crate::combat::deal_damage;
use crate::components::{AxisMoving, Killable, Lifed, Position, Scored};
use crate::config::SimConfig;
use crate::direction::Direction;
use crate::ecs::{Components, Entity};
use crate::error::Result;
use crate::math::{IVec2, tile_origin};
use crate::world::World;

/// How one kind of enemy looks and fights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyInfo {
    pub ai: AiKind,
    /// Multiple of `enemy_base_speed`.
    pub speed: f32,
    pub life: i32,
    /// Points for the player who kills it.
    pub value: u32,
    pub attack: Attack,
    /// Tiles; `None` sees up to the first wall.
    pub vision: Option<u32>,
    /// Walks through breakable walls.
    pub ignore_breakables: bool,
}

impl Default for EnemyInfo {
    fn default() -> Self {
        Self {
            ai: AiKind::RandomForward,
            speed: 1.0,
            life: 1,
            value: 100,
            attack: Attack::default(),
            vision: None,
            ignore_breakables: false,
        }
    }
}

/// Marks a regular enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Enemy {
    pub id: u32,
}

pub fn enemy(id: u32, tile: IVec2, info: &EnemyInfo, config: &SimConfig) -> Result<Components> {
    let pos = tile_origin(tile);
    let layer = if info.ignore_breakables {
        Layer::EnemiesIgnoreBreakables
    } else {
        Layer::Enemies
    };
    Ok(Components::new()
        .with(Position(pos))
        .with(Collider::tile(layer))
        .with(AxisMoving::at(pos, info.speed * config.enemy_base_speed, Direction::None))
        .with(Lifed::new(info.life)?)
        .with(Killable::new(config.death_time()))
        .with(Scored::new(info.value))
        .with(AxisSighted::new(info.vision))
        .with(Shooting::new(info.attack.clone())?)
        .with(Ai::new(info.ai))
        .with(Enemy { id }))
}

fn is_enemy_layer(layer: Layer) -> bool {
    matches!(layer, Layer::Enemies | Layer::EnemiesIgnoreBreakables)
}

/// Contact and dash attacks: hurt the players enemies touch.
pub fn contact_damage(world: &mut World) {
    let mut pairs: HashSet<(Entity, Entity)> = HashSet::new();
    for (e, collider) in world.entities.iter::<Collider>() {
        let own = collider.layer();
        for c in collider.colliding() {
            if is_enemy_layer(own) && c.layer == Layer::Players {
                pairs.insert((e, c.entity));
            } else if own == Layer::Players && is_enemy_layer(c.layer) {
                pairs.insert((c.entity, e));
            }
        }
    }
    let mut pairs: Vec<_> = pairs.into_iter().collect();
    pairs.sort_by_key(|&(a, b)| (a.index(), b.index()));

    let shield = world.ctx.config.damage_shield_time();
    for (attacker, target) in pairs {
        let damage = world
            .entities
            .query_one::<(&mut Shooting, Option<&Killable>, Option<&mut AxisMoving>), _>(
                attacker,
                |(shooting, killable, moving)| {
                    let kind = shooting.attack().kind;
                    let melee = matches!(kind, AttackKind::Contact | AttackKind::Dash);
                    let dead = killable.is_some_and(Killable::is_killed);
                    if !melee || shooting.is_recharging() || dead {
                        return None;
                    }
                    shooting.restart_recharge();
                    if let Some(m) = moving {
                        m.set_dashing(0.0);
                    }
                    Some(shooting.attack().damage)
                },
            );
        let Some(Some(damage)) = damage else {
            continue;
        };
        let outcome = deal_damage(&mut world.entities, target, damage, None, shield);
        log::trace!("{attacker} touches {target}: {outcome:?}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::player::player;

    fn spawn_pair(info: &EnemyInfo) -> (World, Entity, Entity) {
        let mut world = World::empty();
        let cfg = world.ctx.config.clone();
        let p = world.entities.spawn_unowned(player(1, IVec2::new(3, 3), &cfg).unwrap());
        let e = world.spawn(enemy(1, IVec2::new(3, 3), info, &cfg).unwrap());
        (world, p, e)
    }

    #[test]
    fn bundle_follows_info() {
        let info = EnemyInfo {
            speed: 2.0,
            life: 3,
            ignore_breakables: true,
            ..EnemyInfo::default()
        };
        let cfg = SimConfig::default();
        let c = enemy(4, IVec2::ONE, &info, &cfg).unwrap();
        assert_eq!(c.get::<Collider>().unwrap().layer(), Layer::EnemiesIgnoreBreakables);
        assert_eq!(c.get::<AxisMoving>().unwrap().speed(), 2.0 * cfg.enemy_base_speed);
        assert_eq!(c.get::<Lifed>().unwrap().life(), 3);
        assert_eq!(c.get::<Enemy>().unwrap().id, 4);
    }

    #[test]
    fn bad_info_is_rejected() {
        let cfg = SimConfig::default();
        let no_life = EnemyInfo {
            life: 0,
            ..EnemyInfo::default()
        };
        assert!(enemy(1, IVec2::ONE, &no_life, &cfg).is_err());
    }

    #[test]
    fn contact_hurts_then_recharges() {
        let info = EnemyInfo {
            attack: Attack {
                damage: 2,
                ..Attack::default()
            },
            ..EnemyInfo::default()
        };
        let (mut world, p, e) = spawn_pair(&info);
        world.detect_collisions();
        contact_damage(&mut world);
        let max = world.ctx.config.player_max_life;
        assert_eq!(world.entities.get::<Lifed>(p).unwrap().life(), max - 2);
        assert!(world.entities.get::<Shooting>(e).unwrap().is_recharging());

        // Still touching, shield dropped: the recharge protects the player.
        world.entities.insert(p, crate::components::Bonusable::new());
        contact_damage(&mut world);
        assert_eq!(world.entities.get::<Lifed>(p).unwrap().life(), max - 2);
    }

    #[test]
    fn ranged_enemies_do_not_hurt_by_touch() {
        let info = EnemyInfo {
            attack: Attack {
                kind: AttackKind::Ranged,
                ..Attack::default()
            },
            ..EnemyInfo::default()
        };
        let (mut world, p, _) = spawn_pair(&info);
        world.detect_collisions();
        contact_damage(&mut world);
        let full = world.ctx.config.player_max_life;
        assert_eq!(world.entities.get::<Lifed>(p).unwrap().life(), full);
    }

    #[test]
    fn info_from_json() {
        let info: EnemyInfo = serde_json::from_str(
            r#"{ "ai": "follow_dash", "life": 4, "attack": { "kind": "dash", "dash_mult": 3.0 } }"#,
        )
        .unwrap();
        assert_eq!(info.ai, AiKind::FollowDash);
        assert_eq!(info.attack.kind, AttackKind::Dash);
        assert_eq!(info.speed, 1.0);
    }
}
