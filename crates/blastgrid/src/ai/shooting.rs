//! # Shooting — Attacks With a Recharge
//!
//! Every enemy has exactly one [`Attack`]:
//!
//! ```text
//! contact   hurts players it touches, then recharges
//! dash      like contact, but charges at a player it sees
//! ranged    shoots a bullet toward a player it sees, optionally
//!           standing still ("blocking") while it fires
//! ```
//!
//! [`Shooting`] tracks the recharge: after any attack the shooter waits
//! `1 / (fire_rate × multiplier)` seconds before the next one.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::collision::Collider;
use crate::components::{AxisMoving, Killable, Position};
use crate::config::SimConfig;
use crate::direction::Direction;
use crate::ecs::{Components, Entity};
use crate::entities::bullet::{axis_bullet, free_bullet};
use crate::error::{Result, SimError};
use crate::math::Vec2;
use crate::time::Timer;
use crate::world::World;

use super::sight::AxisSighted;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackKind {
    Contact,
    Dash,
    Ranged,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attack {
    pub kind: AttackKind,
    /// Damage of a contact or dash hit. Ranged damage comes from the bullet.
    pub damage: i32,
    pub bullet_id: u32,
    /// Attacks per second.
    pub fire_rate: f32,
    /// Stand still while shooting.
    pub blocking: bool,
    pub block_ms: u64,
    /// How close, in tiles, a player must be to be attacked. Negative means
    /// as far as the shooter can see.
    pub range: i32,
    /// Extra speed while dashing, as a multiple of the original speed.
    pub dash_mult: f32,
}

impl Default for Attack {
    fn default() -> Self {
        Self {
            kind: AttackKind::Contact,
            damage: 1,
            bullet_id: 1,
            fire_rate: 1.0,
            blocking: false,
            block_ms: 0,
            range: -1,
            dash_mult: 2.0,
        }
    }
}

impl Attack {
    pub fn in_range(&self, distance: u32) -> bool {
        self.range < 0 || distance <= self.range as u32
    }
}

#[derive(Debug, Clone)]
pub struct Shooting {
    attack: Attack,
    recharge: Timer,
    fire_rate_mult: f32,
}

impl Shooting {
    /// Ready to attack right away. The fire rate must be positive.
    pub fn new(attack: Attack) -> Result<Self> {
        if attack.fire_rate <= 0.0 || !attack.fire_rate.is_finite() {
            return Err(SimError::InvalidParameter(format!(
                "fire rate must be positive, got {}",
                attack.fire_rate
            )));
        }
        Ok(Self {
            attack,
            recharge: Timer::new(Duration::ZERO),
            fire_rate_mult: 1.0,
        })
    }

    pub fn attack(&self) -> &Attack {
        &self.attack
    }

    pub fn fire_rate_mult(&self) -> f32 {
        self.fire_rate_mult
    }

    pub fn set_fire_rate_mult(&mut self, mult: f32) -> Result<()> {
        if mult <= 0.0 || !mult.is_finite() {
            return Err(SimError::InvalidParameter(format!(
                "fire rate multiplier must be positive, got {mult}"
            )));
        }
        self.fire_rate_mult = mult;
        Ok(())
    }

    pub fn recharge_time(&self) -> Duration {
        Duration::from_secs_f32(1.0 / (self.attack.fire_rate * self.fire_rate_mult))
    }

    pub fn is_recharging(&self) -> bool {
        !self.recharge.finished()
    }

    pub fn tick(&mut self, dt: Duration) {
        self.recharge.tick(dt);
    }

    /// Start a full recharge, as after an attack.
    pub fn restart_recharge(&mut self) {
        let t = self.recharge_time();
        self.recharge.reset(t);
    }

    /// Attack. Doesn't check the recharge.
    ///
    /// Contact and dash attacks only start recharging and return `None`.
    /// Ranged attacks return a bullet shot from `center` toward `dir`, or
    /// toward `facing` (the owner's direction) if `dir` is `None`.
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidEntityConfiguration`] if both `dir` and `facing`
    /// are missing: a shooter without [`AxisMoving`] must aim explicitly.
    /// In debug builds this is a programming error and panics.
    pub fn shoot(
        &mut self,
        source: Entity,
        center: Vec2,
        dir: Direction,
        facing: Option<Direction>,
        config: &SimConfig,
    ) -> Result<Option<Components>> {
        if self.attack.kind != AttackKind::Ranged {
            self.restart_recharge();
            return Ok(None);
        }
        let dir = match dir {
            Direction::None => {
                debug_assert!(facing.is_some(), "directionless shot needs an AxisMoving owner");
                facing.ok_or_else(|| {
                    SimError::InvalidEntityConfiguration(
                        "directionless shot needs an AxisMoving owner".to_owned(),
                    )
                })?
            }
            d => d,
        };
        let bullet = axis_bullet(self.attack.bullet_id, center, dir, Some(source), config)?;
        self.restart_recharge();
        Ok(Some(bullet))
    }

    /// Shoot a free bullet at `angle` radians.
    pub fn shoot_angle(
        &mut self,
        source: Entity,
        center: Vec2,
        angle: f32,
        config: &SimConfig,
    ) -> Result<Components> {
        if self.attack.kind != AttackKind::Ranged {
            return Err(SimError::InvalidEntityConfiguration(format!(
                "{:?} attack can't shoot bullets",
                self.attack.kind
            )));
        }
        let bullet = free_bullet(self.attack.bullet_id, center, angle, Some(source), config)?;
        self.restart_recharge();
        Ok(bullet)
    }
}

/// Attack players seen straight ahead.
///
/// Ranged shooters fire at them, blocking if their attack says so. Dashers
/// charge until they lose sight of their target or hit something solid.
pub fn shooting(world: &mut World) {
    let dt = world.time.delta();
    let config = &world.ctx.config;
    let mut shots = Vec::new();
    world.entities.query::<(
        &mut Shooting,
        &mut AxisMoving,
        &AxisSighted,
        &Position,
        &Collider,
        Option<&Killable>,
    )>(|entity, (shooting, moving, sighted, pos, collider, killable)| {
        shooting.tick(dt);
        if killable.is_some_and(Killable::is_killed) {
            moving.set_dashing(0.0);
            return;
        }
        let facing = moving.direction();
        let target = facing
            .index()
            .and_then(|i| sighted.seen()[i])
            .filter(|s| shooting.attack.in_range(s.distance));

        match shooting.attack.kind {
            AttackKind::Contact => {}
            AttackKind::Dash => {
                if moving.dash() > 0.0 {
                    if target.is_none() || collider.collides_with_solid() {
                        moving.set_dashing(0.0);
                    }
                } else if target.is_some() && !shooting.is_recharging() {
                    moving.set_dashing(shooting.attack.dash_mult);
                    shooting.restart_recharge();
                }
            }
            AttackKind::Ranged => {
                if target.is_none() || shooting.is_recharging() {
                    return;
                }
                let center = collider.rect(pos.0).center();
                match shooting.shoot(entity, center, facing, Some(facing), config) {
                    Ok(Some(bullet)) => {
                        if shooting.attack.blocking {
                            moving.block(Duration::from_millis(shooting.attack.block_ms));
                        }
                        shots.push(bullet);
                    }
                    Ok(None) => {}
                    Err(e) => log::warn!("{entity} can't shoot: {e}"),
                }
            }
        }
    });

    for bullet in shots {
        world.spawn_deferred(bullet);
        world.ctx.play_sound("shot");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::bullet::Bullet;

    fn ranged() -> Attack {
        Attack {
            kind: AttackKind::Ranged,
            fire_rate: 2.0,
            ..Attack::default()
        }
    }

    #[test]
    fn fire_rate_must_be_positive() {
        let bad = Attack {
            fire_rate: 0.0,
            ..Attack::default()
        };
        assert!(matches!(Shooting::new(bad), Err(SimError::InvalidParameter(_))));
        let mut s = Shooting::new(ranged()).unwrap();
        assert!(s.set_fire_rate_mult(0.0).is_err());
        assert!(s.set_fire_rate_mult(-1.0).is_err());
        s.set_fire_rate_mult(2.0).unwrap();
        assert_eq!(s.recharge_time(), Duration::from_millis(250));
    }

    #[test]
    fn contact_attack_only_recharges() {
        let mut group = crate::ecs::EntityGroup::new();
        let me = group.spawn((0u8,));
        let mut s = Shooting::new(Attack::default()).unwrap();
        assert!(!s.is_recharging());
        let shot = s.shoot(me, Vec2::ZERO, Direction::Up, None, &SimConfig::default()).unwrap();
        assert!(shot.is_none());
        assert!(s.is_recharging());
        s.tick(Duration::from_secs(1));
        assert!(!s.is_recharging());
    }

    #[test]
    fn ranged_shot_uses_facing_when_directionless() {
        let mut group = crate::ecs::EntityGroup::new();
        let me = group.spawn((0u8,));
        let mut s = Shooting::new(ranged()).unwrap();
        let bullet = s
            .shoot(me, Vec2::ZERO, Direction::None, Some(Direction::Left), &SimConfig::default())
            .unwrap()
            .unwrap();
        assert_eq!(bullet.get::<AxisMoving>().unwrap().direction(), Direction::Left);
        assert_eq!(bullet.get::<Bullet>().unwrap().source(), Some(me));
    }

    #[test]
    #[cfg_attr(
        debug_assertions,
        should_panic(expected = "directionless shot needs an AxisMoving owner")
    )]
    fn directionless_shot_without_facing_is_rejected() {
        let mut group = crate::ecs::EntityGroup::new();
        let me = group.spawn((0u8,));
        let mut s = Shooting::new(ranged()).unwrap();
        let err = s
            .shoot(me, Vec2::ZERO, Direction::None, None, &SimConfig::default())
            .unwrap_err();
        assert!(matches!(err, SimError::InvalidEntityConfiguration(_)));
    }

    #[test]
    fn contact_attack_cannot_shoot_free_bullets() {
        let mut group = crate::ecs::EntityGroup::new();
        let me = group.spawn((0u8,));
        let mut s = Shooting::new(Attack::default()).unwrap();
        assert!(s.shoot_angle(me, Vec2::ZERO, 0.0, &SimConfig::default()).is_err());
    }

    #[test]
    fn range_limits_targets() {
        let a = Attack {
            range: 3,
            ..Attack::default()
        };
        assert!(a.in_range(3));
        assert!(!a.in_range(4));
        assert!(Attack::default().in_range(100));
    }

    #[test]
    fn attack_from_json() {
        let json = r#"{ "kind": "ranged", "bullet_id": 3, "blocking": true }"#;
        let a: Attack = serde_json::from_str(json).unwrap();
        assert_eq!(a.kind, AttackKind::Ranged);
        assert_eq!(a.bullet_id, 3);
        assert!(a.blocking);
        assert_eq!(a.fire_rate, 1.0);
    }
}
