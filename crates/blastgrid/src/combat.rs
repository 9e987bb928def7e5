//! Dealing damage.
//!
//! Explosions, bullets, hazards and enemy contact all hurt things the same
//! way, so they all go through [`deal_damage`]: shields are honored, life is
//! taken, and a target whose life reaches zero is killed and remembers who
//! killed it (that's how points find their way to the right player).

use std::time::Duration;

use crate::components::{Bonusable, Killable, Lifed};
use crate::ecs::{Entity, EntityGroup};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Shielded, already dying, gone, or not damageable.
    Ignored,
    Hurt,
    Killed,
}

impl DamageOutcome {
    pub fn landed(self) -> bool {
        self != DamageOutcome::Ignored
    }
}

/// Take `amount` life from `target`.
///
/// A target carrying [`Bonusable`] is shielded for `shield_after_hurt` when
/// it survives the hit.
pub fn deal_damage(
    group: &mut EntityGroup,
    target: Entity,
    amount: i32,
    killer: Option<Entity>,
    shield_after_hurt: Duration,
) -> DamageOutcome {
    let Some(c) = group.components_mut(target) else {
        return DamageOutcome::Ignored;
    };
    if c.get::<Killable>().is_some_and(Killable::is_killed) {
        return DamageOutcome::Ignored;
    }
    if c.get::<Bonusable>().is_some_and(Bonusable::has_shield) {
        return DamageOutcome::Ignored;
    }
    let Some(lifed) = c.get_mut::<Lifed>() else {
        return DamageOutcome::Ignored;
    };
    lifed.dec_life(amount);
    if lifed.is_alive() {
        if let Some(b) = c.get_mut::<Bonusable>() {
            b.give_shield(shield_after_hurt);
        }
        return DamageOutcome::Hurt;
    }
    if let Some(k) = c.get_mut::<Killable>() {
        k.kill_by(killer);
    }
    DamageOutcome::Killed
}
