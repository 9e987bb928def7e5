//! Life, death and score value.

use std::time::Duration;

use crate::ecs::Entity;
use crate::error::{Result, SimError};
use crate::time::Timer;

/// Hit points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lifed {
    life: i32,
    max_life: i32,
}

impl Lifed {
    /// Full life. `max_life` must be positive.
    pub fn new(max_life: i32) -> Result<Self> {
        Self::with_life(max_life, max_life)
    }

    /// `life` must be in `0..=max_life`.
    pub fn with_life(life: i32, max_life: i32) -> Result<Self> {
        if max_life <= 0 {
            return Err(SimError::InvalidParameter(format!(
                "max life must be positive, got {max_life}"
            )));
        }
        if !(0..=max_life).contains(&life) {
            return Err(SimError::InvalidParameter(format!(
                "life {life} outside 0..={max_life}"
            )));
        }
        Ok(Self { life, max_life })
    }

    pub fn life(&self) -> i32 {
        self.life
    }

    pub fn max_life(&self) -> i32 {
        self.max_life
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0
    }

    /// Subtract `damage`, never going below zero. Returns the remaining life.
    pub fn dec_life(&mut self, damage: i32) -> i32 {
        self.life = (self.life - damage.max(0)).max(0);
        self.life
    }

    /// Add `amount`, never going above the maximum. Returns the new life.
    pub fn inc_life(&mut self, amount: i32) -> i32 {
        self.life = (self.life + amount.max(0)).min(self.max_life);
        self.life
    }

    pub fn refill(&mut self) {
        self.life = self.max_life;
    }

    pub fn set_life(&mut self, life: i32) -> Result<()> {
        *self = Self::with_life(life, self.max_life)?;
        Ok(())
    }
}

/// Something that can die. Killing starts the death animation; the entity
/// expires once `death_time` has passed.
#[derive(Debug, Clone, Copy)]
pub struct Killable {
    killed: bool,
    death: Timer,
    /// Whoever dealt the final blow, for scoring.
    killer: Option<Entity>,
}

impl Killable {
    pub fn new(death_time: Duration) -> Self {
        Self {
            killed: false,
            death: Timer::new(death_time),
            killer: None,
        }
    }

    /// Start dying. Killing twice keeps the first death.
    pub fn kill(&mut self) {
        if !self.killed {
            self.killed = true;
            self.death.reset(self.death.duration());
        }
    }

    /// Kill, remembering who did it.
    pub fn kill_by(&mut self, killer: Option<Entity>) {
        if !self.killed {
            self.killer = killer;
        }
        self.kill();
    }

    pub fn killer(&self) -> Option<Entity> {
        self.killer
    }

    pub fn is_killed(&self) -> bool {
        self.killed
    }

    pub fn is_kill_in_progress(&self) -> bool {
        self.killed && !self.death.finished()
    }

    pub fn kill_complete(&self) -> bool {
        self.killed && self.death.finished()
    }

    /// Advance the death animation. No-op while alive.
    pub fn tick(&mut self, dt: Duration) {
        if self.killed {
            self.death.tick(dt);
        }
    }

    /// Bring back to life (players with lives left).
    pub fn resurrect(&mut self) {
        self.killed = false;
        self.killer = None;
        self.death.reset(self.death.duration());
    }
}

/// Points given to the killer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scored {
    pub value: u32,
    given: bool,
}

impl Scored {
    pub fn new(value: u32) -> Self {
        Self { value, given: false }
    }

    /// Returns the points the first time, zero afterward.
    pub fn take_points(&mut self) -> u32 {
        if self.given {
            0
        } else {
            self.given = true;
            self.value
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_life_is_rejected() {
        assert!(Lifed::new(0).is_err());
        assert!(Lifed::with_life(-1, 5).is_err());
        assert!(Lifed::with_life(6, 5).is_err());
        assert!(Lifed::with_life(0, 5).is_ok());
    }

    #[test]
    fn dec_life_clamps_at_zero() {
        let mut l = Lifed::new(3).unwrap();
        assert_eq!(l.dec_life(2), 1);
        assert_eq!(l.dec_life(10), 0);
        assert!(!l.is_alive());
        assert_eq!(l.inc_life(10), 3);
    }

    #[test]
    fn set_life_validates() {
        let mut l = Lifed::new(3).unwrap();
        assert!(l.set_life(4).is_err());
        assert_eq!(l.life(), 3);
        l.set_life(1).unwrap();
        assert_eq!(l.life(), 1);
    }

    #[test]
    fn kill_is_sticky_until_resurrect() {
        let mut k = Killable::new(Duration::from_millis(50));
        k.tick(Duration::from_millis(100)); // alive: no effect
        k.kill_by(None);
        assert!(k.is_kill_in_progress());
        k.tick(Duration::from_millis(50));
        assert!(k.kill_complete());
        k.resurrect();
        assert!(!k.is_killed());
    }

    #[test]
    fn points_are_given_once() {
        let mut s = Scored::new(100);
        assert_eq!(s.take_points(), 100);
        assert_eq!(s.take_points(), 0);
    }
}
