//! Timed bonuses carried by players.

use std::time::Duration;

use crate::time::Timer;

/// Shield state of a player. A shield is granted either by the shield bonus
/// or briefly after taking damage; while it lasts, damage is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bonusable {
    shield: Option<Timer>,
}

impl Bonusable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant a shield. A longer remaining shield is never shortened.
    pub fn give_shield(&mut self, duration: Duration) {
        let keep = self.shield.is_some_and(|t| t.remaining() >= duration);
        if !keep {
            self.shield = Some(Timer::new(duration));
        }
    }

    pub fn has_shield(&self) -> bool {
        self.shield.is_some_and(|t| !t.finished())
    }

    pub fn shield_remaining(&self) -> Duration {
        self.shield.map_or(Duration::ZERO, |t| t.remaining())
    }

    pub fn tick(&mut self, dt: Duration) {
        if let Some(t) = self.shield.as_mut() {
            t.tick(dt);
            if t.finished() {
                self.shield = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_shield_does_not_replace_long_one() {
        let mut b = Bonusable::new();
        b.give_shield(Duration::from_secs(20));
        b.give_shield(Duration::from_secs(1));
        assert_eq!(b.shield_remaining(), Duration::from_secs(20));
        b.tick(Duration::from_secs(20));
        assert!(!b.has_shield());
    }
}
