//! Position, fixedness and expiry.
//!
//! An entity leaves its group when [`is_expired`] says so, and only at the end
//! of a frame. Two things make an entity expire:
//!
//! - a [`Temporary`] component whose predicate returns true (a grabbed bonus,
//!   a flash whose animation ended, a bullet that hit something);
//! - a [`Killable`](super::lifed::Killable) whose death animation finished.

use std::time::Duration;

use crate::ecs::Components;
use crate::math::{IVec2, Vec2, tile};
use crate::time::Timer;

use super::lifed::Killable;

/// Top-left corner of the entity, in pixels. Every entity has one.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position(pub Vec2);

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self(Vec2::new(x, y))
    }

    pub fn tile(&self) -> IVec2 {
        tile(self.0)
    }
}

/// Marker: the entity never moves. Fixed colliders don't look for
/// collisions themselves; they are only found by others.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fixed;

type ExpiryFn = dyn Fn(&Components) -> bool + Send + Sync;

/// An entity that removes itself once `predicate` holds.
pub struct Temporary {
    predicate: Box<ExpiryFn>,
}

impl Temporary {
    pub fn new(predicate: impl Fn(&Components) -> bool + Send + Sync + 'static) -> Self {
        Self {
            predicate: Box::new(predicate),
        }
    }

    /// Expire when the entity's [`Lifetime`] runs out.
    pub fn after_lifetime() -> Self {
        Self::new(|c| c.get::<Lifetime>().is_none_or(Lifetime::is_over))
    }

    pub fn is_expired(&self, components: &Components) -> bool {
        (self.predicate)(components)
    }
}

/// A fixed time to live, ticked by the frame delta.
#[derive(Debug, Clone, Copy)]
pub struct Lifetime(pub Timer);

impl Lifetime {
    pub fn new(duration: Duration) -> Self {
        Self(Timer::new(duration))
    }

    pub fn is_over(&self) -> bool {
        self.0.finished()
    }
}

/// The end-of-frame removal predicate.
pub fn is_expired(components: &Components) -> bool {
    if components
        .get::<Temporary>()
        .is_some_and(|t| t.is_expired(components))
    {
        return true;
    }
    components.get::<Killable>().is_some_and(Killable::kill_complete)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Grabbed(bool);

    #[test]
    fn temporary_predicate_sees_siblings() {
        let temp = Temporary::new(|c| c.get::<Grabbed>().is_some_and(|g| g.0));
        let mut c = Components::new().with(Grabbed(false)).with(temp);
        assert!(!is_expired(&c));
        c.get_mut::<Grabbed>().unwrap().0 = true;
        assert!(is_expired(&c));
    }

    #[test]
    fn lifetime_expiry() {
        let mut c = Components::new()
            .with(Lifetime::new(Duration::from_millis(300)))
            .with(Temporary::after_lifetime());
        c.get_mut::<Lifetime>().unwrap().0.tick(Duration::from_millis(299));
        assert!(!is_expired(&c));
        c.get_mut::<Lifetime>().unwrap().0.tick(Duration::from_millis(1));
        assert!(is_expired(&c));
    }

    #[test]
    fn killed_entity_expires_after_death_time() {
        let mut k = Killable::new(Duration::from_millis(100));
        k.kill();
        let mut c = Components::new().with(k);
        assert!(!is_expired(&c));
        c.get_mut::<Killable>().unwrap().tick(Duration::from_millis(100));
        assert!(is_expired(&c));
    }
}
