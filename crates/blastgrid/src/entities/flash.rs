//! Flashes: the short burst of light where a player appears or an entity
//! comes out of a teleport. Purely visual; it only has to go away on time.

use std::time::Duration;

use crate::components::{Lifetime, Position, Temporary};
use crate::ecs::Components;
use crate::math::Vec2;

/// Marker for flash entities.
#[derive(Debug, Clone, Copy, Default)]
pub struct Flash;

pub fn flash(pos: Vec2, duration: Duration) -> Components {
    Components::new()
        .with(Position(pos))
        .with(Flash)
        .with(Lifetime::new(duration))
        .with(Temporary::after_lifetime())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::is_expired;

    #[test]
    fn expires_after_its_animation() {
        let mut c = flash(Vec2::ZERO, Duration::from_millis(300));
        assert!(!is_expired(&c));
        c.get_mut::<Lifetime>().unwrap().0.tick(Duration::from_millis(300));
        assert!(is_expired(&c));
    }
}
