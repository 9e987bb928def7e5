//! The [`Collider`] component: an AABB relative to its owner, plus the
//! collisions found for it this frame.

use crate::ecs::Entity;
use crate::math::{Rect, TILE_SIZE, Vec2};

use super::layer::{Layer, LayerMask};

/// One collision seen by a collider: the other entity and its layer.
///
/// The handle is weak: the other entity may be gone by the time this is
/// read, so always look it up through the group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Collision {
    pub entity: Entity,
    pub layer: Layer,
}

#[derive(Debug, Clone)]
pub struct Collider {
    layer: Layer,
    offset: Vec2,
    size: Vec2,
    transparent_to: LayerMask,
    /// Inactive colliders take no part in detection.
    pub active: bool,
    /// Make others record this collider even when they're moving.
    pub force_ack: bool,
    /// An entity this collider ignores entirely (a bomb and its dropper).
    pub ignore: Option<Entity>,
    at_limit: bool,
    colliding: Vec<Collision>,
}

impl Collider {
    /// A collider covering `size` pixels from the owner's position.
    pub fn new(layer: Layer, size: Vec2) -> Self {
        Self {
            layer,
            offset: Vec2::ZERO,
            size,
            transparent_to: layer.default_transparency(),
            active: true,
            force_ack: false,
            ignore: None,
            at_limit: false,
            colliding: Vec::new(),
        }
    }

    /// A one-tile collider.
    pub fn tile(layer: Layer) -> Self {
        Self::new(layer, Vec2::splat(TILE_SIZE))
    }

    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_force_ack(mut self) -> Self {
        self.force_ack = true;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn with_transparency(mut self, transparent_to: LayerMask) -> Self {
        self.transparent_to = transparent_to;
        self
    }

    pub fn layer(&self) -> Layer {
        self.layer
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn transparent_to(&self) -> LayerMask {
        self.transparent_to
    }

    /// World-space rectangle for an owner at `pos`.
    pub fn rect(&self, pos: Vec2) -> Rect {
        Rect::new(pos + self.offset, self.size)
    }

    /// True if neither collider is transparent to the other's layer.
    pub fn collides_with(&self, other: &Collider) -> bool {
        !self.transparent_to.contains(other.layer) && !other.transparent_to.contains(self.layer)
    }

    pub fn is_at_limit(&self) -> bool {
        self.at_limit
    }

    /// Collisions found this frame. No order, no duplicates.
    pub fn colliding(&self) -> &[Collision] {
        &self.colliding
    }

    pub fn is_colliding(&self) -> bool {
        !self.colliding.is_empty()
    }

    pub fn is_colliding_with(&self, entity: Entity) -> bool {
        self.colliding.iter().any(|c| c.entity == entity)
    }

    /// True if any current collision is with a layer that blocks us.
    pub fn collides_with_solid(&self) -> bool {
        let solid = self.layer.solid_to();
        self.colliding.iter().any(|c| solid.contains(c.layer))
    }

    /// Forget this frame's results.
    pub fn reset(&mut self) {
        self.colliding.clear();
        self.at_limit = false;
    }

    pub(crate) fn set_at_limit(&mut self) {
        self.at_limit = true;
    }

    /// Record a collision, ignoring duplicates.
    pub(crate) fn add_collision(&mut self, collision: Collision) {
        if !self.colliding.contains(&collision) {
            self.colliding.push(collision);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::EntityGroup;

    #[test]
    fn transparency_either_way_prevents_collision() {
        let player = Collider::tile(Layer::Players);
        let wall = Collider::tile(Layer::Unbreakables);
        assert!(player.collides_with(&wall));
        let ghost = Collider::tile(Layer::Players)
            .with_transparency(LayerMask::from_layers(&[Layer::Unbreakables]));
        assert!(!ghost.collides_with(&wall));
        assert!(!wall.collides_with(&ghost));
    }

    #[test]
    fn collisions_are_a_set() {
        let mut group = EntityGroup::new();
        let other = group.spawn((0u8,));
        let mut c = Collider::tile(Layer::Players);
        let hit = Collision {
            entity: other,
            layer: Layer::Bombs,
        };
        c.add_collision(hit);
        c.add_collision(hit);
        assert_eq!(c.colliding().len(), 1);
        assert!(c.collides_with_solid());
        c.reset();
        assert!(!c.is_colliding());
    }

    #[test]
    fn rect_applies_offset() {
        let c = Collider::new(Layer::Hazards, Vec2::splat(96.0)).with_offset(Vec2::splat(-32.0));
        assert_eq!(c.rect(Vec2::new(64.0, 64.0)), Rect::from_xywh(32.0, 32.0, 96.0, 96.0));
    }
}
