//! # Bonuses
//!
//! Bonuses drop from destroyed breakable walls. A player walking over one
//! grabs it; an explosion destroys it; left alone it disappears after
//! `bonus_expire_ms`.

use crate::collision::{Collider, Layer};
use crate::components::{AxisMoving, Bonusable, Killable, Lifed, Position, Temporary};
use crate::ecs::{Components, Entity};
use crate::math::{IVec2, tile_origin};
use crate::rng::DeterministicRng;
use crate::time::Timer;
use crate::world::World;

use super::player::Player;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BonusKind {
    /// One more bomb on the field at once.
    MaxBombs,
    /// Explosions reach one tile further.
    MaxRange,
    /// Bombs burn twice as fast.
    QuickFuse,
    Shield,
    Speedy,
    HealthSmall,
    HealthFull,
}

impl BonusKind {
    pub const ALL: [BonusKind; 7] = [
        BonusKind::MaxBombs,
        BonusKind::MaxRange,
        BonusKind::QuickFuse,
        BonusKind::Shield,
        BonusKind::Speedy,
        BonusKind::HealthSmall,
        BonusKind::HealthFull,
    ];

    pub fn random(rng: &mut DeterministicRng) -> BonusKind {
        rng.pick(&Self::ALL).copied().unwrap_or(BonusKind::MaxBombs)
    }
}

#[derive(Debug, Clone)]
pub struct Bonus {
    kind: BonusKind,
    expire: Timer,
    grabbed_by: Option<Entity>,
    destroyed: bool,
}

impl Bonus {
    pub fn new(kind: BonusKind, expire: std::time::Duration) -> Self {
        Self {
            kind,
            expire: Timer::new(expire),
            grabbed_by: None,
            destroyed: false,
        }
    }

    pub fn kind(&self) -> BonusKind {
        self.kind
    }

    pub fn grabbed_by(&self) -> Option<Entity> {
        self.grabbed_by
    }

    pub fn destroy(&mut self) {
        self.destroyed = true;
    }

    /// Grabbed, destroyed or expired.
    pub fn is_gone(&self) -> bool {
        self.grabbed_by.is_some() || self.destroyed || self.expire.finished()
    }
}

pub fn bonus(tile: IVec2, kind: BonusKind, expire: std::time::Duration) -> Components {
    Components::new()
        .with(Position(tile_origin(tile)))
        .with(Collider::tile(Layer::Grabbable))
        .with(Bonus::new(kind, expire))
        .with(Temporary::new(|c| c.get::<Bonus>().is_none_or(Bonus::is_gone)))
}

/// Apply `kind` to `player`.
pub fn apply_bonus(world: &mut World, player: Entity, kind: BonusKind) {
    let cfg = &world.ctx.config;
    let Some(c) = world.entities.components_mut(player) else {
        return;
    };
    match kind {
        BonusKind::MaxBombs => {
            if let Some(p) = c.get_mut::<Player>() {
                p.add_max_bombs(cfg.max_bombs_cap);
            }
        }
        BonusKind::MaxRange => {
            if let Some(p) = c.get_mut::<Player>() {
                p.add_bomb_radius(cfg.max_bomb_radius);
            }
        }
        BonusKind::QuickFuse => {
            if let Some(p) = c.get_mut::<Player>() {
                p.give_quick_fuse();
            }
        }
        BonusKind::Shield => {
            if let Some(b) = c.get_mut::<Bonusable>() {
                b.give_shield(cfg.shield_bonus_time());
            }
        }
        BonusKind::Speedy => {
            if let Some(m) = c.get_mut::<AxisMoving>() {
                m.give_speedy(cfg.speedy_bonus_time());
            }
        }
        BonusKind::HealthSmall => {
            if let Some(l) = c.get_mut::<Lifed>() {
                l.inc_life((l.max_life() / 4).max(1));
            }
        }
        BonusKind::HealthFull => {
            if let Some(l) = c.get_mut::<Lifed>() {
                l.refill();
            }
        }
    }
}

/// Expire old bonuses and hand the touched ones to players.
pub fn grab_bonuses(world: &mut World) {
    let dt = world.time.delta();
    let mut grabbed = Vec::new();
    let mut touched = Vec::new();
    world
        .entities
        .query::<(&mut Bonus, &Collider)>(|entity, (bonus, collider)| {
            bonus.expire.tick(dt);
            if bonus.is_gone() {
                return;
            }
            if let Some(c) = collider.colliding().iter().find(|c| c.layer == Layer::Players) {
                touched.push((entity, c.entity, bonus.kind));
            }
        });

    for (entity, player, kind) in touched {
        let alive = world.entities.has::<Player>(player)
            && !world
                .entities
                .get::<Killable>(player)
                .is_some_and(Killable::is_killed);
        if !alive {
            continue;
        }
        if let Some(b) = world.entities.get_mut::<Bonus>(entity) {
            b.grabbed_by = Some(player);
        }
        grabbed.push((player, kind));
    }

    let points = world.ctx.config.bonus_points;
    for (player, kind) in grabbed {
        apply_bonus(world, player, kind);
        if let Some(p) = world.entities.get_mut::<Player>(player) {
            p.add_score(points);
        }
        world.ctx.play_sound("bonus_grab");
        log::debug!("{player} grabs {kind:?}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::is_expired;
    use crate::entities::player::player;
    use std::time::Duration;

    const FRAME: Duration = Duration::from_millis(16);

    fn setup(kind: BonusKind) -> (World, Entity, Entity) {
        let mut world = World::empty();
        let cfg = world.ctx.config.clone();
        let p = world.entities.spawn_unowned(player(1, IVec2::new(3, 3), &cfg).unwrap());
        let b = world.spawn(bonus(IVec2::new(3, 3), kind, cfg.bonus_expire_time()));
        (world, p, b)
    }

    #[test]
    fn player_grabs_bonus_once() {
        let (mut world, p, b) = setup(BonusKind::MaxBombs);
        world.time.advance(FRAME);
        world.detect_collisions();
        grab_bonuses(&mut world);
        grab_bonuses(&mut world);
        let player = world.entities.get::<Player>(p).unwrap();
        assert_eq!(player.max_bombs(), world.ctx.config.initial_max_bombs + 1);
        assert_eq!(player.score(), world.ctx.config.bonus_points);
        assert!(is_expired(world.entities.components(b).unwrap()));
    }

    #[test]
    fn speedy_and_shield_are_timed() {
        let (mut world, p, _) = setup(BonusKind::Speedy);
        apply_bonus(&mut world, p, BonusKind::Speedy);
        apply_bonus(&mut world, p, BonusKind::Shield);
        let c = world.entities.components(p).unwrap();
        assert!(c.get::<AxisMoving>().unwrap().is_speedy());
        assert!(c.get::<Bonusable>().unwrap().has_shield());
    }

    #[test]
    fn small_health_heals_a_quarter() {
        let (mut world, p, _) = setup(BonusKind::HealthSmall);
        world.entities.get_mut::<Lifed>(p).unwrap().set_life(1).unwrap();
        apply_bonus(&mut world, p, BonusKind::HealthSmall);
        let max = world.ctx.config.player_max_life;
        assert_eq!(world.entities.get::<Lifed>(p).unwrap().life(), 1 + max / 4);
    }

    #[test]
    fn unclaimed_bonus_expires() {
        let mut world = World::empty();
        let b = world.spawn(bonus(IVec2::ONE, BonusKind::Shield, Duration::from_millis(100)));
        world.time.advance(Duration::from_millis(100));
        grab_bonuses(&mut world);
        world.prune();
        assert!(!world.entities.is_alive(b));
    }
}
