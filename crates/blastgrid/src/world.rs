//! # World — One Level in Play
//!
//! The [`World`] owns everything a running level needs and steps it one
//! frame at a time.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │ World                                                │
//! │                                                      │
//! │  entities:  EntityGroup   walls, players, bombs, ... │
//! │  ctx:       GameContext   rng, assets, options, cfg  │
//! │  time:      Time          frame delta, elapsed       │
//! │  resources: HashMap<TypeId, Box<dyn Any>>            │
//! │             TileOccupancy, TeleportRing, LevelSet... │
//! │  deferred:  spawns queued by systems                 │
//! │  schedule:  the ordered frame systems                │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! ## A Frame
//!
//! ```text
//! update(dt)
//!   ├─ time.advance(dt)       and a fresh sound queue
//!   ├─ schedule.run(world)    tick → move → detect → react → AI → score
//!   ├─ flush deferred spawns  bullets, explosions, flashes, bonuses
//!   └─ prune expired          Temporary predicates, finished deaths
//! ```
//!
//! Systems never insert entities while others iterate: anything created
//! during the frame goes through [`World::spawn_deferred`] or
//! [`World::defer`] and appears once every system has run.
//!
//! ## Resources
//!
//! Level-wide values that aren't tied to an entity (the tile occupancy map,
//! the teleport ring, the enemy descriptors) are resources: type-erased
//! singletons keyed by `TypeId`.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::time::Duration;

use crate::collision::CollisionDetector;
use crate::components::{Position, is_expired};
use crate::config::SimConfig;
use crate::context::GameContext;
use crate::direction::Direction;
use crate::ecs::{DetachedEntity, Entity, EntityGroup, Schedule, SpawnBundle};
use crate::math::{IVec2, Rect};
use crate::nav::TileOccupancy;
use crate::time::Time;

type Deferred = Box<dyn FnOnce(&mut World)>;

pub struct World {
    pub entities: EntityGroup,
    pub ctx: GameContext,
    pub time: Time,
    resources: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
    detector: CollisionDetector,
    /// Level size, in tiles.
    level_size: IVec2,
    deferred: Vec<Deferred>,
    /// Entities destroyed by the last prune.
    removed: Vec<Entity>,
    /// Unowned entities released by prunes, waiting to be collected.
    released: Vec<DetachedEntity>,
    /// Taken out while it runs, so systems can borrow the world mutably.
    schedule: Option<Schedule>,
}

impl World {
    /// A world running the default frame schedule.
    pub fn new(config: SimConfig) -> Self {
        let schedule = crate::systems::default_schedule();
        let mut world = Self::with_schedule(GameContext::new(config), schedule);
        world.insert_resource(TileOccupancy::new(world.level_size));
        world
    }

    /// A world with no systems and a default context.
    pub fn empty() -> Self {
        Self::with_schedule(GameContext::default(), Schedule::new())
    }

    pub fn with_schedule(ctx: GameContext, schedule: Schedule) -> Self {
        let level_size = IVec2::new(ctx.config.level_width, ctx.config.level_height);
        Self {
            entities: EntityGroup::new(),
            ctx,
            time: Time::new(),
            resources: HashMap::new(),
            detector: CollisionDetector::new(),
            level_size,
            deferred: Vec::new(),
            removed: Vec::new(),
            released: Vec::new(),
            schedule: Some(schedule),
        }
    }

    // ── Level geometry ───────────────────────────────────────────────

    pub fn level_size(&self) -> IVec2 {
        self.level_size
    }

    pub fn set_level_size(&mut self, size: IVec2) {
        self.level_size = size;
        if let Some(occ) = self.get_resource_mut::<TileOccupancy>() {
            *occ = TileOccupancy::new(size);
        }
    }

    /// The rectangle movers may not leave.
    pub fn limit(&self) -> Rect {
        Rect::from_tiles(IVec2::ZERO, self.level_size)
    }

    // ── Frame ────────────────────────────────────────────────────────

    /// Step the simulation by `dt`.
    pub fn update(&mut self, dt: Duration) {
        self.time.advance(dt);
        self.ctx.assets.begin_frame();
        if let Some(mut schedule) = self.schedule.take() {
            schedule.run(self);
            self.schedule = Some(schedule);
        }
        self.flush_deferred();
        self.prune();
    }

    /// Run queued spawns. Spawns queued by these run as well.
    pub fn flush_deferred(&mut self) {
        while !self.deferred.is_empty() {
            for job in std::mem::take(&mut self.deferred) {
                job(self);
            }
        }
    }

    /// Remove every expired entity.
    pub fn prune(&mut self) {
        let pruned = self.entities.prune(is_expired);
        #[cfg(feature = "diagnostics")]
        {
            if !pruned.removed.is_empty() || !pruned.released.is_empty() {
                log::trace!(
                    "frame {}: pruned {} entities, released {}",
                    self.time.frame_count(),
                    pruned.removed.len(),
                    pruned.released.len()
                );
            }
        }
        self.removed = pruned.removed;
        self.released.extend(pruned.released);
    }

    /// Entities destroyed at the end of the last frame.
    pub fn removed_last_frame(&self) -> &[Entity] {
        &self.removed
    }

    /// Take the unowned entities released so far.
    pub fn take_released(&mut self) -> Vec<DetachedEntity> {
        std::mem::take(&mut self.released)
    }

    /// Hand back every unowned entity and drop the rest.
    pub fn teardown(mut self) -> Vec<DetachedEntity> {
        let mut released = std::mem::take(&mut self.released);
        released.extend(self.entities.teardown());
        released
    }

    pub fn schedule(&self) -> Option<&Schedule> {
        self.schedule.as_ref()
    }

    /// Recompute collisions for the whole group.
    pub fn detect_collisions(&mut self) {
        let limit = self.limit();
        self.detector.update(&mut self.entities, limit);
    }

    pub fn detector(&self) -> &CollisionDetector {
        &self.detector
    }

    // ── Spawning ─────────────────────────────────────────────────────

    /// Spawn right away. Don't call this from inside a query.
    pub fn spawn<B: SpawnBundle>(&mut self, bundle: B) -> Entity {
        self.entities.spawn(bundle)
    }

    /// Spawn once every system of this frame has run.
    pub fn spawn_deferred<B: SpawnBundle + 'static>(&mut self, bundle: B) {
        self.deferred.push(Box::new(move |world: &mut World| {
            world.entities.spawn(bundle);
        }));
    }

    /// Run `job` once every system of this frame has run. Used when the
    /// spawned entities need each other's handles.
    pub fn defer(&mut self, job: impl FnOnce(&mut World) + 'static) {
        self.deferred.push(Box::new(job));
    }

    // ── Navigation ───────────────────────────────────────────────────

    /// Can `entity` step one tile toward `dir`? Reads the occupancy map
    /// built at the start of this frame.
    pub fn can_go(&self, entity: Entity, dir: Direction) -> bool {
        let Some(occ) = self.get_resource::<TileOccupancy>() else {
            return true;
        };
        let Some(pos) = self.entities.get::<Position>(entity) else {
            return false;
        };
        let Some(collider) = self.entities.get::<crate::collision::Collider>(entity) else {
            return occ.in_bounds(crate::math::tile(pos.0) + dir.unit());
        };
        occ.can_go(
            entity,
            pos.0 + collider.offset(),
            collider.size(),
            collider.layer(),
            dir,
        )
    }

    /// Rebuild the occupancy map from the current colliders.
    pub fn refresh_occupancy(&mut self) {
        let size = self.level_size;
        let mut occ = self
            .resource_remove::<TileOccupancy>()
            .unwrap_or_else(|| TileOccupancy::new(size));
        if occ.size() != size {
            occ = TileOccupancy::new(size);
        }
        occ.rebuild(&self.entities);
        self.insert_resource(occ);
    }

    // ── Resources ────────────────────────────────────────────────────

    /// Insert a resource, replacing any existing one of the same type.
    pub fn insert_resource<T: 'static + Send + Sync>(&mut self, value: T) {
        self.resources.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// # Panics
    ///
    /// Panics if the resource hasn't been inserted.
    pub fn resource<T: 'static + Send + Sync>(&self) -> &T {
        self.get_resource::<T>().unwrap_or_else(|| {
            panic!(
                "Resource `{}` not found. Did you forget to insert it?",
                std::any::type_name::<T>()
            )
        })
    }

    /// # Panics
    ///
    /// Panics if the resource hasn't been inserted.
    pub fn resource_mut<T: 'static + Send + Sync>(&mut self) -> &mut T {
        self.get_resource_mut::<T>().unwrap_or_else(|| {
            panic!(
                "Resource `{}` not found. Did you forget to insert it?",
                std::any::type_name::<T>()
            )
        })
    }

    pub fn get_resource<T: 'static + Send + Sync>(&self) -> Option<&T> {
        self.resources
            .get(&TypeId::of::<T>())
            .and_then(|r| r.downcast_ref::<T>())
    }

    pub fn get_resource_mut<T: 'static + Send + Sync>(&mut self) -> Option<&mut T> {
        self.resources
            .get_mut(&TypeId::of::<T>())
            .and_then(|r| r.downcast_mut::<T>())
    }

    pub fn has_resource<T: 'static + Send + Sync>(&self) -> bool {
        self.resources.contains_key(&TypeId::of::<T>())
    }

    /// Remove a resource, taking ownership. Useful to borrow it alongside
    /// the entities.
    pub fn resource_remove<T: 'static + Send + Sync>(&mut self) -> Option<T> {
        self.resources
            .remove(&TypeId::of::<T>())
            .and_then(|r| r.downcast::<T>().ok())
            .map(|b| *b)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Lifetime, Temporary};

    const FRAME: Duration = Duration::from_millis(16);

    #[test]
    fn resources_roundtrip() {
        let mut world = World::empty();
        assert!(!world.has_resource::<u32>());
        world.insert_resource(5u32);
        *world.resource_mut::<u32>() += 1;
        assert_eq!(*world.resource::<u32>(), 6);
        assert_eq!(world.resource_remove::<u32>(), Some(6));
        assert!(world.get_resource::<u32>().is_none());
    }

    #[test]
    #[should_panic(expected = "not found")]
    fn missing_resource_panics() {
        let world = World::empty();
        world.resource::<String>();
    }

    #[test]
    fn expired_entities_are_gone_after_update() {
        let mut world = World::empty();
        let keep = world.spawn((Position::default(),));
        let gone = world.spawn((Position::default(), Temporary::new(|_| true)));
        world.update(FRAME);
        assert!(world.entities.is_alive(keep));
        assert!(!world.entities.is_alive(gone));
        assert_eq!(world.removed_last_frame(), &[gone]);
    }

    #[test]
    fn deferred_spawns_appear_after_the_frame() {
        let mut schedule = Schedule::new();
        schedule.add_system(|w: &mut World| {
            if w.time.frame_count() == 1 {
                w.spawn_deferred((Position::new(1.0, 2.0),));
                assert_eq!(w.entities.len(), 0);
            }
        });
        let mut world = World::with_schedule(GameContext::default(), schedule);
        world.update(FRAME);
        assert_eq!(world.entities.len(), 1);
    }

    #[test]
    fn deferred_jobs_can_link_entities() {
        let mut world = World::empty();
        world.defer(|w| {
            let a = w.spawn((Position::default(),));
            w.spawn((Position::default(), a));
        });
        world.update(FRAME);
        let linked: Vec<_> = world.entities.iter::<Entity>().map(|(_, e)| *e).collect();
        assert_eq!(linked.len(), 1);
        assert!(world.entities.is_alive(linked[0]));
    }

    #[test]
    fn deferred_spawn_that_is_already_expired_never_survives() {
        let mut world = World::empty();
        world.spawn_deferred((
            Position::default(),
            Lifetime::new(Duration::ZERO),
            Temporary::after_lifetime(),
        ));
        world.update(FRAME);
        assert!(world.entities.is_empty());
    }

    #[test]
    fn released_players_are_handed_back() {
        let mut world = World::empty();
        let p = world.entities.spawn_unowned((Position::default(), Temporary::new(|_| true)));
        world.update(FRAME);
        let released = world.take_released();
        assert_eq!(released.len(), 1);
        assert_eq!(released[0].former, p);
    }

    #[test]
    fn limit_follows_level_size() {
        let mut world = World::empty();
        world.set_level_size(IVec2::new(3, 2));
        assert_eq!(world.limit(), Rect::from_xywh(0.0, 0.0, 96.0, 64.0));
    }

    #[test]
    fn sound_limit_resets_every_frame() {
        let mut schedule = Schedule::new();
        schedule.add_system(|w: &mut World| {
            let accepted = w.ctx.play_sound("explosion");
            w.resource_mut::<Vec<bool>>().push(accepted);
        });
        let mut world = World::with_schedule(GameContext::default(), schedule);
        world.insert_resource(Vec::<bool>::new());
        for _ in 0..12 {
            world.update(FRAME);
        }
        assert_eq!(world.resource::<Vec<bool>>(), &vec![true; 12]);
        assert_eq!(world.ctx.assets.drain_sounds(), vec!["explosion".to_string()]);

        let limit = world.ctx.options.max_parallel_sounds;
        let accepted = (0..=limit).filter(|_| world.ctx.play_sound("explosion")).count();
        assert_eq!(accepted, limit);
    }
}
