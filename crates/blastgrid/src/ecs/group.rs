//! # EntityGroup — The Live Objects of a Level
//!
//! An [`EntityGroup`] owns every entity of the level being played: walls,
//! enemies, bombs, flames, bonuses. Entities are stored in a slot vector
//! indexed by [`Entity::index`], and an insertion-order list drives every
//! iteration, so systems always visit entities in the same, stable order.
//!
//! ```text
//! ┌────────────────────────────────────────────────────┐
//! │ EntityGroup                                        │
//! │                                                    │
//! │  allocator ── generational handles                 │
//! │  slots     ── Vec<Option<Slot>>, by entity index   │
//! │               Slot { components, owned }           │
//! │  order     ── live entities, insertion order       │
//! └────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ownership
//!
//! Most entities are *owned*: when they expire or the level is torn down, they
//! are destroyed. Players are spawned *unowned*: the group tracks and updates
//! them like anything else, but on [`teardown`](EntityGroup::teardown) it hands
//! their components back instead of dropping them, so the next level's group
//! can [`adopt`](EntityGroup::adopt) them.
//!
//! ## Deferred Removal
//!
//! Nothing is removed while systems run. At the end of the frame,
//! [`prune`](EntityGroup::prune) drops every entity whose expiry predicate
//! holds in one separate pass, so no system ever observes a half-removed
//! entity.

use super::component::{Components, SpawnBundle};
use super::entity::{Entity, EntityAllocator};
use super::query::QueryParam;

struct Slot {
    entity: Entity,
    components: Components,
    owned: bool,
}

/// An unowned entity handed back by a group, ready to be adopted elsewhere.
pub struct DetachedEntity {
    /// The handle it had in the group that released it (now stale).
    pub former: Entity,
    pub components: Components,
}

/// Result of a [`prune`](EntityGroup::prune) pass.
#[derive(Default)]
pub struct Pruned {
    /// Owned entities that were destroyed.
    pub removed: Vec<Entity>,
    /// Unowned entities that expired and were released.
    pub released: Vec<DetachedEntity>,
}

pub struct EntityGroup {
    allocator: EntityAllocator,
    slots: Vec<Option<Slot>>,
    order: Vec<Entity>,
}

impl EntityGroup {
    pub fn new() -> Self {
        Self {
            allocator: EntityAllocator::new(),
            slots: Vec::new(),
            order: Vec::new(),
        }
    }

    // ── Spawning and removal ─────────────────────────────────────────

    /// Add an owned entity.
    pub fn spawn<B: SpawnBundle>(&mut self, bundle: B) -> Entity {
        self.insert_slot(bundle.into_components(), true)
    }

    /// Add an entity the group must not destroy on teardown (players).
    pub fn spawn_unowned<B: SpawnBundle>(&mut self, bundle: B) -> Entity {
        self.insert_slot(bundle.into_components(), false)
    }

    /// Re-insert an entity released by another group. It gets a new handle.
    pub fn adopt(&mut self, detached: DetachedEntity) -> Entity {
        self.insert_slot(detached.components, false)
    }

    fn insert_slot(&mut self, components: Components, owned: bool) -> Entity {
        let entity = self.allocator.allocate();
        let idx = entity.index as usize;
        if idx >= self.slots.len() {
            self.slots.resize_with(idx + 1, || None);
        }
        self.slots[idx] = Some(Slot {
            entity,
            components,
            owned,
        });
        self.order.push(entity);
        entity
    }

    /// Remove an entity immediately, returning its components.
    ///
    /// Systems should let [`prune`](Self::prune) do this instead; direct
    /// removal is for setup code and tests.
    pub fn despawn(&mut self, entity: Entity) -> Option<Components> {
        let slot = self.take_slot(entity)?;
        self.order.retain(|&e| e != entity);
        Some(slot.components)
    }

    fn take_slot(&mut self, entity: Entity) -> Option<Slot> {
        if !self.allocator.is_alive(entity) {
            return None;
        }
        let slot = self.slots.get_mut(entity.index as usize)?.take()?;
        self.allocator.release(entity);
        Some(slot)
    }

    /// Remove every entity for which `expired` returns true, in one pass.
    ///
    /// Owned entities are dropped; unowned ones are handed back.
    pub fn prune(&mut self, mut expired: impl FnMut(&Components) -> bool) -> Pruned {
        let doomed: Vec<Entity> = self
            .order
            .iter()
            .copied()
            .filter(|&e| self.components(e).is_some_and(&mut expired))
            .collect();
        let mut pruned = Pruned::default();
        if doomed.is_empty() {
            return pruned;
        }
        for entity in doomed {
            let Some(slot) = self.take_slot(entity) else { continue };
            if slot.owned {
                pruned.removed.push(entity);
            } else {
                pruned.released.push(DetachedEntity {
                    former: entity,
                    components: slot.components,
                });
            }
        }
        let slots = &self.slots;
        self.order
            .retain(|e| slots.get(e.index as usize).is_some_and(|s| s.is_some()));
        pruned
    }

    /// Destroy every owned entity and hand back the unowned ones.
    pub fn teardown(mut self) -> Vec<DetachedEntity> {
        let order = std::mem::take(&mut self.order);
        order
            .into_iter()
            .filter_map(|e| self.take_slot(e))
            .filter(|slot| !slot.owned)
            .map(|slot| DetachedEntity {
                former: slot.entity,
                components: slot.components,
            })
            .collect()
    }

    // ── Lookups ──────────────────────────────────────────────────────

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.allocator.is_alive(entity)
    }

    /// `false` for unowned entities and dead handles.
    pub fn is_owned(&self, entity: Entity) -> bool {
        self.slot(entity).is_some_and(|s| s.owned)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Live entities in insertion order.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.order.iter().copied()
    }

    fn slot(&self, entity: Entity) -> Option<&Slot> {
        self.slots
            .get(entity.index as usize)?
            .as_ref()
            .filter(|s| s.entity == entity)
    }

    fn slot_mut(&mut self, entity: Entity) -> Option<&mut Slot> {
        self.slots
            .get_mut(entity.index as usize)?
            .as_mut()
            .filter(|s| s.entity == entity)
    }

    pub fn components(&self, entity: Entity) -> Option<&Components> {
        self.slot(entity).map(|s| &s.components)
    }

    pub fn components_mut(&mut self, entity: Entity) -> Option<&mut Components> {
        self.slot_mut(entity).map(|s| &mut s.components)
    }

    /// Get a component. `None` for dead handles and missing components.
    pub fn get<T: 'static + Send + Sync>(&self, entity: Entity) -> Option<&T> {
        self.components(entity)?.get::<T>()
    }

    pub fn get_mut<T: 'static + Send + Sync>(&mut self, entity: Entity) -> Option<&mut T> {
        self.components_mut(entity)?.get_mut::<T>()
    }

    pub fn has<T: 'static + Send + Sync>(&self, entity: Entity) -> bool {
        self.components(entity).is_some_and(|c| c.has::<T>())
    }

    /// Add or replace a component. Returns `false` if the entity is dead.
    pub fn insert<T: 'static + Send + Sync>(&mut self, entity: Entity, component: T) -> bool {
        match self.components_mut(entity) {
            Some(c) => {
                c.insert(component);
                true
            }
            None => false,
        }
    }

    pub fn remove<T: 'static + Send + Sync>(&mut self, entity: Entity) -> Option<T> {
        self.components_mut(entity)?.remove::<T>()
    }

    /// All entities having a `T`, in insertion order.
    pub fn entities_with<T: 'static + Send + Sync>(&self) -> Vec<Entity> {
        self.iter::<T>().map(|(e, _)| e).collect()
    }

    /// Read-only iteration over one component type.
    pub fn iter<T: 'static + Send + Sync>(&self) -> impl Iterator<Item = (Entity, &T)> + '_ {
        self.order
            .iter()
            .filter_map(move |&e| self.get::<T>(e).map(|c| (e, c)))
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Run `f` on every entity matching `Q`, in insertion order.
    ///
    /// # Example
    ///
    /// ```ignore
    /// group.query::<(&mut Position, &AxisMoving)>(|entity, (pos, moving)| {
    ///     pos.0 += moving.direction().unit_vec();
    /// });
    /// ```
    pub fn query<Q: QueryParam>(&mut self, mut f: impl FnMut(Entity, Q::Item<'_>)) {
        for i in 0..self.order.len() {
            let entity = self.order[i];
            let Some(slot) = self.slots[entity.index as usize].as_mut() else {
                continue;
            };
            if !Q::matches(&slot.components) {
                continue;
            }
            let mut fetched = Q::extract(&mut slot.components);
            f(entity, Q::fetch(&mut fetched));
            Q::restore(fetched, &mut slot.components);
        }
    }

    /// Run `f` on one entity if it is alive and matches `Q`.
    pub fn query_one<Q: QueryParam, R>(
        &mut self,
        entity: Entity,
        f: impl FnOnce(Q::Item<'_>) -> R,
    ) -> Option<R> {
        let slot = self.slot_mut(entity)?;
        if !Q::matches(&slot.components) {
            return None;
        }
        let mut fetched = Q::extract(&mut slot.components);
        let out = f(Q::fetch(&mut fetched));
        Q::restore(fetched, &mut slot.components);
        Some(out)
    }
}

impl Default for EntityGroup {
    fn default() -> Self {
        Self::new()
    }
}
