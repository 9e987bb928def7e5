//! # Entity — Generational Handles
//!
//! An [`Entity`] names a game object living in an
//! [`EntityGroup`](super::group::EntityGroup). It owns nothing: the group maps
//! it to a component set. Handles are cheap to copy and are what components
//! store when they need to point at another object (a bullet's shooter, an
//! explosion arm's root, the next teleport in a ring).
//!
//! ## Why Generations
//!
//! Objects die all the time in this game: bullets hit walls, explosions fade,
//! bonuses get picked up. Their slots are recycled, so a bare index stored in
//! a collision list could end up pointing at a brand new bullet. Each slot
//! therefore carries a generation that is bumped on release:
//!
//! ```text
//! Entity { index: 7, generation: 0 }  ← bullet fired
//! Entity { index: 7, generation: 1 }  ← slot reused by an explosion
//! ```
//!
//! A lookup with the old handle compares generations and fails, so a stale
//! handle reads as "gone" in O(1) instead of aliasing something else.

use std::fmt;

/// A handle to an entity in an [`EntityGroup`](super::group::EntityGroup).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity {
    /// Slot index. Recycled after the entity is removed.
    pub(crate) index: u32,
    /// Bumped each time the slot is reused.
    pub(crate) generation: u32,
}

impl Entity {
    /// Returns the raw slot index. Useful for diagnostics.
    pub fn index(self) -> u32 {
        self.index
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({}v{})", self.index, self.generation)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Hands out entity handles and recycles released slots.
///
/// ```text
/// generations: [2, 0, 1]   ← current generation of each slot
/// free_list:   [2]         ← released slots, reused LIFO
/// ```
pub(crate) struct EntityAllocator {
    generations: Vec<u32>,
    free_list: Vec<u32>,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self {
            generations: Vec::new(),
            free_list: Vec::new(),
        }
    }

    pub fn allocate(&mut self) -> Entity {
        match self.free_list.pop() {
            // Generation was already bumped on release.
            Some(index) => Entity {
                index,
                generation: self.generations[index as usize],
            },
            None => {
                let index = self.generations.len() as u32;
                self.generations.push(0);
                Entity { index, generation: 0 }
            }
        }
    }

    /// Release `entity`'s slot. Returns `false` if the handle was already stale.
    pub fn release(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }
        self.generations[entity.index as usize] += 1;
        self.free_list.push(entity.index);
        true
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.generations
            .get(entity.index as usize)
            .is_some_and(|&g| g == entity.generation)
    }

    pub fn alive_count(&self) -> usize {
        self.generations.len() - self.free_list.len()
    }

    /// Total slots ever allocated.
    #[cfg(any(feature = "diagnostics", test))]
    pub fn slot_count(&self) -> usize {
        self.generations.len()
    }
}
