//! # Components — Per-Entity Typed Storage
//!
//! Each entity owns one [`Components`] set: a map from component type to a
//! type-erased box. An entity holds at most one component of each type, and
//! lookups are by type:
//!
//! ```text
//! Components {
//!   TypeId(Position)   → Box<Position>
//!   TypeId(Collider)   → Box<Collider>
//!   TypeId(AxisMoving) → Box<AxisMoving>
//! }
//! ```
//!
//! Game objects here are few (hundreds) and very heterogeneous (a bullet, a
//! boss and a teleport share almost nothing), so a per-entity map is simpler
//! than archetype tables and fast enough.
//!
//! ## Builder Style
//!
//! Factories assemble an entity before it enters a group:
//!
//! ```ignore
//! let wall = Components::new()
//!     .with(Position(origin))
//!     .with(Fixed)
//!     .with(Collider::new(Layer::Unbreakables, Vec2::splat(TILE_SIZE)));
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;

type Boxed = Box<dyn Any + Send + Sync>;

/// The component set of one entity.
#[derive(Default)]
pub struct Components {
    map: HashMap<TypeId, Boxed>,
}

impl Components {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add (or replace) a component.
    pub fn with<T: 'static + Send + Sync>(mut self, component: T) -> Self {
        self.insert(component);
        self
    }

    /// Insert a component, returning the one it replaced.
    pub fn insert<T: 'static + Send + Sync>(&mut self, component: T) -> Option<T> {
        self.map
            .insert(TypeId::of::<T>(), Box::new(component))
            .and_then(|old| old.downcast::<T>().ok())
            .map(|b| *b)
    }

    pub fn get<T: 'static + Send + Sync>(&self) -> Option<&T> {
        self.map
            .get(&TypeId::of::<T>())
            .and_then(|c| c.downcast_ref::<T>())
    }

    pub fn get_mut<T: 'static + Send + Sync>(&mut self) -> Option<&mut T> {
        self.map
            .get_mut(&TypeId::of::<T>())
            .and_then(|c| c.downcast_mut::<T>())
    }

    pub fn has<T: 'static + Send + Sync>(&self) -> bool {
        self.map.contains_key(&TypeId::of::<T>())
    }

    pub fn remove<T: 'static + Send + Sync>(&mut self) -> Option<T> {
        self.map
            .remove(&TypeId::of::<T>())
            .and_then(|c| c.downcast::<T>().ok())
            .map(|b| *b)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub(crate) fn contains_type(&self, tid: &TypeId) -> bool {
        self.map.contains_key(tid)
    }

    /// Temporarily take a component out (see [`QueryParam`](super::query::QueryParam)).
    pub(crate) fn take_raw(&mut self, tid: TypeId) -> Option<Boxed> {
        self.map.remove(&tid)
    }

    pub(crate) fn put_raw(&mut self, tid: TypeId, component: Boxed) {
        self.map.insert(tid, component);
    }
}

impl std::fmt::Debug for Components {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Components")
            .field("len", &self.map.len())
            .finish_non_exhaustive()
    }
}

// ── Spawn bundles ────────────────────────────────────────────────────────

/// Anything that can become an entity's component set: a [`Components`]
/// builder, or a tuple of up to 8 components.
pub trait SpawnBundle {
    fn into_components(self) -> Components;
}

impl SpawnBundle for Components {
    fn into_components(self) -> Components {
        self
    }
}

macro_rules! impl_spawn_bundle {
    ($($T:ident),+) => {
        impl<$($T: 'static + Send + Sync),+> SpawnBundle for ($($T,)+) {
            #[allow(non_snake_case)]
            fn into_components(self) -> Components {
                let ($($T,)+) = self;
                let mut c = Components::new();
                $(c.insert($T);)+
                c
            }
        }
    };
}

impl_spawn_bundle!(A);
impl_spawn_bundle!(A, B);
impl_spawn_bundle!(A, B, C);
impl_spawn_bundle!(A, B, C, D);
impl_spawn_bundle!(A, B, C, D, E);
impl_spawn_bundle!(A, B, C, D, E, F);
impl_spawn_bundle!(A, B, C, D, E, F, G);
impl_spawn_bundle!(A, B, C, D, E, F, G, H);

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Life(i32);
    #[derive(Debug, PartialEq)]
    struct Speed(f32);

    #[test]
    fn one_component_per_type() {
        let mut c = Components::new().with(Life(3));
        assert_eq!(c.insert(Life(5)), Some(Life(3)));
        assert_eq!(c.len(), 1);
        assert_eq!(c.get::<Life>(), Some(&Life(5)));
    }

    #[test]
    fn missing_type_is_none() {
        let mut c = Components::new().with(Life(1));
        assert!(c.get::<Speed>().is_none());
        assert!(c.get_mut::<Speed>().is_none());
        assert!(c.remove::<Speed>().is_none());
    }

    #[test]
    fn tuple_bundle() {
        let c = (Life(2), Speed(1.5)).into_components();
        assert!(c.has::<Life>() && c.has::<Speed>());
    }

    #[test]
    fn get_mut_modifies_in_place() {
        let mut c = Components::new().with(Life(2));
        c.get_mut::<Life>().unwrap().0 -= 1;
        assert_eq!(c.remove::<Life>(), Some(Life(1)));
        assert!(c.is_empty());
    }

    #[test]
    fn debug_shows_the_component_count() {
        let c = (Life(2), Speed(1.5)).into_components();
        assert_eq!(format!("{c:?}"), "Components { len: 2, .. }");
        let r: Result<Components, &str> = Err("no");
        assert_eq!(r.unwrap_err(), "no");
    }
}
