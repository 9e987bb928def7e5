//! # Query — Borrowing Several Components of One Entity
//!
//! Systems usually need more than one component of the same entity at once,
//! some of them mutably: movement needs `&mut AxisMoving`, `&mut Position`
//! and `&Collider` together. All three live in the same `HashMap`, and the
//! borrow checker won't hand out a `&mut` to one value while another borrow
//! of the map is alive.
//!
//! ## Extract / Restore
//!
//! Instead of unsafe pointer juggling, the requested components are
//! temporarily *removed* from the entity's map, giving us independent owned
//! boxes. The closure borrows those, and afterward they are put back:
//!
//! ```text
//! group.query::<(&mut AxisMoving, &mut Position, &Collider)>(|e, (m, p, c)| { .. });
//!
//! for each live entity, in insertion order:
//!   1. matches?  all three TypeIds present
//!   2. extract   take the three boxes out of the entity's map
//!   3. fetch     downcast them to (&mut AxisMoving, &mut Position, &Collider)
//!   4. call      f(entity, items)
//!   5. restore   put the boxes back
//! ```
//!
//! Asking for the same component type twice in one query panics on extract,
//! which is exactly the aliasing the borrow checker would have rejected.
//!
//! ## Optional and Filter Params
//!
//! - `Option<&T>` / `Option<&mut T>` match every entity and yield `None` when
//!   the component is missing.
//! - [`With<T>`] only filters: the entity must have a `T`, nothing is yielded.
//! - [`Without<T>`] filters the other way.

use std::any::{Any, TypeId};
use std::marker::PhantomData;

use super::component::Components;

type Boxed = Box<dyn Any + Send + Sync>;

/// Something that can be fetched from one entity's [`Components`].
pub trait QueryParam {
    /// The item handed to the query closure.
    type Item<'w>;
    /// Owned data taken out of the component map while the closure runs.
    type Fetched;

    /// Does this entity have what the param needs?
    fn matches(components: &Components) -> bool;

    fn extract(components: &mut Components) -> Self::Fetched;

    fn restore(fetched: Self::Fetched, components: &mut Components);

    fn fetch(fetched: &mut Self::Fetched) -> Self::Item<'_>;
}

fn take<T: 'static>(components: &mut Components) -> Boxed {
    components.take_raw(TypeId::of::<T>()).unwrap_or_else(|| {
        panic!(
            "Query extract: `{}` missing or requested twice",
            std::any::type_name::<T>()
        )
    })
}

fn wrong_type<T>() -> ! {
    panic!("Query fetch: component box is not a `{}`", std::any::type_name::<T>())
}

/// Shared read access.
impl<T: 'static + Send + Sync> QueryParam for &T {
    type Item<'w> = &'w T;
    type Fetched = Boxed;

    fn matches(components: &Components) -> bool {
        components.contains_type(&TypeId::of::<T>())
    }

    fn extract(components: &mut Components) -> Self::Fetched {
        take::<T>(components)
    }

    fn restore(fetched: Self::Fetched, components: &mut Components) {
        components.put_raw(TypeId::of::<T>(), fetched);
    }

    fn fetch(fetched: &mut Self::Fetched) -> Self::Item<'_> {
        fetched.downcast_ref::<T>().unwrap_or_else(|| wrong_type::<T>())
    }
}

/// Exclusive write access.
impl<T: 'static + Send + Sync> QueryParam for &mut T {
    type Item<'w> = &'w mut T;
    type Fetched = Boxed;

    fn matches(components: &Components) -> bool {
        components.contains_type(&TypeId::of::<T>())
    }

    fn extract(components: &mut Components) -> Self::Fetched {
        take::<T>(components)
    }

    fn restore(fetched: Self::Fetched, components: &mut Components) {
        components.put_raw(TypeId::of::<T>(), fetched);
    }

    fn fetch(fetched: &mut Self::Fetched) -> Self::Item<'_> {
        fetched.downcast_mut::<T>().unwrap_or_else(|| wrong_type::<T>())
    }
}

impl<T: 'static + Send + Sync> QueryParam for Option<&T> {
    type Item<'w> = Option<&'w T>;
    type Fetched = Option<Boxed>;

    fn matches(_: &Components) -> bool {
        true
    }

    fn extract(components: &mut Components) -> Self::Fetched {
        components.take_raw(TypeId::of::<T>())
    }

    fn restore(fetched: Self::Fetched, components: &mut Components) {
        if let Some(b) = fetched {
            components.put_raw(TypeId::of::<T>(), b);
        }
    }

    fn fetch(fetched: &mut Self::Fetched) -> Self::Item<'_> {
        fetched.as_deref().and_then(|b| b.downcast_ref::<T>())
    }
}

impl<T: 'static + Send + Sync> QueryParam for Option<&mut T> {
    type Item<'w> = Option<&'w mut T>;
    type Fetched = Option<Boxed>;

    fn matches(_: &Components) -> bool {
        true
    }

    fn extract(components: &mut Components) -> Self::Fetched {
        components.take_raw(TypeId::of::<T>())
    }

    fn restore(fetched: Self::Fetched, components: &mut Components) {
        if let Some(b) = fetched {
            components.put_raw(TypeId::of::<T>(), b);
        }
    }

    fn fetch(fetched: &mut Self::Fetched) -> Self::Item<'_> {
        fetched.as_deref_mut().and_then(|b| b.downcast_mut::<T>())
    }
}

/// Filter: the entity must have a `T`. Yields `()`.
pub struct With<T>(PhantomData<T>);

impl<T: 'static + Send + Sync> QueryParam for With<T> {
    type Item<'w> = ();
    type Fetched = ();

    fn matches(components: &Components) -> bool {
        components.contains_type(&TypeId::of::<T>())
    }

    fn extract(_: &mut Components) -> Self::Fetched {}

    fn restore(_: Self::Fetched, _: &mut Components) {}

    fn fetch(_: &mut Self::Fetched) -> Self::Item<'_> {}
}

/// Filter: the entity must not have a `T`. Yields `()`.
pub struct Without<T>(PhantomData<T>);

impl<T: 'static + Send + Sync> QueryParam for Without<T> {
    type Item<'w> = ();
    type Fetched = ();

    fn matches(components: &Components) -> bool {
        !components.contains_type(&TypeId::of::<T>())
    }

    fn extract(_: &mut Components) -> Self::Fetched {}

    fn restore(_: Self::Fetched, _: &mut Components) {}

    fn fetch(_: &mut Self::Fetched) -> Self::Item<'_> {}
}

/// Tuples of params are params: `(&A, &mut B, Option<&C>)`.
macro_rules! impl_query_param_tuple {
    ($($P:ident),+) => {
        impl<$($P: QueryParam),+> QueryParam for ($($P,)+) {
            type Item<'w> = ($($P::Item<'w>,)+);
            type Fetched = ($($P::Fetched,)+);

            fn matches(components: &Components) -> bool {
                $($P::matches(components))&&+
            }

            fn extract(components: &mut Components) -> Self::Fetched {
                ($($P::extract(components),)+)
            }

            #[allow(non_snake_case)]
            fn restore(fetched: Self::Fetched, components: &mut Components) {
                let ($($P,)+) = fetched;
                $($P::restore($P, components);)+
            }

            #[allow(non_snake_case)]
            fn fetch(fetched: &mut Self::Fetched) -> Self::Item<'_> {
                let ($($P,)+) = fetched;
                ($($P::fetch($P),)+)
            }
        }
    };
}

impl_query_param_tuple!(A);
impl_query_param_tuple!(A, B);
impl_query_param_tuple!(A, B, C);
impl_query_param_tuple!(A, B, C, D);
impl_query_param_tuple!(A, B, C, D, E);
impl_query_param_tuple!(A, B, C, D, E, F);
impl_query_param_tuple!(A, B, C, D, E, F, G);
impl_query_param_tuple!(A, B, C, D, E, F, G, H);

#[cfg(test)]
mod tests {
    use super::*;

    struct Pos(f32);
    struct Vel(f32);
    struct Frozen;

    fn run<Q: QueryParam>(c: &mut Components, f: impl FnOnce(Q::Item<'_>)) -> bool {
        if !Q::matches(c) {
            return false;
        }
        let mut fetched = Q::extract(c);
        f(Q::fetch(&mut fetched));
        Q::restore(fetched, c);
        true
    }

    #[test]
    fn mutable_and_shared_in_one_query() {
        let mut c = Components::new().with(Pos(1.0)).with(Vel(2.0));
        assert!(run::<(&mut Pos, &Vel)>(&mut c, |(p, v)| p.0 += v.0));
        assert_eq!(c.get::<Pos>().unwrap().0, 3.0);
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn option_param_matches_without_component() {
        let mut c = Components::new().with(Pos(0.0));
        let mut seen = None;
        assert!(run::<(&Pos, Option<&Vel>)>(&mut c, |(_, v)| seen = Some(v.is_none())));
        assert_eq!(seen, Some(true));
    }

    #[test]
    fn filters() {
        let mut c = Components::new().with(Pos(0.0)).with(Frozen);
        assert!(run::<(&Pos, With<Frozen>)>(&mut c, |_| {}));
        assert!(!run::<(&Pos, Without<Frozen>)>(&mut c, |_| {}));
        assert!(!run::<(&Pos, &Vel)>(&mut c, |_| {}));
    }

    #[test]
    #[should_panic(expected = "missing or requested twice")]
    fn same_type_twice_panics() {
        let mut c = Components::new().with(Pos(0.0));
        run::<(&Pos, &mut Pos)>(&mut c, |_| {});
    }
}
