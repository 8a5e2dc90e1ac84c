//! Contracts between a controller and the value it depends on.

use std::fmt::Debug;
use std::hash::Hash;

use hq_core::{Scenario, ScenarioId};

use crate::observable::{Observable, Subscription};

/// Something a controller can watch: readable now, and pushes changes.
pub trait Dependency<D> {
    /// Current value, `None` when nothing is selected.
    fn current(&self) -> Option<D>;

    /// Register the change callback. Deregistered when the handle drops.
    fn on_change(&self, listener: Box<dyn Fn(Option<D>)>) -> Subscription;
}

impl<D: Clone + PartialEq + 'static> Dependency<D> for Observable<Option<D>> {
    fn current(&self) -> Option<D> {
        self.get()
    }

    fn on_change(&self, listener: Box<dyn Fn(Option<D>)>) -> Subscription {
        self.subscribe(move |value: &Option<D>| listener(value.clone()))
    }
}

/// Comparable identity of a dependency value, used as a cache key.
pub trait DependencyKey {
    type Key: Clone + Eq + Hash + Debug + 'static;

    fn key(&self) -> Self::Key;
}

impl DependencyKey for Scenario {
    type Key = ScenarioId;

    fn key(&self) -> ScenarioId {
        self.id
    }
}

impl DependencyKey for ScenarioId {
    type Key = ScenarioId;

    fn key(&self) -> ScenarioId {
        *self
    }
}

macro_rules! self_keyed {
    ($($ty:ty),*) => {
        $(
            impl DependencyKey for $ty {
                type Key = $ty;

                fn key(&self) -> $ty {
                    self.clone()
                }
            }
        )*
    };
}

self_keyed!(u32, u64, i64, String);
