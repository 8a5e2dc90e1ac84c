//! Single-threaded reactive value holder.
//!
//! An [`Observable`] stores one value and synchronously notifies its
//! subscribers whenever that value changes. It is the dependency cell panels
//! watch (e.g. the selected scenario) and also how a controller publishes its
//! lifecycle state to the view layer.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

type Listener<T> = Rc<dyn Fn(&T)>;

struct Slots<T> {
    next_id: u64,
    listeners: Vec<(u64, Listener<T>)>,
}

struct Shared<T> {
    value: RefCell<T>,
    slots: RefCell<Slots<T>>,
    notifying: Cell<bool>,
    dirty: Cell<bool>,
}

/// Reactive single-value cell. Clones share the same value and subscribers.
pub struct Observable<T> {
    shared: Rc<Shared<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<T: Default + Clone + PartialEq + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &*self.shared.value.borrow())
            .field("subscribers", &self.shared.slots.borrow().listeners.len())
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    pub fn new(initial: T) -> Self {
        Self {
            shared: Rc::new(Shared {
                value: RefCell::new(initial),
                slots: RefCell::new(Slots {
                    next_id: 0,
                    listeners: Vec::new(),
                }),
                notifying: Cell::new(false),
                dirty: Cell::new(false),
            }),
        }
    }

    /// Current value (cloned).
    pub fn get(&self) -> T {
        self.shared.value.borrow().clone()
    }

    /// Borrow the current value without cloning it.
    ///
    /// The closure must not call [`Observable::set`] on the same cell.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.shared.value.borrow())
    }

    /// Replace the value, notifying subscribers if it changed.
    ///
    /// Returns `true` when the value differed from the previous one.
    /// Called from inside a listener of this same cell, the new value is
    /// stored immediately and delivered in a further pass once the running
    /// one ends. Several nested sets within one pass collapse into one
    /// delivery of the latest value; intermediate values may be skipped.
    pub fn set(&self, value: T) -> bool {
        {
            let mut current = self.shared.value.borrow_mut();
            if *current == value {
                return false;
            }
            *current = value;
        }

        if self.shared.notifying.get() {
            self.shared.dirty.set(true);
        } else {
            self.notify();
        }
        true
    }

    fn notify(&self) {
        self.shared.notifying.set(true);
        loop {
            self.shared.dirty.set(false);
            // Snapshot listeners and value so no borrow is held while they run.
            let listeners: Vec<Listener<T>> = self
                .shared
                .slots
                .borrow()
                .listeners
                .iter()
                .map(|(_, listener)| Rc::clone(listener))
                .collect();
            let value = self.get();
            for listener in listeners {
                listener(&value);
            }
            if !self.shared.dirty.get() {
                break;
            }
        }
        self.shared.notifying.set(false);
    }

    /// Register a change listener.
    ///
    /// The listener is not invoked with the current value. It stays
    /// registered until the returned [`Subscription`] is dropped or
    /// explicitly unsubscribed.
    pub fn subscribe(&self, listener: impl Fn(&T) + 'static) -> Subscription {
        let id = {
            let mut slots = self.shared.slots.borrow_mut();
            let id = slots.next_id;
            slots.next_id += 1;
            slots.listeners.push((id, Rc::new(listener)));
            id
        };

        let weak = Rc::downgrade(&self.shared);
        Subscription::new(move || {
            if let Some(shared) = weak.upgrade() {
                shared
                    .slots
                    .borrow_mut()
                    .listeners
                    .retain(|(listener_id, _)| *listener_id != id);
            }
        })
    }

    pub fn subscriber_count(&self) -> usize {
        self.shared.slots.borrow().listeners.len()
    }
}

/// Registration handle returned by [`Observable::subscribe`].
///
/// Dropping it deregisters the listener.
#[must_use = "dropping a Subscription immediately deregisters its listener"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub(crate) fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Deregister now.
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    /// Keep the listener registered for the lifetime of the cell.
    pub fn detach(mut self) {
        self.cancel = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder<T: Clone + 'static>() -> (Rc<RefCell<Vec<T>>>, impl Fn(&T) + 'static) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        (seen, move |v: &T| sink.borrow_mut().push(v.clone()))
    }

    #[test]
    fn notifies_only_on_change() {
        let cell = Observable::new(1);
        let (seen, listener) = recorder::<i32>();
        let _sub = cell.subscribe(listener);

        assert!(!cell.set(1));
        assert!(cell.set(2));
        assert!(cell.set(3));
        assert!(!cell.set(3));

        assert_eq!(*seen.borrow(), vec![2, 3]);
        assert_eq!(cell.get(), 3);
    }

    #[test]
    fn dropping_subscription_deregisters() {
        let cell = Observable::new(None::<u32>);
        let (seen, listener) = recorder::<Option<u32>>();
        let sub = cell.subscribe(listener);
        assert_eq!(cell.subscriber_count(), 1);

        cell.set(Some(1));
        drop(sub);
        assert_eq!(cell.subscriber_count(), 0);
        cell.set(Some(2));

        assert_eq!(*seen.borrow(), vec![Some(1)]);
    }

    #[test]
    fn detached_subscription_stays() {
        let cell = Observable::new(0);
        let (seen, listener) = recorder::<i32>();
        cell.subscribe(listener).detach();
        cell.set(5);
        assert_eq!(*seen.borrow(), vec![5]);
        assert_eq!(cell.subscriber_count(), 1);
    }

    #[test]
    fn nested_set_is_delivered_in_order() {
        let cell = Observable::new(0);
        let (seen, listener) = recorder::<i32>();

        let inner = cell.clone();
        let _bump = cell.subscribe(move |v| {
            if *v == 1 {
                inner.set(2);
            }
        });
        let _rec = cell.subscribe(listener);

        cell.set(1);

        assert_eq!(cell.get(), 2);
        assert_eq!(*seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn nested_sets_in_one_pass_deliver_latest() {
        let cell = Observable::new(0);
        let (seen, listener) = recorder::<i32>();

        let inner = cell.clone();
        let _bump = cell.subscribe(move |v| {
            if *v == 1 {
                inner.set(2);
                inner.set(3);
            }
        });
        let _rec = cell.subscribe(listener);

        cell.set(1);

        assert_eq!(cell.get(), 3);
        assert_eq!(*seen.borrow(), vec![1, 3]);
    }

    #[test]
    fn listener_may_read_cell() {
        let cell = Observable::new(String::from("a"));
        let reader = cell.clone();
        let lengths = Rc::new(RefCell::new(Vec::new()));
        let out = Rc::clone(&lengths);
        let _sub = cell.subscribe(move |_| out.borrow_mut().push(reader.with(|s| s.len())));

        cell.set("abc".to_string());
        assert_eq!(*lengths.borrow(), vec![3]);
    }
}
