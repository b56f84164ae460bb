#![forbid(unsafe_code)]

//! Shared, version-tracked observable values.
//!
//! # Design
//!
//! [`Observable<T>`] wraps a value and its subscriber list in shared,
//! reference-counted storage. Writes that change the value bump a monotone
//! version counter and invoke every live subscriber, in registration order,
//! with a reference to the new value. [`touch()`](Observable::touch) runs the
//! same notification cycle without writing, which lets a wrapper signal
//! "re-read me" even though the value is unchanged.
//!
//! Subscribers are held as `Weak` references; the strong reference lives in
//! the [`Subscription`] guard returned by [`subscribe()`](Observable::subscribe).
//! Dead entries are swept lazily at the start of each notification cycle.
//!
//! # Invariants
//!
//! 1. `version()` increments by exactly 1 per notification cycle.
//! 2. Subscribers run in registration order.
//! 3. `set()` with a value equal to the current one is a no-op.
//! 4. A dropped [`Subscription`] never fires again.
//!
//! # Failure Modes
//!
//! - **Subscriber panics**: the value and version are already committed when
//!   callbacks run, so the observable stays consistent; remaining subscribers
//!   in that cycle are skipped by the unwind.
//! - **Subscriber mutates the observable**: the notification cycle iterates a
//!   snapshot taken before the first callback, so a `set` from inside a
//!   callback starts a fresh, well-formed cycle rather than corrupting the
//!   current one.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Subscriber callback signature: invoked with the value after each
/// notification-worthy event.
type SubscriberFn<T> = dyn Fn(&T);

/// Shared interior for [`Observable<T>`].
struct ObservableInner<T> {
    /// The current value.
    value: T,
    /// Monotonically increasing version, bumped once per notification cycle.
    version: u64,
    /// Weak handles to subscriber callbacks, in registration order.
    /// Dead entries are swept lazily during notification.
    subscribers: Vec<Weak<SubscriberFn<T>>>,
}

/// A shared, version-tracked value wrapper with change notification.
///
/// Cloning an `Observable` creates a new handle to the **same** inner state.
///
/// # Invariants
///
/// 1. `version` increments by 1 per notification cycle.
/// 2. Subscribers are notified in registration order.
/// 3. Equal-value `set` calls do not notify.
pub struct Observable<T> {
    inner: Rc<RefCell<ObservableInner<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observable")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .field("subscribers", &inner.subscribers.len())
            .finish()
    }
}

/// RAII guard owning a subscriber callback.
///
/// The observable holds only a `Weak` reference to the callback; dropping
/// the `Subscription` kills the callback before the next notification cycle.
pub struct Subscription {
    /// Keeps the callback allocation alive. Type-erased so guards from
    /// observables of different value types can live in one collection.
    _callback: Box<dyn std::any::Any>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

impl<T: 'static> Observable<T> {
    /// Create an observable seeded with `value`. Seeding does not notify.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ObservableInner {
                value,
                version: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Access the current value by reference without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Register a subscriber callback.
    ///
    /// The callback fires on every notification cycle until the returned
    /// [`Subscription`] is dropped. Callbacks run in registration order.
    #[must_use = "dropping the Subscription unsubscribes immediately"]
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let strong: Rc<SubscriberFn<T>> = Rc::new(callback);
        self.inner
            .borrow_mut()
            .subscribers
            .push(Rc::downgrade(&strong));
        Subscription {
            _callback: Box::new(strong),
        }
    }

    /// Current version number. Increments by 1 per notification cycle.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Number of live subscribers. Sweeps dead entries as a side effect.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        let mut inner = self.inner.borrow_mut();
        inner.subscribers.retain(|weak| weak.strong_count() > 0);
        inner.subscribers.len()
    }
}

impl<T: Clone + 'static> Observable<T> {
    /// Get a clone of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Notify all subscribers with the current value without writing.
    ///
    /// Bumps the version: a `touch` is a full notification cycle, just not a
    /// value change. This is the refresh path a wrapper uses to tell
    /// observers to re-read state it declined to modify.
    pub fn touch(&self) {
        let (callbacks, value) = {
            let mut inner = self.inner.borrow_mut();
            inner.version += 1;
            #[cfg(feature = "tracing")]
            tracing::trace!(message = "observable.touch", version = inner.version);
            (Self::live_callbacks(&mut inner), inner.value.clone())
        };
        for callback in &callbacks {
            callback(&value);
        }
    }

    /// Snapshot live subscriber callbacks, sweeping dead entries.
    ///
    /// Called with the inner borrow held; the returned strong references are
    /// invoked only after the borrow is released.
    fn live_callbacks(inner: &mut ObservableInner<T>) -> Vec<Rc<SubscriberFn<T>>> {
        inner.subscribers.retain(|weak| weak.strong_count() > 0);
        inner.subscribers.iter().filter_map(Weak::upgrade).collect()
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    /// Write a value, notifying subscribers if it differs from the current
    /// one.
    ///
    /// Returns `true` if the value changed (version bumped, subscribers
    /// notified with the new value) and `false` for an equal-value no-op.
    pub fn set(&self, value: T) -> bool {
        let (callbacks, value) = {
            let mut inner = self.inner.borrow_mut();
            if inner.value == value {
                return false;
            }
            inner.value = value;
            inner.version += 1;
            #[cfg(feature = "tracing")]
            tracing::trace!(message = "observable.set", version = inner.version);
            (Self::live_callbacks(&mut inner), inner.value.clone())
        };
        for callback in &callbacks {
            callback(&value);
        }
        true
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
