#![forbid(unsafe_code)]

//! Reactive value primitive for rxgate.
//!
//! This crate provides the change-notification substrate the validated cell
//! in `rxgate` is built on:
//!
//! - [`Observable`]: A shared, version-tracked value wrapper with change
//!   notification via subscriber callbacks.
//! - [`Subscription`]: RAII guard that automatically unsubscribes on drop.
//!
//! # Architecture
//!
//! `Observable<T>` uses `Rc<RefCell<..>>` for single-threaded shared
//! ownership. Subscribers are stored as `Weak` function pointers and cleaned
//! up lazily during notification.
//!
//! # Invariants
//!
//! 1. Version increments exactly once per notification cycle (a `set` that
//!    changes the value, or a `touch`).
//! 2. Subscribers are notified in registration order.
//! 3. Setting a value equal to the current value is a no-op (no version bump,
//!    no notifications).
//! 4. Dropping a [`Subscription`] removes the callback before the next
//!    notification cycle.
//! 5. No `RefCell` borrow is held while subscriber callbacks run, so a
//!    callback may read the observable or register/drop subscriptions.

pub mod observable;

pub use observable::{Observable, Subscription};
