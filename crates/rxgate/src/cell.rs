#![forbid(unsafe_code)]

//! The validation-gated cell.
//!
//! # Design
//!
//! [`ValidatedCell<T>`] owns an [`Observable<T>`] holding the committed value
//! and a chain of [`Validator`] handles in registration order. Every write
//! attempt snapshots the committed value (for change detection), runs the
//! chain left to right with short-circuit evaluation, and then either commits
//! the candidate or refreshes observers with the unchanged value. Rejection
//! is silent at the value layer and loud at the notification layer: bound
//! consumers always get a callback per write attempt, which lets them revert
//! any stale candidate state they are displaying.
//!
//! The chain runs against a snapshot of the validator list, so predicates and
//! observer callbacks are free to add or remove validators mid-write; the
//! mutation takes effect from the next write attempt.
//!
//! # Invariants
//!
//! 1. An empty chain accepts every candidate (vacuous truth); the seed value
//!    never runs through the chain at all.
//! 2. The first rejecting validator stops evaluation; later validators are
//!    not invoked for that attempt.
//! 3. A validator identity appears at most once in the chain; re-adding is a
//!    no-op, as is removing an absent one.
//! 4. Every write attempt bumps the observable version exactly once and
//!    fires each subscriber exactly once.
//!
//! # Failure Modes
//!
//! - **Predicate panics**: the write is abandoned with the committed value
//!   untouched and no notification fired; the cell remains usable (the
//!   in-write flag is cleared on unwind).
//! - **Re-entrant write**: calling [`write`](ValidatedCell::write) from
//!   inside a predicate or a subscriber callback panics immediately instead
//!   of corrupting the in-flight attempt.

use std::cell::RefCell;
use std::rc::Rc;

use rxgate_reactive::{Observable, Subscription};

use crate::validator::Validator;

/// Result of one write attempt: the chain either accepted the candidate and
/// it was committed, or rejected it and the committed value stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Every validator accepted; the candidate is now the committed value.
    Accepted,
    /// Some validator rejected; the committed value is unchanged.
    Rejected,
}

impl WriteOutcome {
    /// Whether the candidate was committed.
    #[must_use]
    pub const fn is_accepted(self) -> bool {
        matches!(self, Self::Accepted)
    }

    /// Whether the candidate was dropped.
    #[must_use]
    pub const fn is_rejected(self) -> bool {
        matches!(self, Self::Rejected)
    }
}

/// Shared interior for [`ValidatedCell<T>`].
struct CellInner<T> {
    /// Committed value as of the start of the most recent write attempt.
    previous: T,
    /// Validator chain in registration order, unique by identity.
    chain: Vec<Validator<T>>,
    /// Set for the duration of a write attempt to reject re-entrant writes.
    writing: bool,
}

/// Clears the in-write flag when a write attempt ends, including by unwind.
struct WriteGuard<T> {
    inner: Rc<RefCell<CellInner<T>>>,
}

impl<T> Drop for WriteGuard<T> {
    fn drop(&mut self) {
        self.inner.borrow_mut().writing = false;
    }
}

/// A reactive value whose writes are gated by a chain of validators.
///
/// Cloning a `ValidatedCell` creates a new handle to the **same** inner
/// state; subscriptions and validators registered through any handle are
/// visible through all of them.
///
/// # Invariants
///
/// 1. `read()` only ever returns values the full chain accepted (or the
///    seed, which bypasses the chain by construction).
/// 2. `has_changed()` reflects exactly the most recent write attempt.
/// 3. Chain order is registration order.
pub struct ValidatedCell<T> {
    value: Observable<T>,
    inner: Rc<RefCell<CellInner<T>>>,
}

impl<T> Clone for ValidatedCell<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for ValidatedCell<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("ValidatedCell")
            .field("value", &self.value)
            .field("previous", &inner.previous)
            .field("validators", &inner.chain.len())
            .finish()
    }
}

impl<T> ValidatedCell<T> {
    /// Append a validator to the end of the chain.
    ///
    /// If `validator` is already present (by identity) the chain is left
    /// unchanged. Returns `&self` so registrations can be chained fluently.
    pub fn add_validator(&self, validator: &Validator<T>) -> &Self {
        let mut inner = self.inner.borrow_mut();
        if !inner.chain.iter().any(|v| v.ptr_eq(validator)) {
            inner.chain.push(validator.clone());
            #[cfg(feature = "tracing")]
            Self::log_chain("add", inner.chain.len());
        }
        self
    }

    /// Remove a validator from the chain.
    ///
    /// Removes the single identity-matching entry, preserving the relative
    /// order of the remainder; removing an absent validator is a no-op.
    /// Returns `&self` for fluent chaining.
    pub fn remove_validator(&self, validator: &Validator<T>) -> &Self {
        let mut inner = self.inner.borrow_mut();
        if let Some(index) = inner.chain.iter().position(|v| v.ptr_eq(validator)) {
            inner.chain.remove(index);
            #[cfg(feature = "tracing")]
            Self::log_chain("remove", inner.chain.len());
        }
        self
    }

    /// Number of validators currently in the chain.
    #[must_use]
    pub fn validator_count(&self) -> usize {
        self.inner.borrow().chain.len()
    }

    #[cfg(feature = "tracing")]
    fn log_chain(op: &str, chain_len: usize) {
        tracing::debug!(message = "cell.chain", op, chain_len);
    }
}

impl<T: Clone + 'static> ValidatedCell<T> {
    /// Create a cell seeded with `initial`.
    ///
    /// The seed is stored directly, never through [`write`](Self::write), so
    /// no validator ever sees it (a cell can legally hold a seed its own
    /// chain would reject). `previous` starts equal to the seed, making
    /// [`has_changed`](Self::has_changed) `false` until the first accepted
    /// write that actually changes the value.
    #[must_use]
    pub fn new(initial: T) -> Self {
        Self {
            value: Observable::new(initial.clone()),
            inner: Rc::new(RefCell::new(CellInner {
                previous: initial,
                chain: Vec::new(),
                writing: false,
            })),
        }
    }

    /// Get a clone of the committed value. No side effects.
    #[must_use]
    pub fn read(&self) -> T {
        self.value.get()
    }

    /// Access the committed value by reference without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.value.with(f)
    }

    /// Subscribe to the cell's notifications.
    ///
    /// The callback fires on every write attempt: with the new value after
    /// an accepted write, and with the unchanged committed value after a
    /// rejected one. Drop the returned guard to unsubscribe.
    #[must_use = "dropping the Subscription unsubscribes immediately"]
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        self.value.subscribe(callback)
    }

    /// Version of the wrapped observable. Bumps once per write attempt.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.value.version()
    }
}

impl<T: Clone + PartialEq + 'static> ValidatedCell<T> {
    /// Attempt to write `candidate` through the validator chain.
    ///
    /// The chain is evaluated in registration order with short-circuit
    /// semantics: the first validator returning `false` rejects the
    /// candidate and later validators are not consulted. An empty chain
    /// accepts everything.
    ///
    /// On acceptance the candidate becomes the committed value and
    /// subscribers are notified with it; if the accepted candidate equals
    /// the committed value, subscribers get a refresh with the (identical)
    /// value instead, so either way exactly one notification fires. On
    /// rejection the committed value is untouched and subscribers get a
    /// refresh with it: rejection is observable at the notification layer
    /// even though it is silent at the value layer.
    ///
    /// # Panics
    ///
    /// Panics if called re-entrantly from inside a validator predicate or a
    /// subscriber callback.
    pub fn write(&self, candidate: T) -> WriteOutcome {
        let chain = {
            let mut inner = self.inner.borrow_mut();
            assert!(
                !inner.writing,
                "ValidatedCell::write called re-entrantly from a validator or subscriber"
            );
            inner.writing = true;
            inner.previous = self.value.get();
            inner.chain.clone()
        };
        let _guard = WriteGuard {
            inner: Rc::clone(&self.inner),
        };

        let accepted = chain.iter().all(|validator| validator.check(&candidate));
        let outcome = if accepted {
            if !self.value.set(candidate) {
                // Accepted but equal to the committed value: the observable
                // deduped the set, so emit the refresh ourselves to keep the
                // one-notification-per-attempt guarantee.
                self.value.touch();
            }
            WriteOutcome::Accepted
        } else {
            self.value.touch();
            WriteOutcome::Rejected
        };
        #[cfg(feature = "tracing")]
        tracing::debug!(message = "cell.write", ?outcome, chain_len = chain.len());
        outcome
    }

    /// Whether the most recent write attempt changed the committed value.
    ///
    /// `false` after a rejected write, after an accepted write of an equal
    /// value, and before any write has happened at all.
    #[must_use]
    pub fn has_changed(&self) -> bool {
        let inner = self.inner.borrow();
        self.value.with(|current| *current != inner.previous)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
