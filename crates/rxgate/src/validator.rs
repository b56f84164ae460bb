#![forbid(unsafe_code)]

//! Identity-carrying validator predicates.

use std::rc::Rc;

/// Predicate signature: `true` accepts the candidate, `false` rejects it.
type PredicateFn<T> = dyn Fn(&T) -> bool;

/// A validator predicate with clone-stable identity.
///
/// A `Validator` wraps a predicate function in shared storage. Clones share
/// the underlying allocation and therefore compare identical under
/// [`ptr_eq`](Validator::ptr_eq); two validators built from separate
/// [`new`](Validator::new) calls are never identical, even when constructed
/// from the same closure text. Chain membership in
/// [`ValidatedCell`](crate::ValidatedCell) is decided by this identity, not
/// by the predicate's behavior.
///
/// Predicates must be synchronous and should be pure: the chain contract
/// guarantees registration-order evaluation, so a predicate may assume that
/// earlier, more specific checks have already narrowed the candidate.
pub struct Validator<T> {
    predicate: Rc<PredicateFn<T>>,
}

impl<T> Clone for Validator<T> {
    fn clone(&self) -> Self {
        Self {
            predicate: Rc::clone(&self.predicate),
        }
    }
}

impl<T> std::fmt::Debug for Validator<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("predicate", &Rc::as_ptr(&self.predicate))
            .finish()
    }
}

impl<T> Validator<T> {
    /// Wrap a predicate function.
    ///
    /// Only values callable as `Fn(&T) -> bool` are accepted, so an
    /// ill-formed validator is a compile error rather than a runtime one.
    #[must_use]
    pub fn new(predicate: impl Fn(&T) -> bool + 'static) -> Self {
        Self {
            predicate: Rc::new(predicate),
        }
    }

    /// Run the predicate against a candidate value.
    #[must_use]
    pub fn check(&self, candidate: &T) -> bool {
        (self.predicate)(candidate)
    }

    /// Whether two handles share one underlying predicate allocation.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.predicate, &other.predicate)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
