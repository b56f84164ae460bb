#![forbid(unsafe_code)]

//! Validation-gated reactive cells.
//!
//! This crate provides [`ValidatedCell`], a wrapper around an observable
//! value that gates every write through an ordered chain of validator
//! predicates:
//!
//! - [`Validator`]: A cheaply cloneable, identity-carrying predicate handle.
//! - [`ValidatedCell`]: The cell itself: committed value, validator chain,
//!   and change detection.
//! - [`WriteOutcome`]: The two possible results of a write attempt.
//!
//! # Architecture
//!
//! The cell delegates storage and notification to
//! [`Observable`](rxgate_reactive::Observable) and adds the write-time
//! validation pipeline on top. A write that every validator accepts is
//! committed and observers see the new value; a write any validator rejects
//! leaves the committed value untouched but still refreshes observers with
//! the unchanged value, so a bound consumer can discard stale candidate
//! state (revert a widget's displayed input back to the committed value).
//!
//! # Invariants
//!
//! 1. Validators run in registration order, left to right, short-circuiting
//!    on the first rejection.
//! 2. A validator identity appears at most once in the chain.
//! 3. A rejected write never mutates the committed value.
//! 4. Every write attempt produces exactly one observer notification.
//! 5. The seed value passed at construction never runs through the chain.
//!
//! # Example
//!
//! ```
//! use rxgate::{ValidatedCell, Validator};
//!
//! let cell = ValidatedCell::new(123);
//! let gate = Validator::new(|v: &i32| *v > 100);
//! cell.add_validator(&gate);
//!
//! assert!(cell.write(50).is_rejected());
//! assert_eq!(cell.read(), 123);
//! assert!(!cell.has_changed());
//!
//! assert!(cell.write(500).is_accepted());
//! assert_eq!(cell.read(), 500);
//! assert!(cell.has_changed());
//! ```

pub mod cell;
pub mod validator;

pub use cell::{ValidatedCell, WriteOutcome};
pub use validator::Validator;

// Re-export the reactive primitives so consumers need only this crate.
pub use rxgate_reactive::{Observable, Subscription};
