#![forbid(unsafe_code)]

//! End-to-end tests for the validation gate.
//!
//! Validates that:
//! 1. The committed value, change detection, and notification layer agree
//!    across mixed accepted/rejected write sequences.
//! 2. Rejected writes are silent at the value layer and loud at the
//!    notification layer (the edit/revert pattern works end to end).
//! 3. Chain mutation mid-session reshapes acceptance from the next write.
//! 4. Short-circuit evaluation holds across multi-validator chains.
//! 5. Subscriptions observe every write attempt in order.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rxgate::{ValidatedCell, Validator, WriteOutcome};

// ============================================================================
// Helpers
// ============================================================================

/// A validator that records every candidate it sees.
fn spy_validator(
    log: &Rc<RefCell<Vec<i32>>>,
    verdict: impl Fn(&i32) -> bool + 'static,
) -> Validator<i32> {
    let log = Rc::clone(log);
    Validator::new(move |v| {
        log.borrow_mut().push(*v);
        verdict(v)
    })
}

/// A percentage field: integers clamped to [0, 100] by rejection.
fn percentage_cell(initial: i32) -> (ValidatedCell<i32>, Validator<i32>, Validator<i32>) {
    let cell = ValidatedCell::new(initial);
    let lower = Validator::new(|v: &i32| *v >= 0);
    let upper = Validator::new(|v: &i32| *v <= 100);
    cell.add_validator(&lower).add_validator(&upper);
    (cell, lower, upper)
}

// ============================================================================
// 1. Mixed write sequences
// ============================================================================

#[test]
fn mixed_sequence_keeps_value_and_change_flag_consistent() {
    let (cell, _lower, _upper) = percentage_cell(50);

    assert_eq!(cell.write(75), WriteOutcome::Accepted);
    assert_eq!(cell.read(), 75);
    assert!(cell.has_changed());

    assert_eq!(cell.write(150), WriteOutcome::Rejected);
    assert_eq!(cell.read(), 75);
    assert!(!cell.has_changed());

    assert_eq!(cell.write(-10), WriteOutcome::Rejected);
    assert_eq!(cell.read(), 75);
    assert!(!cell.has_changed());

    assert_eq!(cell.write(0), WriteOutcome::Accepted);
    assert_eq!(cell.read(), 0);
    assert!(cell.has_changed());

    assert_eq!(cell.write(0), WriteOutcome::Accepted);
    assert_eq!(cell.read(), 0);
    assert!(!cell.has_changed());
}

// ============================================================================
// 2. Edit/revert pattern
// ============================================================================

#[test]
fn widget_revert_on_rejected_edit() {
    // Simulates a bound text field: the widget mirrors every notification
    // into its displayed state, so a rejected edit snaps the display back
    // to the committed value.
    let (cell, _lower, _upper) = percentage_cell(40);
    let displayed = Rc::new(Cell::new(40));

    let displayed_clone = Rc::clone(&displayed);
    let _binding = cell.subscribe(move |v| displayed_clone.set(*v));

    // User types an invalid value; the widget shows it transiently.
    displayed.set(400);
    cell.write(400);
    assert_eq!(displayed.get(), 40, "display reverted to committed value");

    // A valid edit goes through.
    displayed.set(60);
    cell.write(60);
    assert_eq!(displayed.get(), 60);
    assert_eq!(cell.read(), 60);
}

#[test]
fn every_attempt_is_observable_in_order() {
    let (cell, _lower, _upper) = percentage_cell(0);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let seen_clone = Rc::clone(&seen);
    let _sub = cell.subscribe(move |v| seen_clone.borrow_mut().push(*v));

    cell.write(10); // accepted -> 10
    cell.write(999); // rejected -> refresh with 10
    cell.write(20); // accepted -> 20
    cell.write(-1); // rejected -> refresh with 20

    assert_eq!(*seen.borrow(), vec![10, 10, 20, 20]);
    assert_eq!(cell.version(), 4);
}

// ============================================================================
// 3. Chain mutation mid-session
// ============================================================================

#[test]
fn tightening_and_relaxing_the_gate() {
    let cell = ValidatedCell::new(10);
    let positive = Validator::new(|v: &i32| *v > 0);
    let small = Validator::new(|v: &i32| *v < 100);

    cell.add_validator(&positive);
    assert!(cell.write(500).is_accepted());

    cell.add_validator(&small);
    assert!(cell.write(600).is_rejected());
    assert_eq!(cell.read(), 500);

    cell.remove_validator(&small);
    assert!(cell.write(600).is_accepted());
    assert_eq!(cell.read(), 600);
}

#[test]
fn rejected_write_can_trigger_chain_relaxation() {
    // Application logic reacting to a rejected write (via notification)
    // removes the offending gate; the retry then succeeds.
    let cell = ValidatedCell::new(0);
    let gate = Validator::new(|v: &i32| *v < 10);
    cell.add_validator(&gate);

    let cell_clone = cell.clone();
    let gate_clone = gate.clone();
    let _sub = cell.subscribe(move |v| {
        // A refresh with an unchanged value after a non-zero attempt means
        // something was rejected; open the gate.
        if *v == 0 {
            cell_clone.remove_validator(&gate_clone);
        }
    });

    assert!(cell.write(50).is_rejected());
    assert_eq!(cell.validator_count(), 0);
    assert!(cell.write(50).is_accepted());
    assert_eq!(cell.read(), 50);
}

// ============================================================================
// 4. Short-circuit across longer chains
// ============================================================================

#[test]
fn rejection_position_bounds_predicate_calls() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let cell = ValidatedCell::new(0);

    let first = spy_validator(&log, |_| true);
    let second = spy_validator(&log, |v| *v < 50);
    let third = spy_validator(&log, |_| true);
    cell.add_validator(&first)
        .add_validator(&second)
        .add_validator(&third);

    // Rejected at the second link: exactly two predicates ran.
    cell.write(99);
    assert_eq!(*log.borrow(), vec![99, 99]);

    log.borrow_mut().clear();
    // Accepted: all three ran, in order.
    cell.write(7);
    assert_eq!(*log.borrow(), vec![7, 7, 7]);
}

// ============================================================================
// 5. Subscription lifecycle
// ============================================================================

#[test]
fn dropped_subscription_stops_observing() {
    let cell = ValidatedCell::new(0);
    let count = Rc::new(Cell::new(0u32));

    let count_clone = Rc::clone(&count);
    let sub = cell.subscribe(move |_| count_clone.set(count_clone.get() + 1));

    cell.write(1);
    assert_eq!(count.get(), 1);

    drop(sub);
    cell.write(2);
    assert_eq!(count.get(), 1);
}

#[test]
fn multiple_subscribers_fire_in_registration_order() {
    let cell = ValidatedCell::new(0);
    let order = Rc::new(RefCell::new(Vec::new()));

    let o1 = Rc::clone(&order);
    let _s1 = cell.subscribe(move |_| o1.borrow_mut().push(1));
    let o2 = Rc::clone(&order);
    let _s2 = cell.subscribe(move |_| o2.borrow_mut().push(2));

    let gate = Validator::new(|v: &i32| *v > 0);
    cell.add_validator(&gate);

    cell.write(5); // accepted
    cell.write(-5); // rejected: both still fire
    assert_eq!(*order.borrow(), vec![1, 2, 1, 2]);
}
