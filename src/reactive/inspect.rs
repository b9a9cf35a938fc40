//! Process-wide inspect slot.
//!
//! The most recently published piece of reactive state can be looked at from the
//! browser console through the exported `app_state()` function. Nothing in the crate
//! reads this slot for correctness.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

pub(crate) trait Inspect {
    fn describe(&self) -> String;
}

thread_local! {
    static LAST: RefCell<Option<Weak<dyn Inspect>>> = const { RefCell::new(None) };
}

pub(crate) fn publish(target: Weak<dyn Inspect>) {
    LAST.with(|slot| *slot.borrow_mut() = Some(target));
}

/// Debug rendering of the last published state, if it is still alive.
pub fn snapshot() -> Option<String> {
    let target: Option<Rc<dyn Inspect>> =
        LAST.with(|slot| slot.borrow().as_ref().and_then(Weak::upgrade));
    target.map(|t| t.describe())
}
