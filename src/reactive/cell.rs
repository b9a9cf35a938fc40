use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

use super::inspect::{self, Inspect};

type OnChange<T> = Box<dyn FnMut(&T, &Reset<T>)>;

struct Slot<T> {
    value: RefCell<Option<T>>,
    on_change: RefCell<Option<OnChange<T>>>,
    // Writes made from inside the callback, delivered once it returns.
    pending: RefCell<VecDeque<T>>,
    dispatching: Cell<bool>,
}

impl<T: fmt::Debug> Inspect for Slot<T> {
    fn describe(&self) -> String {
        match self.value.try_borrow() {
            Ok(value) => format!("{:?}", *value),
            Err(_) => "<busy>".to_string(),
        }
    }
}

/// A single reactive slot.
///
/// Every `set` stores the value and then runs the change callback, even when the
/// new value equals the old one. The callback receives a [`Reset`] handle that
/// clears the slot back to `None`.
///
/// Clones share the same slot.
pub struct ReactiveCell<T> {
    slot: Rc<Slot<T>>,
}

impl<T> Clone for ReactiveCell<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ReactiveCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactiveCell")
            .field("value", &self.slot.describe())
            .field("has_callback", &self.slot.on_change.borrow().is_some())
            .finish()
    }
}

impl<T: fmt::Debug + 'static> ReactiveCell<T> {
    pub fn new(initial: T) -> Self {
        Self::build(initial, None)
    }

    pub fn with_callback(initial: T, on_change: impl FnMut(&T, &Reset<T>) + 'static) -> Self {
        Self::build(initial, Some(Box::new(on_change)))
    }

    fn build(initial: T, on_change: Option<OnChange<T>>) -> Self {
        let slot = Rc::new(Slot {
            value: RefCell::new(Some(initial)),
            on_change: RefCell::new(on_change),
            pending: RefCell::new(VecDeque::new()),
            dispatching: Cell::new(false),
        });
        let weak: Weak<dyn Inspect> = Rc::downgrade(&slot) as Weak<dyn Inspect>;
        inspect::publish(weak);
        Self { slot }
    }
}

impl<T: Clone> ReactiveCell<T> {
    /// Current value, or `None` after a reset.
    pub fn get(&self) -> Option<T> {
        self.slot.value.borrow().clone()
    }

    /// Stores `value` and runs the change callback with it.
    ///
    /// A write issued from inside the callback is stored immediately but its
    /// callback run is deferred until the running one returns.
    pub fn set(&self, value: T) {
        *self.slot.value.borrow_mut() = Some(value.clone());

        if self.slot.dispatching.get() {
            self.slot.pending.borrow_mut().push_back(value);
            return;
        }
        let Some(mut on_change) = self.slot.on_change.borrow_mut().take() else {
            return;
        };

        self.slot.dispatching.set(true);
        let reset = Reset {
            slot: Rc::downgrade(&self.slot),
        };
        let mut next = Some(value);
        while let Some(current) = next {
            on_change(&current, &reset);
            next = self.slot.pending.borrow_mut().pop_front();
        }
        self.slot.dispatching.set(false);

        *self.slot.on_change.borrow_mut() = Some(on_change);
    }
}

impl<T> ReactiveCell<T> {
    pub fn with<R>(&self, f: impl FnOnce(Option<&T>) -> R) -> R {
        f(self.slot.value.borrow().as_ref())
    }

    pub fn is_reset(&self) -> bool {
        self.slot.value.borrow().is_none()
    }
}

/// Clears a cell from inside its own change callback.
pub struct Reset<T> {
    slot: Weak<Slot<T>>,
}

impl<T> Reset<T> {
    pub fn reset(&self) {
        if let Some(slot) = self.slot.upgrade() {
            *slot.value.borrow_mut() = None;
        }
    }
}

impl<T> fmt::Debug for Reset<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reset").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_returns_initial_value() {
        let cell = ReactiveCell::new(3u8);
        assert_eq!(cell.get(), Some(3));
        assert!(!cell.is_reset());
    }

    #[test]
    fn test_callback_once_per_write_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        let cell = ReactiveCell::with_callback(0i32, move |v, _| log.borrow_mut().push(*v));

        for v in [4, 4, 7, -1, 4] {
            cell.set(v);
        }
        assert_eq!(*seen.borrow(), vec![4, 4, 7, -1, 4]);
        assert_eq!(cell.get(), Some(4));
    }

    #[test]
    fn test_reset_clears_slot() {
        let cell = ReactiveCell::with_callback(String::from("a"), |_, reset| reset.reset());
        cell.set("b".to_string());
        assert_eq!(cell.get(), None);
        assert!(cell.is_reset());

        cell.with(|v| assert!(v.is_none()));
    }

    #[test]
    fn test_write_without_callback() {
        let cell = ReactiveCell::new(vec![1, 2]);
        cell.set(vec![3]);
        assert_eq!(cell.get(), Some(vec![3]));
    }

    #[test]
    fn test_reentrant_write_is_deferred_not_recursive() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let depth = Rc::new(Cell::new(0u32));
        let handle: Rc<RefCell<Option<ReactiveCell<u32>>>> = Rc::new(RefCell::new(None));

        let (log, d, h) = (Rc::clone(&seen), Rc::clone(&depth), Rc::clone(&handle));
        let cell = ReactiveCell::with_callback(0u32, move |v, _| {
            d.set(d.get() + 1);
            assert_eq!(d.get(), 1, "callback must not recurse");
            log.borrow_mut().push(*v);
            if *v < 3 {
                if let Some(cell) = h.borrow().as_ref() {
                    cell.set(v + 1);
                }
            }
            d.set(d.get() - 1);
        });
        *handle.borrow_mut() = Some(cell.clone());

        cell.set(1);
        assert_eq!(*seen.borrow(), vec![1, 2, 3]);
        assert_eq!(cell.get(), Some(3));
    }

    #[test]
    fn test_clones_share_slot() {
        let a = ReactiveCell::new('x');
        let b = a.clone();
        b.set('y');
        assert_eq!(a.get(), Some('y'));
    }
}
