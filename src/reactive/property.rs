use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use crate::error::SubscriberError;
use crate::time;

/// How long `history()` waits before resolving.
pub const HISTORY_DELAY: Duration = Duration::from_millis(1000);

pub type Subscriber<T> = Box<dyn FnMut(&T) -> Result<(), SubscriberError>>;

/// A subscriber that failed while handling one write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberFailure {
    /// Position in subscription order.
    pub index: usize,
    pub error: SubscriberError,
}

/// Outcome of a `set`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notification {
    /// Subscriber calls made, summed over every write this call delivered.
    pub delivered: usize,
    pub failures: Vec<SubscriberFailure>,
    /// The write happened during another notification and was queued behind it.
    pub deferred: bool,
}

impl Notification {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

struct Inner<T> {
    value: RefCell<T>,
    history: RefCell<Vec<T>>,
    subscribers: RefCell<Vec<Subscriber<T>>>,
    pending: RefCell<VecDeque<T>>,
    notifying: Cell<bool>,
    history_delay: Duration,
}

/// Observable value with many subscribers and an append-only write history.
///
/// Subscribers run synchronously in the order they were added. One failing
/// subscriber does not stop the others; its error is logged and returned in the
/// [`Notification`]. Subscribers cannot be removed.
pub struct Reactive<T> {
    inner: Rc<Inner<T>>,
}

impl<T> Clone for Reactive<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Reactive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reactive")
            .field("value", &self.inner.value.borrow())
            .field("writes", &self.inner.history.borrow().len())
            .field("subscribers", &self.inner.subscribers.borrow().len())
            .finish()
    }
}

impl<T: Clone + 'static> Reactive<T> {
    pub fn new(initial: T) -> Self {
        Self::with_history_delay(initial, HISTORY_DELAY)
    }

    pub fn with_history_delay(initial: T, history_delay: Duration) -> Self {
        Self {
            inner: Rc::new(Inner {
                value: RefCell::new(initial),
                history: RefCell::new(Vec::new()),
                subscribers: RefCell::new(Vec::new()),
                pending: RefCell::new(VecDeque::new()),
                notifying: Cell::new(false),
                history_delay,
            }),
        }
    }

    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Stores the value, records it in the history and notifies every subscriber.
    pub fn set(&self, value: T) -> Notification {
        *self.inner.value.borrow_mut() = value.clone();
        self.inner.history.borrow_mut().push(value.clone());

        if self.inner.notifying.get() {
            self.inner.pending.borrow_mut().push_back(value);
            return Notification {
                deferred: true,
                ..Notification::default()
            };
        }

        let mut subscribers = std::mem::take(&mut *self.inner.subscribers.borrow_mut());
        self.inner.notifying.set(true);

        let mut report = Notification::default();
        let mut next = Some(value);
        while let Some(current) = next {
            for (index, subscriber) in subscribers.iter_mut().enumerate() {
                report.delivered += 1;
                if let Err(error) = subscriber(&current) {
                    log::warn!("subscriber #{index} failed: {error}");
                    report.failures.push(SubscriberFailure { index, error });
                }
            }
            next = self.inner.pending.borrow_mut().pop_front();
        }

        self.inner.notifying.set(false);
        // Keep subscribers added during notification, after the existing ones.
        let mut slot = self.inner.subscribers.borrow_mut();
        let added = std::mem::take(&mut *slot);
        subscribers.extend(added);
        *slot = subscribers;

        report
    }

    /// Appends subscribers in the given order.
    pub fn subscribe<I>(&self, subscribers: I)
    where
        I: IntoIterator<Item = Subscriber<T>>,
    {
        self.inner.subscribers.borrow_mut().extend(subscribers);
    }

    /// Appends a subscriber that cannot fail.
    pub fn subscribe_fn(&self, mut f: impl FnMut(&T) + 'static) {
        self.subscribe([Box::new(move |v: &T| {
            f(v);
            Ok(())
        }) as Subscriber<T>]);
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }

    /// Every value written so far, in write order.
    ///
    /// The snapshot is taken when this is called; the future then waits out the
    /// property's history delay before yielding it.
    pub fn history(&self) -> impl Future<Output = Vec<T>> + 'static {
        let snapshot = self.inner.history.borrow().clone();
        let delay = self.inner.history_delay;
        async move {
            time::sleep(delay).await;
            snapshot
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder(log: &Rc<RefCell<Vec<String>>>, name: &'static str) -> Subscriber<i32> {
        let log = Rc::clone(log);
        Box::new(move |v: &i32| {
            log.borrow_mut().push(format!("{name}:{v}"));
            Ok(())
        })
    }

    #[test]
    fn test_value_before_and_after_write() {
        let prop = Reactive::new(10);
        assert_eq!(prop.get(), 10);
        prop.set(11);
        assert_eq!(prop.get(), 11);
    }

    #[test]
    fn test_subscribers_run_in_subscription_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let prop = Reactive::new(0);
        prop.subscribe([recorder(&log, "a"), recorder(&log, "b")]);
        prop.subscribe([recorder(&log, "c")]);

        prop.set(1);
        prop.set(2);
        assert_eq!(
            *log.borrow(),
            vec!["a:1", "b:1", "c:1", "a:2", "b:2", "c:2"]
        );
    }

    #[test]
    fn test_same_subscriber_twice_is_not_deduplicated() {
        let count = Rc::new(Cell::new(0));
        let prop = Reactive::new(0);
        for _ in 0..2 {
            let c = Rc::clone(&count);
            prop.subscribe_fn(move |_| c.set(c.get() + 1));
        }
        let report = prop.set(5);
        assert_eq!(count.get(), 2);
        assert_eq!(report.delivered, 2);
        assert_eq!(prop.subscriber_count(), 2);
    }

    #[test]
    fn test_failing_subscriber_is_isolated() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let prop = Reactive::new(0);
        prop.subscribe([
            recorder(&log, "a"),
            Box::new(|v: &i32| Err(SubscriberError::new(format!("rejected {v}")))) as Subscriber<i32>,
            recorder(&log, "c"),
        ]);

        let report = prop.set(9);
        assert_eq!(*log.borrow(), vec!["a:9", "c:9"]);
        assert!(!report.is_clean());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].index, 1);
        assert_eq!(report.failures[0].error.to_string(), "rejected 9");
    }

    #[test]
    fn test_write_from_subscriber_is_queued() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let prop = Reactive::new(0);
        let inner = prop.clone();
        let deferred = Rc::new(Cell::new(false));
        let flag = Rc::clone(&deferred);
        prop.subscribe_fn(move |v| {
            if *v == 1 {
                flag.set(inner.set(2).deferred);
            }
        });
        prop.subscribe([recorder(&log, "b")]);

        let report = prop.set(1);
        assert!(deferred.get());
        assert_eq!(*log.borrow(), vec!["b:1", "b:2"]);
        assert_eq!(report.delivered, 4);
        assert_eq!(prop.get(), 2);
    }

    #[test]
    fn test_subscribe_during_notification_keeps_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let prop = Reactive::new(0);
        let handle = prop.clone();
        let late = Rc::clone(&log);
        let added = Rc::new(Cell::new(false));
        prop.subscribe_fn(move |_| {
            if !added.replace(true) {
                handle.subscribe([recorder(&late, "late")]);
            }
        });
        prop.subscribe([recorder(&log, "b")]);

        prop.set(1);
        prop.set(2);
        assert_eq!(*log.borrow(), vec!["b:1", "b:2", "late:2"]);
    }

    #[tokio::test]
    async fn test_history_counts_writes_not_subscribers() {
        let prop = Reactive::with_history_delay(0, Duration::from_millis(5));
        prop.subscribe_fn(|_| {});
        prop.subscribe_fn(|_| {});
        prop.subscribe_fn(|_| {});
        for v in [3, 1, 4] {
            prop.set(v);
        }

        let history = prop.history().await;
        assert_eq!(history, vec![3, 1, 4]);
    }

    #[tokio::test]
    async fn test_history_excludes_unwritten_initial_value() {
        let prop = Reactive::with_history_delay(7, Duration::from_millis(1));
        assert!(prop.history().await.is_empty());

        prop.set(7);
        assert_eq!(prop.history().await, vec![7]);
    }

    #[tokio::test]
    async fn test_history_is_a_snapshot() {
        let prop = Reactive::with_history_delay(0, Duration::from_millis(5));
        prop.set(1);
        let pending = prop.history();
        prop.set(2);
        assert_eq!(pending.await, vec![1]);
    }
}
