//! Reactive state primitives.
//!
//! [`ReactiveCell`] is a single slot with a write callback; [`Reactive`] is a
//! multi-subscriber property that also keeps its write history. Neither tracks
//! dependencies: a write runs exactly the callbacks registered on that value.

mod cell;
pub mod inspect;
mod property;

pub use cell::{ReactiveCell, Reset};
pub use property::{Notification, Reactive, Subscriber, SubscriberFailure, HISTORY_DELAY};
