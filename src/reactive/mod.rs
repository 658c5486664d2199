//! # Publisher / Subscriber / Subscription protocol roles.
//!
//! The push/pull contract every stage in this crate speaks:
//!
//! ```text
//!   Publisher::subscribe(subscriber)
//!        │
//!        ▼
//!   subscriber.on_subscribe(subscription)          exactly once
//!   subscriber.on_next(value)*                     at most the requested amount
//!   subscriber.on_complete() | on_error(error)     at most one, ends the interaction
//!
//!   subscription.request(n)   n > 0, additive, saturates at u64::MAX
//!   subscription.cancel()     idempotent; no terminal signal follows
//! ```
//!
//! Callbacks may arrive on any thread; implementations must be `Send + Sync`.

mod publisher;
mod subscriber;
mod subscription;

pub use publisher::Publisher;
pub use subscriber::Subscriber;
pub use subscription::{NoopSubscription, Subscription};
