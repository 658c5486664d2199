use std::sync::Arc;

use crate::error::StreamError;
use crate::reactive::Subscription;

/// Consumer side of the protocol.
///
/// Receives `on_subscribe` once, then zero or more `on_next`, then at most one of
/// `on_complete` / `on_error`. After it cancels its subscription no further
/// signals are guaranteed to be delivered.
pub trait Subscriber<T>: Send + Sync {
    /// Hands over the subscription used to request values and to cancel.
    fn on_subscribe(&self, subscription: Arc<dyn Subscription>);

    /// Delivers one value. Never called more often than requested.
    fn on_next(&self, value: T);

    /// Terminal failure.
    fn on_error(&self, error: StreamError);

    /// Terminal success.
    fn on_complete(&self);
}
