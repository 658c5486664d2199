use std::sync::Arc;

use crate::error::BoxError;
use crate::reactive::Subscriber;

/// A source of values under the push/pull protocol.
///
/// Besides the asynchronous `subscribe` handshake a publisher may expose a
/// *scalar* capability: a single value available synchronously. The zip operator
/// polls such sources directly instead of subscribing to them.
pub trait Publisher<T>: Send + Sync {
    /// Registers `subscriber`, which will receive `on_subscribe` exactly once.
    fn subscribe(&self, subscriber: Arc<dyn Subscriber<T>>);

    /// Returns the publisher's single value if it is available without subscribing.
    ///
    /// `None` means the publisher is asynchronous. `Some(Err(_))` reports a failure
    /// raised while producing the value.
    fn scalar(&self) -> Option<Result<T, BoxError>> {
        None
    }
}
