use std::fmt;
use std::sync::Arc;

use super::iter::IterSubscription;
use crate::error::{BoxError, StreamError};
use crate::reactive::{NoopSubscription, Publisher, Subscriber};

/// Publishes a single value known up front.
///
/// Exposes the value through [`Publisher::scalar`], so a zip reads it directly
/// instead of subscribing.
#[derive(Debug, Clone)]
pub struct Just<T> {
    value: T,
}

impl<T> Just<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }
}

impl<T> Publisher<T> for Just<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn subscribe(&self, subscriber: Arc<dyn Subscriber<T>>) {
        IterSubscription::start(Arc::from([self.value.clone()]), subscriber);
    }

    fn scalar(&self) -> Option<Result<T, BoxError>> {
        Some(Ok(self.value.clone()))
    }
}

/// Publishes the single value computed by a supplier, evaluated per subscriber.
///
/// A failing supplier is reported as `on_error` when subscribed to directly,
/// and aborts the start of a zip that reads it as a scalar.
pub struct Scalar<F> {
    supplier: F,
}

impl<F> Scalar<F> {
    pub fn new(supplier: F) -> Self {
        Self { supplier }
    }
}

impl<T, F> Publisher<T> for Scalar<F>
where
    T: Clone + Send + Sync + 'static,
    F: Fn() -> Result<T, BoxError> + Send + Sync,
{
    fn subscribe(&self, subscriber: Arc<dyn Subscriber<T>>) {
        match (self.supplier)() {
            Ok(value) => IterSubscription::start(Arc::from([value]), subscriber),
            Err(err) => {
                subscriber.on_subscribe(Arc::new(NoopSubscription));
                subscriber.on_error(StreamError::upstream(err));
            }
        }
    }

    fn scalar(&self) -> Option<Result<T, BoxError>> {
        Some((self.supplier)())
    }
}

impl<F> fmt::Debug for Scalar<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scalar").finish_non_exhaustive()
    }
}
