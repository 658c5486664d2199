use std::sync::Arc;

use crate::error::StreamError;
use crate::reactive::{NoopSubscription, Publisher, Subscriber};

/// Completes immediately without emitting anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct Empty;

impl<T> Publisher<T> for Empty {
    fn subscribe(&self, subscriber: Arc<dyn Subscriber<T>>) {
        subscriber.on_subscribe(Arc::new(NoopSubscription));
        subscriber.on_complete();
    }
}

/// Fails immediately with a fixed error.
#[derive(Debug, Clone)]
pub struct Fail {
    error: StreamError,
}

impl Fail {
    pub fn new(error: StreamError) -> Self {
        Self { error }
    }
}

impl<T> Publisher<T> for Fail {
    fn subscribe(&self, subscriber: Arc<dyn Subscriber<T>>) {
        subscriber.on_subscribe(Arc::new(NoopSubscription));
        subscriber.on_error(self.error.clone());
    }
}
