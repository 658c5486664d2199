use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use crate::error::{InvalidDemand, StreamError};
use crate::reactive::{Publisher, Subscriber, Subscription};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Signal {
    Subscribed,
    Next,
    Error,
    Complete,
}

/// Records every signal it receives.
pub(crate) struct Recorder<R> {
    subscription: OnceLock<Arc<dyn Subscription>>,
    signals: Mutex<Vec<Signal>>,
    values: Mutex<Vec<R>>,
    error: Mutex<Option<StreamError>>,
}

impl<R: Clone + Send + 'static> Recorder<R> {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            subscription: OnceLock::new(),
            signals: Mutex::new(Vec::new()),
            values: Mutex::new(Vec::new()),
            error: Mutex::new(None),
        })
    }

    pub(crate) fn request(&self, n: u64) {
        self.subscription
            .get()
            .expect("subscribed")
            .request(n)
            .expect("valid demand");
    }

    pub(crate) fn cancel(&self) {
        self.subscription.get().expect("subscribed").cancel();
    }

    pub(crate) fn signals(&self) -> Vec<Signal> {
        self.signals.lock().unwrap().clone()
    }

    pub(crate) fn values(&self) -> Vec<R> {
        self.values.lock().unwrap().clone()
    }

    pub(crate) fn error(&self) -> Option<StreamError> {
        self.error.lock().unwrap().clone()
    }

    pub(crate) fn is_complete(&self) -> bool {
        self.signals().contains(&Signal::Complete)
    }
}

impl<R: Clone + Send + 'static> Subscriber<R> for Recorder<R> {
    fn on_subscribe(&self, s: Arc<dyn Subscription>) {
        self.signals.lock().unwrap().push(Signal::Subscribed);
        let _ = self.subscription.set(s);
    }

    fn on_next(&self, value: R) {
        self.signals.lock().unwrap().push(Signal::Next);
        self.values.lock().unwrap().push(value);
    }

    fn on_error(&self, error: StreamError) {
        self.signals.lock().unwrap().push(Signal::Error);
        *self.error.lock().unwrap() = Some(error);
    }

    fn on_complete(&self) {
        self.signals.lock().unwrap().push(Signal::Complete);
    }
}

/// Upstream side of a [`Manual`] source: counts demand and cancellations.
#[derive(Default)]
pub(crate) struct Upstream {
    requested: AtomicU64,
    cancels: AtomicUsize,
}

impl Subscription for Upstream {
    fn request(&self, n: u64) -> Result<(), InvalidDemand> {
        if n == 0 {
            return Err(InvalidDemand { requested: n });
        }
        self.requested.fetch_add(n, Ordering::SeqCst);
        Ok(())
    }

    fn cancel(&self) {
        self.cancels.fetch_add(1, Ordering::SeqCst);
    }
}

/// Publisher driven by hand from the test body.
pub(crate) struct Manual<T> {
    upstream: Arc<Upstream>,
    subscriber: Mutex<Option<Arc<dyn Subscriber<T>>>>,
}

impl<T: Send + 'static> Manual<T> {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            upstream: Arc::new(Upstream::default()),
            subscriber: Mutex::new(None),
        })
    }

    fn downstream(&self) -> Arc<dyn Subscriber<T>> {
        self.subscriber.lock().unwrap().clone().expect("subscribed")
    }

    pub(crate) fn next(&self, value: T) {
        self.downstream().on_next(value);
    }

    pub(crate) fn complete(&self) {
        self.downstream().on_complete();
    }

    pub(crate) fn error(&self, error: StreamError) {
        self.downstream().on_error(error);
    }

    pub(crate) fn requested(&self) -> u64 {
        self.upstream.requested.load(Ordering::SeqCst)
    }

    pub(crate) fn cancels(&self) -> usize {
        self.upstream.cancels.load(Ordering::SeqCst)
    }
}

impl<T: Send + 'static> Publisher<T> for Manual<T> {
    fn subscribe(&self, subscriber: Arc<dyn Subscriber<T>>) {
        *self.subscriber.lock().unwrap() = Some(Arc::clone(&subscriber));
        subscriber.on_subscribe(Arc::clone(&self.upstream) as Arc<dyn Subscription>);
    }
}
