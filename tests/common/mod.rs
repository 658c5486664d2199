#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use zipbarrier::{InvalidDemand, Publisher, StreamError, Subscriber, Subscription};

/// One signal as seen by a [`TestSubscriber`].
#[derive(Debug, Clone, PartialEq)]
pub enum Seen<T> {
    Subscribed,
    Next(T),
    Error(String),
    Complete,
}

/// Consumer that records every signal, in arrival order.
pub struct TestSubscriber<T> {
    initial: u64,
    retain: bool,
    subscription: OnceLock<Arc<dyn Subscription>>,
    seen: Mutex<Vec<Seen<T>>>,
    errors: Mutex<Vec<StreamError>>,
}

impl<T: Clone + Send + 'static> TestSubscriber<T> {
    pub fn new() -> Arc<Self> {
        Self::requesting(0)
    }

    /// Requests `n` from inside `on_subscribe` (0 means nothing).
    pub fn requesting(n: u64) -> Arc<Self> {
        Self::build(n, true)
    }

    /// Requests `n` from inside `on_subscribe`, then lets the handle go.
    pub fn fire_and_forget(n: u64) -> Arc<Self> {
        Self::build(n, false)
    }

    fn build(initial: u64, retain: bool) -> Arc<Self> {
        Arc::new(Self {
            initial,
            retain,
            subscription: OnceLock::new(),
            seen: Mutex::new(Vec::new()),
            errors: Mutex::new(Vec::new()),
        })
    }

    pub fn request(&self, n: u64) {
        self.subscription().request(n).expect("positive demand");
    }

    pub fn cancel(&self) {
        self.subscription().cancel();
    }

    pub fn subscription(&self) -> &Arc<dyn Subscription> {
        self.subscription.get().expect("on_subscribe was called")
    }

    pub fn seen(&self) -> Vec<Seen<T>> {
        self.seen.lock().unwrap().clone()
    }

    pub fn values(&self) -> Vec<T> {
        self.seen()
            .into_iter()
            .filter_map(|s| match s {
                Seen::Next(v) => Some(v),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<StreamError> {
        self.errors.lock().unwrap().clone()
    }

    pub fn completions(&self) -> usize {
        self.count(|s| matches!(s, Seen::Complete))
    }

    pub fn terminals(&self) -> usize {
        self.count(|s| matches!(s, Seen::Complete | Seen::Error(_)))
    }

    pub fn is_terminated(&self) -> bool {
        self.terminals() > 0
    }

    fn count(&self, f: impl Fn(&Seen<T>) -> bool) -> usize {
        self.seen.lock().unwrap().iter().filter(|s| f(s)).count()
    }
}

impl<T: Clone + Send + 'static> Subscriber<T> for TestSubscriber<T> {
    fn on_subscribe(&self, s: Arc<dyn Subscription>) {
        self.seen.lock().unwrap().push(Seen::Subscribed);
        if self.retain {
            let _ = self.subscription.set(Arc::clone(&s));
        }
        if self.initial > 0 {
            s.request(self.initial).expect("positive demand");
        }
    }

    fn on_next(&self, value: T) {
        self.seen.lock().unwrap().push(Seen::Next(value));
    }

    fn on_error(&self, error: StreamError) {
        self.seen.lock().unwrap().push(Seen::Error(error.to_string()));
        self.errors.lock().unwrap().push(error);
    }

    fn on_complete(&self) {
        self.seen.lock().unwrap().push(Seen::Complete);
    }
}

/// Upstream handle handed out by a [`ManualSource`].
#[derive(Default)]
pub struct Handle {
    requested: AtomicU64,
    cancels: AtomicUsize,
}

impl Handle {
    pub fn requested(&self) -> u64 {
        self.requested.load(Ordering::SeqCst)
    }

    pub fn cancels(&self) -> usize {
        self.cancels.load(Ordering::SeqCst)
    }
}

impl Subscription for Handle {
    fn request(&self, n: u64) -> Result<(), InvalidDemand> {
        if n == 0 {
            return Err(InvalidDemand { requested: n });
        }
        let _ = self
            .requested
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |r| {
                Some(r.saturating_add(n))
            });
        Ok(())
    }

    fn cancel(&self) {
        self.cancels.fetch_add(1, Ordering::SeqCst);
    }
}

/// Asynchronous source driven by hand, from any thread.
///
/// It does not enforce demand: pushing more than requested is the test's choice.
pub struct ManualSource<T> {
    handle: Arc<Handle>,
    subscriber: Mutex<Option<Arc<dyn Subscriber<T>>>>,
}

impl<T: Send + 'static> ManualSource<T> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            handle: Arc::new(Handle::default()),
            subscriber: Mutex::new(None),
        })
    }

    pub fn erased(self: &Arc<Self>) -> Arc<dyn Publisher<T>> {
        Arc::clone(self) as Arc<dyn Publisher<T>>
    }

    fn downstream(&self) -> Arc<dyn Subscriber<T>> {
        self.subscriber
            .lock()
            .unwrap()
            .clone()
            .expect("source was subscribed")
    }

    pub fn next(&self, value: T) {
        self.downstream().on_next(value);
    }

    pub fn complete(&self) {
        self.downstream().on_complete();
    }

    pub fn error(&self, error: StreamError) {
        self.downstream().on_error(error);
    }

    /// Calls `on_subscribe` a second time with a fresh handle (a protocol violation).
    pub fn resubscribe(&self) -> Arc<Handle> {
        let extra = Arc::new(Handle::default());
        self.downstream()
            .on_subscribe(Arc::clone(&extra) as Arc<dyn Subscription>);
        extra
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscriber.lock().unwrap().is_some()
    }

    pub fn requested(&self) -> u64 {
        self.handle.requested()
    }

    pub fn cancels(&self) -> usize {
        self.handle.cancels()
    }
}

impl<T: Send + 'static> Publisher<T> for ManualSource<T> {
    fn subscribe(&self, subscriber: Arc<dyn Subscriber<T>>) {
        *self.subscriber.lock().unwrap() = Some(Arc::clone(&subscriber));
        subscriber.on_subscribe(Arc::clone(&self.handle) as Arc<dyn Subscription>);
    }
}
