//! # Demand-honoring publisher over an in-memory sequence.
//!
//! Values are emitted synchronously on whichever thread calls `request`, never
//! more than requested. Re-entrant requests (a subscriber asking for more from
//! inside `on_next`) only add demand; the running drain picks it up.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::error::InvalidDemand;
use crate::reactive::{Publisher, Subscriber, Subscription};
use crate::zip::demand;
use crate::zip::drain::Serialized;

/// Publishes every item of a sequence, then completes.
///
/// Each subscriber gets its own cursor over the shared items.
#[derive(Debug)]
pub struct FromIter<T> {
    items: Arc<[T]>,
}

impl<T> FromIter<T> {
    pub fn new(items: impl IntoIterator<Item = T>) -> Self {
        Self {
            items: items.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> Publisher<T> for FromIter<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn subscribe(&self, subscriber: Arc<dyn Subscriber<T>>) {
        IterSubscription::start(Arc::clone(&self.items), subscriber);
    }
}

struct Cursor<T> {
    items: Arc<[T]>,
    next: usize,
    // Dropped at the terminal signal so the subscriber is not kept alive by us.
    subscriber: Option<Arc<dyn Subscriber<T>>>,
}

pub(crate) struct IterSubscription<T> {
    requested: AtomicU64,
    cancelled: AtomicBool,
    work: Serialized<Cursor<T>>,
}

impl<T> IterSubscription<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Hands a fresh subscription to `subscriber`.
    ///
    /// An empty sequence completes right away, without waiting for demand.
    pub(crate) fn start(items: Arc<[T]>, subscriber: Arc<dyn Subscriber<T>>) {
        let sub = Arc::new(Self {
            requested: AtomicU64::new(0),
            cancelled: AtomicBool::new(false),
            work: Serialized::new(Cursor {
                items,
                next: 0,
                subscriber: Some(Arc::clone(&subscriber)),
            }),
        });
        subscriber.on_subscribe(Arc::clone(&sub) as Arc<dyn Subscription>);
        sub.drain();
    }

    fn drain(&self) {
        self.work.drain(|cur| self.emit(cur));
    }

    fn emit(&self, cur: &mut Cursor<T>) -> ControlFlow<()> {
        let r = self.requested.load(Ordering::Acquire);
        let mut emitted = 0u64;

        loop {
            if self.cancelled.load(Ordering::Acquire) {
                cur.subscriber = None;
                return ControlFlow::Break(());
            }
            let Some(subscriber) = cur.subscriber.clone() else {
                return ControlFlow::Break(());
            };
            let Some(value) = cur.items.get(cur.next).cloned() else {
                cur.subscriber = None;
                subscriber.on_complete();
                return ControlFlow::Break(());
            };
            if emitted == r {
                break;
            }
            cur.next += 1;
            emitted += 1;
            subscriber.on_next(value);
        }

        demand::sub(&self.requested, emitted);
        ControlFlow::Continue(())
    }
}

impl<T> Subscription for IterSubscription<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn request(&self, n: u64) -> Result<(), InvalidDemand> {
        if n == 0 {
            return Err(InvalidDemand { requested: n });
        }
        demand::add(&self.requested, n);
        self.drain();
        Ok(())
    }

    fn cancel(&self) {
        if self.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }
        self.work.park(|cur| cur.subscriber = None);
    }
}
