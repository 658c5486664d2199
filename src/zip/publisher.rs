//! # The zip operator.
//!
//! [`ZipPublisher`] holds the source list and the combinator. Every consumer gets
//! its own [`Barrier`]; nothing is shared between subscriptions except the
//! operator settings.
//!
//! ```text
//! try_subscribe(None)      ──► Err(NullSubscriber)
//! subscribe(s), N == 0     ──► s.on_subscribe(noop), s.on_complete()
//! subscribe(s), N > 0      ──► Barrier::new ──ok──► s.on_subscribe(barrier), barrier.start()
//!                                          └─err─► s.on_subscribe(noop), s.on_error(Start)
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::warn;

use super::barrier::{Barrier, Combinator, Coordinator};
use super::builder::ZipBuilder;
use crate::error::{BoxError, ProtocolViolation};
use crate::events::{Bus, Event, EventKind};
use crate::reactive::{NoopSubscription, Publisher, Subscriber, Subscription};

/// Settings shared by every barrier of one operator.
#[derive(Debug)]
pub(crate) struct Settings {
    pub(crate) name: Option<Arc<str>>,
    pub(crate) prefetch: usize,
    pub(crate) bus: Option<Bus>,
}

/// Combines N publishers into one publisher of combined tuples.
///
/// The i-th emitted item is the combinator applied to the i-th value of every
/// source. The sequence completes as soon as any source is exhausted.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use zipbarrier::{Publisher, ZipPublisher, sources::Just};
///
/// let zip = ZipPublisher::new(vec![
///     Arc::new(Just::new(1i32)) as Arc<dyn Publisher<i32>>,
///     Arc::new(Just::new(2i32)),
/// ]);
/// assert_eq!(zip.upstreams_count(), 2);
/// ```
pub struct ZipPublisher<T, R = Vec<T>> {
    sources: Arc<[Arc<dyn Publisher<T>>]>,
    combinator: Combinator<T, R>,
    settings: Arc<Settings>,
}

impl<T> ZipPublisher<T, Vec<T>>
where
    T: Clone + fmt::Debug + Send + 'static,
{
    /// Zips `sources` into `Vec`s of one value per source, in source order.
    pub fn new(sources: Vec<Arc<dyn Publisher<T>>>) -> Self {
        ZipBuilder::new(sources).build()
    }

    /// Starts a builder for a named or configured operator.
    pub fn builder(sources: Vec<Arc<dyn Publisher<T>>>) -> ZipBuilder<T, Vec<T>> {
        ZipBuilder::new(sources)
    }
}

impl<T, R> ZipPublisher<T, R>
where
    T: fmt::Debug + Send + 'static,
    R: Send + 'static,
{
    /// Zips `sources` and folds every tuple with `combinator`.
    ///
    /// A combinator error ends the sequence with `StreamError::Combine`.
    pub fn with_combinator<F>(sources: Vec<Arc<dyn Publisher<T>>>, combinator: F) -> Self
    where
        F: Fn(&[T]) -> Result<R, BoxError> + Send + Sync + 'static,
    {
        Self::from_parts(
            sources,
            Arc::new(combinator),
            Settings {
                name: None,
                prefetch: crate::ZipConfig::default().prefetch_clamped(),
                bus: None,
            },
        )
    }

    pub(crate) fn from_parts(
        sources: Vec<Arc<dyn Publisher<T>>>,
        combinator: Combinator<T, R>,
        settings: Settings,
    ) -> Self {
        Self {
            sources: sources.into(),
            combinator,
            settings: Arc::new(settings),
        }
    }

    /// Subscribes a possibly absent consumer.
    ///
    /// A missing consumer is a protocol violation and is rejected before any
    /// source is touched, whatever the number of sources.
    pub fn try_subscribe(
        &self,
        subscriber: Option<Arc<dyn Subscriber<R>>>,
    ) -> Result<(), ProtocolViolation> {
        let subscriber = subscriber.ok_or(ProtocolViolation::NullSubscriber)?;
        let _ = self.connect(subscriber);
        Ok(())
    }

    /// Subscribes `subscriber` and returns the barrier driving its subscription.
    ///
    /// Returns `None` when there is nothing to drive: no sources, or a scalar
    /// source failed before anything was subscribed.
    pub fn connect(&self, subscriber: Arc<dyn Subscriber<R>>) -> Option<Arc<Barrier<T, R>>> {
        if self.sources.is_empty() {
            subscriber.on_subscribe(Arc::new(NoopSubscription));
            subscriber.on_complete();
            return None;
        }

        match Barrier::new(
            &self.sources,
            Arc::clone(&subscriber),
            Arc::clone(&self.combinator),
            Arc::clone(&self.settings),
        ) {
            Ok(barrier) => {
                barrier.publish(
                    Event::new(EventKind::ZipSubscribed)
                        .with_reason(format!("sources={}", self.sources.len())),
                );
                subscriber.on_subscribe(Arc::clone(&barrier) as Arc<dyn Subscription>);
                barrier.start(&self.sources);
                Some(barrier)
            }
            Err(err) => {
                warn!(operator = self.name(), label = err.as_label(), "{err}");
                if let Some(bus) = &self.settings.bus {
                    let ev = Event::new(EventKind::ZipFailed)
                        .with_emitted(0)
                        .with_reason(err.to_string());
                    bus.publish(match &self.settings.name {
                        Some(name) => ev.with_operator(Arc::clone(name)),
                        None => ev,
                    });
                }
                subscriber.on_subscribe(Arc::new(NoopSubscription));
                subscriber.on_error(err);
                None
            }
        }
    }

    /// Number of upstream sources.
    pub fn upstreams_count(&self) -> usize {
        self.sources.len()
    }

    /// Operator name used to tag events, if one was set.
    pub fn name(&self) -> Option<&str> {
        self.settings.name.as_deref()
    }

    /// Bus this operator publishes lifecycle events to, if any.
    pub fn bus(&self) -> Option<&Bus> {
        self.settings.bus.as_ref()
    }
}

impl<T, R> Publisher<R> for ZipPublisher<T, R>
where
    T: fmt::Debug + Send + 'static,
    R: Send + 'static,
{
    fn subscribe(&self, subscriber: Arc<dyn Subscriber<R>>) {
        let _ = self.connect(subscriber);
    }
}

impl<T, R> Clone for ZipPublisher<T, R> {
    fn clone(&self) -> Self {
        Self {
            sources: Arc::clone(&self.sources),
            combinator: Arc::clone(&self.combinator),
            settings: Arc::clone(&self.settings),
        }
    }
}

impl<T, R> fmt::Debug for ZipPublisher<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZipPublisher")
            .field("upstreams", &self.sources.len())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
