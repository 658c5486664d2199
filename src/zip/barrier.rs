//! # Barrier: the lock-free coordinator behind one zip subscription.
//!
//! A [`Barrier`] owns one state per upstream, the tuple slot buffer, the demand
//! counter, the error slot and the cancelled flag. It is handed to the consumer
//! as its [`Subscription`].
//!
//! ## Drain loop
//! ```text
//! request(n) / cancel() / on_next / on_complete / on_error
//!        │
//!        ▼
//!   Serialized::drain ── wip 0→1 ? ──no──► leave a redo mark, return
//!        │ yes
//!        ▼
//!   ┌─► cancelled or error latched? ──yes──► teardown, on_error (if any), park
//!   │   r = requested
//!   │   fill empty slots in index order:
//!   │     value          → slot
//!   │     none, finished → teardown, on_complete, park
//!   │     none, pending  → tuple incomplete
//!   │   r > 0 && complete?
//!   │     yes → combine, on_next, r -= 1,
//!   │           per source: re-check terminal flags, request_more, finished? → complete
//!   │           └─ loop to fill
//!   │     no  → requested -= emitted
//!   └── more redo marks? ──no──► exit
//! ```
//!
//! ## Rules
//! - The loop body runs on one thread at a time; tuples reach the consumer one by one.
//! - A terminal outcome parks the drain: nothing is assembled afterwards.
//! - Every source state is cancelled exactly once on any terminal path.
//! - Cancellation produces no terminal signal.
//!
//! ## Ownership
//! Each upstream holds its adapter, and each adapter holds the barrier, so a
//! running zip does not depend on the consumer keeping its handle. The
//! consumer and the source states live in the serialized drain state and are
//! dropped by the teardown; after a terminal outcome the barrier references
//! neither.

use std::fmt;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_utils::CachePadded;
use tracing::debug;

use super::buffer::SourceBuffer;
use super::demand;
use super::drain::Serialized;
use super::latch::ErrorSlot;
use super::publisher::Settings;
use super::scalar::ScalarState;
use super::state::SourceState;
use crate::error::{BoxError, InvalidDemand, ProtocolViolation, StreamError};
use crate::events::{Event, EventKind};
use crate::reactive::{Publisher, Subscriber, Subscription};

/// Folds one value per source into the emitted item.
pub type Combinator<T, R> = Arc<dyn Fn(&[T]) -> Result<R, BoxError> + Send + Sync>;

/// Callbacks the per-source adapters use to reach their barrier.
pub(crate) trait Coordinator: Send + Sync {
    fn drain(&self);
    fn report_error(&self, error: StreamError) -> Result<(), ProtocolViolation>;
    fn is_cancelled(&self) -> bool;
    fn publish(&self, event: Event);
}

const UNSTARTED: u8 = 0;
const RUNNING: u8 = 1;
const TERMINATED: u8 = 2;

enum Slots<T> {
    Assembling(Vec<Option<T>>),
    Terminated,
}

struct DrainState<T, R> {
    /// Taken by the teardown.
    subscriber: Option<Arc<dyn Subscriber<R>>>,
    states: Vec<SourceState<T>>,
    slots: Slots<T>,
    emitted: u64,
}

enum Outcome {
    Complete,
    Error(StreamError),
    Cancel,
}

/// Coordinator of one zip subscription.
pub struct Barrier<T, R> {
    combinator: Combinator<T, R>,
    settings: Arc<Settings>,
    requested: CachePadded<AtomicU64>,
    cancelled: AtomicBool,
    error: ErrorSlot,
    phase: AtomicU8,
    buffered: Vec<(usize, Arc<SourceBuffer<T>>)>,
    upstreams: usize,
    work: Serialized<DrainState<T, R>>,
}

impl<T, R> Barrier<T, R>
where
    T: fmt::Debug + Send + 'static,
    R: Send + 'static,
{
    /// Builds one state per source.
    ///
    /// Scalar values are resolved here, before any subscription exists, so a
    /// failing supplier aborts the whole start.
    pub(crate) fn new(
        sources: &[Arc<dyn Publisher<T>>],
        subscriber: Arc<dyn Subscriber<R>>,
        combinator: Combinator<T, R>,
        settings: Arc<Settings>,
    ) -> Result<Arc<Self>, StreamError> {
        let mut scalars = Vec::with_capacity(sources.len());
        for (index, source) in sources.iter().enumerate() {
            let value = match source.scalar() {
                None => None,
                Some(Ok(value)) => Some(value),
                Some(Err(err)) => {
                    return Err(StreamError::Start {
                        index,
                        source: Arc::from(err),
                    });
                }
            };
            scalars.push(value);
        }

        let upstreams = sources.len();
        let mut buffered = Vec::new();
        let states: Vec<SourceState<T>> = scalars
            .into_iter()
            .enumerate()
            .map(|(index, value)| match value {
                Some(value) => SourceState::Scalar(ScalarState::new(value)),
                None => {
                    let buffer = Arc::new(SourceBuffer::new(index, settings.prefetch));
                    buffered.push((index, Arc::clone(&buffer)));
                    SourceState::Buffered(buffer)
                }
            })
            .collect();

        Ok(Arc::new(Self {
            combinator,
            settings,
            requested: CachePadded::new(AtomicU64::new(0)),
            cancelled: AtomicBool::new(false),
            error: ErrorSlot::default(),
            phase: AtomicU8::new(UNSTARTED),
            buffered,
            upstreams,
            work: Serialized::new(DrainState {
                subscriber: Some(subscriber),
                states,
                slots: Slots::Assembling(empty_slots(upstreams)),
                emitted: 0,
            }),
        }))
    }

    /// Subscribes every asynchronous adapter to its source, then drains once.
    ///
    /// Each adapter carries a strong reference to this barrier, so the
    /// upstreams keep it alive. No-op once cancelled or terminated.
    pub(crate) fn start(self: &Arc<Self>, sources: &[Arc<dyn Publisher<T>>]) {
        if self.is_cancelled() || self.is_terminated() {
            return;
        }
        let _ = self
            .phase
            .compare_exchange(UNSTARTED, RUNNING, Ordering::AcqRel, Ordering::Acquire);

        for (index, buffer) in &self.buffered {
            if self.is_cancelled() {
                return;
            }
            let parent: Arc<dyn Coordinator> = self.clone();
            buffer.subscribe_to(parent, &*sources[*index]);
        }
        self.drain();
    }

    /// `true` once the consumer cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// `true` while sources are subscribed and tuples may still be assembled.
    pub fn is_started(&self) -> bool {
        self.phase.load(Ordering::Acquire) == RUNNING
    }

    /// `true` once a terminal outcome (complete, error, cancel) was reached.
    pub fn is_terminated(&self) -> bool {
        self.phase.load(Ordering::Acquire) == TERMINATED
    }

    /// The upstream error latched by this barrier, if any.
    pub fn error(&self) -> Option<StreamError> {
        self.error.get().cloned()
    }

    /// Outstanding downstream demand (`u64::MAX` means unbounded).
    pub fn requested_from_downstream(&self) -> u64 {
        self.requested.load(Ordering::Acquire)
    }

    /// Number of upstream sources zipped by this barrier.
    pub fn upstreams_count(&self) -> usize {
        self.upstreams
    }

    fn drain(&self) {
        self.work.drain(|st| self.drain_pass(st));
    }

    fn drain_pass(&self, st: &mut DrainState<T, R>) -> ControlFlow<()> {
        if let Some(outcome) = self.pending_outcome() {
            return self.finish(st, outcome);
        }

        let Some(subscriber) = st.subscriber.clone() else {
            return ControlFlow::Break(());
        };
        let mut r = self.requested.load(Ordering::Acquire);
        let mut emitted = 0u64;

        loop {
            let Slots::Assembling(slots) = &mut st.slots else {
                return ControlFlow::Break(());
            };

            let mut complete = true;
            let mut exhausted = false;
            for (slot, state) in slots.iter_mut().zip(st.states.iter_mut()) {
                if slot.is_some() {
                    continue;
                }
                match state.read_next() {
                    Some(value) => *slot = Some(value),
                    None if state.is_terminated() => {
                        exhausted = true;
                        break;
                    }
                    None => complete = false,
                }
            }
            if exhausted {
                return self.finish(st, Outcome::Complete);
            }
            if r == 0 || !complete {
                break;
            }

            // Taking every slot leaves a fresh buffer for the next tuple.
            let tuple: Vec<T> = slots.iter_mut().filter_map(Option::take).collect();
            let value = match (self.combinator)(&tuple) {
                Ok(value) => value,
                Err(err) => {
                    let err = StreamError::Combine {
                        tuple: format!("{tuple:?}"),
                        source: Arc::from(err),
                    };
                    return self.finish(st, Outcome::Error(err));
                }
            };
            if r != demand::UNBOUNDED {
                r -= 1;
            }
            emitted += 1;
            st.emitted += 1;
            subscriber.on_next(value);

            for i in 0..st.states.len() {
                if let Some(outcome) = self.pending_outcome() {
                    return self.finish(st, outcome);
                }
                let state = &mut st.states[i];
                state.request_more();
                if state.is_terminated() {
                    return self.finish(st, Outcome::Complete);
                }
            }
        }

        if emitted > 0 {
            demand::sub(&self.requested, emitted);
        }
        ControlFlow::Continue(())
    }

    fn pending_outcome(&self) -> Option<Outcome> {
        if self.is_cancelled() {
            return Some(Outcome::Cancel);
        }
        self.error.get().map(|err| Outcome::Error(err.clone()))
    }

    /// Tears down and delivers `outcome`. Always parks the drain.
    fn finish(&self, st: &mut DrainState<T, R>, outcome: Outcome) -> ControlFlow<()> {
        let discarded: u64 = st.states.iter().map(SourceState::pending).sum();

        st.slots = Slots::Terminated;
        self.phase.store(TERMINATED, Ordering::Release);
        for state in &mut st.states {
            state.cancel();
        }
        st.states.clear();
        let subscriber = st.subscriber.take();

        let emitted = st.emitted;
        match outcome {
            Outcome::Complete => {
                debug!(operator = self.name(), emitted, discarded, "zip completed");
                self.publish(Event::new(EventKind::ZipCompleted).with_emitted(emitted));
                if let Some(subscriber) = subscriber {
                    subscriber.on_complete();
                }
            }
            Outcome::Error(err) => {
                debug!(operator = self.name(), emitted, label = err.as_label(), "zip failed");
                self.publish(
                    Event::new(EventKind::ZipFailed)
                        .with_emitted(emitted)
                        .with_reason(err.to_string()),
                );
                if let Some(subscriber) = subscriber {
                    subscriber.on_error(err);
                }
            }
            Outcome::Cancel => {
                debug!(operator = self.name(), emitted, discarded, "zip cancelled");
                self.publish(Event::new(EventKind::ZipCancelled).with_emitted(emitted));
            }
        }
        ControlFlow::Break(())
    }

    fn name(&self) -> &str {
        self.settings.name.as_deref().unwrap_or("zip")
    }
}

impl<T, R> Coordinator for Barrier<T, R>
where
    T: fmt::Debug + Send + 'static,
    R: Send + 'static,
{
    fn drain(&self) {
        Barrier::drain(self);
    }

    fn report_error(&self, error: StreamError) -> Result<(), ProtocolViolation> {
        if self.is_terminated() {
            debug!(operator = self.name(), %error, "error after termination dropped");
            return Ok(());
        }
        self.error.latch(error)?;
        Barrier::drain(self);
        Ok(())
    }

    fn is_cancelled(&self) -> bool {
        Barrier::is_cancelled(self)
    }

    fn publish(&self, event: Event) {
        if let Some(bus) = &self.settings.bus {
            let event = match &self.settings.name {
                Some(name) => event.with_operator(Arc::clone(name)),
                None => event,
            };
            bus.publish(event);
        }
    }
}

impl<T, R> Subscription for Barrier<T, R>
where
    T: fmt::Debug + Send + 'static,
    R: Send + 'static,
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
        // Either we own the drain now, or the running owner sees the flag.
        self.work.park(|st| {
            let _ = self.finish(st, Outcome::Cancel);
        });
    }
}

fn empty_slots<T>(n: usize) -> Vec<Option<T>> {
    std::iter::repeat_with(|| None).take(n).collect()
}
